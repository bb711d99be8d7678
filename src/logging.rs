use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use csv::Writer;
use serde::Serialize;

/// Writes one record per saliency run to a JSONL and a CSV file under
/// `runs/<experiment>/`.
pub struct Logger {
    json: File,
    csv: Writer<File>,
}

#[derive(Serialize)]
pub struct RunRecord<'a> {
    pub image: &'a str,
    pub guided: bool,
    pub take_max: bool,
    pub grad_min: f32,
    pub grad_max: f32,
}

impl Logger {
    pub fn new(log_dir: Option<String>, experiment: Option<String>) -> io::Result<Self> {
        let base = log_dir.unwrap_or_else(|| "runs".to_string());
        let exp = experiment.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_else(|_| Duration::from_secs(0))
                .as_secs()
                .to_string()
        });
        let dir = PathBuf::from(base).join(exp);
        std::fs::create_dir_all(&dir)?;
        let json = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("records.jsonl"))?;
        let csv_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("records.csv"))?;
        let csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(csv_file);
        Ok(Logger { json, csv })
    }

    /// Append one run record to both sinks.
    pub fn log(&mut self, record: &RunRecord) -> io::Result<()> {
        let line = serde_json::to_string(record)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        writeln!(self.json, "{}", line)?;
        self.csv
            .serialize(record)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        self.csv.flush()?;
        Ok(())
    }
}
