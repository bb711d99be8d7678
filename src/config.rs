use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::viz::RenderOptions;

/// Run configuration loaded from a TOML or JSON file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the saliency figure is written.
    pub figure_path: String,
    /// Blend factor for the overlay panel.
    pub overlay_alpha: f32,
    /// Spread of the standardized gradient around `brightness`.
    pub saturation: f32,
    /// Centre of the displayable gradient range.
    pub brightness: f32,
    /// Side length images are resized to before entering the network.
    pub image_side: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            figure_path: "saliency.png".to_string(),
            overlay_alpha: 0.3,
            saturation: 0.1,
            brightness: 0.5,
            image_side: 224,
        }
    }
}

impl Config {
    /// Load configuration from the given path.  Supports TOML or JSON based
    /// on the file extension. Returns `None` if reading or parsing fails.
    pub fn from_path(path: &str) -> Option<Self> {
        let Ok(content) = fs::read_to_string(path) else {
            return None;
        };
        if path.ends_with(".json") {
            serde_json::from_str(&content).ok()
        } else {
            toml::from_str(&content).ok()
        }
    }

    /// Convert into the rendering options the visualization wrapper takes.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            figure_path: PathBuf::from(&self.figure_path),
            overlay_alpha: self.overlay_alpha,
            saturation: self.saturation,
            brightness: self.brightness,
            image_side: self.image_side,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join("saliency-config-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("run.toml");
        fs::write(&path, "overlay_alpha = 0.5\nimage_side = 299\n").unwrap();
        let cfg = Config::from_path(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.overlay_alpha, 0.5);
        assert_eq!(cfg.image_side, 299);
        assert_eq!(cfg.figure_path, "saliency.png");
    }

    #[test]
    fn missing_file_yields_none() {
        assert!(Config::from_path("does-not-exist.toml").is_none());
    }
}
