use std::env;
use std::path::PathBuf;
use std::process;

use saliency::config::Config;
use saliency::logging::{Logger, RunRecord};
use saliency::models::{self, Network};
use saliency::viz;
use saliency::weights;

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {} <IMAGE_PATH> [--model simple|inception] [--classes N] \
         [--weights PATH] [--guided] [--take-max] [--cpu] [--config PATH] [--out PATH]",
        program
    );
    process::exit(1);
}

fn main() {
    env_logger::init();

    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "saliency".to_string());

    let mut image = None;
    let mut model_name = "simple".to_string();
    let mut classes = 10usize;
    let mut weights_path = None;
    let mut guided = false;
    let mut take_max = false;
    let mut use_accelerator = true;
    let mut config_path = None;
    let mut out = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--model" => model_name = args.next().unwrap_or_else(|| usage(&program)),
            "--classes" => {
                classes = args
                    .next()
                    .and_then(|n| n.parse().ok())
                    .unwrap_or_else(|| usage(&program));
            }
            "--weights" => weights_path = Some(args.next().unwrap_or_else(|| usage(&program))),
            "--guided" => guided = true,
            "--take-max" => take_max = true,
            "--cpu" => use_accelerator = false,
            "--config" => config_path = Some(args.next().unwrap_or_else(|| usage(&program))),
            "--out" => out = Some(args.next().unwrap_or_else(|| usage(&program))),
            _ => image = Some(arg),
        }
    }
    let Some(image) = image else { usage(&program) };

    let cfg = config_path
        .as_deref()
        .and_then(Config::from_path)
        .unwrap_or_default();
    let mut opts = cfg.render_options();
    if let Some(out) = out {
        opts.figure_path = PathBuf::from(out);
    }

    let mut net = match model_name.as_str() {
        "simple" => models::simple_cnn(opts.image_side, classes),
        "inception" => models::inception_mini(classes),
        other => {
            log::error!("unknown model '{other}'");
            usage(&program);
        }
    };
    // Resolution-bound architectures dictate the preprocessing size.
    if let Some((side, _)) = net.input_spec().fixed_hw {
        opts.image_side = side;
    }

    if let Some(path) = &weights_path {
        if let Err(e) = weights::load_network(path, &mut net) {
            log::error!("failed to load weights from {path}: {e}");
            process::exit(1);
        }
    }

    let (_clipped, raw) =
        match viz::get_input_gradient_with(&mut net, &image, guided, take_max, use_accelerator, &opts)
        {
            Ok(v) => v,
            Err(e) => {
                log::error!("saliency computation failed: {e}");
                process::exit(1);
            }
        };

    let (lo, hi) = raw
        .data
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    log::info!(
        "gradient range [{lo:.6}, {hi:.6}], figure written to {}",
        opts.figure_path.display()
    );

    match Logger::new(None, None) {
        Ok(mut logger) => {
            if let Err(e) = logger.log(&RunRecord {
                image: &image,
                guided,
                take_max,
                grad_min: lo,
                grad_max: hi,
            }) {
                log::error!("failed to write run record: {e}");
            }
        }
        Err(e) => log::error!("failed to open run log: {e}"),
    }
}
