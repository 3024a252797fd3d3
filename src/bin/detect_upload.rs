//! detect_upload - submit an image and print overlay-ready detections
//!
//! 1. Loads `PipelineConfig` (DETECT_CONFIG file plus DETECT_* overrides)
//! 2. Uploads the image and polls until detections arrive or the budget ends
//! 3. Maps the boxes to the requested display width and prints JSON

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use detection_pipeline::error::exit_code;
use detection_pipeline::{
    image_size, map_result, CancelToken, DetectionClient, DetectionResult, DisplayBox,
    ImageUpload, PipelineConfig, PipelineError,
};

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Upload an image to the detection service and map its boxes onto a display"
)]
struct Args {
    /// Image file to submit.
    image: PathBuf,

    /// Width of the display surface in pixels.
    #[arg(long, default_value_t = 640.0)]
    display_width: f64,

    /// Override the configured number of poll attempts.
    #[arg(long)]
    attempts: Option<u32>,

    /// Override the configured pause between poll attempts.
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Keep boxes below the configured score threshold.
    #[arg(long)]
    all_boxes: bool,

    /// Write the JSON report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: ui::UiMode,
}

#[derive(Serialize)]
struct Report<'a> {
    result: &'a DetectionResult,
    display: DisplayReport<'a>,
}

#[derive(Serialize)]
struct DisplayReport<'a> {
    width: f64,
    height: f64,
    /// False when `height` is the placeholder.
    height_known: bool,
    boxes: Vec<&'a DisplayBox>,
    captions: Vec<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        log::warn!("detect_upload failed: {:#}", err);
        eprintln!("error: {:#}", err);
        let code = err.downcast_ref::<PipelineError>().map(exit_code).unwrap_or(1);
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    if !(args.display_width > 0.0) {
        return Err(anyhow!("--display-width must be positive"));
    }

    let mut cfg = PipelineConfig::load()?;
    if let Some(attempts) = args.attempts {
        if attempts == 0 {
            return Err(anyhow!("--attempts must be at least 1"));
        }
        cfg.polling.max_attempts = attempts;
    }
    if let Some(ms) = args.interval_ms {
        cfg.polling.interval = Duration::from_millis(ms);
    }

    let ui = ui::Ui::new(args.ui);
    let upload = ImageUpload::from_path(&args.image)?;
    let local_size = image_size::measure_bytes(&upload.bytes);
    if local_size.is_none() {
        log::warn!(
            "could not read dimensions of {}; relying on server-reported size",
            args.image.display()
        );
    }

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel()).context("install Ctrl-C handler")?;

    let client = DetectionClient::new(cfg.api.service(), cfg.polling).with_cancel(cancel);
    let result = {
        let mut stage = ui.stage("Upload & detect");
        let result = client.submit_and_detect(&upload)?;
        stage.finish_with(format!("{} detection(s)", result.total()));
        result
    };

    let overlay = map_result(&result, local_size, args.display_width);
    let threshold = if args.all_boxes {
        f64::NEG_INFINITY
    } else {
        cfg.overlay.score_threshold
    };
    let boxes: Vec<&DisplayBox> = overlay.visible(threshold).collect();
    let report = Report {
        result: &result,
        display: DisplayReport {
            width: args.display_width,
            height: overlay.height_or(cfg.overlay.placeholder_height),
            height_known: overlay.display_height.is_some(),
            captions: boxes.iter().map(|b| b.caption()).collect(),
            boxes,
        },
    };

    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => {
            let _stage = ui.stage("Write report");
            std::fs::write(path, json)
                .with_context(|| format!("write report to {}", path.display()))?;
            println!("report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
