//! detection_history - list past submissions, newest first

use anyhow::Result;
use clap::Parser;

use detection_pipeline::error::exit_code;
use detection_pipeline::{DetectionClient, PipelineConfig, PipelineError};

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(author, version, about = "List past detection submissions")]
struct Args {
    /// Show at most this many rows.
    #[arg(long)]
    limit: Option<usize>,

    /// Print rows as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// UI mode for stderr progress (auto|plain|pretty)
    #[arg(long, default_value = "auto", value_name = "MODE")]
    ui: ui::UiMode,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("error: {:#}", err);
        let code = err.downcast_ref::<PipelineError>().map(exit_code).unwrap_or(1);
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let cfg = PipelineConfig::load()?;
    let ui = ui::Ui::new(args.ui);

    let service = cfg.api.service();
    let base = service.endpoints().base()?;
    let client = DetectionClient::new(service, cfg.polling);
    let mut rows = {
        let mut stage = ui.stage("Fetch history");
        let rows = client.history()?;
        stage.finish_with(format!("{} row(s)", rows.len()));
        rows
    };
    if let Some(limit) = args.limit {
        rows.truncate(limit);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No records yet.");
        return Ok(());
    }
    for row in &rows {
        println!(
            "#{} {} {} detection(s) {}",
            row.id.as_deref().unwrap_or("?"),
            row.filename.as_deref().unwrap_or("-"),
            row.result.total(),
            row.annotated_url(&base).unwrap_or_default()
        );
    }
    Ok(())
}
