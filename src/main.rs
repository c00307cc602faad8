use clap::Parser;
use stallwatch_core::FailureReport;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod runner;

use runner::RunOptions;

#[derive(Parser, Debug)]
#[command(name = "stallwatch", about = "Parking stall occupancy from a single camera frame")]
struct Args {
    /// Frame to analyse
    #[arg(long)]
    image: PathBuf,

    /// Zone layout JSON (defaults to the config's zones_file)
    #[arg(long, env = "STALLWATCH_ZONES")]
    zones: Option<PathBuf>,

    /// Detections dumped by an external model
    #[arg(long)]
    detections: Option<PathBuf>,

    /// Pipeline configuration JSON
    #[arg(long, env = "STALLWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Write the annotated frame here
    #[arg(long)]
    annotated: Option<PathBuf>,

    /// Leave `image_annotated` out of the report
    #[arg(long)]
    no_image: bool,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,
}

fn print_json<T: serde::Serialize>(value: &T, compact: bool) {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };

    match rendered {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialise report: {}", e),
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("stallwatch=info,stallwatch_cv=info,stallwatch_core=info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let options = RunOptions {
        image: args.image,
        zones: args.zones,
        detections: args.detections,
        config: args.config,
        annotated: args.annotated,
        embed_image: !args.no_image,
    };

    match runner::run(&options) {
        Ok(report) => {
            tracing::info!(
                "{}/{} stalls occupied ({}%)",
                report.occupied,
                report.total,
                report.occupancy_rate
            );
            print_json(&report, args.compact);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Analysis failed: {:#}", e);
            print_json(&FailureReport::new(format!("{:#}", e)), args.compact);
            ExitCode::FAILURE
        }
    }
}
