//! lokigen - Loki deployment manifest generator

use clap::Parser;
use lokigen::cli::Cli;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Parse command-line arguments; clap exits on usage errors
    let cli = Cli::parse();

    init_logging(cli.debug_enabled());
    info!("Starting lokigen");

    if let Err(e) = cli.execute() {
        error!("Error: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let debug = debug
        || std::env::var("LOKIGEN_DEBUG")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);
    let default_filter = if debug { "lokigen=debug" } else { "lokigen=warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let json = std::env::var("LOKIGEN_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
