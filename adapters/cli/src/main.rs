#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays Castle Defence sessions.

mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use session::{Session, SessionReport, DEFAULT_SESSION};

const DEFAULT_LOG_FILTER: &str = "info";

/// Replays a scripted wall-building session and reports the resulting enclosure.
#[derive(Debug, Parser)]
#[command(name = "castle-defence", version, about)]
struct Cli {
    /// Session file to replay; the built-in session runs when omitted.
    #[arg(long, value_name = "FILE")]
    session: Option<PathBuf>,

    /// Log filter directives, overriding `RUST_LOG`.
    #[arg(long, value_name = "FILTER")]
    log_filter: Option<String>,
}

/// Entry point for the Castle Defence command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_filter.as_deref())?;

    let session = match &cli.session {
        Some(path) => Session::load(path)?,
        None => Session::parse(DEFAULT_SESSION).context("built-in session is invalid")?,
    };

    print_report(&session.replay());
    Ok(())
}

fn init_tracing(directives: Option<&str>) -> Result<()> {
    let filter = match directives {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("failed to install tracing subscriber")
}

fn print_report(report: &SessionReport) {
    println!(
        "walls: {}  enclosed: {}  open gaps: {}",
        report.stats.wall_count, report.stats.enclosed_count, report.stats.open_gap_count
    );

    let enclosed = report
        .enclosed
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    println!("enclosed cells: {enclosed}");

    if report.structures.is_empty() {
        println!("structures: none");
    } else {
        println!("structures:");
        for (cell, name) in &report.structures {
            println!("  {cell} {name}");
        }
    }

    println!("gold: {}", report.balance);
    println!("mode: {:?}", report.play_mode);
    println!("events: {}", report.event_count);
}
