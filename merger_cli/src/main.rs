mod run;
mod ui;

use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

#[derive(Parser)]
#[command(name = "metrics-merger")]
#[command(about = "Merges per-run wrk2 latency histograms into per-mesh summary series", long_about = None)]
#[command(version)]
struct Cli {
    /// Prometheus server URL
    prometheus_url: String,

    /// Prometheus push gateway host:port
    pushgateway: String,

    /// Config file (YAML, TOML, or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mesh to merge; repeat to merge several (overrides the configured list)
    #[arg(short, long = "mesh")]
    meshes: Vec<String>,

    /// Value of the `instance` grouping key used when pushing
    #[arg(long)]
    instance: Option<String>,

    /// Timeout for each query and push, e.g. "30s"
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Continue with the remaining meshes when one fails
    #[arg(long)]
    keep_going: bool,

    /// Print the summary series instead of pushing them
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let program = std::env::args().next().unwrap_or_else(|| "metrics-merger".to_string());
            ui::print_usage(&program);
            eprint!("{}", e.render());
            std::process::exit(1);
        }
    };

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    run::execute(run::RunOptions {
        prometheus_url: cli.prometheus_url,
        pushgateway: cli.pushgateway,
        config: cli.config,
        meshes: cli.meshes,
        instance: cli.instance,
        timeout: cli.timeout,
        keep_going: cli.keep_going,
        dry_run: cli.dry_run,
    })
    .await
}
