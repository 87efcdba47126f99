use clap::{Parser, Subcommand};
use gridco2::cli::fetch::FetchArgs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gridco2")]
#[command(about = "Grid carbon-intensity acquisition, simulator log parsing and plotting", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a date range for one configured source and write it as CSV
    Fetch {
        #[arg(long)]
        source: String,
        /// First day, YYYY-MM-DD (UTC) or RFC 3339
        #[arg(long)]
        start: String,
        /// Exclusive end day, YYYY-MM-DD (UTC) or RFC 3339
        #[arg(long)]
        end: String,
        /// Defaults to <output.directory>/<source>.csv
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Extract per-job carbon emission and SLO timeouts from a simulator log
    ParseLog {
        log: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Succeed even when no simulator state blocks are found
        #[arg(long)]
        allow_empty: bool,
    },
    /// Plot hour-of-day averages for a CSV file or a directory of CSV files
    Plot {
        input: PathBuf,
        /// SVG destination; printed to stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Init {
        #[arg(long)]
        stdout: bool,
    },
    Validate,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // stdout carries charts and summaries
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gridco2=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<(), gridco2::cli::CliError> {
    let config_path = gridco2::config::resolve_config_path(cli.config.as_deref());

    match cli.command {
        Commands::Fetch {
            source,
            start,
            end,
            output,
        } => {
            let args = FetchArgs {
                source,
                start,
                end,
                output,
            };
            let path = gridco2::cli::fetch::run(config_path.as_deref(), &args).await?;
            println!("{}", path.display());
        }
        Commands::ParseLog {
            log,
            output,
            allow_empty,
        } => {
            let summary = gridco2::cli::parse_log::run(&log, output.as_deref(), allow_empty)?;
            println!("rows: {}", summary.rows);
            if let Some(mean) = summary.mean_carbon_emission {
                println!("mean carbon emission: {}", mean);
            }
            if let Some(mean) = summary.mean_slo_timeout {
                println!("mean SLO timeout: {}", mean);
            }
        }
        Commands::Plot { input, output } => {
            gridco2::cli::plot::run(&input, output.as_deref())?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { stdout } => {
                gridco2::cli::config::init(stdout)?;
            }
            ConfigAction::Validate => {
                gridco2::cli::config::validate(config_path.as_deref())?;
            }
        },
    }

    Ok(())
}
