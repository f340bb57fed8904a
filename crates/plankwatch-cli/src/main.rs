mod report;
mod run;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use plankwatch_core::Retailer;

#[derive(Debug, Parser)]
#[command(name = "plankwatch")]
#[command(about = "Regional hardwood flooring price scraper")]
struct Cli {
    /// Scrape a single unvisited region per retailer and skip the
    /// post-run validation gate.
    #[arg(long)]
    test: bool,

    /// Restrict the run to one retailer (hd, lowes).
    #[arg(long)]
    retailer: Option<Retailer>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match plankwatch_core::load_app_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::from(1);
        }
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match run::execute(&config, cli.test, cli.retailer).await {
        Ok(run::RunStatus::Success) => ExitCode::SUCCESS,
        Ok(run::RunStatus::ValidationFailed) => ExitCode::from(1),
        Ok(run::RunStatus::PreflightBlocked) => ExitCode::from(2),
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            ExitCode::from(1)
        }
    }
}
