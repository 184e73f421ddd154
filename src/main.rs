mod browser;
mod config;
mod csv_writer;
mod error;
mod extract;
mod input;
mod models;
mod pipeline;
mod prompt;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::browser::ChromeFetcher;
use crate::config::AppConfig;
use crate::csv_writer::{output_file_name, CsvExporter};
use crate::error::AppError;
use crate::extract::PositionalParser;
use crate::pipeline::Pipeline;

/// Scrape fund performance figures into `fund_list_<YYYYMMDD>.csv`.
///
/// Exit codes: 0 success or declined, 1 other failure, 2 input not found,
/// 3 input empty, 4 input unreadable, 5 fund page unreachable,
/// 6 fund page not found, 7 fund page in unexpected format.
#[derive(Parser)]
#[command(name = "fund-scraper", version)]
struct Cli {
    /// File with one fund id per line
    input: PathBuf,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    // Fixed for the whole run, even across midnight.
    let output = output_file_name(chrono::Local::now().date_naive());

    let config = AppConfig::load().map_err(|e| AppError::Config(format!("{e:#}")))?;
    let mut browser = config.browser;
    if cli.headed {
        browser.headless = false;
        info!("Running in headed mode (browser visible)");
    }

    let parser = PositionalParser::new(config.site.converted_value_class.clone());
    let mut pipeline = Pipeline::new(
        ChromeFetcher::new(browser),
        parser,
        config.site,
        CsvExporter::new(output.clone()),
    );

    let rows = pipeline
        .confirm_and_run(io::stdin().lock(), io::stdout(), &cli.input)
        .await?;
    if let Some(rows) = rows {
        info!("Scraping complete! {} funds saved to {}", rows, output.display());
    }
    Ok(())
}
