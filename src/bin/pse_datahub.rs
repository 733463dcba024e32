use pse_datahub::config::{parse_time_of_day, Config};
use pse_datahub::scrapers::pse::PSEScraper;
use pse_datahub::services::pipeline::{Pipeline, PipelineReport};
use pse_datahub::services::scheduler::DailySchedule;
use pse_datahub::store::MySqlStore;
use pse_datahub::Result;

use anyhow::Context;
use clap::{App, Arg, SubCommand};
use log::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = App::new("PSE DataHub")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Load PSE company directory and daily prices into MySQL")
        .subcommand(SubCommand::with_name("run").about("Load companies, then prices, once"))
        .subcommand(SubCommand::with_name("companies").about("Load the company directory only"))
        .subcommand(
            SubCommand::with_name("prices")
                .about("Load daily prices for known companies")
                .arg(
                    Arg::with_name("symbol")
                        .short('s')
                        .long("symbol")
                        .value_name("SYMBOL")
                        .help("Only load prices for this ticker (repeatable)")
                        .takes_value(true)
                        .multiple_occurrences(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("schedule")
                .about("Run the full pipeline every day at a fixed local time")
                .arg(
                    Arg::with_name("at")
                        .long("at")
                        .value_name("HH:MM")
                        .help("Time of day to run (overrides PSE_SCHEDULE_AT)")
                        .takes_value(true),
                ),
        );

    let matches = app.get_matches();
    let mut config = Config::from_env().context("invalid configuration")?;
    let scraper = PSEScraper::new(&config).context("failed to build HTTP client")?;

    match matches.subcommand() {
        Some(("run", _)) => {
            let report = run_once(&config, &scraper).await?;
            log_report(&report);
        }
        Some(("companies", _)) => {
            let mut store = connect(&config).await?;
            let result = Pipeline::new(&scraper, &mut store).load_companies().await;
            let report = keep_primary_error(result, store.close().await)
                .context("company directory load failed")?;
            info!(
                "Companies: {} pages, {} saved, {} skipped",
                report.pages_fetched, report.inserted, report.skipped
            );
        }
        Some(("prices", sub)) => {
            let symbols: Vec<String> = sub
                .values_of("symbol")
                .map(|values| values.map(|s| s.trim().to_uppercase()).collect())
                .unwrap_or_default();

            let mut store = connect(&config).await?;
            let result = {
                let mut pipeline = Pipeline::new(&scraper, &mut store);
                if symbols.is_empty() {
                    pipeline.load_prices().await
                } else {
                    pipeline.load_prices_for(&symbols).await
                }
            };
            let report = keep_primary_error(result, store.close().await).context("price load failed")?;
            for failure in &report.failures {
                warn!("{}: {} ({})", failure.ticker, failure.message, failure.kind);
            }
        }
        Some(("schedule", sub)) => {
            if let Some(at) = sub.value_of("at") {
                config = config.with_schedule_at(parse_time_of_day(at)?);
            }
            let schedule = DailySchedule::new(config.schedule_at);
            info!("Running pipeline daily at {}", schedule.at());

            schedule.run_forever(|| run_once(&config, &scraper)).await;
        }
        _ => {
            info!("No command specified. Use --help for usage information.");
        }
    }

    Ok(())
}

async fn connect(config: &Config) -> anyhow::Result<MySqlStore> {
    MySqlStore::connect(config)
        .await
        .with_context(|| format!("failed to connect to {}", config.redacted_database_url()))
}

// 每次运行使用新的连接，结束后关闭
async fn run_once(config: &Config, scraper: &PSEScraper) -> Result<PipelineReport> {
    let mut store = MySqlStore::connect(config).await?;
    let result = Pipeline::new(scraper, &mut store).run().await;
    keep_primary_error(result, store.close().await)
}

// 关闭连接失败只记日志，不覆盖加载结果
fn keep_primary_error<T>(result: Result<T>, closed: Result<()>) -> Result<T> {
    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            warn!("Failed to close database connection: {}", close_err);
            Err(e)
        }
    }
}

fn log_report(report: &PipelineReport) {
    match serde_json::to_string(report) {
        Ok(summary) => info!("Run summary: {}", summary),
        Err(e) => warn!("Failed to serialize run summary: {}", e),
    }
    for failure in &report.prices.failures {
        warn!("{}: {} ({})", failure.ticker, failure.message, failure.kind);
    }
}
