//! ufcstats scraper CLI application.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use shared::config::resolve_delay;
use shared::{
    Config, DataPaths, Database, DbNotSetupError, EntityType, LinkSelection, LinksDb, LogConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use ufcstats_scraper::lists::all_letters;
use ufcstats_scraper::{
    BatchReport, BatchRunner, DetailsPage, EventDetailsPage, FightDetailsPage, FighterDetailsPage,
    HttpFetcher, JsonWriter, ListRunner, Reporter,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Scrape fighters, events and fights from www.ufcstats.com",
    long_about = None
)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the links database tables
    DbSetup {
        /// Drop existing tables first
        #[arg(long)]
        reset: bool,
    },
    /// Scrape the completed events list
    EventsList,
    /// Scrape the fighters list, letter by letter
    FightersList {
        /// Seconds to wait between letters
        #[arg(short, long, value_parser = parse_delay)]
        delay: Option<Duration>,
    },
    /// Scrape event details pages
    EventDetails(DetailsArgs),
    /// Scrape fighter details pages
    FighterDetails(DetailsArgs),
    /// Scrape fight details pages
    FightDetails(DetailsArgs),
}

#[derive(clap::Args, Debug)]
struct DetailsArgs {
    /// Seconds to wait between pages
    #[arg(short, long, value_parser = parse_delay)]
    delay: Option<Duration>,

    /// Which links to scrape: all, failed or untried
    #[arg(short, long)]
    filter: Option<LinkSelection>,

    /// Maximum number of pages to scrape
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    limit: Option<u64>,
}

/// Parse a positive number of seconds
fn parse_delay(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("{:?} is not a number of seconds", value))?;
    resolve_delay(secs).map_err(|e| e.to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!(error = ?e, "ufcstats scraper failed");
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> Result<u8> {
    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging
    let mut log_config = LogConfig::from_settings(&config.logging, &config.log_dir());
    if args.verbose {
        log_config.console = true;
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    info!(
        config_file = %args.config.display(),
        command = ?args.command,
        "ufcstats scraper starting"
    );

    let reporter = Reporter::new(args.quiet);

    // Initialize data paths
    let data_paths = DataPaths::new(config.data_dir());
    data_paths
        .create_dirs()
        .context("Failed to create data directories")?;

    // Open database
    let db_path = config.database_path();
    info!(db_path = %db_path.display(), "Opening database");
    let mut database = Database::open(&db_path).context("Failed to open database")?;

    if let Command::DbSetup { reset } = args.command {
        return db_setup(&mut database, reset, reporter);
    }

    let mut store = LinksDb::new(database);
    let writer = JsonWriter::new(data_paths);
    let mut fetcher = HttpFetcher::new(&config.scraper)?;
    let base_url = config.scraper.base_url.as_str();

    let report = match args.command {
        Command::DbSetup { .. } => unreachable!("handled above"),
        Command::EventsList => {
            ensure_ready(&store, &[], reporter)?;
            reporter.title("Scraping events list");
            ListRunner::new(&mut store, &mut fetcher, &writer, reporter, Duration::ZERO)
                .events_list(base_url, Local::now().date_naive())
                .await?
        }
        Command::FightersList { delay } => {
            ensure_ready(&store, &[], reporter)?;
            reporter.title("Scraping fighters list");
            let delay = match delay {
                Some(delay) => delay,
                None => config.scraper.delay()?,
            };
            ListRunner::new(&mut store, &mut fetcher, &writer, reporter, delay)
                .fighters_list(base_url, all_letters())
                .await?
        }
        Command::EventDetails(details) => {
            ensure_ready(&store, &[EntityType::Event, EntityType::Fighter], reporter)?;
            run_details::<EventDetailsPage>(
                &config,
                &mut store,
                &mut fetcher,
                &writer,
                reporter,
                details,
            )
            .await?
        }
        Command::FighterDetails(details) => {
            ensure_ready(&store, &[EntityType::Fighter], reporter)?;
            run_details::<FighterDetailsPage>(
                &config,
                &mut store,
                &mut fetcher,
                &writer,
                reporter,
                details,
            )
            .await?
        }
        Command::FightDetails(details) => {
            ensure_ready(&store, &[EntityType::Fight], reporter)?;
            run_details::<FightDetailsPage>(
                &config,
                &mut store,
                &mut fetcher,
                &writer,
                reporter,
                details,
            )
            .await?
        }
    };

    reporter.summary(&report);
    info!(outcome = ?report.outcome, "ufcstats scraper finished");

    Ok(report.outcome.exit_code())
}

fn db_setup(database: &mut Database, reset: bool, reporter: Reporter) -> Result<u8> {
    reporter.title("Links database setup");

    if reset {
        info!("Resetting links database");
        database.reset().context("Failed to reset links database")?;
        reporter.success("Dropped existing tables");
    } else if database.is_setup()? {
        info!("Links database already set up");
        reporter.line("Links database is already set up. Use --reset to start over.");
        return Ok(0);
    }

    database.setup().context("Failed to set up links database")?;
    reporter.success("Links database is ready");
    Ok(0)
}

/// Refuse to scrape before the store is set up and seeded
fn ensure_ready(store: &LinksDb, required: &[EntityType], reporter: Reporter) -> Result<()> {
    if !store.database().is_setup()? {
        reporter.failure("Links database is not set up. Run db-setup and try again.");
        return Err(DbNotSetupError.into());
    }

    for entity in required {
        if store.is_table_empty(*entity)? {
            let source = match entity {
                EntityType::Event => "events-list",
                EntityType::Fighter => "fighters-list",
                EntityType::Fight => "event-details",
            };
            reporter.failure(&format!(
                "Links database has no {} links. Run {} first.",
                entity, source
            ));
            anyhow::bail!("no {} links in the links database", entity);
        }
    }
    Ok(())
}

async fn run_details<P: DetailsPage>(
    config: &Config,
    store: &mut LinksDb,
    fetcher: &mut HttpFetcher,
    writer: &JsonWriter,
    reporter: Reporter,
    args: DetailsArgs,
) -> Result<BatchReport> {
    let selection = args.filter.unwrap_or(config.scraper.default_filter);
    let delay = match args.delay {
        Some(delay) => delay,
        None => config.scraper.delay()?,
    };
    let limit = args.limit.map(|n| n as usize);

    reporter.title(&format!("Scraping {} details", P::ENTITY));
    BatchRunner::new(store, fetcher, writer, reporter, delay)
        .run::<P>(selection, limit)
        .await
}
