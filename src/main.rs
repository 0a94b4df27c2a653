use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use feedbot::bot::{BotListener, CommandHandler};
use feedbot::cli::{Cli, Commands};
use feedbot::config::Config;
use feedbot::errors::{FeedbotError, FeedbotResult};
use feedbot::services::{
    spawn_scheduler, AdminService, FeedPoller, LogNotifier, Notifier, PollScheduler,
    SeenRegistry, TelegramNotifier,
};
use feedbot::sources::RssAtomSource;
use feedbot::storage::{self, WatchListStore};
use feedbot::{health, logging, shutdown};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> FeedbotResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;
    logging::init(&config.log_level);

    // Initialize storage
    let store = storage::open(&config.sources_path)?;

    match cli.command {
        Commands::Add { name, url } => cmd_add(store, &name, &url),
        Commands::Remove { name } => cmd_remove(store, &name),
        Commands::List => cmd_list(store),
        Commands::Poll { dry_run } => cmd_poll(store, &config, dry_run).await,
        Commands::Run { dry_run } => cmd_run(store, &config, dry_run).await,
    }
}

fn admin_service(store: Arc<dyn WatchListStore>) -> AdminService {
    // Seen memory only lives inside a running bot
    AdminService::new(store, Arc::new(SeenRegistry::new()))
}

fn cmd_add(store: Arc<dyn WatchListStore>, name: &str, url: &str) -> FeedbotResult<()> {
    let source = admin_service(store).add_source(name, url)?;
    println!("Added source {}: {}", source.name, source.url);
    Ok(())
}

fn cmd_remove(store: Arc<dyn WatchListStore>, name: &str) -> FeedbotResult<()> {
    let source = admin_service(store).remove_source(name)?;
    println!("Removed source {}", source.name);
    Ok(())
}

fn cmd_list(store: Arc<dyn WatchListStore>) -> FeedbotResult<()> {
    let sources = admin_service(store).list_sources()?;

    if sources.is_empty() {
        println!("No sources added.");
        return Ok(());
    }

    println!("Watched sources:\n");
    for source in sources.sources() {
        println!("  {}", source.name);
        println!("    URL: {}", source.url);
    }

    Ok(())
}

fn notifier(config: &Config, dry_run: bool) -> FeedbotResult<Arc<dyn Notifier>> {
    if dry_run {
        return Ok(Arc::new(LogNotifier));
    }
    Ok(Arc::new(TelegramNotifier::new(&config.bot()?)?))
}

async fn cmd_poll(
    store: Arc<dyn WatchListStore>,
    config: &Config,
    dry_run: bool,
) -> FeedbotResult<()> {
    let poller = FeedPoller::new(
        Arc::new(RssAtomSource::new()?),
        notifier(config, dry_run)?,
        Arc::new(SeenRegistry::new()),
    );

    println!("Fetching feeds...\n");
    let report = poller.poll(store).await?;

    if report.sources.is_empty() {
        println!("No sources added.");
        return Ok(());
    }

    for source in &report.sources {
        match &source.fetch_error {
            Some(e) => println!("  {}: FAILED: {}", source.name, e),
            None => println!(
                "  {}: {} delivered, {} failed",
                source.name, source.delivered, source.failed
            ),
        }
    }
    println!("\nPoll complete: {}", report);

    Ok(())
}

async fn cmd_run(
    store: Arc<dyn WatchListStore>,
    config: &Config,
    dry_run: bool,
) -> FeedbotResult<()> {
    // An unreadable store must stop us here rather than look like an empty list
    let loader = store.clone();
    let initial = tokio::task::spawn_blocking(move || loader.load())
        .await
        .map_err(|e| FeedbotError::Store(format!("startup load failed: {}", e)))??;
    info!(
        "Loaded {} source(s) from {}",
        initial.len(),
        config.sources_path.display()
    );

    let seen = Arc::new(SeenRegistry::new());
    let poller = Arc::new(FeedPoller::new(
        Arc::new(RssAtomSource::new()?),
        notifier(config, dry_run)?,
        seen.clone(),
    ));
    let scheduler = Arc::new(PollScheduler::with_interval(
        poller,
        store.clone(),
        config.check_interval,
    ));

    let (trigger, signal) = shutdown::channel();
    let mut tasks = vec![spawn_scheduler(scheduler, signal.clone())];

    if dry_run {
        info!("Dry run: notifications are logged, chat commands are disabled");
    } else {
        let bot = config.bot()?;
        let admin = Arc::new(AdminService::new(store.clone(), seen));
        let listener = BotListener::new(
            telegram::BotClient::new(&bot.token)?,
            CommandHandler::new(admin, bot.owner_id),
        );
        let listener_signal = signal.clone();
        tasks.push(tokio::spawn(async move {
            listener.run(listener_signal).await;
        }));
    }

    let port = config.port;
    tasks.push(tokio::spawn(async move {
        if let Err(e) = health::serve(port, signal).await {
            error!("Liveness endpoint failed: {}", e);
        }
    }));

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested, waiting for the current cycle to finish");
    trigger.trigger();

    for task in tasks {
        if let Err(e) = task.await {
            error!("Task ended abnormally: {}", e);
        }
    }

    info!("Stopped");
    Ok(())
}
