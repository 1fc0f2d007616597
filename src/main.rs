use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crewmate::config::BotConfig;
use crewmate::platform::discord::{self, DiscordPlatform};
use crewmate::{store, Bot, Store};

#[derive(Parser)]
#[command(name = "crewmate")]
#[command(about = "Project, task and rewards bot for Discord communities")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and serve commands
    Run {
        /// Data file (defaults to CREWMATE_DATA, then the platform data dir)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Command prefix
        #[arg(short, long)]
        prefix: Option<String>,
    },
    /// Load the data file and print a summary
    Check {
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "crewmate=debug,serenity=warn".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn data_path(flag: Option<PathBuf>, config: &BotConfig) -> anyhow::Result<PathBuf> {
    match flag.or_else(|| config.data_path.clone()) {
        Some(path) => Ok(path),
        None => store::default_path(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing();

    let mut config = BotConfig::from_env();

    match cli.command {
        Some(Commands::Check { data }) => check(data_path(data, &config)?),
        Some(Commands::Run { data, prefix }) => {
            if let Some(prefix) = prefix {
                config.prefix = prefix;
            }
            let path = data_path(data, &config)?;
            run(config, path).await
        }
        None => {
            let path = data_path(None, &config)?;
            run(config, path).await
        }
    }
}

async fn run(config: BotConfig, path: PathBuf) -> anyhow::Result<()> {
    let token = config
        .token
        .clone()
        .context("DISCORD_TOKEN is not set. Put it in the environment or a .env file.")?;

    let store = Store::open(path);
    let platform = Arc::new(DiscordPlatform::new(&token));
    tracing::info!(prefix = %config.prefix, "Starting crewmate");
    let bot = Bot::new(store.clone(), platform, config);

    let mut client = discord::client(&token, bot).await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutting down");
            shard_manager.shutdown_all().await;
        }
    });

    let result = client.start().await;
    store.save().context("Failed to save data on shutdown")?;
    result.context("Gateway client stopped with an error")
}

fn check(path: PathBuf) -> anyhow::Result<()> {
    let doc = store::load_document(&path)?;
    let Some(doc) = doc else {
        println!("No data file at {} (a fresh one will be created)", path.display());
        return Ok(());
    };

    println!("Data file: {}", path.display());
    println!("Forum channel: {}", doc.forum_channel_name);
    println!("Projects: {}", doc.projects.len());
    for project in doc.projects.values() {
        println!(
            "  {} [{}] {}% ({}/{} tasks)",
            project.name(),
            project.status(),
            project.progress_percent(),
            project.completed_task_count(),
            project.tasks().len()
        );
        if !project.unreadable_tasks().is_empty() {
            println!(
                "    {} unreadable task record(s) kept aside",
                project.unreadable_tasks().len()
            );
        }
    }
    if !doc.unreadable_projects.is_empty() {
        let names: Vec<&str> = doc.unreadable_projects.keys().map(String::as_str).collect();
        println!("Unreadable project records kept aside: {}", names.join(", "));
    }
    let total = doc.user_points.values().fold(0u64, |acc, p| acc.saturating_add(*p));
    println!("Members with points: {} ({} points total)", doc.user_points.len(), total);
    println!("Shop items: {}", doc.shop_items.len());
    Ok(())
}
