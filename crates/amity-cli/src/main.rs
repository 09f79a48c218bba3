//! Amity CLI - Command line interface for the friendship graph

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use amity_core::{AnyEntity, EntityRegistry, FriendableRef};
use amity_engine::FriendshipEngine;
use amity_storage::SqliteStorage;
use commands::{completions, friendship, group, query};
use config::{config_file_path, Config};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "amity")]
#[command(author, version, about = "Friend requests, blocks and friend groups for any entity")]
pub struct Cli {
    /// Config file
    #[arg(long, global = true, env = "AMITY_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, global = true, env = "AMITY_DATABASE")]
    pub database: Option<PathBuf>,

    /// Entity type for bare ids (overrides the config file)
    #[arg(short = 't', long = "type", global = true)]
    pub entity_type: Option<String>,

    /// Output format: table, json
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config_file_path)
    }

    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from(self.format.as_str())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a friend request
    Befriend(friendship::PairArgs),
    /// Accept a friend request (ENTITY accepts OTHER's request)
    Accept(friendship::PairArgs),
    /// Deny a friend request (ENTITY denies OTHER's request)
    Deny(friendship::PairArgs),
    /// Block an entity
    Block(friendship::PairArgs),
    /// Lift a block
    Unblock(friendship::PairArgs),
    /// Remove every friendship edge between two entities
    Unfriend(friendship::PairArgs),
    /// Show the relationship between two entities
    Status(friendship::PairArgs),
    /// Manage friend groups
    Group(group::GroupArgs),
    /// List accepted friends
    Friends(query::FriendsArgs),
    /// List friends of friends
    Fof(query::EntityPageArgs),
    /// List mutual friends
    Mutual(query::MutualArgs),
    /// List friendships by status and direction
    Requests(query::RequestsArgs),
    /// Count accepted friends
    Count(query::CountArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with the engine over SQLite
pub struct AppContext {
    pub engine: FriendshipEngine<SqliteStorage>,
    pub config: Config,
}

impl AppContext {
    pub async fn new(cli: &Cli, config: Config) -> anyhow::Result<Self> {
        let db_path = cli.database.clone().unwrap_or_else(|| config.database_path());
        tracing::debug!("Using database at: {:?}", db_path);

        let storage = SqliteStorage::open(&db_path, config.tables.clone())?;

        let registry = if config.entity_types.is_empty() {
            EntityRegistry::open()
        } else {
            config
                .entity_types
                .iter()
                .fold(EntityRegistry::strict(), |registry, entity_type| {
                    registry.register(entity_type.as_str(), Arc::new(AnyEntity))
                })
        };

        let engine = FriendshipEngine::new(Arc::new(storage))
            .with_registry(registry)
            .with_config(config.friendships());

        Ok(Self { engine, config })
    }

    /// Parse `type:id`, or a bare id of the default type
    pub fn entity(&self, cli: &Cli, raw: &str) -> anyhow::Result<FriendableRef> {
        let reference = if raw.contains(':') {
            raw.parse::<FriendableRef>()?
        } else {
            let entity_type = cli
                .entity_type
                .as_deref()
                .unwrap_or(&self.config.default_entity_type);
            FriendableRef::new(entity_type, raw)
        };
        reference.validate()?;
        Ok(reference)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting amity CLI");

    match &cli.command {
        Commands::Config(args) => return commands::config::run(args, &cli).await,
        Commands::Completions(args) => return completions::run(args),
        _ => {}
    }

    let config = Config::load(&cli.config_path())?;
    let ctx = AppContext::new(&cli, config).await?;

    match &cli.command {
        Commands::Befriend(args) => friendship::befriend(args, &cli, &ctx).await?,
        Commands::Accept(args) => friendship::accept(args, &cli, &ctx).await?,
        Commands::Deny(args) => friendship::deny(args, &cli, &ctx).await?,
        Commands::Block(args) => friendship::block(args, &cli, &ctx).await?,
        Commands::Unblock(args) => friendship::unblock(args, &cli, &ctx).await?,
        Commands::Unfriend(args) => friendship::unfriend(args, &cli, &ctx).await?,
        Commands::Status(args) => friendship::status(args, &cli, &ctx).await?,
        Commands::Group(args) => group::run(args, &cli, &ctx).await?,
        Commands::Friends(args) => query::friends(args, &cli, &ctx).await?,
        Commands::Fof(args) => query::friends_of_friends(args, &cli, &ctx).await?,
        Commands::Mutual(args) => query::mutual(args, &cli, &ctx).await?,
        Commands::Requests(args) => query::requests(args, &cli, &ctx).await?,
        Commands::Count(args) => query::count(args, &cli, &ctx).await?,
        Commands::Config(_) | Commands::Completions(_) => {}
    }

    Ok(())
}
