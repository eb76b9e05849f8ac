use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use diagnoser_bot::application::errors::BotError;
use diagnoser_bot::application::messaging::{AudienceMiddleware, LoggingMiddleware, MessageDispatcher, MessageParser};
use diagnoser_bot::application::services::{CommandService, MessageService};
use diagnoser_bot::domain::traits::Bot;
use diagnoser_bot::infrastructure::adapters::{ConsoleAdapter, TelegramAdapter};
use diagnoser_bot::infrastructure::config::Config;
use diagnoser_bot::infrastructure::startup::{self, Platform, Prepared};
use diagnoser_bot::infrastructure::storage;

#[derive(Parser)]
#[command(name = "diagnoser-bot")]
#[command(about = "A chat bot that guesses conditions from symptoms", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run {
        /// Bot token (overrides config and BOT_TOKEN)
        #[arg(short, long)]
        token: Option<String>,

        /// Disease database JSON file (overrides config and DISEASE_DB)
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Read messages from stdin instead of connecting to Telegram
        #[arg(long)]
        console: bool,
    },
    /// Load a disease database and report what it contains
    Check {
        /// Disease database JSON file
        #[arg(short, long)]
        database: PathBuf,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { token, database, console } => {
            run_bot(&cli.config, token, database, console)
        }
        Commands::Check { database } => check_database(&database),
        Commands::Version => {
            println!("diagnoser-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: &Path) -> Result<Config, BotError> {
    let mut config = if path.exists() {
        Config::load(path)?
    } else {
        tracing::debug!("No config at {}, using defaults", path.display());
        Config::default()
    };
    config.apply_env();
    Ok(config)
}

fn run_bot(
    config_path: &Path,
    token_override: Option<String>,
    database_override: Option<PathBuf>,
    console: bool,
) -> Result<(), BotError> {
    let mut config = load_config(config_path)?;
    if let Some(token) = token_override {
        config.set_token(token);
    }
    if let Some(path) = database_override {
        config.database.path = Some(path);
    }

    // The database must load before any connection is made
    let Prepared { platform, commands } = startup::prepare(&config, console)?;

    tracing::info!("Starting {}", config.bot.name);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;

    match platform {
        Platform::Telegram { token } => rt.block_on(async {
            let mut bot = TelegramAdapter::new(token);
            bot.fetch_bot_info().await?;

            if let Some(hint) = config.group_privacy_hint() {
                tracing::warn!("{}", hint);
            } else {
                let listed = [
                    ("diagnose", "Guess which conditions match your symptoms"),
                    ("info", "Show symptoms and treatments for a disease"),
                    ("help", "Show usage"),
                ];
                if let Err(e) = bot.register_commands(&listed).await {
                    tracing::warn!("Failed to register commands: {}", e);
                }
            }

            serve(bot, &config, commands).await
        }),
        Platform::Console => rt.block_on(serve(ConsoleAdapter::new(), &config, commands)),
    }
}

async fn serve<B: Bot + 'static>(bot: B, config: &Config, commands: CommandService) -> Result<(), BotError> {
    let parser = MessageParser::new(&config.bot.prefix)
        .with_mention(bot.bot_info().username);
    let dispatcher = MessageDispatcher::new(parser, commands)
        .with_middleware(LoggingMiddleware)
        .with_middleware(AudienceMiddleware::new(config.bot.allow_private));

    MessageService::new(bot, dispatcher).run().await
}

fn check_database(path: &Path) -> Result<(), BotError> {
    let database = storage::load_database(path)?;
    let without_symptoms = database.records().filter(|r| r.symptoms.is_empty()).count();

    println!("{}: {} diseases", path.display(), database.len());
    if without_symptoms > 0 {
        println!("{} diseases have no symptoms and can never be diagnosed", without_symptoms);
    }
    Ok(())
}

fn init_config() -> Result<(), BotError> {
    let config = Config::default();
    println!("{}", config.to_yaml()?);
    if let Some(hint) = config.group_privacy_hint() {
        println!("\nNote: {}.", hint);
    }
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
