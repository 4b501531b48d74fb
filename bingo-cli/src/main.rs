mod announcer;
mod commands;
mod config;
mod scheduler;

use bingo_game::GameError;
use clap::{Parser, Subcommand};
use commands::App;
use config::CliConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bingo")]
#[command(about = "Chat bingo - call words, stamp cards, shout BINGO")]
#[command(version)]
struct Cli {
    /// Data directory for the game database
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (defaults to config.json in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Host(commands::HostCommands),

    #[command(flatten)]
    Player(commands::PlayerCommands),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(config::default_data_dir);
    let config_path = cli
        .config
        .unwrap_or_else(|| data_dir.join(config::CONFIG_FILE));
    let config = CliConfig::load(&data_dir, &config_path).await?;

    // Initialize logging
    let log_level = if cli.verbose || config.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "bingo={0},bingo_game={0},bingo_core={0}",
            log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = App::open(config).await?;

    let result = match cli.command {
        Commands::Host(cmd) => commands::handle_host_command(cmd, &app).await,
        Commands::Player(cmd) => commands::handle_player_command(cmd, &app).await,
    };

    if let Err(e) = result {
        match e.downcast_ref::<GameError>() {
            Some(GameError::Core(inner)) if inner.is_user_input() => {
                eprintln!("Error: {}", inner);
                eprintln!("Fix the word list or frequency and run 'bingo start' again");
            }
            _ => {
                eprintln!("Error: {:#}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
