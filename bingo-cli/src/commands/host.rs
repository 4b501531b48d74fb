use super::App;
use anyhow::bail;
use bingo_core::Game;
use bingo_game::{StartRequest, StopOutcome, TickOutcome};
use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use dialoguer::Confirm;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Subcommand)]
pub enum HostCommands {
    /// Start a new game, replacing any game in progress
    Start {
        /// Comma-separated words or phrases
        #[arg(short, long, conflicts_with = "words_file")]
        words: Option<String>,
        /// File with one word or phrase per line (commas also separate)
        #[arg(long)]
        words_file: Option<PathBuf>,
        /// Minutes between calls
        #[arg(short, long)]
        frequency: Option<f64>,
        /// Channel to announce the game in
        #[arg(short, long)]
        channel: Option<String>,
        /// Who is starting the game
        #[arg(short, long, default_value = "host")]
        user: String,
    },
    /// Stop the active game without a winner
    Stop {
        /// Who is stopping the game
        #[arg(short, long, default_value = "host")]
        user: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Call the next word now
    Tick,
    /// Keep calling words while scheduled calls are on
    Run {
        /// Seconds between checks while scheduled calls are off
        #[arg(long, default_value_t = 5)]
        poll: u64,
        /// Exit as soon as scheduled calls are off
        #[arg(long)]
        exit_when_idle: bool,
    },
    /// Show the active game
    Status,
}

pub async fn handle_host_command(cmd: HostCommands, app: &App) -> anyhow::Result<()> {
    match cmd {
        HostCommands::Start {
            words,
            words_file,
            frequency,
            channel,
            user,
        } => {
            let word_list = match (words, words_file) {
                (Some(words), _) => words,
                (None, Some(path)) => read_word_file(&path).await?,
                (None, None) => bail!("Provide a word list with --words or --words-file"),
            };

            let request = StartRequest::from_word_list(
                word_list,
                frequency.unwrap_or(app.config.game.default_frequency_minutes),
                channel.unwrap_or_else(|| app.config.default_channel.clone()),
                user,
            );
            let game = app.manager.start_game(request).await?;

            println!();
            println!("Game ID: {}", game.id);
            println!("Words: {}", game.word_pool.len());
            println!("Calling every {}", format_interval(game.call_frequency));
            println!("Keep words coming with: bingo run");
        }

        HostCommands::Stop { user, force } => {
            if !force {
                let confirm = Confirm::new()
                    .with_prompt("Stop the current game? Nobody will win it.")
                    .default(false)
                    .interact()?;

                if !confirm {
                    println!("Stop cancelled.");
                    return Ok(());
                }
            }

            if let StopOutcome::Stopped(game) = app.manager.stop_game(&user).await? {
                println!(
                    "Game {} ended after {} of {} calls.",
                    game.id,
                    game.call_history.len(),
                    game.word_pool.len()
                );
            }
        }

        HostCommands::Tick => match app.manager.tick().await? {
            TickOutcome::NoActiveGame => {
                println!("No active game. Scheduled calls are off.");
            }
            TickOutcome::Called { .. } => {}
            TickOutcome::Exhausted(game) => {
                println!("Game {} is over. Scheduled calls are off.", game.id);
            }
        },

        HostCommands::Run {
            poll,
            exit_when_idle,
        } => run_caller(app, Duration::from_secs(poll.max(1)), exit_when_idle).await?,

        HostCommands::Status => show_status(app).await?,
    }

    Ok(())
}

async fn read_word_file(path: &Path) -> anyhow::Result<String> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(content.lines().collect::<Vec<_>>().join(","))
}

fn format_interval(interval: Duration) -> String {
    let minutes = interval.as_secs_f64() / 60.0;
    format!("{:.2} minutes ({} seconds)", minutes, interval.as_secs())
}

/// Local stand-in for the cloud timer: waits out the game's call frequency,
/// then ticks, for as long as the scheduler switch is on.
async fn run_caller(app: &App, poll: Duration, exit_when_idle: bool) -> anyhow::Result<()> {
    println!("Caller running. Press Ctrl+C to stop.");

    loop {
        if !app.scheduler.is_enabled().await? {
            if exit_when_idle {
                println!("Scheduled calls are off.");
                break;
            }
            if wait_or_shutdown(poll).await {
                break;
            }
            continue;
        }

        let interval = match app.manager.active_game().await? {
            Some(game) => game.call_frequency,
            None => app.config.game.default_interval()?,
        };
        if wait_or_shutdown(interval).await {
            break;
        }

        // The switch may have flipped while we slept
        if !app.scheduler.is_enabled().await? {
            continue;
        }
        if let Err(e) = app.manager.tick().await {
            tracing::warn!("Tick failed, retrying after the next interval: {}", e);
        }
    }

    println!("Caller stopped.");
    Ok(())
}

/// Sleep for `duration`. Returns `true` if Ctrl+C arrived first.
async fn wait_or_shutdown(duration: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = tokio::signal::ctrl_c() => true,
    }
}

async fn show_status(app: &App) -> anyhow::Result<()> {
    let scheduled = if app.scheduler.is_enabled().await? {
        "on"
    } else {
        "off"
    };

    let Some(game) = app.manager.active_game().await? else {
        println!("No active game.");
        println!("Scheduled calls: {}", scheduled);
        return Ok(());
    };

    println!("{}", status_table(&game, scheduled));

    if !game.call_history.is_empty() {
        println!();
        println!("Called so far: {}", game.call_history.join(", "));
    }

    Ok(())
}

fn status_table(game: &Game, scheduled: &str) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Field", "Value"]);

    table.add_row(vec!["Game ID".to_string(), game.id.to_string()]);
    table.add_row(vec!["Channel".to_string(), game.channel.clone()]);
    table.add_row(vec!["Started by".to_string(), game.started_by.clone()]);
    table.add_row(vec![
        "Started at".to_string(),
        game.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    ]);
    table.add_row(vec![
        "Call frequency".to_string(),
        format_interval(game.call_frequency),
    ]);
    table.add_row(vec![
        "Calls".to_string(),
        format!("{} of {}", game.call_history.len(), game.word_pool.len()),
    ]);
    table.add_row(vec![
        "Remaining words".to_string(),
        game.remaining_words().to_string(),
    ]);
    table.add_row(vec![
        "Last call".to_string(),
        game.last_call().unwrap_or("-").to_string(),
    ]);
    table.add_row(vec!["Scheduled calls".to_string(), scheduled.to_string()]);

    table
}
