use super::App;
use bingo_core::GRID_SIZE;
use bingo_game::{CardOutcome, CardView, CellState, ClaimOutcome, StampIgnored, StampOutcome};
use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};

#[derive(Subcommand)]
pub enum PlayerCommands {
    /// Show your card, dealing one if you don't have one yet
    Card {
        /// Player name
        #[arg(short, long)]
        player: String,
    },
    /// Stamp a called word on your card
    Stamp {
        /// Player name
        #[arg(short, long)]
        player: String,
        /// Row, 1 to 5
        row: usize,
        /// Column, 1 to 5
        col: usize,
    },
    /// Claim bingo
    Claim {
        /// Player name
        #[arg(short, long)]
        player: String,
    },
}

pub async fn handle_player_command(cmd: PlayerCommands, app: &App) -> anyhow::Result<()> {
    match cmd {
        PlayerCommands::Card { player } => {
            if let CardOutcome::Card(view) = app.manager.request_card(&player).await? {
                print_card(&view);
            }
        }

        PlayerCommands::Stamp { player, row, col } => {
            let (Some(row), Some(col)) = (row.checked_sub(1), col.checked_sub(1)) else {
                println!("{}", ignored_message(StampIgnored::OffGrid, &player));
                return Ok(());
            };

            match app.manager.stamp(&player, row, col).await? {
                StampOutcome::Stamped(view) => print_card(&view),
                StampOutcome::Ignored(reason) => println!("{}", ignored_message(reason, &player)),
            }
        }

        PlayerCommands::Claim { player } => {
            if let ClaimOutcome::Won(game) = app.manager.claim_win(&player).await? {
                println!(
                    "You won! Game {} finished after {} calls.",
                    game.id,
                    game.call_history.len()
                );
            }
        }
    }

    Ok(())
}

fn ignored_message(reason: StampIgnored, player: &str) -> String {
    match reason {
        StampIgnored::NoActiveGame => "No active game found. Start a new game first!".to_string(),
        StampIgnored::NoCard => format!(
            "You don't have a card yet. Open one with: bingo card --player {}",
            player
        ),
        StampIgnored::OffGrid => format!("Rows and columns run from 1 to {}.", GRID_SIZE),
        StampIgnored::FreeSpace => "The free space is always stamped.".to_string(),
        StampIgnored::NotCalled => "That word hasn't been called yet.".to_string(),
        StampIgnored::AlreadyStamped => "That cell is already stamped.".to_string(),
    }
}

fn cell_text(view: &CardView, position: usize) -> String {
    let word = view.card.word_at(position).unwrap_or_default();
    match view.cell_state(position) {
        CellState::Free => word.to_string(),
        CellState::Stamped => format!("[x] {}", word),
        CellState::Called => format!("{} *", word),
        CellState::Uncalled => word.to_string(),
    }
}

fn card_table(view: &CardView) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["", "B", "I", "N", "G", "O"]);

    for row in 0..GRID_SIZE {
        let mut cells = vec![(row + 1).to_string()];
        cells.extend((0..GRID_SIZE).map(|col| cell_text(view, row * GRID_SIZE + col)));
        table.add_row(cells);
    }

    table
}

fn print_card(view: &CardView) {
    println!("Bingo card for {}", view.player_id);
    println!("{}", card_table(view));
    println!("[x] stamped   * called, ready to stamp");

    if view.has_bingo {
        println!();
        println!(
            "You have BINGO! Claim it with: bingo claim --player {}",
            view.player_id
        );
    } else {
        println!("Stamp a called word with: bingo stamp --player {} <row> <col>", view.player_id);
    }
}
