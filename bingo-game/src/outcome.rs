use crate::win::{winning_line, Line};
use bingo_core::{Card, Game, PlayerCard, PlayerId, StampedSet, FREE_POSITION};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a single cell should be shown to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Free,
    Stamped,
    /// Called but not stamped yet.
    Called,
    Uncalled,
}

/// A player's card together with what they need to play it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardView {
    pub game_id: Uuid,
    pub player_id: PlayerId,
    pub card: Card,
    pub stamped: StampedSet,
    pub called: Vec<String>,
    pub has_bingo: bool,
}

impl CardView {
    pub fn new(game: &Game, player_card: PlayerCard) -> Self {
        let has_bingo = winning_line(player_card.stamped.positions()).is_some();
        Self {
            game_id: game.id,
            player_id: player_card.player_id,
            card: player_card.card,
            stamped: player_card.stamped,
            called: game.call_history.clone(),
            has_bingo,
        }
    }

    pub fn winning_line(&self) -> Option<&'static Line> {
        winning_line(self.stamped.positions())
    }

    pub fn cell_state(&self, position: usize) -> CellState {
        if position == FREE_POSITION {
            return CellState::Free;
        }
        if self.stamped.contains(position) {
            return CellState::Stamped;
        }

        match self.card.word_at(position) {
            Some(word) if self.called.iter().any(|c| c == word) => CellState::Called,
            _ => CellState::Uncalled,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CardOutcome {
    NoActiveGame,
    Card(CardView),
}

/// Why a stamp request changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampIgnored {
    NoActiveGame,
    NoCard,
    OffGrid,
    FreeSpace,
    NotCalled,
    AlreadyStamped,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StampOutcome {
    Stamped(CardView),
    Ignored(StampIgnored),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    NoActiveGame,
    NotAWinner,
    /// Another player completed the game first.
    AlreadyWon { winner: PlayerId },
    /// The game ended without a winner while the claim was in flight.
    GameOver,
    Won(Game),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    NoActiveGame,
    Called {
        game_id: Uuid,
        word: String,
        previous_calls: Vec<String>,
    },
    /// Nothing was left to call, so the game was closed.
    Exhausted(Game),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    NoActiveGame,
    Stopped(Game),
}
