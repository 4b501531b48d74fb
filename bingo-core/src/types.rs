use crate::error::{BingoError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::time::Duration;
use uuid::Uuid;

/// Width and height of a card.
pub const GRID_SIZE: usize = 5;

/// Number of cells on a card.
pub const CELL_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// Row-major index of the centre cell.
pub const FREE_POSITION: usize = 12;

/// Sentinel word held by the centre cell.
pub const FREE_SPACE: &str = "FREE SPACE";

/// Number of pool words a card needs.
pub const WORDS_PER_CARD: usize = CELL_COUNT - 1;

/// Chat-platform user identifier.
pub type PlayerId = String;

/// Row-major position for `(row, col)`, or `None` when either is off the grid.
pub fn position(row: usize, col: usize) -> Option<usize> {
    if row < GRID_SIZE && col < GRID_SIZE {
        Some(row * GRID_SIZE + col)
    } else {
        None
    }
}

/// The candidate words for one game. Entries are unique and keep their input order.
/// The free-space sentinel is never a pool word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordPool(Vec<String>);

impl WordPool {
    /// Build a pool, rejecting it if fewer than `min_words` unique entries remain.
    pub fn new(words: Vec<String>, min_words: usize) -> Result<Self> {
        let mut seen = HashSet::new();
        let words: Vec<String> = words
            .into_iter()
            .map(|word| word.trim().to_string())
            .filter(|word| !word.is_empty() && word != FREE_SPACE)
            .filter(|word| seen.insert(word.clone()))
            .collect();

        if words.len() < min_words {
            return Err(BingoError::NotEnoughWords {
                need: min_words,
                got: words.len(),
            });
        }

        Ok(Self(words))
    }

    /// Parse the comma-separated list typed into the setup dialog.
    pub fn parse(raw: &str, min_words: usize) -> Result<Self> {
        Self::new(raw.split(',').map(str::to_string).collect(), min_words)
    }

    pub fn words(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.0.iter().any(|w| w == word)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Active,
    Completed,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Active => "active",
            GameStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(GameStatus::Active),
            "completed" => Some(GameStatus::Completed),
            _ => None,
        }
    }
}

/// Why a game left the active state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    Winner,
    ManualStop,
    Superseded,
    PoolExhausted,
}

impl CompletionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionReason::Winner => "winner",
            CompletionReason::ManualStop => "manual_stop",
            CompletionReason::Superseded => "superseded",
            CompletionReason::PoolExhausted => "pool_exhausted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "winner" => Some(CompletionReason::Winner),
            "manual_stop" => Some(CompletionReason::ManualStop),
            "superseded" => Some(CompletionReason::Superseded),
            "pool_exhausted" => Some(CompletionReason::PoolExhausted),
            _ => None,
        }
    }
}

/// Arguments of the conditional Active -> Completed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub reason: CompletionReason,
    pub winner: Option<PlayerId>,
}

impl Completion {
    pub fn winner(player: impl Into<PlayerId>) -> Self {
        Self {
            reason: CompletionReason::Winner,
            winner: Some(player.into()),
        }
    }

    pub fn without_winner(reason: CompletionReason) -> Self {
        Self {
            reason,
            winner: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub channel: String,
    pub word_pool: WordPool,
    /// Called words, oldest first.
    pub call_history: Vec<String>,
    pub status: GameStatus,
    pub winner: Option<PlayerId>,
    pub completion_reason: Option<CompletionReason>,
    pub call_frequency: Duration,
    pub started_by: PlayerId,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Game {
    pub fn new(
        channel: impl Into<String>,
        word_pool: WordPool,
        call_frequency: Duration,
        started_by: impl Into<PlayerId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.into(),
            word_pool,
            call_history: Vec::new(),
            status: GameStatus::Active,
            winner: None,
            completion_reason: None,
            call_frequency,
            started_by: started_by.into(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == GameStatus::Active
    }

    pub fn is_called(&self, word: &str) -> bool {
        self.call_history.iter().any(|w| w == word)
    }

    pub fn is_exhausted(&self) -> bool {
        self.call_history.len() >= self.word_pool.len()
    }

    pub fn remaining_words(&self) -> usize {
        self.word_pool.len().saturating_sub(self.call_history.len())
    }

    /// Most recent call, if any.
    pub fn last_call(&self) -> Option<&str> {
        self.call_history.last().map(String::as_str)
    }

    /// Every call except the most recent one.
    pub fn previous_calls(&self) -> &[String] {
        match self.call_history.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }
}

/// A player's 5x5 grid, row-major, with the free space in the centre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Card {
    cells: Vec<String>,
}

impl Card {
    /// Lay out exactly 24 words around the free space.
    pub fn from_words(words: Vec<String>) -> Result<Self> {
        if words.len() != WORDS_PER_CARD {
            return Err(BingoError::internal(format!(
                "A card needs {} words, got {}",
                WORDS_PER_CARD,
                words.len()
            )));
        }

        let mut cells = words;
        cells.insert(FREE_POSITION, FREE_SPACE.to_string());
        Self::from_cells(cells)
    }

    /// Rebuild a card from its stored cells.
    pub fn from_cells(cells: Vec<String>) -> Result<Self> {
        if cells.len() != CELL_COUNT {
            return Err(BingoError::corrupt(format!(
                "Card has {} cells, expected {}",
                cells.len(),
                CELL_COUNT
            )));
        }
        if cells[FREE_POSITION] != FREE_SPACE {
            return Err(BingoError::corrupt("Card centre is not the free space"));
        }

        let mut seen = HashSet::new();
        if !cells.iter().all(|cell| seen.insert(cell.as_str())) {
            return Err(BingoError::corrupt("Card repeats a word"));
        }

        Ok(Self { cells })
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn word_at(&self, position: usize) -> Option<&str> {
        self.cells.get(position).map(String::as_str)
    }

    /// The 24 pool words, without the free space.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != FREE_POSITION)
            .map(|(_, w)| w.as_str())
    }
}

impl TryFrom<Vec<String>> for Card {
    type Error = BingoError;

    fn try_from(cells: Vec<String>) -> Result<Self> {
        Self::from_cells(cells)
    }
}

impl From<Card> for Vec<String> {
    fn from(card: Card) -> Self {
        card.cells
    }
}

/// Positions a player has marked. Always includes the free space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct StampedSet(BTreeSet<usize>);

impl StampedSet {
    pub fn new() -> Self {
        Self(BTreeSet::from([FREE_POSITION]))
    }

    pub fn contains(&self, position: usize) -> bool {
        self.0.contains(&position)
    }

    /// Returns `false` if the position was already stamped.
    pub fn insert(&mut self, position: usize) -> bool {
        self.0.insert(position)
    }

    pub fn positions(&self) -> &BTreeSet<usize> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for StampedSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<usize>> for StampedSet {
    type Error = BingoError;

    fn try_from(positions: Vec<usize>) -> Result<Self> {
        if let Some(bad) = positions.iter().find(|p| **p >= CELL_COUNT) {
            return Err(BingoError::corrupt(format!(
                "Stamped position {} is off the card",
                bad
            )));
        }

        let mut set = Self::new();
        set.0.extend(positions);
        Ok(set)
    }
}

impl From<StampedSet> for Vec<usize> {
    fn from(set: StampedSet) -> Self {
        set.0.into_iter().collect()
    }
}

/// A card as stored for one (game, player) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCard {
    pub game_id: Uuid,
    pub player_id: PlayerId,
    pub card: Card,
    pub stamped: StampedSet,
    pub created_at: DateTime<Utc>,
}

impl PlayerCard {
    pub fn new(game_id: Uuid, player_id: impl Into<PlayerId>, card: Card) -> Self {
        Self {
            game_id,
            player_id: player_id.into(),
            card,
            stamped: StampedSet::new(),
            created_at: Utc::now(),
        }
    }
}
