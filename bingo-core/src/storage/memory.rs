use crate::error::{BingoError, Result};
use crate::storage::BingoStore;
use crate::types::{Card, Completion, CompletionReason, Game, GameStatus, PlayerCard, StampedSet};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    games: HashMap<Uuid, Game>,
    cards: HashMap<(Uuid, String), PlayerCard>,
}

/// Process-local store. Every primitive runs under a single lock acquisition.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn game_count(&self) -> usize {
        self.state.lock().games.len()
    }
}

#[async_trait]
impl BingoStore for MemoryStore {
    async fn create_game(&self, game: &Game, supersede: bool) -> Result<Option<Game>> {
        if !game.is_active() {
            return Err(BingoError::internal(format!(
                "Refusing to create game {} in state {}",
                game.id,
                game.status.as_str()
            )));
        }

        let mut state = self.state.lock();
        if state.games.contains_key(&game.id) {
            return Err(BingoError::internal(format!("Game {} already exists", game.id)));
        }

        let active_id = state.games.values().find(|g| g.is_active()).map(|g| g.id);
        let superseded = match active_id {
            Some(id) if !supersede => return Err(BingoError::ActiveGameExists(id)),
            Some(id) => state.games.get_mut(&id).map(|old| {
                old.status = GameStatus::Completed;
                old.completion_reason = Some(CompletionReason::Superseded);
                old.completed_at = Some(Utc::now());
                old.clone()
            }),
            None => None,
        };

        state.games.insert(game.id, game.clone());
        Ok(superseded)
    }

    async fn get_active_game(&self) -> Result<Option<Game>> {
        let state = self.state.lock();
        Ok(state.games.values().find(|g| g.is_active()).cloned())
    }

    async fn get_game(&self, game_id: Uuid) -> Result<Option<Game>> {
        Ok(self.state.lock().games.get(&game_id).cloned())
    }

    async fn append_call(&self, game_id: Uuid, word: &str) -> Result<Option<Game>> {
        let mut state = self.state.lock();
        let Some(game) = state.games.get_mut(&game_id) else {
            return Ok(None);
        };

        if !game.is_active() || game.is_called(word) {
            return Ok(None);
        }

        game.call_history.push(word.to_string());
        Ok(Some(game.clone()))
    }

    async fn complete_game(&self, game_id: Uuid, completion: &Completion) -> Result<Option<Game>> {
        let mut state = self.state.lock();
        let Some(game) = state.games.get_mut(&game_id) else {
            return Ok(None);
        };

        if !game.is_active() {
            return Ok(None);
        }

        game.status = GameStatus::Completed;
        game.winner = completion.winner.clone();
        game.completion_reason = Some(completion.reason);
        game.completed_at = Some(Utc::now());
        Ok(Some(game.clone()))
    }

    async fn get_card(&self, game_id: Uuid, player_id: &str) -> Result<Option<PlayerCard>> {
        let state = self.state.lock();
        Ok(state.cards.get(&(game_id, player_id.to_string())).cloned())
    }

    async fn create_card(&self, game_id: Uuid, player_id: &str, card: &Card) -> Result<PlayerCard> {
        let mut state = self.state.lock();
        let stored = state
            .cards
            .entry((game_id, player_id.to_string()))
            .or_insert_with(|| PlayerCard::new(game_id, player_id, card.clone()));
        Ok(stored.clone())
    }

    async fn set_stamped_positions(
        &self,
        game_id: Uuid,
        player_id: &str,
        stamped: &StampedSet,
    ) -> Result<()> {
        let mut state = self.state.lock();
        let card = state
            .cards
            .get_mut(&(game_id, player_id.to_string()))
            .ok_or_else(|| {
                BingoError::internal(format!(
                    "No card for player {} in game {}",
                    player_id, game_id
                ))
            })?;

        card.stamped = stamped.clone();
        Ok(())
    }
}
