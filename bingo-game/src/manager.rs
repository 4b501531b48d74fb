//! Game lifecycle: start, cards, stamps, claims, scheduled calls and stops.
//!
//! Every trigger runs independently against the shared store. Nothing here
//! holds a lock across triggers; the store's atomic append and conditional
//! completion are what keep concurrent triggers consistent.

use crate::caller::next_word;
use crate::card::generate_card;
use crate::collaborators::{Announcer, CallScheduler};
use crate::outcome::{
    CardOutcome, CardView, ClaimOutcome, StampIgnored, StampOutcome, StopOutcome, TickOutcome,
};
use crate::rng::GameRng;
use crate::win::has_bingo;
use crate::{GameError, Result};
use bingo_core::{
    position, BingoStore, Completion, CompletionReason, Game, GameConfig, PlayerId, WordPool,
    FREE_POSITION,
};
use parking_lot::Mutex;
use std::sync::Arc;

const NO_ACTIVE_GAME: &str = "No active game found. Start a new game first!";
const NOTHING_TO_STOP: &str = "No active game found. Nothing to stop!";
const NOT_A_WINNER: &str = "You don't have bingo yet! You need 5 in a row, column, or diagonal.";
const ALREADY_WON: &str = "Game already won by another player. Better luck next time!";
const GAME_OVER: &str = "This game has already ended.";
const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Everything the setup dialog collects.
#[derive(Debug, Clone)]
pub struct StartRequest {
    /// Comma-separated words as typed; parsed by [`WordPool::parse`].
    pub word_list: String,
    pub frequency_minutes: f64,
    pub channel: String,
    pub requester: PlayerId,
}

impl StartRequest {
    pub fn from_word_list(
        word_list: impl Into<String>,
        frequency_minutes: f64,
        channel: impl Into<String>,
        requester: impl Into<PlayerId>,
    ) -> Self {
        Self {
            word_list: word_list.into(),
            frequency_minutes,
            channel: channel.into(),
            requester: requester.into(),
        }
    }
}

pub struct GameManager {
    store: Arc<dyn BingoStore>,
    announcer: Arc<dyn Announcer>,
    scheduler: Arc<dyn CallScheduler>,
    config: GameConfig,
    rng: Mutex<GameRng>,
}

impl GameManager {
    pub fn new(
        store: Arc<dyn BingoStore>,
        announcer: Arc<dyn Announcer>,
        scheduler: Arc<dyn CallScheduler>,
        config: GameConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            store,
            announcer,
            scheduler,
            config,
            rng: Mutex::new(GameRng::from_entropy()),
        })
    }

    /// Replace the entropy-seeded generator, e.g. with a fixed seed in tests.
    pub fn with_rng(mut self, rng: GameRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub async fn active_game(&self) -> Result<Option<Game>> {
        Ok(self.store.get_active_game().await?)
    }

    /// Start a game, superseding any active one. Invalid input is rejected
    /// before anything is written.
    pub async fn start_game(&self, request: StartRequest) -> Result<Game> {
        let result = self.try_start_game(&request).await;
        self.report_failure(&request.requester, "starting game", result)
            .await
    }

    async fn try_start_game(&self, request: &StartRequest) -> Result<Game> {
        let pool = WordPool::parse(&request.word_list, self.config.min_words)?;
        let interval = self.config.call_interval(request.frequency_minutes)?;

        let mut game = Game::new(
            request.channel.clone(),
            pool,
            interval,
            request.requester.clone(),
        );

        // The opening call is stored with the game so no player ever sees an empty board
        let first_word = {
            let mut rng = self.rng.lock();
            next_word(&game.word_pool, &game.call_history, &mut rng).map(str::to_string)
        }
        .ok_or_else(|| GameError::internal("Word pool is empty"))?;
        game.call_history.push(first_word.clone());

        // Any game still running is replaced in the same store step
        let superseded = self.store.create_game(&game, true).await?;
        if let Some(old) = &superseded {
            tracing::info!("Game {} superseded by game {}", old.id, game.id);
            if let Err(e) = self.announcer.post_stop(old, None).await {
                tracing::warn!("Failed to announce end of game {}: {}", old.id, e);
            }
        }

        tracing::info!(
            "Game {} started by {} in channel {} with {} words, calling every {:?}",
            game.id,
            game.started_by,
            game.channel,
            game.word_pool.len(),
            game.call_frequency
        );

        if let Err(e) = self.announcer.post_start(&game, &first_word).await {
            tracing::warn!("Failed to announce start of game {}: {}", game.id, e);
        }
        self.enable_scheduler().await;

        Ok(game)
    }

    /// End the active game without a winner.
    pub async fn stop_game(&self, requester: &str) -> Result<StopOutcome> {
        let result = self.try_stop_game(requester).await;
        self.report_failure(requester, "stopping game", result).await
    }

    async fn try_stop_game(&self, requester: &str) -> Result<StopOutcome> {
        let Some(game) = self.store.get_active_game().await? else {
            self.notify(requester, NOTHING_TO_STOP).await;
            return Ok(StopOutcome::NoActiveGame);
        };

        let completion = Completion::without_winner(CompletionReason::ManualStop);
        let stopped = self.store.complete_game(game.id, &completion).await?;
        self.disable_scheduler().await;

        let Some(stopped) = stopped else {
            self.notify(requester, NOTHING_TO_STOP).await;
            return Ok(StopOutcome::NoActiveGame);
        };

        tracing::info!("Game {} stopped manually by user {}", stopped.id, requester);
        if let Err(e) = self.announcer.post_stop(&stopped, Some(requester)).await {
            tracing::warn!("Failed to announce stop of game {}: {}", stopped.id, e);
        }

        Ok(StopOutcome::Stopped(stopped))
    }

    /// The player's card for the active game, dealt on first request.
    pub async fn request_card(&self, player: &str) -> Result<CardOutcome> {
        let result = self.try_request_card(player).await;
        self.report_failure(player, "opening card", result).await
    }

    async fn try_request_card(&self, player: &str) -> Result<CardOutcome> {
        let Some(game) = self.store.get_active_game().await? else {
            self.notify(player, NO_ACTIVE_GAME).await;
            return Ok(CardOutcome::NoActiveGame);
        };

        let player_card = match self.store.get_card(game.id, player).await? {
            Some(existing) => existing,
            None => {
                let card = {
                    let mut rng = self.rng.lock();
                    generate_card(&game.word_pool, &mut rng)?
                };
                self.store.create_card(game.id, player, &card).await?
            }
        };

        Ok(CardOutcome::Card(CardView::new(&game, player_card)))
    }

    /// Mark the cell at `(row, col)`. Requests that break a rule are ignored.
    pub async fn stamp(&self, player: &str, row: usize, col: usize) -> Result<StampOutcome> {
        let result = self.try_stamp(player, row, col).await;
        if let Ok(StampOutcome::Ignored(reason)) = &result {
            tracing::debug!(
                "Ignored stamp by {} at ({}, {}): {:?}",
                player,
                row,
                col,
                reason
            );
        }
        self.report_failure(player, "stamping card", result).await
    }

    async fn try_stamp(&self, player: &str, row: usize, col: usize) -> Result<StampOutcome> {
        let Some(game) = self.store.get_active_game().await? else {
            return Ok(StampOutcome::Ignored(StampIgnored::NoActiveGame));
        };
        let Some(mut player_card) = self.store.get_card(game.id, player).await? else {
            return Ok(StampOutcome::Ignored(StampIgnored::NoCard));
        };
        let Some(pos) = position(row, col) else {
            return Ok(StampOutcome::Ignored(StampIgnored::OffGrid));
        };
        if pos == FREE_POSITION {
            return Ok(StampOutcome::Ignored(StampIgnored::FreeSpace));
        }

        let called = player_card
            .card
            .word_at(pos)
            .map_or(false, |word| game.is_called(word));
        if !called {
            return Ok(StampOutcome::Ignored(StampIgnored::NotCalled));
        }
        if !player_card.stamped.insert(pos) {
            return Ok(StampOutcome::Ignored(StampIgnored::AlreadyStamped));
        }

        self.store
            .set_stamped_positions(game.id, player, &player_card.stamped)
            .await?;

        let view = CardView::new(&game, player_card);
        if let Some(line) = view.winning_line() {
            tracing::info!(
                "Player {} can claim bingo in game {} with {:?}",
                player,
                game.id,
                line
            );
        }

        Ok(StampOutcome::Stamped(view))
    }

    /// Claim the win. Only the first valid claim completes the game.
    pub async fn claim_win(&self, player: &str) -> Result<ClaimOutcome> {
        let result = self.try_claim_win(player).await;
        self.report_failure(player, "handling bingo call", result)
            .await
    }

    async fn try_claim_win(&self, player: &str) -> Result<ClaimOutcome> {
        let Some(game) = self.store.get_active_game().await? else {
            self.notify(player, NO_ACTIVE_GAME).await;
            return Ok(ClaimOutcome::NoActiveGame);
        };

        let is_winner = self
            .store
            .get_card(game.id, player)
            .await?
            .map_or(false, |card| has_bingo(card.stamped.positions()));
        if !is_winner {
            self.notify(player, NOT_A_WINNER).await;
            return Ok(ClaimOutcome::NotAWinner);
        }

        if let Some(won) = self
            .store
            .complete_game(game.id, &Completion::winner(player))
            .await?
        {
            tracing::info!("Game {} won by {}", won.id, player);
            self.disable_scheduler().await;
            if let Err(e) = self.announcer.post_winner(&won.channel, player).await {
                tracing::warn!("Failed to announce winner of game {}: {}", won.id, e);
            }
            return Ok(ClaimOutcome::Won(won));
        }

        let winner = self
            .store
            .get_game(game.id)
            .await?
            .and_then(|ended| ended.winner);
        match winner {
            Some(winner) => {
                tracing::info!(
                    "Claim by {} on game {} lost to {}",
                    player,
                    game.id,
                    winner
                );
                self.notify(player, ALREADY_WON).await;
                Ok(ClaimOutcome::AlreadyWon { winner })
            }
            None => {
                self.notify(player, GAME_OVER).await;
                Ok(ClaimOutcome::GameOver)
            }
        }
    }

    /// One scheduled call.
    ///
    /// With no active game the scheduler is switched off again, which heals a
    /// missed disable. When the pool is used up the game is closed with
    /// [`CompletionReason::PoolExhausted`].
    pub async fn tick(&self) -> Result<TickOutcome> {
        let result = self.try_tick().await;
        if let Err(e) = &result {
            tracing::error!("Error in scheduled call: {}", e);
        }
        result
    }

    async fn try_tick(&self) -> Result<TickOutcome> {
        let Some(mut game) = self.store.get_active_game().await? else {
            tracing::debug!("No active game found, switching scheduled calls off");
            self.disable_scheduler().await;
            return Ok(TickOutcome::NoActiveGame);
        };

        // A rejected append means an overlapping tick grew the history or the
        // game ended, so each retry sees strictly more calls.
        for _ in 0..=game.word_pool.len() {
            let word = if game.is_exhausted() {
                None
            } else {
                let mut rng = self.rng.lock();
                next_word(&game.word_pool, &game.call_history, &mut rng).map(str::to_string)
            };
            let Some(word) = word else {
                return self.finish_exhausted(game).await;
            };

            if let Some(updated) = self.store.append_call(game.id, &word).await? {
                return self.announce_call(updated, word).await;
            }

            match self.store.get_game(game.id).await? {
                Some(latest) if latest.is_active() => {
                    tracing::debug!("'{}' was already called in game {}, picking again", word, game.id);
                    game = latest;
                }
                _ => {
                    tracing::info!("Game {} ended before '{}' could be called", game.id, word);
                    return Ok(TickOutcome::NoActiveGame);
                }
            }
        }

        Err(GameError::internal(format!(
            "Store kept rejecting calls for game {}",
            game.id
        )))
    }

    async fn announce_call(&self, updated: Game, word: String) -> Result<TickOutcome> {
        let previous_calls = updated.previous_calls().to_vec();
        tracing::info!(
            "Called '{}' in game {} ({} of {})",
            word,
            updated.id,
            updated.call_history.len(),
            updated.word_pool.len()
        );

        if let Err(e) = self
            .announcer
            .post_call(&updated.channel, &word, &previous_calls)
            .await
        {
            tracing::warn!("Failed to post call '{}' for game {}: {}", word, updated.id, e);
        }

        Ok(TickOutcome::Called {
            game_id: updated.id,
            word,
            previous_calls,
        })
    }

    async fn finish_exhausted(&self, game: Game) -> Result<TickOutcome> {
        tracing::info!("All words have been called in game {}", game.id);

        let completion = Completion::without_winner(CompletionReason::PoolExhausted);
        let Some(ended) = self.store.complete_game(game.id, &completion).await? else {
            return Ok(TickOutcome::NoActiveGame);
        };

        self.disable_scheduler().await;
        if let Err(e) = self.announcer.post_stop(&ended, None).await {
            tracing::warn!("Failed to announce end of game {}: {}", ended.id, e);
        }

        Ok(TickOutcome::Exhausted(ended))
    }

    async fn enable_scheduler(&self) {
        match self.scheduler.enable().await {
            Ok(()) => tracing::info!("Scheduled calls enabled"),
            Err(e) => tracing::error!("Error enabling scheduled calls: {}", e),
        }
    }

    async fn disable_scheduler(&self) {
        match self.scheduler.disable().await {
            Ok(()) => tracing::debug!("Scheduled calls disabled"),
            Err(e) => tracing::error!("Error disabling scheduled calls: {}", e),
        }
    }

    async fn notify(&self, recipient: &str, message: &str) {
        if let Err(e) = self.announcer.post_ephemeral(recipient, message).await {
            tracing::warn!("Failed to notify {}: {}", recipient, e);
        }
    }

    /// Log a failed trigger and tell the requester to retry. Input errors are
    /// returned untouched for the caller to show.
    async fn report_failure<T>(&self, requester: &str, action: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if !e.is_user_input() {
                tracing::error!("Error {}: {}", action, e);
                self.notify(requester, GENERIC_FAILURE).await;
            }
        }
        result
    }
}
