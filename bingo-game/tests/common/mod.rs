#![allow(dead_code)]

use async_trait::async_trait;
use bingo_core::{
    BingoError, BingoStore, Card, Completion, Game, GameConfig, MemoryStore, PlayerCard,
    StampedSet, FREE_POSITION,
};
use bingo_game::{
    Announcer, CallScheduler, CardOutcome, CardView, GameError, GameManager, GameRng, Result,
    StampOutcome, StartRequest, TickOutcome,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Barrier;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum Announcement {
    Call {
        channel: String,
        word: String,
        previous_calls: Vec<String>,
    },
    Start {
        game_id: Uuid,
        first_word: String,
    },
    Stop {
        game_id: Uuid,
        stopped_by: Option<String>,
    },
    Winner {
        channel: String,
        winner: String,
    },
    Ephemeral {
        recipient: String,
        message: String,
    },
}

#[derive(Default)]
pub struct RecordingAnnouncer {
    events: Mutex<Vec<Announcement>>,
}

impl RecordingAnnouncer {
    pub fn events(&self) -> Vec<Announcement> {
        self.events.lock().clone()
    }

    pub fn ephemerals_for(&self, recipient: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Announcement::Ephemeral { recipient: r, message } if r == recipient => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Announcement) {
        self.events.lock().push(event);
    }
}

#[async_trait]
impl Announcer for RecordingAnnouncer {
    async fn post_call(&self, channel: &str, word: &str, previous_calls: &[String]) -> Result<()> {
        self.push(Announcement::Call {
            channel: channel.to_string(),
            word: word.to_string(),
            previous_calls: previous_calls.to_vec(),
        });
        Ok(())
    }

    async fn post_start(&self, game: &Game, first_word: &str) -> Result<()> {
        self.push(Announcement::Start {
            game_id: game.id,
            first_word: first_word.to_string(),
        });
        Ok(())
    }

    async fn post_stop(&self, game: &Game, stopped_by: Option<&str>) -> Result<()> {
        self.push(Announcement::Stop {
            game_id: game.id,
            stopped_by: stopped_by.map(str::to_string),
        });
        Ok(())
    }

    async fn post_winner(&self, channel: &str, winner: &str) -> Result<()> {
        self.push(Announcement::Winner {
            channel: channel.to_string(),
            winner: winner.to_string(),
        });
        Ok(())
    }

    async fn post_ephemeral(&self, recipient: &str, message: &str) -> Result<()> {
        self.push(Announcement::Ephemeral {
            recipient: recipient.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}

/// Records every toggle; optionally fails them all.
#[derive(Default)]
pub struct RecordingScheduler {
    calls: Mutex<Vec<&'static str>>,
    failing: bool,
}

impl RecordingScheduler {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn last(&self) -> Option<&'static str> {
        self.calls.lock().last().copied()
    }

    fn record(&self, call: &'static str) -> Result<()> {
        self.calls.lock().push(call);
        if self.failing {
            return Err(GameError::scheduler("rule update rejected"));
        }
        Ok(())
    }
}

#[async_trait]
impl CallScheduler for RecordingScheduler {
    async fn enable(&self) -> Result<()> {
        self.record("enable")
    }

    async fn disable(&self) -> Result<()> {
        self.record("disable")
    }
}

/// Holds every `get_active_game` call while closed until `parties` callers
/// are waiting, so concurrent triggers all see the game as active.
pub struct GatedStore {
    inner: MemoryStore,
    gate: Barrier,
    closed: AtomicBool,
}

impl GatedStore {
    pub fn new(parties: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            gate: Barrier::new(parties),
            closed: AtomicBool::new(false),
        }
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl BingoStore for GatedStore {
    async fn create_game(&self, game: &Game, supersede: bool) -> bingo_core::Result<Option<Game>> {
        self.inner.create_game(game, supersede).await
    }

    async fn get_active_game(&self) -> bingo_core::Result<Option<Game>> {
        let game = self.inner.get_active_game().await?;
        if self.closed.load(Ordering::SeqCst) {
            self.gate.wait().await;
        }
        Ok(game)
    }

    async fn get_game(&self, game_id: Uuid) -> bingo_core::Result<Option<Game>> {
        self.inner.get_game(game_id).await
    }

    async fn append_call(&self, game_id: Uuid, word: &str) -> bingo_core::Result<Option<Game>> {
        self.inner.append_call(game_id, word).await
    }

    async fn complete_game(
        &self,
        game_id: Uuid,
        completion: &Completion,
    ) -> bingo_core::Result<Option<Game>> {
        self.inner.complete_game(game_id, completion).await
    }

    async fn get_card(&self, game_id: Uuid, player_id: &str) -> bingo_core::Result<Option<PlayerCard>> {
        self.inner.get_card(game_id, player_id).await
    }

    async fn create_card(
        &self,
        game_id: Uuid,
        player_id: &str,
        card: &Card,
    ) -> bingo_core::Result<PlayerCard> {
        self.inner.create_card(game_id, player_id, card).await
    }

    async fn set_stamped_positions(
        &self,
        game_id: Uuid,
        player_id: &str,
        stamped: &StampedSet,
    ) -> bingo_core::Result<()> {
        self.inner
            .set_stamped_positions(game_id, player_id, stamped)
            .await
    }
}

/// Memory store whose `create_game` can be made to fail on demand.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_create: AtomicBool,
}

impl FlakyStore {
    pub fn refuse_new_games(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl BingoStore for FlakyStore {
    async fn create_game(&self, game: &Game, supersede: bool) -> bingo_core::Result<Option<Game>> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(BingoError::internal("disk full"));
        }
        self.inner.create_game(game, supersede).await
    }

    async fn get_active_game(&self) -> bingo_core::Result<Option<Game>> {
        self.inner.get_active_game().await
    }

    async fn get_game(&self, game_id: Uuid) -> bingo_core::Result<Option<Game>> {
        self.inner.get_game(game_id).await
    }

    async fn append_call(&self, game_id: Uuid, word: &str) -> bingo_core::Result<Option<Game>> {
        self.inner.append_call(game_id, word).await
    }

    async fn complete_game(
        &self,
        game_id: Uuid,
        completion: &Completion,
    ) -> bingo_core::Result<Option<Game>> {
        self.inner.complete_game(game_id, completion).await
    }

    async fn get_card(&self, game_id: Uuid, player_id: &str) -> bingo_core::Result<Option<PlayerCard>> {
        self.inner.get_card(game_id, player_id).await
    }

    async fn create_card(
        &self,
        game_id: Uuid,
        player_id: &str,
        card: &Card,
    ) -> bingo_core::Result<PlayerCard> {
        self.inner.create_card(game_id, player_id, card).await
    }

    async fn set_stamped_positions(
        &self,
        game_id: Uuid,
        player_id: &str,
        stamped: &StampedSet,
    ) -> bingo_core::Result<()> {
        self.inner
            .set_stamped_positions(game_id, player_id, stamped)
            .await
    }
}

/// Every call fails as if the database were unreachable.
pub struct BrokenStore;

fn unavailable<T>() -> bingo_core::Result<T> {
    Err(BingoError::internal("database unavailable"))
}

#[async_trait]
impl BingoStore for BrokenStore {
    async fn create_game(&self, _game: &Game, _supersede: bool) -> bingo_core::Result<Option<Game>> {
        unavailable()
    }

    async fn get_active_game(&self) -> bingo_core::Result<Option<Game>> {
        unavailable()
    }

    async fn get_game(&self, _game_id: Uuid) -> bingo_core::Result<Option<Game>> {
        unavailable()
    }

    async fn append_call(&self, _game_id: Uuid, _word: &str) -> bingo_core::Result<Option<Game>> {
        unavailable()
    }

    async fn complete_game(
        &self,
        _game_id: Uuid,
        _completion: &Completion,
    ) -> bingo_core::Result<Option<Game>> {
        unavailable()
    }

    async fn get_card(&self, _game_id: Uuid, _player_id: &str) -> bingo_core::Result<Option<PlayerCard>> {
        unavailable()
    }

    async fn create_card(
        &self,
        _game_id: Uuid,
        _player_id: &str,
        _card: &Card,
    ) -> bingo_core::Result<PlayerCard> {
        unavailable()
    }

    async fn set_stamped_positions(
        &self,
        _game_id: Uuid,
        _player_id: &str,
        _stamped: &StampedSet,
    ) -> bingo_core::Result<()> {
        unavailable()
    }
}

pub struct Harness {
    pub manager: Arc<GameManager>,
    pub announcer: Arc<RecordingAnnouncer>,
    pub scheduler: Arc<RecordingScheduler>,
}

pub fn harness_with(store: Arc<dyn BingoStore>, scheduler: RecordingScheduler) -> Harness {
    let announcer = Arc::new(RecordingAnnouncer::default());
    let scheduler = Arc::new(scheduler);
    let manager = GameManager::new(
        store,
        announcer.clone(),
        scheduler.clone(),
        GameConfig::default(),
    )
    .unwrap()
    .with_rng(GameRng::new(42));

    Harness {
        manager: Arc::new(manager),
        announcer,
        scheduler,
    }
}

pub fn harness() -> Harness {
    harness_with(Arc::new(MemoryStore::new()), RecordingScheduler::default())
}

pub fn word_list(n: usize) -> String {
    (1..=n)
        .map(|i| format!("word {}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn start_request(n: usize) -> StartRequest {
    StartRequest::from_word_list(word_list(n), 0.5, "C-general", "U-host")
}

/// Tick until the pool is used up. Returns the number of extra calls made.
pub async fn call_every_word(manager: &GameManager) -> usize {
    let mut calls = 0;
    loop {
        let game = manager.active_game().await.unwrap().unwrap();
        if game.is_exhausted() {
            return calls;
        }
        match manager.tick().await.unwrap() {
            TickOutcome::Called { .. } => calls += 1,
            other => panic!("unexpected tick outcome: {:?}", other),
        }
    }
}

pub async fn card_for(manager: &GameManager, player: &str) -> CardView {
    match manager.request_card(player).await.unwrap() {
        CardOutcome::Card(view) => view,
        CardOutcome::NoActiveGame => panic!("no active game"),
    }
}

/// Stamp every called cell on the player's card.
pub async fn stamp_all_called(manager: &GameManager, player: &str) -> CardView {
    let mut view = card_for(manager, player).await;
    for pos in 0..25 {
        if pos == FREE_POSITION {
            continue;
        }
        let word = view.card.word_at(pos).unwrap().to_string();
        if view.called.contains(&word) {
            if let StampOutcome::Stamped(updated) =
                manager.stamp(player, pos / 5, pos % 5).await.unwrap()
            {
                view = updated;
            }
        }
    }
    view
}
