use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use shared::{domain::Rank, protocol::GameEvent};

use crate::{
    config::EngineConfig,
    deck::{Deck, DeckDealer, DECK_SIZE},
    emitter::EventSink,
    Engine,
};

pub(crate) const KNOWN_RANKS: [Rank; DECK_SIZE] = [7, 3, 11, 1, 13, 2, 12, 4, 10, 5, 9, 6, 8];

#[derive(Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<GameEvent>>,
}

impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<GameEvent> {
        self.events.lock().expect("events").clone()
    }

    pub(crate) fn events_for(&self, player: &str) -> Vec<GameEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.player().as_str() == player)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: GameEvent) {
        self.events.lock().expect("events").push(event);
    }
}

/// Deals queued decks in order, then falls back to `KNOWN_RANKS`.
#[derive(Default)]
pub(crate) struct QueuedDealer {
    decks: Mutex<VecDeque<Deck>>,
}

impl QueuedDealer {
    pub(crate) fn push(&self, ranks: [Rank; DECK_SIZE]) {
        self.decks
            .lock()
            .expect("decks")
            .push_back(Deck::from_ranks(ranks).expect("valid deck"));
    }
}

impl DeckDealer for QueuedDealer {
    fn deal(&self) -> Deck {
        self.decks
            .lock()
            .expect("decks")
            .pop_front()
            .unwrap_or_else(|| Deck::from_ranks(KNOWN_RANKS).expect("valid deck"))
    }
}

pub(crate) fn test_config() -> EngineConfig {
    EngineConfig {
        cooldown: Duration::from_secs(2),
        notice_delay: Duration::from_millis(500),
        inactivity_timeout: Duration::from_secs(300),
        max_active_games: 4,
        admin: Some("streamer".into()),
        ..EngineConfig::default()
    }
}

pub(crate) struct Harness {
    pub(crate) engine: Arc<Engine>,
    pub(crate) sink: Arc<RecordingSink>,
    pub(crate) dealer: Arc<QueuedDealer>,
}

pub(crate) fn harness(config: EngineConfig) -> Harness {
    let sink = Arc::new(RecordingSink::default());
    let dealer = Arc::new(QueuedDealer::default());
    let engine = Engine::with_dealer(config, sink.clone(), dealer.clone());
    Harness {
        engine,
        sink,
        dealer,
    }
}

/// The guess that is correct for moving from `ranks[step - 1]` to `ranks[step]`.
pub(crate) fn right_guess(ranks: &[Rank], step: usize) -> &'static str {
    if ranks[step] > ranks[step - 1] {
        "h"
    } else {
        "l"
    }
}

pub(crate) fn wrong_guess(ranks: &[Rank], step: usize) -> &'static str {
    if right_guess(ranks, step) == "h" {
        "l"
    } else {
        "h"
    }
}
