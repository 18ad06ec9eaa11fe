use std::{future::Future, time::Duration};

use shared::domain::{GameId, Guess, LifetimeStats, PlayerName, Rank, Verdict};
use tokio::sync::OwnedSemaphorePermit;

use crate::{deck::Deck, timer::Timer};

/// One in-progress round for a single player.
///
/// Holding a `Game` holds one of the registry's active-game permits; the
/// permit goes back to the pool when the game is dropped.
#[derive(Debug)]
pub struct Game {
    id: GameId,
    player: PlayerName,
    deck: Deck,
    inactivity: Timer,
    _slot: OwnedSemaphorePermit,
}

/// Result of resolving one guess against the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn {
    pub active_card: Rank,
    pub next_card: Rank,
    pub guess: Guess,
    pub verdict: Verdict,
    pub score: u32,
}

/// Whether `guess` is right about `next` relative to `active`. Equal ranks
/// cannot occur in one deck, so they count as wrong.
pub fn is_correct(guess: Guess, active: Rank, next: Rank) -> bool {
    match guess {
        Guess::Higher => next > active,
        Guess::Lower => next < active,
    }
}

impl Game {
    pub(crate) fn new(id: GameId, player: PlayerName, deck: Deck, slot: OwnedSemaphorePermit) -> Self {
        Self {
            id,
            player,
            deck,
            inactivity: Timer::default(),
            _slot: slot,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn player(&self) -> &PlayerName {
        &self.player
    }

    pub fn active_card(&self) -> Rank {
        self.deck.active_card()
    }

    pub fn score(&self) -> u32 {
        self.deck.cursor() as u32
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Applies a guess. Returns `None` only if the deck is already exhausted,
    /// which cannot happen for a game that is still in a session slot.
    pub fn resolve(&mut self, guess: Guess) -> Option<Turn> {
        let active_card = self.deck.active_card();
        let next_card = self.deck.peek_next()?;

        let verdict = if is_correct(guess, active_card, next_card) {
            self.deck.advance();
            if self.deck.is_exhausted() {
                Verdict::Won
            } else {
                Verdict::Correct
            }
        } else {
            Verdict::Lost
        };

        Some(Turn {
            active_card,
            next_card,
            guess,
            verdict,
            score: self.score(),
        })
    }

    pub(crate) fn arm_inactivity<F>(&mut self, timeout: Duration, fire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.inactivity.arm(timeout, fire);
    }

    pub(crate) fn cancel_inactivity(&mut self) {
        self.inactivity.cancel();
    }

    pub(crate) fn disarm_inactivity(&mut self) {
        self.inactivity.disarm();
    }

    pub fn inactivity_armed(&self) -> bool {
        self.inactivity.is_armed()
    }
}

/// Folds a finished game into the player's lifetime counters.
pub fn record_result(stats: &mut LifetimeStats, turn: &Turn) {
    if !turn.verdict.ends_game() {
        return;
    }
    stats.games_played += 1;
    if turn.verdict == Verdict::Won {
        stats.games_won += 1;
    }
    stats.high_score = stats.high_score.max(turn.score);
}

#[cfg(test)]
#[path = "tests/game_tests.rs"]
mod tests;
