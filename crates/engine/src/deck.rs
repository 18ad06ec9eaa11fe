use rand::{seq::SliceRandom, Rng};
use shared::domain::Rank;
use thiserror::Error;

pub const DECK_SIZE: usize = 13;

const RANKS: [Rank; DECK_SIZE] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("rank {0} is outside 1..=13")]
    RankOutOfRange(Rank),
    #[error("rank {0} appears more than once")]
    DuplicateRank(Rank),
}

/// The 13 ranks in play order plus the index of the face-up card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: [Rank; DECK_SIZE],
    cursor: usize,
}

impl Deck {
    pub fn shuffle() -> Self {
        Self::shuffle_with(&mut rand::thread_rng())
    }

    pub fn shuffle_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cards = RANKS;
        cards.shuffle(rng);
        Self { cards, cursor: 0 }
    }

    pub fn from_ranks(cards: [Rank; DECK_SIZE]) -> Result<Self, DeckError> {
        let mut seen = [false; DECK_SIZE];
        for rank in cards {
            if !(1..=DECK_SIZE as Rank).contains(&rank) {
                return Err(DeckError::RankOutOfRange(rank));
            }
            let slot = &mut seen[usize::from(rank) - 1];
            if *slot {
                return Err(DeckError::DuplicateRank(rank));
            }
            *slot = true;
        }
        Ok(Self { cards, cursor: 0 })
    }

    pub fn cards(&self) -> &[Rank] {
        &self.cards
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn active_card(&self) -> Rank {
        self.cards[self.cursor]
    }

    /// Card after the active one, `None` once the last card is face up.
    pub fn peek_next(&self) -> Option<Rank> {
        self.cards.get(self.cursor + 1).copied()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor == DECK_SIZE - 1
    }

    pub fn advance(&mut self) {
        debug_assert!(!self.is_exhausted(), "advance past the last card");
        if !self.is_exhausted() {
            self.cursor += 1;
        }
    }
}

/// Source of fresh decks for new games.
pub trait DeckDealer: Send + Sync {
    fn deal(&self) -> Deck;
}

pub struct ShuffledDealer;

impl DeckDealer for ShuffledDealer {
    fn deal(&self) -> Deck {
        Deck::shuffle()
    }
}

#[cfg(test)]
#[path = "tests/deck_tests.rs"]
mod tests;
