use std::sync::Arc;

use tokio::sync::Semaphore;

use super::*;
use crate::deck::DECK_SIZE;

const RANKS: [Rank; DECK_SIZE] = [7, 3, 11, 1, 13, 2, 12, 4, 10, 5, 9, 6, 8];

fn game(pool: &Arc<Semaphore>) -> Game {
    let slot = Arc::clone(pool).try_acquire_owned().expect("permit");
    Game::new(
        GameId(1),
        PlayerName::from("alice"),
        Deck::from_ranks(RANKS).expect("deck"),
        slot,
    )
}

fn right_guess(active: Rank, next: Rank) -> Guess {
    if next > active {
        Guess::Higher
    } else {
        Guess::Lower
    }
}

#[test]
fn guess_is_correct_only_in_the_matching_direction() {
    assert!(is_correct(Guess::Higher, 3, 9));
    assert!(!is_correct(Guess::Lower, 3, 9));
    assert!(is_correct(Guess::Lower, 9, 3));
    assert!(!is_correct(Guess::Higher, 9, 3));
}

#[test]
fn correct_guesses_advance_score_with_cursor() {
    let pool = Arc::new(Semaphore::new(1));
    let mut game = game(&pool);
    assert_eq!(game.active_card(), 7);

    let turn = game.resolve(Guess::Lower).expect("turn");
    assert_eq!(turn.verdict, Verdict::Correct);
    assert_eq!(turn.active_card, 7);
    assert_eq!(turn.next_card, 3);
    assert_eq!(turn.score, 1);
    assert_eq!(game.score(), game.deck().cursor() as u32);
    assert_eq!(game.active_card(), 3);
}

#[test]
fn reaching_last_card_is_a_win() {
    let pool = Arc::new(Semaphore::new(1));
    let mut game = game(&pool);

    for step in 1..DECK_SIZE {
        let guess = right_guess(RANKS[step - 1], RANKS[step]);
        let turn = game.resolve(guess).expect("turn");
        assert_eq!(turn.score, step as u32);
        if step == DECK_SIZE - 1 {
            assert_eq!(turn.verdict, Verdict::Won);
        } else {
            assert_eq!(turn.verdict, Verdict::Correct);
        }
    }
    assert_eq!(game.score(), 12);
    assert_eq!(game.resolve(Guess::Higher), None);
}

#[test]
fn wrong_guess_loses_without_advancing() {
    let pool = Arc::new(Semaphore::new(1));
    let mut game = game(&pool);
    let turn = game.resolve(Guess::Higher).expect("turn");
    assert_eq!(turn.verdict, Verdict::Lost);
    assert_eq!(turn.next_card, 3);
    assert_eq!(turn.score, 0);
    assert_eq!(game.deck().cursor(), 0);
}

#[test]
fn dropping_a_game_returns_its_slot() {
    let pool = Arc::new(Semaphore::new(1));
    let first = game(&pool);
    assert_eq!(pool.available_permits(), 0);
    drop(first);
    assert_eq!(pool.available_permits(), 1);
}

#[test]
fn high_score_only_moves_at_game_end() {
    let mut stats = LifetimeStats {
        games_played: 2,
        games_won: 0,
        high_score: 5,
    };
    let mut turn = Turn {
        active_card: 4,
        next_card: 9,
        guess: Guess::Higher,
        verdict: Verdict::Correct,
        score: 8,
    };
    record_result(&mut stats, &turn);
    assert_eq!(stats.high_score, 5);
    assert_eq!(stats.games_played, 2);

    turn.verdict = Verdict::Lost;
    turn.score = 3;
    record_result(&mut stats, &turn);
    assert_eq!(stats.high_score, 5);
    assert_eq!(stats.games_played, 3);
    assert_eq!(stats.games_won, 0);

    turn.verdict = Verdict::Won;
    turn.score = 12;
    record_result(&mut stats, &turn);
    assert_eq!(stats.high_score, 12);
    assert_eq!(stats.games_won, 1);
}
