use super::*;

fn alice() -> PlayerName {
    PlayerName::from("alice")
}

fn new_game(name: &str, active_card: Rank) -> NewGameForm {
    NewGameForm {
        display_name: name.into(),
        active_card,
        hi_score: 5,
        num_games: 2,
        num_wins: 1,
    }
}

fn update(name: &str, active_card: Rank, next_card: Rank, verdict: Verdict) -> GameUpdateForm {
    GameUpdateForm {
        display_name: name.into(),
        active_card,
        next_card,
        user_choice: if next_card > active_card {
            Guess::Higher
        } else {
            Guess::Lower
        },
        verdict,
        score: 1,
        hi_score: 5,
        num_games: 2,
        num_wins: 1,
    }
}

fn notification(name: &str, text: &str) -> NotificationForm {
    NotificationForm {
        display_name: name.into(),
        notification_text: text.into(),
    }
}

async fn started(registry: &MirrorRegistry) {
    registry.start_game(new_game("alice", 7)).await.expect("new game");
    registry.poll(&alice()).await.expect("first poll");
}

fn state_of(view: &View) -> &'static str {
    match view {
        View::Game(_) => "game",
        View::Result(_) => "result",
        View::EndGame(_) => "end_game",
        View::Placeholder(_) => "placeholder",
    }
}

#[tokio::test]
async fn first_poll_moves_a_new_game_into_progress() {
    let registry = MirrorRegistry::new();
    registry.start_game(new_game("alice", 7)).await.expect("new game");
    assert_eq!(
        registry.game(&alice()).await.expect("game").state,
        PresentationState::NotStarted
    );

    let view = registry.poll(&alice()).await.expect("poll");
    let View::Game(game) = &view else {
        panic!("expected game view, got {view:?}");
    };
    assert_eq!(game.active_card, 7);
    assert_eq!(game.choice, None);

    let game = registry.game(&alice()).await.expect("game");
    assert_eq!(game.state, PresentationState::InProgress);
    registry.poll(&alice()).await.expect("poll");
    assert_eq!(
        registry.game(&alice()).await.expect("game").state,
        PresentationState::InProgress
    );
}

#[tokio::test]
async fn correct_guess_is_shown_one_step_per_poll() {
    let registry = MirrorRegistry::new();
    started(&registry).await;
    registry
        .record_guess(update("alice", 7, 3, Verdict::Correct))
        .await
        .expect("update");

    let choice = registry.poll(&alice()).await.expect("poll");
    let View::Game(game) = &choice else {
        panic!("expected game view, got {choice:?}");
    };
    assert_eq!(game.choice, Some(Guess::Lower));
    assert_eq!(
        registry.game(&alice()).await.expect("game").state,
        PresentationState::DisplayingResult
    );

    let result = registry.poll(&alice()).await.expect("poll");
    let View::Result(message) = &result else {
        panic!("expected result view, got {result:?}");
    };
    assert_eq!(message.text, CORRECT_TEXT);

    let game = registry.game(&alice()).await.expect("game");
    assert_eq!(game.state, PresentationState::InProgress);
    assert_eq!(game.active_card, 3);
    assert_eq!(game.choice, None);
}

#[tokio::test]
async fn won_and_lost_games_settle_on_their_end_view() {
    let registry = MirrorRegistry::new();
    started(&registry).await;
    registry
        .record_guess(update("alice", 7, 13, Verdict::Won))
        .await
        .expect("update");
    let views = [
        registry.poll(&alice()).await.expect("poll"),
        registry.poll(&alice()).await.expect("poll"),
        registry.poll(&alice()).await.expect("poll"),
        registry.poll(&alice()).await.expect("poll"),
    ];
    let kinds: Vec<_> = views.iter().map(state_of).collect();
    assert_eq!(kinds, vec!["game", "result", "end_game", "end_game"]);
    assert!(matches!(&views[1], View::Result(m) if m.text == CORRECT_TEXT));
    assert!(matches!(&views[3], View::EndGame(m) if m.text == WON_TEXT));

    let registry = MirrorRegistry::new();
    started(&registry).await;
    registry
        .record_guess(update("alice", 7, 9, Verdict::Lost))
        .await
        .expect("update");
    registry.poll(&alice()).await.expect("poll");
    let result = registry.poll(&alice()).await.expect("poll");
    assert!(matches!(&result, View::Result(m) if m.text == INCORRECT_TEXT));
    let end = registry.poll(&alice()).await.expect("poll");
    assert!(matches!(&end, View::EndGame(m) if m.text == LOST_TEXT));
    assert_eq!(
        registry.game(&alice()).await.expect("game").state,
        PresentationState::Lost
    );
}

#[tokio::test]
async fn expired_game_hides_the_notification() {
    let registry = MirrorRegistry::new();
    started(&registry).await;
    registry
        .update_notification(notification("alice", "slow down"))
        .await;
    registry.expire(&alice()).await.expect("expire");

    let view = registry.poll(&alice()).await.expect("poll");
    assert_eq!(
        view,
        View::EndGame(MessageView {
            display_name: alice(),
            text: EXPIRED_TEXT,
            notification: None,
        })
    );
}

#[tokio::test]
async fn empty_notification_hides_the_banner() {
    let registry = MirrorRegistry::new();
    started(&registry).await;
    registry
        .update_notification(notification("alice", "slow down"))
        .await;
    assert_eq!(
        registry.game(&alice()).await.expect("game").notification.as_deref(),
        Some("slow down")
    );

    registry
        .update_notification(notification("alice", ""))
        .await;
    assert_eq!(registry.game(&alice()).await.expect("game").notification, None);
}

#[tokio::test]
async fn new_game_replaces_only_finished_games() {
    let registry = MirrorRegistry::new();
    started(&registry).await;
    assert_eq!(
        registry.start_game(new_game("alice", 4)).await,
        Err(MirrorError::GameInProgress(alice()))
    );

    registry.expire(&alice()).await.expect("expire");
    registry.start_game(new_game("alice", 4)).await.expect("replacement");
    let game = registry.game(&alice()).await.expect("game");
    assert_eq!(game.state, PresentationState::NotStarted);
    assert_eq!(game.active_card, 4);
}

#[tokio::test]
async fn new_game_replaces_a_lost_game_before_its_end_view_is_shown() {
    let registry = MirrorRegistry::new();
    started(&registry).await;
    registry
        .record_guess(update("alice", 7, 9, Verdict::Lost))
        .await
        .expect("update");
    registry.poll(&alice()).await.expect("choice poll");
    assert_eq!(
        registry.game(&alice()).await.expect("game").state,
        PresentationState::DisplayingResult
    );

    registry.start_game(new_game("alice", 4)).await.expect("replacement");
    let game = registry.game(&alice()).await.expect("game");
    assert_eq!(game.state, PresentationState::NotStarted);
    assert_eq!(game.active_card, 4);
    assert_eq!(game.verdict, None);
    assert!(!game.rendered);
}

#[tokio::test]
async fn update_after_a_deciding_verdict_is_rejected() {
    let registry = MirrorRegistry::new();
    started(&registry).await;
    registry
        .record_guess(update("alice", 7, 13, Verdict::Won))
        .await
        .expect("update");
    assert_eq!(
        registry
            .record_guess(update("alice", 13, 2, Verdict::Correct))
            .await,
        Err(MirrorError::GameFinished(alice()))
    );
    let game = registry.game(&alice()).await.expect("game");
    assert_eq!(game.active_card, 7);
    assert_eq!(game.verdict, Some(Verdict::Won));
}

#[tokio::test]
async fn events_for_unknown_players_or_games_are_rejected() {
    let registry = MirrorRegistry::new();
    assert_eq!(
        registry.poll(&alice()).await,
        Err(MirrorError::UnknownPlayer(alice()))
    );
    assert_eq!(
        registry.expire(&alice()).await,
        Err(MirrorError::UnknownPlayer(alice()))
    );

    started(&registry).await;
    registry.install_placeholder(&alice()).await.expect("placeholder");
    assert_eq!(registry.poll(&alice()).await, Err(MirrorError::NoGame(alice())));
    assert_eq!(
        registry
            .record_guess(update("alice", 7, 3, Verdict::Correct))
            .await,
        Err(MirrorError::NoGame(alice()))
    );
    assert_eq!(MirrorError::NoGame(alice()).code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn update_after_the_game_ended_is_rejected() {
    let registry = MirrorRegistry::new();
    started(&registry).await;
    registry.expire(&alice()).await.expect("expire");
    let err = registry
        .record_guess(update("alice", 7, 3, Verdict::Correct))
        .await
        .expect_err("ended");
    assert_eq!(err, MirrorError::GameFinished(alice()));
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn rejected_update_leaves_stats_untouched() {
    let registry = MirrorRegistry::new();
    started(&registry).await;
    registry.expire(&alice()).await.expect("expire");
    let late = GameUpdateForm {
        hi_score: 99,
        num_games: 40,
        num_wins: 30,
        ..update("alice", 7, 3, Verdict::Correct)
    };
    registry.record_guess(late).await.expect_err("ended");

    let summaries = registry.summaries().await;
    assert_eq!(
        summaries[0].stats,
        LifetimeStats {
            games_played: 2,
            games_won: 1,
            high_score: 5,
        }
    );
}

#[tokio::test]
async fn notice_for_a_player_without_a_game_is_kept() {
    let registry = MirrorRegistry::new();
    registry
        .update_notification(notification("alice", "all slots taken"))
        .await;

    let summaries = registry.summaries().await;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].state, None);
    assert_eq!(summaries[0].notification.as_deref(), Some("all slots taken"));

    let expected = View::Placeholder(PlaceholderView {
        display_name: Some(alice()),
        notification: Some("all slots taken".into()),
    });
    assert_eq!(registry.poll(&alice()).await, Ok(expected.clone()));
    assert_eq!(registry.install_placeholder(&alice()).await, Ok(expected));

    registry.start_game(new_game("alice", 7)).await.expect("new game");
    assert_eq!(registry.summaries().await[0].notification, None);
}

#[tokio::test]
async fn unrendered_games_are_discovered_once() {
    let registry = MirrorRegistry::new();
    registry.start_game(new_game("bob", 2)).await.expect("bob");
    registry.start_game(new_game("alice", 7)).await.expect("alice");

    let mut found = Vec::new();
    while let Some(View::Game(game)) = registry.find_unrendered().await {
        found.push(game.display_name.0);
    }
    found.sort();
    assert_eq!(found, vec!["alice".to_string(), "bob".to_string()]);
    assert_eq!(registry.find_unrendered().await, None);
}

#[tokio::test]
async fn summaries_carry_the_latest_stats() {
    let registry = MirrorRegistry::new();
    started(&registry).await;
    let summaries = registry.summaries().await;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].display_name, alice());
    assert_eq!(summaries[0].stats.high_score, 5);
    assert_eq!(summaries[0].state, Some(PresentationState::InProgress));
}
