use serde::{Deserialize, Serialize};

use crate::domain::{Guess, LifetimeStats, PlayerName, Rank, Verdict};

pub fn new_game_route() -> &'static str {
    "/new-game"
}

pub fn game_route() -> &'static str {
    "/game"
}

pub fn update_notification_route() -> &'static str {
    "/update-notification"
}

pub fn expire_game_route() -> &'static str {
    "/expire-game"
}

pub fn shut_down_route() -> &'static str {
    "/shut-down"
}

pub fn check_for_new_game_route() -> &'static str {
    "/check-for-new-game"
}

pub fn install_placeholder_route() -> &'static str {
    "/install-placeholder"
}

/// State transition reported by the engine to the render mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    NewGame {
        player: PlayerName,
        active_card: Rank,
        stats: LifetimeStats,
    },
    GameUpdate {
        player: PlayerName,
        active_card: Rank,
        guess: Guess,
        verdict: Verdict,
        next_card: Rank,
        score: u32,
        stats: LifetimeStats,
    },
    NotificationUpdate {
        player: PlayerName,
        text: String,
    },
    GameExpired {
        player: PlayerName,
    },
}

impl GameEvent {
    pub fn player(&self) -> &PlayerName {
        match self {
            GameEvent::NewGame { player, .. }
            | GameEvent::GameUpdate { player, .. }
            | GameEvent::NotificationUpdate { player, .. }
            | GameEvent::GameExpired { player } => player,
        }
    }

    pub fn route(&self) -> &'static str {
        match self {
            GameEvent::NewGame { .. } => new_game_route(),
            GameEvent::GameUpdate { .. } => game_route(),
            GameEvent::NotificationUpdate { .. } => update_notification_route(),
            GameEvent::GameExpired { .. } => expire_game_route(),
        }
    }

    pub fn into_form(self) -> EventForm {
        match self {
            GameEvent::NewGame {
                player,
                active_card,
                stats,
            } => EventForm::NewGame(NewGameForm {
                display_name: player.0,
                active_card,
                hi_score: stats.high_score,
                num_games: stats.games_played,
                num_wins: stats.games_won,
            }),
            GameEvent::GameUpdate {
                player,
                active_card,
                guess,
                verdict,
                next_card,
                score,
                stats,
            } => EventForm::GameUpdate(GameUpdateForm {
                display_name: player.0,
                active_card,
                next_card,
                user_choice: guess,
                verdict,
                score,
                hi_score: stats.high_score,
                num_games: stats.games_played,
                num_wins: stats.games_won,
            }),
            GameEvent::NotificationUpdate { player, text } => {
                EventForm::Notification(NotificationForm {
                    display_name: player.0,
                    notification_text: text,
                })
            }
            GameEvent::GameExpired { player } => EventForm::ExpireGame(PlayerForm {
                display_name: player.0,
            }),
        }
    }
}

/// Form-encoded body of an engine event, one variant per mirror endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EventForm {
    NewGame(NewGameForm),
    GameUpdate(GameUpdateForm),
    Notification(NotificationForm),
    ExpireGame(PlayerForm),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewGameForm {
    pub display_name: String,
    pub active_card: Rank,
    #[serde(default)]
    pub hi_score: u32,
    #[serde(default)]
    pub num_games: u32,
    #[serde(default)]
    pub num_wins: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GameUpdateForm {
    pub display_name: String,
    pub active_card: Rank,
    pub next_card: Rank,
    pub user_choice: Guess,
    pub verdict: Verdict,
    pub score: u32,
    #[serde(default)]
    pub hi_score: u32,
    #[serde(default)]
    pub num_games: u32,
    #[serde(default)]
    pub num_wins: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotificationForm {
    pub display_name: String,
    #[serde(default)]
    pub notification_text: String,
}

/// Body of `/expire-game` and query of `/game` and `/install-placeholder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlayerForm {
    pub display_name: String,
}
