//! Mirrored copy of every player's game, advanced one presentation step per
//! display poll.

use std::{collections::BTreeMap, sync::Arc};

use serde::Serialize;
use shared::{
    domain::{Guess, LifetimeStats, PlayerName, Rank, Verdict},
    error::ErrorCode,
    protocol::{GameUpdateForm, NewGameForm, NotificationForm},
};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

pub(crate) const CORRECT_TEXT: &str = "Correct!";
pub(crate) const INCORRECT_TEXT: &str = "Incorrect!";
pub(crate) const WON_TEXT: &str = "You win!!";
pub(crate) const LOST_TEXT: &str = "You lost!";
pub(crate) const EXPIRED_TEXT: &str = "Game expired.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MirrorError {
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerName),
    #[error("player {0} has no mirrored game")]
    NoGame(PlayerName),
    #[error("player {0} already has a game in progress")]
    GameInProgress(PlayerName),
    #[error("game of player {0} has already ended")]
    GameFinished(PlayerName),
}

impl MirrorError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MirrorError::UnknownPlayer(_) | MirrorError::NoGame(_) => ErrorCode::NotFound,
            MirrorError::GameInProgress(_) | MirrorError::GameFinished(_) => ErrorCode::Conflict,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationState {
    NotStarted,
    InProgress,
    DisplayingChoice,
    DisplayingResult,
    Won,
    Lost,
    Expired,
}

impl PresentationState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PresentationState::Won | PresentationState::Lost | PresentationState::Expired
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorGame {
    pub active_card: Rank,
    pub next_card: Option<Rank>,
    pub verdict: Option<Verdict>,
    pub choice: Option<Guess>,
    /// `None` while the notification banner is hidden.
    pub notification: Option<String>,
    pub score: u32,
    pub state: PresentationState,
    pub rendered: bool,
}

impl MirrorGame {
    fn new(active_card: Rank) -> Self {
        Self {
            active_card,
            next_card: None,
            verdict: None,
            choice: None,
            notification: None,
            score: 0,
            state: PresentationState::NotStarted,
            rendered: false,
        }
    }

    /// Finished once the engine has reported a deciding verdict, even if the
    /// display has not polled its way to the end view yet.
    pub fn is_finished(&self) -> bool {
        self.state.is_terminal() || self.verdict.is_some_and(Verdict::ends_game)
    }

    fn view(&self, player: &PlayerName) -> GameView {
        GameView {
            display_name: player.clone(),
            active_card: self.active_card,
            choice: self.choice,
            score: self.score,
            notification: self.notification.clone(),
        }
    }

    fn message(&self, player: &PlayerName, text: &'static str) -> MessageView {
        MessageView {
            display_name: player.clone(),
            text,
            notification: self.notification.clone(),
        }
    }

    /// Renders the current state and moves to the next one.
    fn advance(&mut self, player: &PlayerName) -> View {
        match self.state {
            PresentationState::NotStarted => {
                self.state = PresentationState::InProgress;
                View::Game(self.view(player))
            }
            PresentationState::InProgress => View::Game(self.view(player)),
            PresentationState::DisplayingChoice => {
                self.state = PresentationState::DisplayingResult;
                View::Game(self.view(player))
            }
            PresentationState::DisplayingResult => {
                self.choice = None;
                let text = match self.verdict {
                    Some(Verdict::Correct) => {
                        self.state = PresentationState::InProgress;
                        if let Some(next) = self.next_card.take() {
                            self.active_card = next;
                        }
                        CORRECT_TEXT
                    }
                    Some(Verdict::Won) => {
                        self.state = PresentationState::Won;
                        CORRECT_TEXT
                    }
                    Some(Verdict::Lost) | None => {
                        self.state = PresentationState::Lost;
                        INCORRECT_TEXT
                    }
                };
                View::Result(self.message(player, text))
            }
            PresentationState::Won => View::EndGame(self.message(player, WON_TEXT)),
            PresentationState::Lost => View::EndGame(self.message(player, LOST_TEXT)),
            PresentationState::Expired => View::EndGame(MessageView {
                display_name: player.clone(),
                text: EXPIRED_TEXT,
                notification: None,
            }),
        }
    }
}

/// What the display client should draw next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Game(GameView),
    Result(MessageView),
    EndGame(MessageView),
    Placeholder(PlaceholderView),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GameView {
    pub display_name: PlayerName,
    pub active_card: Rank,
    pub choice: Option<Guess>,
    pub score: u32,
    pub notification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageView {
    pub display_name: PlayerName,
    pub text: &'static str,
    pub notification: Option<String>,
}

/// Drawn when a player has no game on screen. Carries any notice the engine
/// sent while the player had no game, such as a full-capacity message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlaceholderView {
    pub display_name: Option<PlayerName>,
    pub notification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    pub display_name: PlayerName,
    pub stats: LifetimeStats,
    pub state: Option<PresentationState>,
    pub notification: Option<String>,
}

#[derive(Debug, Default)]
struct MirrorPlayer {
    game: Option<MirrorGame>,
    stats: LifetimeStats,
    /// Notification received while no game was mirrored.
    notice: Option<String>,
}

impl MirrorPlayer {
    fn notification(&self) -> Option<String> {
        match &self.game {
            Some(game) => game.notification.clone(),
            None => self.notice.clone(),
        }
    }

    fn placeholder(&self, player: &PlayerName) -> View {
        View::Placeholder(PlaceholderView {
            display_name: Some(player.clone()),
            notification: self.notice.clone(),
        })
    }

    fn game_mut(&mut self, player: &PlayerName) -> Result<&mut MirrorGame, MirrorError> {
        self.game
            .as_mut()
            .ok_or_else(|| MirrorError::NoGame(player.clone()))
    }
}

/// Players keyed by display name. The map lock is only held to find or
/// insert an entry; each player has its own lock for presentation changes.
#[derive(Default)]
pub struct MirrorRegistry {
    players: RwLock<BTreeMap<PlayerName, Arc<Mutex<MirrorPlayer>>>>,
}

impl MirrorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    async fn get(&self, player: &PlayerName) -> Result<Arc<Mutex<MirrorPlayer>>, MirrorError> {
        self.players
            .read()
            .await
            .get(player)
            .cloned()
            .ok_or_else(|| MirrorError::UnknownPlayer(player.clone()))
    }

    async fn get_or_create(&self, player: &PlayerName) -> Arc<Mutex<MirrorPlayer>> {
        if let Some(entry) = self.players.read().await.get(player) {
            return Arc::clone(entry);
        }
        let mut players = self.players.write().await;
        Arc::clone(players.entry(player.clone()).or_default())
    }

    /// Starts mirroring a new game. A previous game is only replaced once it
    /// has finished, whether or not the display has shown its end yet.
    pub async fn start_game(&self, form: NewGameForm) -> Result<(), MirrorError> {
        let name = PlayerName::new(form.display_name);
        let entry = self.get_or_create(&name).await;
        let mut player = entry.lock().await;
        if player.game.as_ref().is_some_and(|game| !game.is_finished()) {
            return Err(MirrorError::GameInProgress(name));
        }
        player.stats = LifetimeStats {
            games_played: form.num_games,
            games_won: form.num_wins,
            high_score: form.hi_score,
        };
        player.notice = None;
        player.game = Some(MirrorGame::new(form.active_card));
        Ok(())
    }

    pub async fn record_guess(&self, form: GameUpdateForm) -> Result<(), MirrorError> {
        let name = PlayerName::new(form.display_name);
        let entry = self.get(&name).await?;
        let mut player = entry.lock().await;
        let game = player.game_mut(&name)?;
        if game.is_finished() {
            return Err(MirrorError::GameFinished(name));
        }
        game.active_card = form.active_card;
        game.next_card = Some(form.next_card);
        game.choice = Some(form.user_choice);
        game.verdict = Some(form.verdict);
        game.score = form.score;
        game.state = PresentationState::DisplayingChoice;
        player.stats = LifetimeStats {
            games_played: form.num_games,
            games_won: form.num_wins,
            high_score: form.hi_score,
        };
        Ok(())
    }

    /// An empty text hides the notification banner. A player without a
    /// mirrored game keeps the text until their next game starts.
    pub async fn update_notification(&self, form: NotificationForm) {
        let name = PlayerName::new(form.display_name);
        let text = Some(form.notification_text).filter(|text| !text.is_empty());
        let entry = self.get_or_create(&name).await;
        let mut guard = entry.lock().await;
        let player = &mut *guard;
        match player.game.as_mut() {
            Some(game) => game.notification = text,
            None => player.notice = text,
        }
    }

    pub async fn expire(&self, name: &PlayerName) -> Result<(), MirrorError> {
        let entry = self.get(name).await?;
        let mut player = entry.lock().await;
        player.game_mut(name)?.state = PresentationState::Expired;
        Ok(())
    }

    /// Display poll: returns the view for the current presentation state and
    /// advances at most one step. Without a game, a pending notice is shown
    /// on the placeholder.
    pub async fn poll(&self, name: &PlayerName) -> Result<View, MirrorError> {
        let entry = self.get(name).await?;
        let mut player = entry.lock().await;
        if player.game.is_none() && player.notice.is_some() {
            return Ok(player.placeholder(name));
        }
        Ok(player.game_mut(name)?.advance(name))
    }

    /// Drops the player's mirrored game once the display has torn it down.
    pub async fn install_placeholder(&self, name: &PlayerName) -> Result<View, MirrorError> {
        let entry = self.get(name).await?;
        let mut player = entry.lock().await;
        player.game = None;
        Ok(player.placeholder(name))
    }

    /// Returns the first game the display has not picked up yet and marks it
    /// rendered, so each game is discovered once.
    pub async fn find_unrendered(&self) -> Option<View> {
        let players = self.players.read().await;
        for (name, entry) in players.iter() {
            let mut player = entry.lock().await;
            if let Some(game) = player.game.as_mut().filter(|game| !game.rendered) {
                game.rendered = true;
                return Some(View::Game(game.view(name)));
            }
        }
        None
    }

    pub async fn summaries(&self) -> Vec<PlayerSummary> {
        let players = self.players.read().await;
        let mut summaries = Vec::with_capacity(players.len());
        for (name, entry) in players.iter() {
            let player = entry.lock().await;
            summaries.push(PlayerSummary {
                display_name: name.clone(),
                stats: player.stats,
                state: player.game.as_ref().map(|game| game.state),
                notification: player.notification(),
            });
        }
        summaries
    }

    pub async fn game(&self, name: &PlayerName) -> Option<MirrorGame> {
        let entry = self.get(name).await.ok()?;
        let player = entry.lock().await;
        player.game.clone()
    }
}

#[cfg(test)]
#[path = "tests/presentation_tests.rs"]
mod tests;
