//! Authoritative high-low game engine.
//!
//! Chat messages come in through [`Engine::handle_message`]; each player's
//! state lives in a [`PlayerSession`] behind its own lock, and every state
//! transition is reported to the render mirror through an [`EventSink`].

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use shared::{
    domain::{GameId, Guess, PlayerName},
    protocol::GameEvent,
};
use tracing::{debug, info, warn};

pub mod command;
pub mod config;
pub mod deck;
pub mod emitter;
pub mod game;
mod inactivity;
pub mod limiter;
pub mod session;
mod timer;

pub use command::{Command, CommandTokens};
pub use config::EngineConfig;
pub use deck::{Deck, DeckDealer, DeckError, ShuffledDealer};
pub use emitter::{DeliveryError, EventSink, HttpEmitter};
pub use limiter::RateLimiter;
pub use session::{Admission, GameSnapshot, PlayerSession, SessionRegistry, SessionSnapshot};

/// What happened to one inbound chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Not a command, or a shutdown token from someone other than the admin.
    Ignored,
    /// Dropped by the rate limiter.
    Suppressed,
    Processed,
    /// The admin asked for shutdown; the caller owns the actual teardown.
    Shutdown,
}

pub struct Engine {
    config: EngineConfig,
    registry: SessionRegistry,
    limiter: RateLimiter,
    dealer: Arc<dyn DeckDealer>,
    sink: Arc<dyn EventSink>,
    next_game_id: AtomicU64,
}

impl Engine {
    pub fn new(config: EngineConfig, sink: Arc<dyn EventSink>) -> Arc<Self> {
        Self::with_dealer(config, sink, Arc::new(ShuffledDealer))
    }

    pub fn with_dealer(
        config: EngineConfig,
        sink: Arc<dyn EventSink>,
        dealer: Arc<dyn DeckDealer>,
    ) -> Arc<Self> {
        let limiter = RateLimiter::new(
            config.cooldown,
            config.notice_delay,
            config.slow_down_text.clone(),
            Arc::clone(&sink),
        );
        Arc::new(Self {
            registry: SessionRegistry::new(config.max_active_games),
            limiter,
            dealer,
            sink,
            next_game_id: AtomicU64::new(1),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn parse(&self, text: &str) -> Option<Command> {
        self.config.tokens.parse(text)
    }

    /// Handles one chat message end to end, including the cooldown that
    /// follows an admitted command.
    pub async fn handle_message(self: &Arc<Self>, display_name: &str, text: &str) -> Disposition {
        match self.parse(text) {
            Some(command) => self.dispatch(PlayerName::new(display_name), command).await,
            None => Disposition::Ignored,
        }
    }

    pub async fn dispatch(self: &Arc<Self>, player: PlayerName, command: Command) -> Disposition {
        let guess = match command {
            Command::Shutdown => return self.authorize_shutdown(&player),
            Command::Join => None,
            Command::Guess(guess) => Some(guess),
        };

        let session = self.registry.get_or_create(&player).await;
        let admitted = self
            .limiter
            .run(&session, || async {
                match guess {
                    None => self.join(&session).await,
                    Some(guess) => self.guess(&session, guess).await,
                }
            })
            .await;

        if admitted {
            Disposition::Processed
        } else {
            Disposition::Suppressed
        }
    }

    fn authorize_shutdown(&self, player: &PlayerName) -> Disposition {
        if self.config.admin.as_deref() == Some(player.as_str()) {
            info!(player = %player, "shutdown requested");
            Disposition::Shutdown
        } else {
            warn!(player = %player, "shutdown token from non-admin ignored");
            Disposition::Ignored
        }
    }

    async fn join(&self, session: &Arc<PlayerSession>) {
        let player = session.name();
        let mut guard = session.lock().await;
        let state = &mut *guard;
        if state.game.is_some() {
            debug!(player = %player, "join ignored; game already active");
            return;
        }

        let Some(slot) = self.registry.try_reserve_slot() else {
            warn!(
                player = %player,
                max_active_games = self.registry.max_active_games(),
                "active game cap reached; join rejected"
            );
            self.sink.emit(GameEvent::NotificationUpdate {
                player: player.clone(),
                text: self.config.capacity_text.clone(),
            });
            return;
        };

        let id = GameId(self.next_game_id.fetch_add(1, Ordering::Relaxed));
        let mut game = game::Game::new(id, player.clone(), self.dealer.deal(), slot);
        inactivity::arm(&mut game, session, &self.sink, self.config.inactivity_timeout);
        let active_card = game.active_card();
        state.game = Some(game);

        info!(player = %player, game_id = id.0, active_card, "game started");
        self.sink.emit(GameEvent::NewGame {
            player: player.clone(),
            active_card,
            stats: state.stats,
        });
    }

    async fn guess(&self, session: &Arc<PlayerSession>, guess: Guess) {
        let player = session.name();
        let mut guard = session.lock().await;
        let state = &mut *guard;
        let Some(game) = state.game.as_mut() else {
            debug!(player = %player, "guess without active game ignored");
            return;
        };

        game.cancel_inactivity();
        let Some(turn) = game.resolve(guess) else {
            return;
        };

        if turn.verdict.ends_game() {
            state.game = None;
            game::record_result(&mut state.stats, &turn);
            info!(
                player = %player,
                verdict = turn.verdict.as_str(),
                score = turn.score,
                "game finished"
            );
        } else if let Some(game) = state.game.as_mut() {
            inactivity::arm(game, session, &self.sink, self.config.inactivity_timeout);
        }

        self.sink.emit(GameEvent::GameUpdate {
            player: player.clone(),
            active_card: turn.active_card,
            guess: turn.guess,
            verdict: turn.verdict,
            next_card: turn.next_card,
            score: turn.score,
            stats: state.stats,
        });
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
