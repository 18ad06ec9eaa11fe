use std::{sync::Arc, time::Duration};

use shared::{domain::GameId, protocol::GameEvent};
use tracing::{debug, info};

use crate::{emitter::EventSink, game::Game, session::PlayerSession};

/// Arms (or re-arms) the expiration timer of `game`, which must be the game
/// currently held by `session`.
pub(crate) fn arm(
    game: &mut Game,
    session: &Arc<PlayerSession>,
    sink: &Arc<dyn EventSink>,
    timeout: Duration,
) {
    let game_id = game.id();
    let session = Arc::clone(session);
    let sink = Arc::clone(sink);
    game.arm_inactivity(timeout, async move {
        expire(&session, game_id, sink.as_ref()).await;
    });
}

/// Clears the session's game if it is still `game_id`. Returns whether a game
/// was expired; a stale or repeated firing is a no-op.
pub(crate) async fn expire(session: &PlayerSession, game_id: GameId, sink: &dyn EventSink) -> bool {
    let mut state = session.lock().await;
    if state.game.as_ref().map(Game::id) != Some(game_id) {
        debug!(player = %session.name(), game_id = game_id.0, "stale inactivity timer ignored");
        return false;
    }
    if let Some(mut game) = state.game.take() {
        game.disarm_inactivity();
    }
    info!(player = %session.name(), game_id = game_id.0, "game expired after inactivity");
    sink.emit(GameEvent::GameExpired {
        player: session.name().clone(),
    });
    true
}
