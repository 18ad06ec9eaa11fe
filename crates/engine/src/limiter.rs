use std::{future::Future, sync::Arc, time::Duration};

use shared::protocol::GameEvent;
use tracing::debug;

use crate::{
    emitter::EventSink,
    session::{Admission, PlayerSession},
};

/// Per-player admission control: at most one command in flight per player,
/// and anything arriving while busy is dropped.
pub struct RateLimiter {
    cooldown: Duration,
    notice_delay: Duration,
    notice_text: String,
    sink: Arc<dyn EventSink>,
}

impl RateLimiter {
    pub fn new(
        cooldown: Duration,
        notice_delay: Duration,
        notice_text: impl Into<String>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            cooldown,
            notice_delay,
            notice_text: notice_text.into(),
            sink,
        }
    }

    /// Runs `work` if the player is idle, then holds them busy for the
    /// cooldown. Returns `false` when the message was suppressed.
    pub async fn run<F, Fut>(&self, session: &Arc<PlayerSession>, work: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        if !self.admit(session).await {
            return false;
        }
        work().await;
        tokio::time::sleep(self.cooldown).await;
        self.release(session).await;
        true
    }

    async fn admit(&self, session: &Arc<PlayerSession>) -> bool {
        let mut state = session.lock().await;
        if state.admission == Admission::Idle {
            state.admission = Admission::Busy;
            return true;
        }

        debug!(player = %session.name(), "message suppressed while busy");
        state.notice_generation += 1;
        let generation = state.notice_generation;
        let session = Arc::clone(session);
        let sink = Arc::clone(&self.sink);
        let text = self.notice_text.clone();
        state.notice.arm(self.notice_delay, async move {
            show_slow_down(session, generation, sink, text).await;
        });
        false
    }

    async fn release(&self, session: &PlayerSession) {
        let mut state = session.lock().await;
        state.admission = Admission::Idle;
        state.notice.cancel();
        state.notice_generation += 1;
        if state.notice_shown {
            state.notice_shown = false;
            self.sink.emit(GameEvent::NotificationUpdate {
                player: session.name().clone(),
                text: String::new(),
            });
        }
    }
}

async fn show_slow_down(
    session: Arc<PlayerSession>,
    generation: u64,
    sink: Arc<dyn EventSink>,
    text: String,
) {
    let mut state = session.lock().await;
    if state.notice_generation != generation {
        debug!(player = %session.name(), "stale slow-down timer ignored");
        return;
    }
    state.notice.disarm();
    state.notice_shown = true;
    sink.emit(GameEvent::NotificationUpdate {
        player: session.name().clone(),
        text,
    });
}
