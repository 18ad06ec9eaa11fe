use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use reqwest::{Client, StatusCode};
use shared::{
    domain::PlayerName,
    protocol::{shut_down_route, GameEvent},
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use url::Url;

/// Outbound channel from the engine to the render mirror.
///
/// `emit` is a non-blocking enqueue. The engine calls it while still holding
/// the player's session lock so that a player's events keep generation order.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: GameEvent);
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid mirror url: {0}")]
    Url(#[from] url::ParseError),
    #[error("request to {route} failed: {source}")]
    Transport {
        route: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("mirror rejected {route} with status {status}")]
    Rejected {
        route: &'static str,
        status: StatusCode,
    },
}

struct MirrorTransport {
    http: Client,
    base_url: Url,
}

impl MirrorTransport {
    async fn post_event(&self, event: GameEvent) -> Result<(), DeliveryError> {
        let route = event.route();
        let url = self.base_url.join(route)?;
        let response = self
            .http
            .post(url)
            .form(&event.into_form())
            .send()
            .await
            .map_err(|source| DeliveryError::Transport { route, source })?;
        check_status(route, response.status())
    }
}

fn check_status(route: &'static str, status: StatusCode) -> Result<(), DeliveryError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(DeliveryError::Rejected { route, status })
    }
}

/// Posts events to the mirror over HTTP.
///
/// Each player gets a delivery lane: an unbounded queue drained by its own
/// task, so one player's events arrive in order while different players are
/// delivered in parallel. Delivery is drop-and-continue: a failed request is
/// logged and the event discarded, never retried.
pub struct HttpEmitter {
    transport: Arc<MirrorTransport>,
    lanes: Mutex<HashMap<PlayerName, mpsc::UnboundedSender<GameEvent>>>,
}

impl HttpEmitter {
    pub fn new(base_url: Url, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            transport: Arc::new(MirrorTransport { http, base_url }),
            lanes: Mutex::new(HashMap::new()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.transport.base_url
    }

    /// Asks the mirror to shut down and waits for its answer.
    pub async fn request_shutdown(&self) -> Result<(), DeliveryError> {
        let route = shut_down_route();
        let url = self.transport.base_url.join(route)?;
        let response = self
            .transport
            .http
            .post(url)
            .send()
            .await
            .map_err(|source| DeliveryError::Transport { route, source })?;
        check_status(route, response.status())
    }

    fn open_lane(&self, player: &PlayerName) -> mpsc::UnboundedSender<GameEvent> {
        let (tx, mut rx) = mpsc::unbounded_channel::<GameEvent>();
        let transport = Arc::clone(&self.transport);
        let player = player.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let route = event.route();
                match transport.post_event(event).await {
                    Ok(()) => debug!(player = %player, route, "mirror event delivered"),
                    Err(error) => warn!(
                        player = %player,
                        route,
                        %error,
                        "mirror delivery failed; dropping event"
                    ),
                }
            }
        });
        tx
    }
}

impl EventSink for HttpEmitter {
    fn emit(&self, event: GameEvent) {
        let mut lanes = self.lanes.lock().unwrap_or_else(PoisonError::into_inner);
        let player = event.player().clone();
        let event = match lanes.get(&player) {
            Some(lane) => match lane.send(event) {
                Ok(()) => return,
                Err(mpsc::error::SendError(event)) => event,
            },
            None => event,
        };
        let lane = self.open_lane(&player);
        if lane.send(event).is_err() {
            warn!(player = %player, "mirror lane closed immediately; dropping event");
        }
        lanes.insert(player, lane);
    }
}

#[cfg(test)]
#[path = "tests/emitter_tests.rs"]
mod tests;
