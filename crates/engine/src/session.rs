use std::{collections::HashMap, sync::Arc};

use shared::domain::{GameId, LifetimeStats, PlayerName, Rank};
use tokio::sync::{Mutex, MutexGuard, OwnedSemaphorePermit, RwLock, Semaphore};

use crate::{game::Game, timer::Timer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Admission {
    #[default]
    Idle,
    Busy,
}

/// Everything guarded by a session's lock.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) game: Option<Game>,
    pub(crate) stats: LifetimeStats,
    pub(crate) admission: Admission,
    pub(crate) notice: Timer,
    pub(crate) notice_generation: u64,
    pub(crate) notice_shown: bool,
}

/// Durable per-player record, created on first contact and kept for the
/// life of the process.
#[derive(Debug)]
pub struct PlayerSession {
    name: PlayerName,
    state: Mutex<SessionState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSnapshot {
    pub id: GameId,
    pub active_card: Rank,
    pub score: u32,
    pub inactivity_armed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub name: PlayerName,
    pub stats: LifetimeStats,
    pub admission: Admission,
    pub game: Option<GameSnapshot>,
}

impl PlayerSession {
    fn new(name: PlayerName) -> Self {
        Self {
            name,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn name(&self) -> &PlayerName {
        &self.name
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            name: self.name.clone(),
            stats: state.stats,
            admission: state.admission,
            game: state.game.as_ref().map(|game| GameSnapshot {
                id: game.id(),
                active_card: game.active_card(),
                score: game.score(),
                inactivity_armed: game.inactivity_armed(),
            }),
        }
    }
}

/// Identity to session map plus the pool of active-game slots.
///
/// The map lock is only held to look up or insert an entry; game logic runs
/// under the per-session lock afterwards.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<PlayerName, Arc<PlayerSession>>>,
    slots: Arc<Semaphore>,
    max_active_games: usize,
}

impl SessionRegistry {
    pub fn new(max_active_games: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            slots: Arc::new(Semaphore::new(max_active_games)),
            max_active_games,
        }
    }

    pub async fn get(&self, name: &PlayerName) -> Option<Arc<PlayerSession>> {
        self.sessions.read().await.get(name).cloned()
    }

    pub async fn get_or_create(&self, name: &PlayerName) -> Arc<PlayerSession> {
        if let Some(session) = self.get(name).await {
            return session;
        }
        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(name.clone())
                .or_insert_with(|| Arc::new(PlayerSession::new(name.clone()))),
        )
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Reserves one active-game slot, or `None` when the cap is reached.
    pub(crate) fn try_reserve_slot(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.slots).try_acquire_owned().ok()
    }

    pub fn max_active_games(&self) -> usize {
        self.max_active_games
    }

    pub fn active_games(&self) -> usize {
        self.max_active_games - self.slots.available_permits()
    }
}
