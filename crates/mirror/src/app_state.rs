use std::sync::Arc;

use tokio::sync::Notify;

use crate::presentation::MirrorRegistry;

#[derive(Clone, Default)]
pub(crate) struct AppState {
    pub(crate) mirror: Arc<MirrorRegistry>,
    /// Signalled by `POST /shut-down`; the server drains and exits.
    pub(crate) shutdown: Arc<Notify>,
}
