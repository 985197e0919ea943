/// Shared application state
///
/// Everything handlers need is injected here at startup; nothing is global.

use std::sync::Arc;

use crate::auth::SessionManager;
use crate::store::{ChirpStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub chirps: Arc<dyn ChirpStore>,
    pub sessions: SessionManager,
    /// Destructive admin operations are only allowed on the dev platform
    pub is_dev: bool,
    /// Shared secret the payment provider sends with webhooks
    pub polka_key: String,
}
