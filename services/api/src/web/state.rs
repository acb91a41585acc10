//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use foodshare_core::expiry::Clock;
use foodshare_core::ports::DatabaseService;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
///
/// The clock is injected so expiry math and transition timestamps are
/// deterministic under test.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub clock: Arc<dyn Clock>,
}
