pub mod achievements;
pub mod analytics;
pub mod auth;
pub mod donations;
pub mod food;
pub mod middleware;
pub mod rest;
pub mod state;

// Re-export the router and spec so the binaries can build the web server.
pub use middleware::require_auth;
pub use rest::{router, ApiDoc};
