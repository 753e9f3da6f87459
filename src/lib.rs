pub mod config;
pub mod escalation;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod vonage;

// Re-export commonly used items for convenience
pub use config::ServerConfig;
pub use escalation::{EscalationError, EscalationScheduler, PendingConnectionRegistry};
pub use state::AppState;
