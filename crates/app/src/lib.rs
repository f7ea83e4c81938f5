//! Caucus application services
//!
//! The service layer over `caucus-core`: administrator accounts, room
//! management, ballot and review collection, the results reader, the
//! conflict resolution cycle, the finalizer, and term publishing. A UI or
//! HTTP surface is expected to sit on top of these functions.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod auth;
pub mod collector;
pub mod finalize;
pub mod resolutions;
pub mod results;
pub mod rooms;
pub mod settings;
pub mod state;
pub mod terms;

pub use resolutions::ActionOutcome;
pub use settings::Settings;
pub use state::{AppState, Notification};

/// Initialize logging from the environment (`RUST_LOG`)
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
