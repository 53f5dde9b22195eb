// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod categorize;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod monitor;
pub mod notify;
pub mod recorder;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::categorize::{BidCategory, CategoryTable};
pub use crate::monitor::{BidMonitor, RunReport};
pub use crate::store::{BidAlert, BidStore, InsertOutcome, NewBidAlert};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber. `RUST_LOG` sets the filter
/// (default `info`); `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}
