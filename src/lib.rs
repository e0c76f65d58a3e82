// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod cursor;
pub mod delivery;
pub mod error;
pub mod ingest;
pub mod notify;
pub mod poller;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::delivery::{plan_delivery, DeliveryPlan};
pub use crate::ingest::types::{ExtractorKind, Item, SourceDescriptor};
pub use crate::notify::{Notifier, NotifierMux};
pub use crate::poller::{CycleReport, Poller};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber. `RUST_LOG` wins over `debug`.
pub fn init_tracing(debug: bool) {
    let default = if debug {
        "listing_watch=debug,ingest=debug,poller=debug,notify=debug,warn"
    } else {
        "listing_watch=info,ingest=info,poller=info,notify=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
