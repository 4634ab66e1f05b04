#![forbid(unsafe_code)]

//! Tracing targets and optional subscriber setup.
//!
//! All crates in the workspace log through `tracing` under the targets below,
//! so a host can filter with e.g. `RUST_LOG=sortable.session=debug`.

/// State graph dispatch (transitions, dropped events).
pub const GRAPH_TARGET: &str = "sortable.graph";

/// Gesture classification.
pub const GESTURE_TARGET: &str = "sortable.gesture";

/// Drag session coordination and order mutations.
pub const SESSION_TARGET: &str = "sortable.session";

/// Install a global JSON subscriber filtered by `RUST_LOG`.
///
/// Falls back to `info` when `RUST_LOG` is unset or invalid. Returns an error
/// if a global subscriber is already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber() -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_target(true))
        .try_init()
}
