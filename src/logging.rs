//! Tracing subscriber initialization. Call once from `main`.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize global tracing based on `RUST_LOG` (defaults to `info`).
///
/// `AGENT_LOG_FORMAT=json` switches to structured JSON output, suitable for
/// log aggregation in production; the default human-readable format is used
/// otherwise.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_format = std::env::var("AGENT_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_format {
        let _ = fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(true)
            .try_init();
    } else {
        let _ = fmt().with_env_filter(filter).try_init();
    }
}
