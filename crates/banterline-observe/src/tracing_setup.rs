//! Tracing subscriber initialization.
//!
//! One structured `fmt` layer, filtered by directives. The binary maps
//! its verbosity flags to a directive string; `RUST_LOG` overrides it
//! when set.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global tracing subscriber.
///
/// - `default_directives` is used when `RUST_LOG` is unset
///   (e.g. `"warn"` or `"info,banterline=debug"`).
/// - `json` switches the fmt layer to newline-delimited JSON for log
///   shippers; otherwise output is human-readable.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(
    default_directives: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()?;
    }

    Ok(())
}
