use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the application.
///
/// `RUST_LOG` wins when it is set; otherwise `default_level` is used as the
/// filter for every target.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(normalize_level(default_level)));

    // try_init so tests can call this more than once without panicking
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn normalize_level(level: &str) -> &'static str {
    match level.to_lowercase().as_str() {
        "error" => "error",
        "warn" | "warning" => "warn",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    }
}

#[cfg(test)]
pub(crate) fn level_for(level: &str) -> &'static str {
    normalize_level(level)
}
