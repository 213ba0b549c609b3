//! Diagnostic output
//!
//! Library code only emits `tracing` events. Hosts that do not install their
//! own subscriber can call [`init`] once at startup.

use tracing_subscriber::EnvFilter;

use crate::config::Settings;

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV: &str = "PROPSLENS_LOG";

/// Filter directive used when `PROPSLENS_LOG` is unset
pub fn default_directive(settings: &Settings) -> &'static str {
    if settings.debug { "propslens=debug" } else { "warn" }
}

/// Install a stderr `fmt` subscriber. Returns false when a global subscriber
/// was already set, which is not an error.
pub fn init(settings: &Settings) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(settings)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_setting_raises_level() {
        let mut settings = Settings::default();
        assert_eq!(default_directive(&settings), "warn");
        settings.debug = true;
        assert_eq!(default_directive(&settings), "propslens=debug");
    }

    #[test]
    fn init_is_idempotent() {
        let settings = Settings::default();
        let _ = init(&settings);
        assert!(!init(&settings));
    }
}
