//! Structured logging setup for the control plane process.
//!
//! Builds a `tracing-subscriber` filter from [`crate::config::LoggingConfig`]
//! and installs it as the global default. Every reconcile span emitted by
//! `crate::reconcile::dispatcher` flows through whichever format this picks.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// Builds the `tracing_subscriber::EnvFilter` directive string from a
/// [`LoggingConfig`]: the base level, plus one `target=level` directive per
/// entry in `component_levels`, e.g. `"info,aigw_control_plane::rotation=debug"`.
pub fn build_filter_directives(config: &LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        for (component, level) in component_levels {
            filter_str.push_str(&format!(",aigw_control_plane::{}={}", component, level));
        }
    }

    filter_str
}

/// Installs the global `tracing` subscriber. Call once, at process startup.
pub fn init(config: &LoggingConfig) {
    let directives = build_filter_directives(config);
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"));

    match config.format {
        LogFormat::Json => {
            fmt().with_env_filter(filter).json().init();
        }
        LogFormat::Pretty => {
            fmt().with_env_filter(filter).init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn base_level_only() {
        let config = LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            component_levels: None,
        };
        assert_eq!(build_filter_directives(&config), "info");
    }

    #[test]
    fn appends_component_directives() {
        let mut component_levels = HashMap::new();
        component_levels.insert("rotation".to_string(), "debug".to_string());

        let config = LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            component_levels: Some(component_levels),
        };

        assert_eq!(
            build_filter_directives(&config),
            "info,aigw_control_plane::rotation=debug"
        );
    }
}
