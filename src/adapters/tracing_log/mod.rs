// Tracing log adapter - Subscriber setup for structured logging

use tracing_subscriber::EnvFilter;

use crate::domain::errors::*;

/// Install the global subscriber
///
/// `RUST_LOG` wins over `level`. Calling this more than once is harmless;
/// later calls leave the first subscriber in place.
pub fn init(level: &str, json: bool) -> Result<(), DomainError> {
    let filter = build_filter(level, std::env::var("RUST_LOG").ok().as_deref())?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let _ = if json {
        builder.json().with_current_span(false).try_init()
    } else {
        builder.compact().try_init()
    };

    Ok(())
}

/// Filter from an explicit directive string, falling back to the configured level
pub fn build_filter(level: &str, directives: Option<&str>) -> Result<EnvFilter, DomainError> {
    match directives.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| DomainError::Config(format!("Invalid RUST_LOG '{}': {}", directives, e))),
        None => EnvFilter::try_new(level.to_lowercase())
            .map_err(|e| DomainError::Config(format!("Invalid log level '{}': {}", level, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_uses_level() {
        let filter = build_filter("DEBUG", None).unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn test_build_filter_prefers_directives() {
        let filter = build_filter("info", Some("reelcraft=trace")).unwrap();
        assert_eq!(filter.to_string(), "reelcraft=trace");
    }

    #[test]
    fn test_build_filter_blank_directives_ignored() {
        let filter = build_filter("warn", Some("  ")).unwrap();
        assert_eq!(filter.to_string(), "warn");
    }
}
