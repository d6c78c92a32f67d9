use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::{BlockedDate, BlockedDateSet, MIN_NIGHTS};

/// Error type for loading a listing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid calendar configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("min_nights must be at least 1, found {0}")]
    InvalidMinNights(u32),
}

/// Listing configuration read from TOML.
///
/// ```toml
/// listing_url = "https://www.airbnb.com/rooms/your-listing-id"
/// min_nights = 2
///
/// [[blocked]]
/// date = "2025-06-10"
///
/// [[blocked]]
/// date = "2025-06-11"
/// kind = "blocked"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarConfig {
    /// Listing page on the booking platform that takes over once dates are chosen.
    pub listing_url: String,

    /// Shortest stay accepted, in nights.
    #[serde(default = "default_min_nights")]
    pub min_nights: u32,

    /// Unavailable days kept alongside the listing.
    #[serde(default)]
    pub blocked: Vec<BlockedDate>,
}

const fn default_min_nights() -> u32 {
    MIN_NIGHTS
}

impl CalendarConfig {
    /// Parses and validates a listing configuration.
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` for malformed TOML or dates and
    /// `ConfigError::InvalidMinNights` for a zero minimum stay.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        if config.min_nights < MIN_NIGHTS {
            return Err(ConfigError::InvalidMinNights(config.min_nights));
        }
        debug!(
            listing_url = %config.listing_url,
            min_nights = config.min_nights,
            n_blocked = config.blocked.len(),
            "Parsed calendar configuration",
        );
        Ok(config)
    }

    /// Reads a listing configuration from a file.
    ///
    /// # Errors
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`CalendarConfig::from_toml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// The `[[blocked]]` entries as a lookup set.
    pub fn blocked_dates(&self) -> BlockedDateSet {
        self.blocked.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlockKind;
    use crate::test_utils::date;

    const LISTING: &str = r#"
        listing_url = "https://www.airbnb.com/rooms/123"
        min_nights = 2

        [[blocked]]
        date = "2025-06-10"

        [[blocked]]
        date = "2025-06-11"
        kind = "blocked"
    "#;

    #[test]
    fn test_parse_full_config() {
        let config = CalendarConfig::from_toml_str(LISTING).expect("parse config");
        assert_eq!(config.listing_url, "https://www.airbnb.com/rooms/123");
        assert_eq!(config.min_nights, 2);

        let blocked = config.blocked_dates();
        assert_eq!(blocked.kind(&date(2025, 6, 10)), Some(BlockKind::Booked));
        assert_eq!(blocked.kind(&date(2025, 6, 11)), Some(BlockKind::Blocked));
    }

    #[test]
    fn test_defaults() {
        let config =
            CalendarConfig::from_toml_str(r#"listing_url = "https://example.com/rooms/1""#)
                .expect("parse minimal config");
        assert_eq!(config.min_nights, MIN_NIGHTS);
        assert!(config.blocked_dates().is_empty());
    }

    #[test]
    fn test_rejects_zero_min_nights() {
        let result = CalendarConfig::from_toml_str(
            r#"
            listing_url = "https://example.com/rooms/1"
            min_nights = 0
            "#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidMinNights(0))));
    }

    #[test]
    fn test_rejects_bad_dates_and_unknown_keys() {
        let bad_date = r#"
            listing_url = "https://example.com/rooms/1"
            [[blocked]]
            date = "2025-02-30"
        "#;
        assert!(matches!(
            CalendarConfig::from_toml_str(bad_date),
            Err(ConfigError::Parse(_))
        ));

        let unknown = r#"
            listing_url = "https://example.com/rooms/1"
            theme = "dark"
        "#;
        assert!(matches!(
            CalendarConfig::from_toml_str(unknown),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = CalendarConfig::from_path("/nonexistent/cabin-calendar.toml");
        let err = result.expect_err("reading a missing file must fail");
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/cabin-calendar.toml"));
    }
}
