use std::path::{Path, PathBuf};

use crate::{BlockedDateSet, CalendarConfig, CalendarDate, ConfigError};

/// Why a calendar source could not produce its blocked days.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The listing file could not be read or parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The source has no data to offer.
    #[error("Calendar source unavailable: {0}")]
    Unavailable(String),
}

/// Where the unavailable days come from.
///
/// The engine only needs an enumerable set of days before it trusts any
/// query. A live calendar sync would implement this trait; the sources in
/// this crate cover a fixed list and a TOML listing file.
pub trait CalendarSource {
    /// Fetches the full set of unavailable days.
    ///
    /// # Errors
    /// Returns `SourceError` if the set could not be produced. Callers do not
    /// retry; a failed fetch leaves the engine fail-closed.
    fn fetch(&self) -> Result<BlockedDateSet, SourceError>;
}

/// A set known up front.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    blocked: BlockedDateSet,
}

impl StaticSource {
    /// Serves `blocked` on every fetch.
    pub const fn new(blocked: BlockedDateSet) -> Self {
        Self { blocked }
    }

    /// The placeholder reservations the booking page shipped with while the
    /// live calendar sync was pending.
    ///
    /// # Errors
    /// Never fails in practice; the dates are fixed and valid.
    pub fn demo() -> Result<Self, SourceError> {
        const DAYS: [(u16, u8, u8); 10] = [
            (2025, 6, 10),
            (2025, 6, 11),
            (2025, 6, 15),
            (2025, 6, 16),
            (2025, 6, 20),
            (2025, 6, 21),
            (2025, 6, 25),
            (2025, 6, 26),
            (2025, 7, 4),
            (2025, 7, 5),
        ];

        let blocked = DAYS
            .iter()
            .map(|&(year, month, day)| CalendarDate::new(year, month, day))
            .collect::<Result<BlockedDateSet, _>>()
            .map_err(|err| SourceError::Unavailable(err.to_string()))?;
        Ok(Self::new(blocked))
    }
}

impl CalendarSource for StaticSource {
    fn fetch(&self) -> Result<BlockedDateSet, SourceError> {
        Ok(self.blocked.clone())
    }
}

/// The `[[blocked]]` entries of a listing configuration.
#[derive(Debug, Clone)]
pub enum TomlSource {
    /// Configuration text held in memory.
    Text(String),
    /// A configuration file read on every fetch.
    File(PathBuf),
}

impl TomlSource {
    /// Reads the entries from configuration text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Reads the entries from a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

impl CalendarSource for TomlSource {
    fn fetch(&self) -> Result<BlockedDateSet, SourceError> {
        let config = match self {
            Self::Text(text) => CalendarConfig::from_toml_str(text)?,
            Self::File(path) => CalendarConfig::from_path(path)?,
        };
        Ok(config.blocked_dates())
    }
}

impl<S: CalendarSource + ?Sized> CalendarSource for &S {
    fn fetch(&self) -> Result<BlockedDateSet, SourceError> {
        (**self).fetch()
    }
}
