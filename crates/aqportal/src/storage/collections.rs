//! Collection names and their files.

use std::fmt;

/// One of the five JSON collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Air quality records.
    AirQuality,
    /// Citizen profiles.
    Citizens,
    /// Pollutant reference table.
    Pollutants,
    /// Alerts.
    Alerts,
    /// Health guidelines.
    Guidelines,
}

impl Collection {
    /// Every collection, in the order they are created on disk.
    pub const ALL: [Collection; 5] = [
        Self::AirQuality,
        Self::Citizens,
        Self::Pollutants,
        Self::Alerts,
        Self::Guidelines,
    ];

    /// File name of the collection inside the data directory.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::AirQuality => "air_quality.json",
            Self::Citizens => "citizens.json",
            Self::Pollutants => "pollutants.json",
            Self::Alerts => "alerts.json",
            Self::Guidelines => "guidelines.json",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AirQuality => write!(f, "air"),
            Self::Citizens => write!(f, "citizens"),
            Self::Pollutants => write!(f, "pollutants"),
            Self::Alerts => write!(f, "alerts"),
            Self::Guidelines => write!(f, "guidelines"),
        }
    }
}
