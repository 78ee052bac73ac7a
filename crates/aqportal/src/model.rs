//! Record types for aqportal.
//!
//! Five independent flat collections live on disk: air quality records,
//! citizens, pollutants, alerts and guidelines. Every record type keeps the
//! JSON keys of the collection files (`record_id`, `AQI`, `AQI_level`, ...)
//! and coerces every field leniently, so hand-edited or imported files
//! with `"AQI": "150"`, `"location": null` or `"status": "Active"`
//! still load.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::storage::Collection;

/// A record stored in one of the JSON collections.
pub trait Record: Serialize + for<'de> Deserialize<'de> + Clone {
    /// The collection this record type is persisted in.
    const COLLECTION: Collection;

    /// The record identifier, unique within its collection.
    fn id(&self) -> &str;
}

/// Generate a fresh identifier such as `rec_1a2b3c4d`.
#[must_use]
pub fn generate_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &hex[..8])
}

/// Today's local date as `YYYY-MM-DD`.
#[must_use]
pub fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Normalize a free-text region name for matching.
#[must_use]
pub fn region_key(region: &str) -> String {
    region.trim().to_lowercase()
}

/// Whether two free-text region names refer to the same region.
#[must_use]
pub fn same_region(a: &str, b: &str) -> bool {
    region_key(a) == region_key(b)
}

/// Parse a number the way the console and CSV import do: trimmed, and 0.0
/// when it does not parse.
#[must_use]
pub fn parse_number(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parse a whole number such as an AQI or an age, truncating fractions and
/// clamping negatives to 0.
#[must_use]
pub fn parse_whole(input: &str) -> u32 {
    aqi_from_f64(parse_number(input))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn aqi_from_f64(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.trunc().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

fn number_from_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_number(s),
        _ => 0.0,
    }
}

fn lenient_whole<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(aqi_from_f64(number_from_value(&value)))
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

fn lenient_levels<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<IndexMap<String, f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let Value::Object(map) = value else {
        return Ok(IndexMap::new());
    };
    Ok(map
        .iter()
        .map(|(name, level)| (name.clone(), number_from_value(level)))
        .collect())
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// `withdrawn` in any case is withdrawn; anything else counts as active.
fn lenient_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AlertStatus, D::Error> {
    let text = lenient_text(deserializer)?;
    Ok(if text.trim().eq_ignore_ascii_case("withdrawn") {
        AlertStatus::Withdrawn
    } else {
        AlertStatus::Active
    })
}

/// One dated air-quality observation for a region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirQualityRecord {
    /// Unique identifier (`rec_...`).
    #[serde(deserialize_with = "lenient_text")]
    pub record_id: String,
    /// Free-text region or city name.
    #[serde(deserialize_with = "lenient_text")]
    pub region: String,
    /// Observation date, normally `YYYY-MM-DD`.
    #[serde(deserialize_with = "lenient_text")]
    pub date: String,
    /// Air Quality Index.
    #[serde(rename = "AQI", deserialize_with = "lenient_whole")]
    pub aqi: u32,
    /// Pollutant name to measured level, in entry order.
    #[serde(deserialize_with = "lenient_levels")]
    pub pollutants: IndexMap<String, f64>,
    /// Free-text health risk note.
    #[serde(deserialize_with = "lenient_text")]
    pub health_risk: String,
}

impl AirQualityRecord {
    /// Create a record with a freshly generated id.
    #[must_use]
    pub fn new(
        region: impl Into<String>,
        date: impl Into<String>,
        aqi: u32,
        pollutants: IndexMap<String, f64>,
        health_risk: impl Into<String>,
    ) -> Self {
        Self {
            record_id: generate_id("rec"),
            region: region.into(),
            date: date.into(),
            aqi,
            pollutants,
            health_risk: health_risk.into(),
        }
    }

    /// Pollutant levels as `PM2.5: 12.5, NO2: 30` for table cells.
    #[must_use]
    pub fn pollutant_summary(&self) -> String {
        self.pollutants
            .iter()
            .map(|(name, level)| format!("{name}: {level}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Record for AirQualityRecord {
    const COLLECTION: Collection = Collection::AirQuality;

    fn id(&self) -> &str {
        &self.record_id
    }
}

/// A pollutant definition from the reference table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pollutant {
    /// Unique identifier (`pol_...`).
    #[serde(deserialize_with = "lenient_text")]
    pub pollutant_id: String,
    /// Short name such as `PM2.5`.
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    /// Description including the unit.
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    /// Safe exposure limit.
    #[serde(deserialize_with = "lenient_number")]
    pub safe_limit: f64,
}

impl Pollutant {
    /// Create a pollutant with a freshly generated id.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, safe_limit: f64) -> Self {
        Self {
            pollutant_id: generate_id("pol"),
            name: name.into(),
            description: description.into(),
            safe_limit,
        }
    }
}

impl Record for Pollutant {
    const COLLECTION: Collection = Collection::Pollutants;

    fn id(&self) -> &str {
        &self.pollutant_id
    }
}

/// A registered citizen profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Citizen {
    /// Unique identifier (`cit_...`), also the login.
    #[serde(deserialize_with = "lenient_text")]
    pub citizen_id: String,
    /// Display name.
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    /// Age in years; 0 when unknown.
    #[serde(deserialize_with = "lenient_whole")]
    pub age: u32,
    /// Home region, matched against record regions.
    #[serde(deserialize_with = "lenient_text")]
    pub location: String,
    /// Email or phone.
    #[serde(deserialize_with = "lenient_text")]
    pub contact: String,
}

impl Citizen {
    /// Create a citizen with a freshly generated id.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        age: u32,
        location: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            citizen_id: generate_id("cit"),
            name: name.into(),
            age,
            location: location.into(),
            contact: contact.into(),
        }
    }
}

impl Record for Citizen {
    const COLLECTION: Collection = Collection::Citizens;

    fn id(&self) -> &str {
        &self.citizen_id
    }
}

/// Lifecycle state of an alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// In force.
    #[default]
    Active,
    /// Withdrawn by an administrator. Terminal.
    Withdrawn,
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Withdrawn => write!(f, "withdrawn"),
        }
    }
}

/// A region-scoped advisory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alert {
    /// Unique identifier (`alert_...`).
    #[serde(deserialize_with = "lenient_text")]
    pub alert_id: String,
    /// Free-text region name.
    #[serde(deserialize_with = "lenient_text")]
    pub region: String,
    /// Advisory level, e.g. `Hazardous` or an AQI figure.
    #[serde(rename = "AQI_level", deserialize_with = "lenient_text")]
    pub aqi_level: String,
    /// Current status.
    #[serde(deserialize_with = "lenient_status")]
    pub status: AlertStatus,
    /// Issue date (`YYYY-MM-DD`).
    #[serde(deserialize_with = "lenient_text")]
    pub issue_date: String,
    /// Expiry date, empty when open-ended.
    #[serde(deserialize_with = "lenient_text")]
    pub expiry_date: String,
}

impl Alert {
    /// Issue a new active alert.
    #[must_use]
    pub fn issue(
        region: impl Into<String>,
        aqi_level: impl Into<String>,
        issue_date: impl Into<String>,
        expiry_date: impl Into<String>,
    ) -> Self {
        Self {
            alert_id: generate_id("alert"),
            region: region.into(),
            aqi_level: aqi_level.into(),
            status: AlertStatus::Active,
            issue_date: issue_date.into(),
            expiry_date: expiry_date.into(),
        }
    }

    /// Whether the alert is in force.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }

    /// Move the alert to `withdrawn`.
    ///
    /// Returns `false` when it was already withdrawn.
    pub fn withdraw(&mut self) -> bool {
        if self.is_active() {
            self.status = AlertStatus::Withdrawn;
            true
        } else {
            false
        }
    }
}

impl Record for Alert {
    const COLLECTION: Collection = Collection::Alerts;

    fn id(&self) -> &str {
        &self.alert_id
    }
}

/// Static advisory text for an AQI band.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Guideline {
    /// Identifier such as `g1`.
    #[serde(deserialize_with = "lenient_text")]
    pub guide_id: String,
    /// Inclusive band, e.g. `51-100`.
    #[serde(rename = "AQI_range", deserialize_with = "lenient_text")]
    pub aqi_range: String,
    /// Advice for the band.
    #[serde(deserialize_with = "lenient_text")]
    pub precautions: String,
}

impl Guideline {
    /// Inclusive bounds of `aqi_range`, if it parses as `low-high`.
    #[must_use]
    pub fn bounds(&self) -> Option<(u32, u32)> {
        let (low, high) = self.aqi_range.split_once('-')?;
        let low = low.trim().parse().ok()?;
        let high = high.trim().parse().ok()?;
        (low <= high).then_some((low, high))
    }

    /// Whether `aqi` falls inside this band.
    #[must_use]
    pub fn covers(&self, aqi: u32) -> bool {
        self.bounds()
            .is_some_and(|(low, high)| (low..=high).contains(&aqi))
    }
}

impl Record for Guideline {
    const COLLECTION: Collection = Collection::Guidelines;

    fn id(&self) -> &str {
        &self.guide_id
    }
}
