//! Sample dataset for a fresh data directory.
//!
//! Six pollutants, five guideline bands, two citizens, two alerts and
//! fifteen days (2025-01-01 to 2025-01-15) of readings for twenty Indian
//! cities. Readings come from a seeded ChaCha8 stream, so a given seed
//! produces the same AQI values and pollutant levels on every platform and
//! release.

use chrono::NaiveDate;
use indexmap::IndexMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::error::Result;
use crate::model::{
    AirQualityRecord, Alert, AlertStatus, Citizen, Guideline, Pollutant, generate_id,
};
use crate::report::round1;
use crate::storage::Store;

/// Cities covered by the sample readings.
pub const SAMPLE_CITIES: [&str; 20] = [
    "Delhi",
    "Mumbai",
    "Kolkata",
    "Chennai",
    "Bengaluru",
    "Hyderabad",
    "Ahmedabad",
    "Pune",
    "Lucknow",
    "Jaipur",
    "Bhopal",
    "Visakhapatnam",
    "Surat",
    "Kanpur",
    "Nagpur",
    "Indore",
    "Thane",
    "Agra",
    "Vadodara",
    "Nashik",
];

/// Days of January 2025 covered by the sample readings.
const SAMPLE_DAYS: u32 = 15;

/// Everything written by [`create_sample_data`].
#[derive(Debug, Clone, PartialEq)]
pub struct SampleData {
    /// Pollutant reference table.
    pub pollutants: Vec<Pollutant>,
    /// Guideline bands.
    pub guidelines: Vec<Guideline>,
    /// Demo citizens.
    pub citizens: Vec<Citizen>,
    /// Daily readings.
    pub air_quality: Vec<AirQualityRecord>,
    /// Demo alerts.
    pub alerts: Vec<Alert>,
}

fn pollutant(id: &str, name: &str, description: &str, safe_limit: f64) -> Pollutant {
    Pollutant {
        pollutant_id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        safe_limit,
    }
}

fn guideline(id: &str, range: &str, precautions: &str) -> Guideline {
    Guideline {
        guide_id: id.to_string(),
        aqi_range: range.to_string(),
        precautions: precautions.to_string(),
    }
}

fn citizen(id: &str, name: &str, age: u32, location: &str, contact: &str) -> Citizen {
    Citizen {
        citizen_id: id.to_string(),
        name: name.to_string(),
        age,
        location: location.to_string(),
        contact: contact.to_string(),
    }
}

fn alert(region: &str, level: &str, issue_date: &str, expiry_date: &str) -> Alert {
    Alert {
        alert_id: generate_id("alert"),
        region: region.to_string(),
        aqi_level: level.to_string(),
        status: AlertStatus::Active,
        issue_date: issue_date.to_string(),
        expiry_date: expiry_date.to_string(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn readings(rng: &mut ChaCha8Rng) -> Vec<AirQualityRecord> {
    let mut records = Vec::with_capacity(SAMPLE_CITIES.len() * SAMPLE_DAYS as usize);
    for city in SAMPLE_CITIES {
        for day in 1..=SAMPLE_DAYS {
            let date = NaiveDate::from_ymd_opt(2025, 1, day)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            let aqi: u32 = rng.gen_range(50..=400);
            let scale = f64::from(aqi);

            let mut levels = IndexMap::new();
            levels.insert("PM2.5".to_string(), round1(scale * rng.gen_range(0.3..0.9)));
            levels.insert("PM10".to_string(), round1(scale * rng.gen_range(0.4..1.0)));
            levels.insert("NO2".to_string(), round1(scale * rng.gen_range(0.05..0.25)));
            levels.insert("CO".to_string(), round2(rng.gen_range(0.2..5.0) * (scale / 100.0)));
            levels.insert("O3".to_string(), round1(rng.gen_range(10.0..150.0) * (scale / 200.0)));
            levels.insert("SO2".to_string(), round1(rng.gen_range(5.0..80.0) * (scale / 200.0)));

            records.push(AirQualityRecord::new(city, date, aqi, levels, ""));
        }
    }
    records
}

/// Build the sample dataset for `seed` without writing it.
#[must_use]
pub fn sample_data(seed: u64) -> SampleData {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    SampleData {
        pollutants: vec![
            pollutant("pol_pm25", "PM2.5", "Fine particulate matter (µg/m³)", 60.0),
            pollutant("pol_pm10", "PM10", "Coarse particulate matter (µg/m³)", 100.0),
            pollutant("pol_no2", "NO2", "Nitrogen dioxide (µg/m³)", 80.0),
            pollutant("pol_co", "CO", "Carbon monoxide (mg/m³)", 10.0),
            pollutant("pol_o3", "O3", "Ozone (µg/m³)", 120.0),
            pollutant("pol_so2", "SO2", "Sulfur dioxide (µg/m³)", 80.0),
        ],
        guidelines: vec![
            guideline("g1", "0-50", "Good: No health impacts expected."),
            guideline(
                "g2",
                "51-100",
                "Moderate: Unusually sensitive people should consider reducing prolonged outdoor exertion.",
            ),
            guideline(
                "g3",
                "101-200",
                "Unhealthy: Sensitive groups should reduce prolonged outdoor exertion.",
            ),
            guideline("g4", "201-300", "Very Unhealthy: Avoid outdoor activities."),
            guideline(
                "g5",
                "301-500",
                "Hazardous: Remain indoors and use protective measures.",
            ),
        ],
        citizens: vec![
            citizen("cit_alice", "Alice", 30, "Delhi", "alice@example.com"),
            citizen("cit_bob", "Bob", 40, "Mumbai", "bob@example.com"),
        ],
        air_quality: readings(&mut rng),
        alerts: vec![
            alert("Delhi", "Very Unhealthy", "2025-01-10", "2025-01-12"),
            alert("Kanpur", "Hazardous", "2025-01-08", "2025-01-11"),
        ],
    }
}

/// Overwrite every collection with the sample dataset.
///
/// # Errors
///
/// Returns an error if any collection cannot be saved.
pub fn create_sample_data(store: &Store, seed: u64) -> Result<SampleData> {
    let data = sample_data(seed);
    store.save(&data.pollutants)?;
    store.save(&data.guidelines)?;
    store.save(&data.citizens)?;
    store.save(&data.air_quality)?;
    store.save(&data.alerts)?;
    info!(
        "Sample data created in {} ({} readings)",
        store.data_dir().display(),
        data.air_quality.len()
    );
    Ok(data)
}

/// Seed the store if the pollutant table is empty.
///
/// A store with no pollutants but data in other collections is left alone.
/// Returns `true` when sample data was written.
///
/// # Errors
///
/// Returns an error if any collection cannot be saved.
pub fn ensure_sample_data(store: &Store, seed: u64) -> Result<bool> {
    let stats = store.stats();
    if stats.pollutants > 0 {
        return Ok(false);
    }
    if !stats.is_empty() {
        warn!(
            "No pollutants in {} but other collections hold data; skipping sample data",
            store.data_dir().display()
        );
        return Ok(false);
    }
    create_sample_data(store, seed)?;
    Ok(true)
}
