//! Aggregations and filters over in-memory collections.
//!
//! Everything here is a pure function over slices loaded from the store.
//! Means are computed as `sum / count` in `f64` and stay unrounded; use
//! [`round1`] only when displaying.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{region_key, same_region, AirQualityRecord, Alert, Guideline};
use crate::table::Table;

/// Mean AQI for one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionAverage {
    /// Region name as first seen in the records.
    pub region: String,
    /// Arithmetic mean of the region's AQI values.
    pub average: f64,
    /// Number of records averaged.
    pub count: usize,
}

/// Mean AQI for one month of one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAverage {
    /// `YYYY-MM`, or the raw date when it did not parse.
    pub month: String,
    /// Arithmetic mean of the month's AQI values.
    pub average: f64,
    /// Number of records averaged.
    pub count: usize,
}

/// All alerts plus status counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertSummary<'a> {
    /// Alerts in stored order.
    pub alerts: &'a [Alert],
    /// How many are active.
    pub active: usize,
    /// How many are withdrawn.
    pub withdrawn: usize,
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, aqi: u32) {
        self.sum += f64::from(aqi);
        self.count += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Round to one decimal place for display.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Rank regions by mean AQI, highest first.
///
/// Regions are grouped case-insensitively. Ties keep first-seen order.
/// `limit` of `None` returns every region.
#[must_use]
pub fn top_polluted_regions(
    records: &[AirQualityRecord],
    limit: Option<usize>,
) -> Vec<RegionAverage> {
    let mut groups: IndexMap<String, (String, Accumulator)> = IndexMap::new();
    for record in records {
        groups
            .entry(region_key(&record.region))
            .or_insert_with(|| (record.region.trim().to_string(), Accumulator::default()))
            .1
            .add(record.aqi);
    }

    let mut ranked: Vec<RegionAverage> = groups
        .into_values()
        .map(|(region, acc)| RegionAverage {
            region,
            average: acc.mean(),
            count: acc.count,
        })
        .collect();

    // sort_by is stable, so equal means keep first-seen order
    ranked.sort_by(|a, b| b.average.total_cmp(&a.average));

    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}

/// Month bucket for a record date: `YYYY-MM`, or the raw date if unparsable.
#[must_use]
pub fn month_key(date: &str) -> String {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_or_else(|_| date.to_string(), |d| d.format("%Y-%m").to_string())
}

/// Mean AQI per month for one region, months ascending.
#[must_use]
pub fn monthly_trend(records: &[AirQualityRecord], region: &str) -> Vec<MonthlyAverage> {
    let mut months: BTreeMap<String, Accumulator> = BTreeMap::new();
    for record in records.iter().filter(|r| same_region(&r.region, region)) {
        months.entry(month_key(&record.date)).or_default().add(record.aqi);
    }

    months
        .into_iter()
        .map(|(month, acc)| MonthlyAverage {
            month,
            average: acc.mean(),
            count: acc.count,
        })
        .collect()
}

/// Summarize alerts without aggregating them.
#[must_use]
pub fn alert_summary(alerts: &[Alert]) -> AlertSummary<'_> {
    let active = alerts.iter().filter(|a| a.is_active()).count();
    AlertSummary {
        alerts,
        active,
        withdrawn: alerts.len() - active,
    }
}

/// Records taken on exactly `date`.
#[must_use]
pub fn records_on_date<'a>(records: &'a [AirQualityRecord], date: &str) -> Vec<&'a AirQualityRecord> {
    let date = date.trim();
    records.iter().filter(|r| r.date == date).collect()
}

/// Records for a region, matched case-insensitively.
#[must_use]
pub fn records_for_region<'a>(
    records: &'a [AirQualityRecord],
    region: &str,
) -> Vec<&'a AirQualityRecord> {
    records
        .iter()
        .filter(|r| same_region(&r.region, region))
        .collect()
}

/// Records that measured the named pollutant.
#[must_use]
pub fn records_with_pollutant<'a>(
    records: &'a [AirQualityRecord],
    pollutant: &str,
) -> Vec<&'a AirQualityRecord> {
    let pollutant = pollutant.trim();
    records
        .iter()
        .filter(|r| r.pollutants.contains_key(pollutant))
        .collect()
}

/// The newest record for each region, regions in first-seen order.
///
/// On equal dates the earlier stored record wins.
#[must_use]
pub fn latest_per_region(records: &[AirQualityRecord]) -> Vec<&AirQualityRecord> {
    let mut latest: IndexMap<String, &AirQualityRecord> = IndexMap::new();
    for record in records {
        latest
            .entry(region_key(&record.region))
            .and_modify(|current| {
                if record.date > current.date {
                    *current = record;
                }
            })
            .or_insert(record);
    }
    latest.into_values().collect()
}

/// The newest record for one region.
#[must_use]
pub fn latest_for_region<'a>(
    records: &'a [AirQualityRecord],
    region: &str,
) -> Option<&'a AirQualityRecord> {
    records_for_region(records, region)
        .into_iter()
        .fold(None, |best: Option<&AirQualityRecord>, record| match best {
            Some(current) if record.date <= current.date => Some(current),
            _ => Some(record),
        })
}

/// Active alerts for a region.
#[must_use]
pub fn active_alerts_for<'a>(alerts: &'a [Alert], region: &str) -> Vec<&'a Alert> {
    alerts
        .iter()
        .filter(|a| a.is_active() && same_region(&a.region, region))
        .collect()
}

/// The first guideline whose AQI band contains `aqi`.
#[must_use]
pub fn guideline_for(guidelines: &[Guideline], aqi: u32) -> Option<&Guideline> {
    guidelines.iter().find(|g| g.covers(aqi))
}

/// Render ranked regions as a console table.
#[must_use]
pub fn region_table(regions: &[RegionAverage]) -> Table {
    let mut table = Table::new(["Region", "Average AQI", "Records"]);
    for r in regions {
        table.row([r.region.clone(), round1(r.average).to_string(), r.count.to_string()]);
    }
    table
}

/// Render a monthly trend as a console table.
#[must_use]
pub fn trend_table(months: &[MonthlyAverage]) -> Table {
    let mut table = Table::new(["Month", "Avg AQI", "Records"]);
    for m in months {
        table.row([m.month.clone(), round1(m.average).to_string(), m.count.to_string()]);
    }
    table
}

/// Render alerts as a console table.
#[must_use]
pub fn alert_table(alerts: &[Alert]) -> Table {
    let mut table = Table::new(["ID", "Region", "AQI_level", "Status", "Issue date", "Expiry"]);
    for a in alerts {
        table.row([
            a.alert_id.clone(),
            a.region.clone(),
            a.aqi_level.clone(),
            a.status.to_string(),
            a.issue_date.clone(),
            a.expiry_date.clone(),
        ]);
    }
    table
}
