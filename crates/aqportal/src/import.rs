//! Bulk import of air quality records from JSON or CSV files.
//!
//! JSON files hold a list of record maps. CSV files have a header row of
//! `region,date,AQI,health_risk` followed by one column per pollutant.
//! Every imported row gets a freshly generated record id.

use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::{generate_id, parse_whole, parse_number, today, AirQualityRecord, Pollutant};
use crate::storage::Store;

/// Columns of an import CSV that are not pollutant levels.
const CORE_COLUMNS: [&str; 4] = ["region", "date", "AQI", "health_risk"];

/// Supported import formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// A JSON array of record maps.
    Json,
    /// A CSV file with a header row.
    Csv,
}

impl ImportFormat {
    /// Pick the format from a file extension, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImportUnsupported`] for anything but `.json` and `.csv`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(Error::ImportUnsupported { extension }),
        }
    }
}

/// Read records from an import file without touching the store.
///
/// `known_pollutants` only affects logging: CSV pollutant columns that are
/// not in the reference table are reported but still imported.
///
/// # Errors
///
/// Returns an error if the file is missing, has an unsupported extension,
/// or cannot be parsed.
pub fn read_records(path: &Path, known_pollutants: &[String]) -> Result<Vec<AirQualityRecord>> {
    if !path.exists() {
        return Err(Error::ImportNotFound {
            path: path.to_path_buf(),
        });
    }

    match ImportFormat::from_path(path)? {
        ImportFormat::Json => parse_json(&std::fs::read_to_string(path)?),
        ImportFormat::Csv => parse_csv(std::fs::File::open(path)?, known_pollutants),
    }
}

/// Import a file into the air quality collection.
///
/// Returns the number of records added.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the collection cannot be saved.
pub fn import_into(store: &Store, path: &Path) -> Result<usize> {
    let known: Vec<String> = store
        .load::<Pollutant>()
        .into_iter()
        .map(|p| p.name)
        .collect();

    let records = read_records(path, &known)?;
    let added = store.extend(records)?;
    info!("Imported {} records from {}", added, path.display());
    Ok(added)
}

/// Parse a JSON array of records, assigning fresh ids.
///
/// # Errors
///
/// Returns an error if the text is not JSON or not an array of objects.
pub fn parse_json(text: &str) -> Result<Vec<AirQualityRecord>> {
    let Value::Array(items) = serde_json::from_str::<Value>(text)? else {
        return Err(Error::import_format("JSON must be a list of records"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(Error::import_format(format!(
                    "entry {index} is not a record object"
                )));
            }
            let mut record: AirQualityRecord = serde_json::from_value(item)?;
            record.record_id = generate_id("rec");
            Ok(record)
        })
        .collect()
}

/// Parse CSV rows into records, assigning fresh ids.
///
/// Every column other than the core columns is a pollutant level; empty
/// cells are skipped. An empty or missing date means today.
///
/// # Errors
///
/// Returns an error if the CSV cannot be read.
pub fn parse_csv<R: Read>(reader: R, known_pollutants: &[String]) -> Result<Vec<AirQualityRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let region_col = column(CORE_COLUMNS[0]);
    let date_col = column(CORE_COLUMNS[1]);
    let aqi_col = column(CORE_COLUMNS[2]);
    let risk_col = column(CORE_COLUMNS[3]);

    let pollutant_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.is_empty() && !CORE_COLUMNS.iter().any(|c| h.eq_ignore_ascii_case(c)))
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    for (_, name) in &pollutant_cols {
        if !known_pollutants.iter().any(|k| k == name) {
            warn!("CSV column '{}' is not a known pollutant, importing anyway", name);
        }
    }

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let cell = |col: Option<usize>| col.and_then(|i| row.get(i)).unwrap_or("");

        let mut levels = IndexMap::new();
        for (index, name) in &pollutant_cols {
            match row.get(*index) {
                Some(value) if !value.is_empty() => {
                    levels.insert(name.clone(), parse_number(value));
                }
                _ => {}
            }
        }

        let date = match cell(date_col) {
            "" => today(),
            date => date.to_string(),
        };

        records.push(AirQualityRecord::new(
            cell(region_col),
            date,
            parse_whole(cell(aqi_col)),
            levels,
            cell(risk_col),
        ));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::storage::testing::TempStore;

    fn known() -> Vec<String> {
        vec!["PM2.5".to_string(), "NO2".to_string()]
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("aqportal_import_{}_{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ImportFormat::from_path(Path::new("a/b.JSON")).unwrap(),
            ImportFormat::Json
        );
        assert_eq!(
            ImportFormat::from_path(Path::new("rows.csv")).unwrap(),
            ImportFormat::Csv
        );
        assert!(matches!(
            ImportFormat::from_path(Path::new("rows.xlsx")),
            Err(Error::ImportUnsupported { .. })
        ));
        assert!(matches!(
            ImportFormat::from_path(Path::new("noext")),
            Err(Error::ImportUnsupported { .. })
        ));
    }

    #[test]
    fn test_parse_csv_two_rows_with_pollutant() {
        let csv = "region,date,AQI,health_risk,PM2.5\n\
                   Delhi,2025-02-01,180,High,75.5\n\
                   Pune,2025-02-01,90,,30\n";

        let records = parse_csv(csv.as_bytes(), &known()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].region, "Delhi");
        assert_eq!(records[0].aqi, 180);
        assert_eq!(records[0].health_risk, "High");
        assert_eq!(records[0].pollutants.get("PM2.5"), Some(&75.5));
        assert_eq!(records[1].pollutants.get("PM2.5"), Some(&30.0));
        assert_ne!(records[0].record_id, records[1].record_id);
    }

    #[test]
    fn test_parse_csv_skips_empty_cells_and_coerces() {
        let csv = "region,date,AQI,health_risk,PM2.5,NO2\n\
                   Agra,2025-02-02,abc,,,n/a\n";

        let records = parse_csv(csv.as_bytes(), &known()).unwrap();
        assert_eq!(records[0].aqi, 0);
        assert!(!records[0].pollutants.contains_key("PM2.5"));
        assert_eq!(records[0].pollutants.get("NO2"), Some(&0.0));
    }

    #[test]
    fn test_parse_csv_missing_date_is_today() {
        let csv = "region,AQI\nSurat,120\nThane,80\n";

        let records = parse_csv(csv.as_bytes(), &[]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, today());
        assert!(records[0].pollutants.is_empty());
    }

    #[test]
    fn test_parse_csv_unknown_pollutant_still_imported() {
        let csv = "region,date,AQI,health_risk,NH3\nNagpur,2025-02-03,70,,4.2\n";

        let records = parse_csv(csv.as_bytes(), &known()).unwrap();
        assert_eq!(records[0].pollutants.get("NH3"), Some(&4.2));
    }

    #[test]
    fn test_parse_json_assigns_fresh_ids() {
        let json = r#"[
            {"record_id": "rec_dup", "region": "Delhi", "date": "2025-02-01", "AQI": 200},
            {"record_id": "rec_dup", "region": "Delhi", "date": "2025-02-02", "AQI": "210"}
        ]"#;

        let records = parse_json(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_ne!(records[0].record_id, "rec_dup");
        assert_ne!(records[0].record_id, records[1].record_id);
        assert_eq!(records[1].aqi, 210);
    }

    #[test]
    fn test_parse_json_rejects_non_list() {
        let err = parse_json(r#"{"region": "Delhi"}"#).unwrap_err();
        assert!(err.to_string().contains("JSON must be a list of records"));
    }

    #[test]
    fn test_parse_json_rejects_scalar_entries() {
        let err = parse_json("[1, 2]").unwrap_err();
        assert!(matches!(err, Error::ImportFormat { .. }));
    }

    #[test]
    fn test_read_records_missing_file() {
        let err = read_records(Path::new("/nonexistent/rows.csv"), &[]).unwrap_err();
        assert!(matches!(err, Error::ImportNotFound { .. }));
    }

    #[test]
    fn test_read_records_unsupported_file() {
        let path = write_temp("rows.txt", "region\n");
        let err = read_records(&path, &[]).unwrap_err();
        assert!(matches!(err, Error::ImportUnsupported { .. }));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_import_into_appends_to_store() {
        let store = TempStore::new("import");
        store
            .insert(AirQualityRecord::new("Delhi", "2025-01-01", 100, IndexMap::new(), ""))
            .unwrap();
        let path = write_temp(
            "two.csv",
            "region,date,AQI,health_risk,PM2.5\nDelhi,2025-02-01,180,,75\nPune,2025-02-01,90,,30\n",
        );

        let added = import_into(&store, &path).unwrap();
        assert_eq!(added, 2);

        let all = store.load::<AirQualityRecord>();
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].pollutants.get("PM2.5"), Some(&75.0));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_import_into_failure_leaves_store_untouched() {
        let store = TempStore::new("import_fail");
        let path = write_temp("bad.json", r#"{"not": "a list"}"#);

        assert!(import_into(&store, &path).is_err());
        assert_eq!(store.count::<AirQualityRecord>(), 0);
        let _ = std::fs::remove_file(&path);
    }
}
