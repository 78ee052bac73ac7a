//! Storage layer for aqportal.
//!
//! Each collection is one pretty-printed JSON array in the data directory.
//! Collections are always read and rewritten whole: there are no partial
//! writes, no locking and no transactions, so the last writer wins.

mod collections;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{AirQualityRecord, Alert, Citizen, Guideline, Pollutant, Record};

pub use collections::Collection;

/// File-backed store for the five JSON collections.
#[derive(Debug, Clone)]
pub struct Store {
    /// Directory holding the collection files.
    data_dir: PathBuf,
}

impl Store {
    /// Open a store rooted at `data_dir`.
    ///
    /// Creates the directory and an empty collection file for every
    /// collection that does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a collection file cannot be created.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();

        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir).map_err(|source| Error::DirectoryCreate {
                path: data_dir.clone(),
                source,
            })?;
        }

        let store = Self { data_dir };
        for collection in Collection::ALL {
            let path = store.path_of(collection);
            if !path.exists() {
                debug!("Creating empty collection {}", path.display());
                store.write_collection::<serde_json::Value>(&path, &[])?;
            }
        }

        debug!("Data directory ready at {}", store.data_dir.display());
        Ok(store)
    }

    /// Get the data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the file path of a collection.
    #[must_use]
    pub fn path_of(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(collection.file_name())
    }

    /// Load a whole collection.
    ///
    /// A missing file yields an empty list. So does a file that is not a
    /// valid JSON array of records; that case is logged and otherwise
    /// swallowed, and the next save overwrites the file.
    #[must_use]
    pub fn load<T: Record>(&self) -> Vec<T> {
        let path = self.path_of(T::COLLECTION);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Collection {} missing, treating as empty", T::COLLECTION);
                return Vec::new();
            }
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<T>>(&text) {
            Ok(items) => {
                debug!("Loaded {} {} records", items.len(), T::COLLECTION);
                items
            }
            Err(e) => {
                warn!(
                    "Malformed collection {}, treating as empty: {}",
                    path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Overwrite a whole collection.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn save<T: Record>(&self, items: &[T]) -> Result<()> {
        let path = self.path_of(T::COLLECTION);
        self.write_collection(&path, items)?;
        debug!("Saved {} {} records", items.len(), T::COLLECTION);
        Ok(())
    }

    fn write_collection<T: Serialize>(&self, path: &Path, items: &[T]) -> Result<()> {
        let json = serde_json::to_string_pretty(items)?;
        std::fs::write(path, json).map_err(|source| Error::CollectionWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Append one record and persist the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be saved.
    pub fn insert<T: Record>(&self, item: T) -> Result<()> {
        self.extend(vec![item]).map(|_| ())
    }

    /// Append records and persist the collection once.
    ///
    /// Returns the number of records appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be saved.
    pub fn extend<T: Record>(&self, items: Vec<T>) -> Result<usize> {
        let added = items.len();
        let mut all = self.load::<T>();
        all.extend(items);
        self.save(&all)?;
        Ok(added)
    }

    /// Find a record by id.
    #[must_use]
    pub fn find<T: Record>(&self, id: &str) -> Option<T> {
        self.load::<T>().into_iter().find(|item| item.id() == id)
    }

    /// Apply `change` to the record with the given id and persist.
    ///
    /// Returns `false` (and writes nothing) if no record has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be saved.
    pub fn update<T: Record>(&self, id: &str, change: impl FnOnce(&mut T)) -> Result<bool> {
        let mut all = self.load::<T>();
        let Some(item) = all.iter_mut().find(|item| item.id() == id) else {
            return Ok(false);
        };
        change(item);
        self.save(&all)?;
        Ok(true)
    }

    /// Delete the record with the given id and persist.
    ///
    /// Returns `false` (and writes nothing) if no record has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be saved.
    pub fn delete<T: Record>(&self, id: &str) -> Result<bool> {
        let mut all = self.load::<T>();
        let before = all.len();
        all.retain(|item| item.id() != id);
        if all.len() == before {
            return Ok(false);
        }
        self.save(&all)?;
        Ok(true)
    }

    /// Count the records in a collection.
    #[must_use]
    pub fn count<T: Record>(&self) -> usize {
        self.load::<T>().len()
    }

    /// Get per-collection record counts.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            data_dir: self.data_dir.clone(),
            air_quality: self.count::<AirQualityRecord>(),
            citizens: self.count::<Citizen>(),
            pollutants: self.count::<Pollutant>(),
            alerts: self.count::<Alert>(),
            guidelines: self.count::<Guideline>(),
        }
    }
}

/// Record counts per collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Directory holding the collections.
    pub data_dir: PathBuf,
    /// Number of air quality records.
    pub air_quality: usize,
    /// Number of citizens.
    pub citizens: usize,
    /// Number of pollutants.
    pub pollutants: usize,
    /// Number of alerts.
    pub alerts: usize,
    /// Number of guidelines.
    pub guidelines: usize,
}

impl StoreStats {
    /// Whether every collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.air_quality + self.citizens + self.pollutants + self.alerts + self.guidelines == 0
    }
}


#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::testing::TempStore;
    use super::*;
    use crate::model::AlertStatus;

    fn record(region: &str, date: &str, aqi: u32) -> AirQualityRecord {
        AirQualityRecord::new(region, date, aqi, IndexMap::new(), "")
    }

    #[test]
    fn test_open_creates_empty_collections() {
        let store = TempStore::new("open");

        for collection in Collection::ALL {
            let path = store.path_of(collection);
            assert!(path.exists(), "{} missing", path.display());
            assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
        }
        assert!(store.load::<AirQualityRecord>().is_empty());
    }

    #[test]
    fn test_open_keeps_existing_files() {
        let store = TempStore::new("reopen");
        store.insert(record("Delhi", "2025-01-01", 120)).unwrap();

        let reopened = Store::open(store.data_dir()).unwrap();
        assert_eq!(reopened.count::<AirQualityRecord>(), 1);
    }

    #[test]
    fn test_insert_then_load_round_trip() {
        let store = TempStore::new("roundtrip");
        let mut levels = IndexMap::new();
        levels.insert("PM2.5".to_string(), 61.2);
        levels.insert("NO2".to_string(), 18.0);
        let input = AirQualityRecord::new("Delhi", "2025-01-03", 212, levels, "High");

        store.insert(input.clone()).unwrap();

        let loaded = store.load::<AirQualityRecord>();
        assert_eq!(loaded, vec![input]);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let store = TempStore::new("missing");
        std::fs::remove_file(store.path_of(Collection::Alerts)).unwrap();

        assert!(store.load::<Alert>().is_empty());
    }

    #[test]
    fn test_malformed_file_loads_empty() {
        crate::logging::init_test_logging();
        let store = TempStore::new("malformed");
        std::fs::write(store.path_of(Collection::Citizens), "{ not json").unwrap();

        assert!(store.load::<Citizen>().is_empty());
    }

    #[test]
    fn test_non_array_file_loads_empty() {
        let store = TempStore::new("object");
        std::fs::write(store.path_of(Collection::Pollutants), r#"{"name": "PM10"}"#).unwrap();

        assert!(store.load::<Pollutant>().is_empty());
    }

    #[test]
    fn test_odd_entries_keep_the_whole_collection() {
        let store = TempStore::new("odd_entries");
        std::fs::write(
            store.path_of(Collection::Citizens),
            r#"[
                {"citizen_id": "cit_a", "name": "Asha", "age": 29, "location": "Delhi", "contact": "a@x.in"},
                {"citizen_id": "cit_b", "name": "Ravi", "age": "41", "location": null, "contact": 98765}
            ]"#,
        )
        .unwrap();
        std::fs::write(
            store.path_of(Collection::Alerts),
            r#"[
                {"alert_id": "alert_a", "region": "Delhi", "AQI_level": 320, "status": "Active", "issue_date": "2025-01-10", "expiry_date": null},
                {"alert_id": "alert_b", "region": "Agra", "AQI_level": "Hazardous", "status": "WITHDRAWN"}
            ]"#,
        )
        .unwrap();

        let citizens = store.load::<Citizen>();
        assert_eq!(citizens.len(), 2);
        assert_eq!(citizens[1].location, "");
        assert_eq!(citizens[1].contact, "98765");

        let alerts = store.load::<Alert>();
        assert_eq!(alerts.len(), 2);
        assert!(alerts[0].is_active());
        assert_eq!(alerts[0].aqi_level, "320");
        assert_eq!(alerts[1].status, AlertStatus::Withdrawn);

        store
            .insert(Citizen::new("Meera", 35, "Pune", "m@x.in"))
            .unwrap();
        assert_eq!(store.count::<Citizen>(), 3);
        assert!(store.find::<Citizen>("cit_b").is_some());
    }

    #[test]
    fn test_saved_file_is_pretty_printed() {
        let store = TempStore::new("pretty");
        store.insert(record("Agra", "2025-01-01", 90)).unwrap();

        let text = std::fs::read_to_string(store.path_of(Collection::AirQuality)).unwrap();
        assert!(text.contains("\n  {"));
        assert!(text.contains("\"AQI\": 90"));
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let store = TempStore::new("delete");
        let a = record("Delhi", "2025-01-01", 100);
        let b = record("Pune", "2025-01-01", 80);
        let c = record("Agra", "2025-01-01", 60);
        store
            .extend(vec![a.clone(), b.clone(), c.clone()])
            .unwrap();

        assert!(store.delete::<AirQualityRecord>(&b.record_id).unwrap());

        let remaining = store.load::<AirQualityRecord>();
        assert_eq!(remaining, vec![a, c]);
    }

    #[test]
    fn test_delete_nonexistent() {
        let store = TempStore::new("delete_none");
        store.insert(record("Delhi", "2025-01-01", 100)).unwrap();

        assert!(!store.delete::<AirQualityRecord>("rec_nope").unwrap());
        assert_eq!(store.count::<AirQualityRecord>(), 1);
    }

    #[test]
    fn test_update_applies_change() {
        let store = TempStore::new("update");
        let rec = record("Delhi", "2025-01-01", 100);
        store.insert(rec.clone()).unwrap();

        let updated = store
            .update::<AirQualityRecord>(&rec.record_id, |r| r.aqi = 250)
            .unwrap();
        assert!(updated);
        assert_eq!(
            store
                .find::<AirQualityRecord>(&rec.record_id)
                .unwrap()
                .aqi,
            250
        );
    }

    #[test]
    fn test_update_nonexistent() {
        let store = TempStore::new("update_none");
        let updated = store
            .update::<Alert>("alert_nope", |a| a.status = AlertStatus::Withdrawn)
            .unwrap();
        assert!(!updated);
    }

    #[test]
    fn test_find_nonexistent() {
        let store = TempStore::new("find_none");
        assert!(store.find::<Citizen>("cit_nobody").is_none());
    }

    #[test]
    fn test_stats_counts_each_collection() {
        let store = TempStore::new("stats");
        store.insert(record("Delhi", "2025-01-01", 100)).unwrap();
        store.insert(record("Delhi", "2025-01-02", 110)).unwrap();
        store
            .insert(Citizen::new("Asha", 29, "Delhi", "asha@example.com"))
            .unwrap();

        let stats = store.stats();
        assert_eq!(stats.air_quality, 2);
        assert_eq!(stats.citizens, 1);
        assert_eq!(stats.pollutants, 0);
        assert_eq!(stats.alerts, 0);
        assert_eq!(stats.guidelines, 0);
        assert_eq!(stats.data_dir, store.data_dir());
        assert!(!stats.is_empty());
        assert!(TempStore::new("stats_empty").stats().is_empty());
    }

    #[test]
    fn test_open_creates_nested_dirs() {
        let root = std::env::temp_dir().join(format!("aqportal_nested_{}", std::process::id()));
        let nested = root.join("a/b/data");
        let _ = std::fs::remove_dir_all(&root);

        let store = Store::open(&nested).unwrap();
        assert!(store.path_of(Collection::Guidelines).exists());

        let _ = std::fs::remove_dir_all(&root);
    }
}
