//! Administrator menu.

use std::io::{BufRead, Write};
use std::path::Path;

use indexmap::IndexMap;
use tracing::info;

use super::Portal;
use crate::error::{Error, Result};
use crate::import::import_into;
use crate::model::{parse_whole, parse_number, today, AirQualityRecord, Alert, Pollutant};
use crate::report::{
    alert_summary, alert_table, monthly_trend, region_table, top_polluted_regions, trend_table,
};
use crate::table::Table;

const ADMIN_MENU: &str = "\
--- Admin Menu ---
1. Add Air Quality Record
2. Update/Delete Air Record
3. Manage Pollutants
4. Upload Bulk Data (JSON/CSV)
5. Generate Reports
6. Manage Alerts
7. Back to Main Menu";

const POLLUTANT_MENU: &str = "Options: 1.Add 2.Update 3.Delete 4.Back";

const REPORT_MENU: &str = "Report options: 1.Top polluted regions (avg AQI) 2.Monthly trend for a region 3.Alerts summary 4.Back";

const ALERT_MENU: &str = "1.Issue alert 2.Withdraw alert 3.Back";

impl<R: BufRead, W: Write> Portal<'_, R, W> {
    pub(super) fn admin_menu(&mut self) -> Result<()> {
        loop {
            let result = match self.choose(ADMIN_MENU)?.as_str() {
                "1" => self.add_record(),
                "2" => self.update_or_delete_record(),
                "3" => self.manage_pollutants(),
                "4" => self.upload_bulk_data(),
                "5" => self.generate_reports(),
                "6" => self.manage_alerts(),
                "7" => return Ok(()),
                _ => self.console.say("Invalid choice."),
            };
            self.recover(result)?;
        }
    }

    fn pollutant_levels(&mut self, pollutants: &[Pollutant]) -> Result<IndexMap<String, f64>> {
        self.console.say("Enter pollutant levels (blank to skip):")?;
        let mut levels = IndexMap::new();
        for pollutant in pollutants {
            let value = self.console.prompt(&format!("  {}: ", pollutant.name))?;
            if !value.is_empty() {
                levels.insert(pollutant.name.clone(), parse_number(&value));
            }
        }
        Ok(levels)
    }

    fn add_record(&mut self) -> Result<()> {
        self.console.say("Add Air Quality Record")?;
        let region = self.console.prompt("Region / City: ")?;
        let date = match self.console.prompt("Date (YYYY-MM-DD, blank for today): ")? {
            date if date.is_empty() => today(),
            date => date,
        };
        let aqi = parse_whole(&self.console.prompt("AQI (numeric): ")?);
        let health_risk = self.console.prompt("Health risk (blank for none): ")?;

        let pollutants = self.store.load::<Pollutant>();
        let levels = self.pollutant_levels(&pollutants)?;

        let record = AirQualityRecord::new(region, date, aqi, levels, health_risk);
        info!("Adding record {} for {}", record.record_id, record.region);
        self.store.insert(record)?;
        self.console.say("Record added.")
    }

    fn update_or_delete_record(&mut self) -> Result<()> {
        let records = self.store.load::<AirQualityRecord>();
        if records.is_empty() {
            return self.console.say("No air quality records available.");
        }

        let mut table = Table::new(["ID", "Region", "Date", "AQI"]);
        for r in &records {
            table.row([
                r.record_id.clone(),
                r.region.clone(),
                r.date.clone(),
                r.aqi.to_string(),
            ]);
        }
        self.console.table(&table, "")?;

        let id = self
            .console
            .prompt("Enter record_id to update/delete (blank to cancel): ")?;
        if id.is_empty() {
            return Ok(());
        }
        let Some(mut record) = records.into_iter().find(|r| r.record_id == id) else {
            return self.console.say("Record not found.");
        };

        let action = self
            .console
            .prompt("Enter 'u' to update, 'd' to delete, anything else to cancel: ")?
            .to_lowercase();
        match action.as_str() {
            "d" => {
                self.store.delete::<AirQualityRecord>(&id)?;
                self.console.say("Deleted.")
            }
            "u" => {
                record.region = self.console.edit("Region", &record.region)?;
                record.date = self.console.edit("Date", &record.date)?;
                let aqi = self.console.prompt(&format!("AQI [{}]: ", record.aqi))?;
                if !aqi.is_empty() {
                    record.aqi = parse_whole(&aqi);
                }
                record.health_risk = self.console.edit("Health risk", &record.health_risk)?;
                for (name, level) in &mut record.pollutants {
                    let value = self.console.prompt(&format!("{name} [{level}]: "))?;
                    if !value.is_empty() {
                        *level = parse_number(&value);
                    }
                }
                self.store
                    .update::<AirQualityRecord>(&id, |stored| *stored = record)?;
                self.console.say("Updated.")
            }
            _ => self.console.say("Cancelled."),
        }
    }

    fn manage_pollutants(&mut self) -> Result<()> {
        loop {
            let mut table = Table::new(["ID", "Name", "Description", "Safe limit"]);
            for p in self.store.load::<Pollutant>() {
                table.row([p.pollutant_id, p.name, p.description, p.safe_limit.to_string()]);
            }
            self.console.table(&table, "No pollutants defined.")?;

            let result = match self.choose(POLLUTANT_MENU)?.as_str() {
                "1" => self.add_pollutant(),
                "2" => self.update_pollutant(),
                "3" => self.delete_pollutant(),
                "4" => return Ok(()),
                _ => self.console.say("Invalid choice."),
            };
            self.recover(result)?;
        }
    }

    fn add_pollutant(&mut self) -> Result<()> {
        let name = self.console.prompt("Name: ")?;
        let description = self.console.prompt("Description: ")?;
        let safe_limit = parse_number(&self.console.prompt("Safe limit (numeric): ")?);

        self.store.insert(Pollutant::new(name, description, safe_limit))?;
        self.console.say("Pollutant added.")
    }

    fn update_pollutant(&mut self) -> Result<()> {
        let id = self.console.prompt("Pollutant ID to update: ")?;
        let Some(mut pollutant) = self.store.find::<Pollutant>(&id) else {
            return self.console.say("Pollutant not found.");
        };

        pollutant.name = self.console.edit("Name", &pollutant.name)?;
        pollutant.description = self.console.edit("Description", &pollutant.description)?;
        let limit = self
            .console
            .prompt(&format!("Safe limit [{}]: ", pollutant.safe_limit))?;
        if !limit.is_empty() {
            pollutant.safe_limit = parse_number(&limit);
        }

        self.store
            .update::<Pollutant>(&id, |stored| *stored = pollutant)?;
        self.console.say("Updated.")
    }

    fn delete_pollutant(&mut self) -> Result<()> {
        let id = self.console.prompt("Pollutant ID to delete: ")?;
        if self.store.delete::<Pollutant>(&id)? {
            self.console.say("Deleted.")
        } else {
            self.console.say("Pollutant not found.")
        }
    }

    fn upload_bulk_data(&mut self) -> Result<()> {
        let path = self.console.prompt("Enter path to JSON or CSV file: ")?;
        match import_into(self.store, Path::new(&path)) {
            Ok(added) => self.console.say(format!("Imported {added} records.")),
            Err(Error::ImportNotFound { .. }) => self.console.say("File not found."),
            Err(Error::ImportUnsupported { .. }) => {
                self.console.say("Unsupported file type. Use .json or .csv")
            }
            Err(Error::ImportFormat { message }) => self.console.say(message),
            Err(err @ Error::CollectionWrite { .. }) => Err(err),
            Err(err) => self.console.say(format!("Import failed: {err}")),
        }
    }

    fn generate_reports(&mut self) -> Result<()> {
        let records = self.store.load::<AirQualityRecord>();
        if records.is_empty() {
            return self.console.say("No data available.");
        }

        match self.choose(REPORT_MENU)?.as_str() {
            "1" => {
                let ranked = top_polluted_regions(&records, self.config.top_regions_limit());
                self.console.table(&region_table(&ranked), "No data available.")
            }
            "2" => {
                let region = self.console.prompt("Region: ")?;
                let trend = monthly_trend(&records, &region);
                self.console
                    .table(&trend_table(&trend), "No data for that region.")
            }
            "3" => {
                let alerts = self.store.load::<Alert>();
                if alerts.is_empty() {
                    return self.console.say("No alerts.");
                }
                let summary = alert_summary(&alerts);
                self.console.table(&alert_table(summary.alerts), "")?;
                self.console.say(format!(
                    "Active: {}, Withdrawn: {}",
                    summary.active, summary.withdrawn
                ))
            }
            _ => Ok(()),
        }
    }

    fn manage_alerts(&mut self) -> Result<()> {
        match self.choose(ALERT_MENU)?.as_str() {
            "1" => {
                let region = self.console.prompt("Region: ")?;
                let level = self.console.prompt("AQI level: ")?;
                let expiry = self.console.prompt("Expiry date (YYYY-MM-DD) or blank: ")?;

                let alert = Alert::issue(region, level, today(), expiry);
                info!("Issuing alert {} for {}", alert.alert_id, alert.region);
                self.store.insert(alert)?;
                self.console.say("Alert issued.")
            }
            "2" => {
                let id = self.console.prompt("Alert ID to withdraw: ")?;
                match self.store.find::<Alert>(&id) {
                    None => self.console.say("Alert not found."),
                    Some(alert) if !alert.is_active() => {
                        self.console.say("Alert is already withdrawn.")
                    }
                    Some(_) => {
                        self.store.update::<Alert>(&id, |a| {
                            a.withdraw();
                        })?;
                        info!("Withdrew alert {}", id);
                        self.console.say("Alert withdrawn.")
                    }
                }
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::menu::testing::run_script;
    use crate::model::{AirQualityRecord, Alert, AlertStatus, Pollutant};
    use crate::storage::testing::TempStore;

    use indexmap::IndexMap;

    const LOGIN: &str = "1\nadmin\nadmin123\n";
    const LEAVE: &str = "7\n4\n";

    fn session(steps: &str) -> String {
        format!("{LOGIN}{steps}{LEAVE}")
    }

    fn seeded_pollutants(store: &TempStore) {
        store.insert(Pollutant::new("PM2.5", "Fine", 60.0)).unwrap();
        store.insert(Pollutant::new("NO2", "Nitrogen dioxide", 80.0)).unwrap();
    }

    #[test]
    fn test_add_record_with_levels() {
        let store = TempStore::new("admin_add");
        seeded_pollutants(&store);

        let out = run_script(&store, &session("1\nDelhi\n2025-03-01\n212\nHigh\n88.5\n\n"));
        assert!(out.contains("Record added."));

        let records = store.load::<AirQualityRecord>();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].region, "Delhi");
        assert_eq!(records[0].date, "2025-03-01");
        assert_eq!(records[0].aqi, 212);
        assert_eq!(records[0].health_risk, "High");
        assert_eq!(records[0].pollutants.get("PM2.5"), Some(&88.5));
        assert!(!records[0].pollutants.contains_key("NO2"));
    }

    #[test]
    fn test_add_record_blank_date_is_today_and_bad_aqi_is_zero() {
        let store = TempStore::new("admin_add_defaults");

        run_script(&store, &session("1\nPune\n\nlots\n\n"));
        let records = store.load::<AirQualityRecord>();
        assert_eq!(records[0].date, crate::model::today());
        assert_eq!(records[0].aqi, 0);
    }

    #[test]
    fn test_update_record_keeps_blank_fields() {
        let store = TempStore::new("admin_update");
        let mut levels = IndexMap::new();
        levels.insert("PM2.5".to_string(), 40.0);
        let record = AirQualityRecord::new("Agra", "2025-01-02", 150, levels, "");
        let id = record.record_id.clone();
        store.insert(record).unwrap();

        let out = run_script(&store, &session(&format!("2\n{id}\nu\n\n\n175\n\n55\n")));
        assert!(out.contains("Updated."));

        let stored = store.find::<AirQualityRecord>(&id).unwrap();
        assert_eq!(stored.region, "Agra");
        assert_eq!(stored.date, "2025-01-02");
        assert_eq!(stored.aqi, 175);
        assert_eq!(stored.pollutants.get("PM2.5"), Some(&55.0));
    }

    #[test]
    fn test_delete_record_and_missing_id() {
        let store = TempStore::new("admin_delete");
        let keep = AirQualityRecord::new("Agra", "2025-01-02", 150, IndexMap::new(), "");
        let doomed = AirQualityRecord::new("Agra", "2025-01-03", 160, IndexMap::new(), "");
        let doomed_id = doomed.record_id.clone();
        store.insert(keep.clone()).unwrap();
        store.insert(doomed).unwrap();

        let out = run_script(&store, &session(&format!("2\n{doomed_id}\nd\n2\nrec_missing\n")));
        assert!(out.contains("Deleted."));
        assert!(out.contains("Record not found."));
        assert_eq!(store.load::<AirQualityRecord>(), vec![keep]);
    }

    #[test]
    fn test_update_delete_with_no_records() {
        let store = TempStore::new("admin_norecords");
        let out = run_script(&store, &session("2\n"));
        assert!(out.contains("No air quality records available."));
    }

    #[test]
    fn test_manage_pollutants_add_update_delete() {
        let store = TempStore::new("admin_pollutants");
        run_script(&store, &session("3\n1\nNH3\nAmmonia\n400\n4\n"));

        let id = store.load::<Pollutant>()[0].pollutant_id.clone();
        run_script(&store, &session(&format!("3\n2\n{id}\n\nAmmonia gas\n\n4\n")));
        let updated = store.find::<Pollutant>(&id).unwrap();
        assert_eq!(updated.name, "NH3");
        assert_eq!(updated.description, "Ammonia gas");
        assert!((updated.safe_limit - 400.0).abs() < f64::EPSILON);

        let out = run_script(&store, &session(&format!("3\n3\npol_missing\n3\n{id}\n4\n")));
        assert!(out.contains("Pollutant not found."));
        assert!(out.contains("Deleted."));
        assert_eq!(store.count::<Pollutant>(), 0);
    }

    #[test]
    fn test_upload_missing_and_unsupported_files() {
        let store = TempStore::new("admin_upload");
        let out = run_script(&store, &session("4\n/nonexistent/rows.csv\n"));
        assert!(out.contains("File not found."));

        let path = std::env::temp_dir().join(format!("aqportal_menu_{}_rows.txt", std::process::id()));
        std::fs::write(&path, "region\n").unwrap();
        let out = run_script(&store, &session(&format!("4\n{}\n", path.display())));
        assert!(out.contains("Unsupported file type. Use .json or .csv"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_reports_top_regions_and_trend() {
        let store = TempStore::new("admin_reports");
        for (region, date, aqi) in [
            ("R1", "2025-01-01", 100),
            ("R1", "2025-01-05", 200),
            ("R2", "2025-01-03", 50),
        ] {
            store
                .insert(AirQualityRecord::new(region, date, aqi, IndexMap::new(), ""))
                .unwrap();
        }

        let out = run_script(&store, &session("5\n1\n5\n2\nr1\n5\n2\nNowhere\n"));
        let r1 = out.find("| R1 ").unwrap();
        let r2 = out.find("| R2 ").unwrap();
        assert!(r1 < r2);
        assert!(out.contains("150"));
        assert!(out.contains("| 2025-01 "));
        assert!(out.contains("No data for that region."));
    }

    #[test]
    fn test_reports_without_data() {
        let store = TempStore::new("admin_reports_empty");
        let out = run_script(&store, &session("5\n"));
        assert!(out.contains("No data available."));
    }

    #[test]
    fn test_issue_and_withdraw_alert() {
        let store = TempStore::new("admin_alerts");
        let other = Alert::issue("Kanpur", "Hazardous", "2025-01-08", "");
        store.insert(other.clone()).unwrap();

        run_script(&store, &session("6\n1\nDelhi\nVery Unhealthy\n2025-01-12\n"));
        let alerts = store.load::<Alert>();
        assert_eq!(alerts.len(), 2);
        let issued = alerts[1].clone();
        assert_eq!(issued.issue_date, crate::model::today());
        assert_eq!(issued.expiry_date, "2025-01-12");
        assert!(issued.is_active());

        let script = session(&format!(
            "6\n2\n{0}\n6\n2\n{0}\n6\n2\nalert_missing\n",
            issued.alert_id
        ));
        let out = run_script(&store, &script);
        assert!(out.contains("Alert withdrawn."));
        assert!(out.contains("Alert is already withdrawn."));
        assert!(out.contains("Alert not found."));

        let withdrawn = store.find::<Alert>(&issued.alert_id).unwrap();
        assert_eq!(withdrawn.status, AlertStatus::Withdrawn);
        assert_eq!(store.find::<Alert>(&other.alert_id).unwrap(), other);
    }

    #[test]
    fn test_alert_summary_counts() {
        let store = TempStore::new("admin_alert_summary");
        store
            .insert(AirQualityRecord::new("Delhi", "2025-01-01", 90, IndexMap::new(), ""))
            .unwrap();
        let mut old = Alert::issue("Delhi", "Unhealthy", "2025-01-01", "");
        old.withdraw();
        store.insert(old).unwrap();
        store.insert(Alert::issue("Delhi", "Hazardous", "2025-01-02", "")).unwrap();

        let out = run_script(&store, &session("5\n3\n"));
        assert!(out.contains("Active: 1, Withdrawn: 1"));
        assert!(out.contains("withdrawn"));
    }
}
