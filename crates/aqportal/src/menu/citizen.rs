//! Citizen menu.

use std::io::{BufRead, Write};

use super::Portal;
use crate::error::Result;
use crate::model::{parse_whole, AirQualityRecord, Alert, Citizen, Guideline};
use crate::report::{
    active_alerts_for, guideline_for, latest_for_region, latest_per_region, monthly_trend,
    records_for_region, records_on_date, records_with_pollutant, trend_table,
};
use crate::table::Table;

const SEARCH_MENU: &str = "\
Search by:
1.Date
2.Region
3.Pollutant
4.All Regions (latest AQI per region)
5.Back";

fn citizen_menu_text(name: &str) -> String {
    format!(
        "--- Citizen Menu ({name}) ---
1.View Current Air Quality (your region)
2.Search Historical AQI Data
3.View Pollution Trends
4.Access Health Guidelines
5.Manage Profile
6.Logout"
    )
}

fn record_table<'a>(records: impl IntoIterator<Item = &'a AirQualityRecord>) -> Table {
    let mut table = Table::new(["ID", "Date", "Region", "AQI", "Pollutants"]);
    for r in records {
        table.row([
            r.record_id.clone(),
            r.date.clone(),
            r.region.clone(),
            r.aqi.to_string(),
            r.pollutant_summary(),
        ]);
    }
    table
}

impl<R: BufRead, W: Write> Portal<'_, R, W> {
    pub(super) fn citizen_menu(&mut self, mut citizen: Citizen) -> Result<()> {
        loop {
            let result = match self.choose(&citizen_menu_text(&citizen.name))?.as_str() {
                "1" => self.view_current_air_quality(&citizen),
                "2" => self.search_historical_data(),
                "3" => self.view_trends(&citizen),
                "4" => self.access_guidelines(),
                "5" => self.manage_profile(&mut citizen),
                "6" => return Ok(()),
                _ => self.console.say("Invalid choice."),
            };
            self.recover(result)?;
        }
    }

    fn view_current_air_quality(&mut self, citizen: &Citizen) -> Result<()> {
        let records = self.store.load::<AirQualityRecord>();
        let Some(latest) = latest_for_region(&records, &citizen.location) else {
            return self
                .console
                .say(format!("No AQI data for region: {}", citizen.location));
        };

        let mut table = Table::new(["Date", "Region", "AQI", "Pollutants"]);
        table.row([
            latest.date.clone(),
            latest.region.clone(),
            latest.aqi.to_string(),
            latest.pollutant_summary(),
        ]);
        self.console.table(&table, "")?;

        let guidelines = self.store.load::<Guideline>();
        if let Some(guide) = guideline_for(&guidelines, latest.aqi) {
            self.console
                .say(format!("Guideline ({}): {}", guide.aqi_range, guide.precautions))?;
        }

        let alerts = self.store.load::<Alert>();
        for alert in active_alerts_for(&alerts, &citizen.location) {
            self.console.say(format!(
                "ALERT: {} issued on {} (id {})",
                alert.aqi_level, alert.issue_date, alert.alert_id
            ))?;
        }
        Ok(())
    }

    fn search_historical_data(&mut self) -> Result<()> {
        let records = self.store.load::<AirQualityRecord>();
        if records.is_empty() {
            return self.console.say("No air quality data available.");
        }

        let results = match self.choose(SEARCH_MENU)?.as_str() {
            "1" => {
                let date = self.console.prompt("Date (YYYY-MM-DD): ")?;
                records_on_date(&records, &date)
            }
            "2" => {
                let region = self.console.prompt("Region: ")?;
                records_for_region(&records, &region)
            }
            "3" => {
                let pollutant = self.console.prompt("Pollutant name (e.g. PM2.5): ")?;
                records_with_pollutant(&records, &pollutant)
            }
            "4" => latest_per_region(&records),
            _ => return Ok(()),
        };

        self.console
            .table(&record_table(results), "No matches found.")
    }

    fn view_trends(&mut self, citizen: &Citizen) -> Result<()> {
        let records = self.store.load::<AirQualityRecord>();
        let trend = monthly_trend(&records, &citizen.location);
        let empty = format!("No trend data for region: {}", citizen.location);
        self.console.table(&trend_table(&trend), &empty)
    }

    fn access_guidelines(&mut self) -> Result<()> {
        let mut table = Table::new(["ID", "AQI Range", "Precautions"]);
        for g in self.store.load::<Guideline>() {
            table.row([g.guide_id, g.aqi_range, g.precautions]);
        }
        self.console.table(&table, "No guidelines available.")
    }

    fn manage_profile(&mut self, citizen: &mut Citizen) -> Result<()> {
        let Some(mut profile) = self.store.find::<Citizen>(&citizen.citizen_id) else {
            return self.console.say("Profile not found.");
        };

        profile.name = self.console.edit("Name", &profile.name)?;
        let age = self.console.prompt(&format!("Age [{}]: ", profile.age))?;
        if !age.is_empty() {
            profile.age = parse_whole(&age);
        }
        profile.location = self.console.edit("Location", &profile.location)?;
        profile.contact = self.console.edit("Contact", &profile.contact)?;

        let updated = profile.clone();
        self.store
            .update::<Citizen>(&citizen.citizen_id, |stored| *stored = profile)?;
        *citizen = updated;
        self.console.say("Profile updated.")
    }
}
