use std::collections::BTreeSet;
use std::io;
use std::path::Path;

use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{RecordDate, UsageRecord};

pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// French month names indexed by month number - 1. Lookup in both
/// directions goes through this one table.
pub const MONTH_NAMES: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

pub fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|candidate| *candidate == name)
        .map(|index| index as u32 + 1)
}

#[derive(Debug, Deserialize, Serialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Nombre d'utilisateurs")]
    active_users: i64,
    #[serde(rename = "Nombre total d'utilisateurs potentiels")]
    potential_users: i64,
}

/// Day-first parse; a failure keeps the raw text instead of erroring so
/// one bad row never sinks the load.
pub fn parse_date(raw: &str) -> RecordDate {
    match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
        Ok(date) => RecordDate::Valid(date),
        Err(_) => RecordDate::Invalid(raw.to_string()),
    }
}

fn format_date(date: &RecordDate) -> String {
    match date {
        RecordDate::Valid(date) => date.format(DATE_FORMAT).to_string(),
        RecordDate::Invalid(raw) => raw.clone(),
    }
}

pub fn read_records(reader: impl io::Read) -> anyhow::Result<Vec<UsageRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for result in csv_reader.deserialize::<CsvRow>() {
        let row = result?;
        records.push(UsageRecord {
            date: parse_date(&row.date),
            active_users: row.active_users,
            potential_users: row.potential_users,
        });
    }

    Ok(records)
}

pub fn load_csv(csv_path: &Path) -> anyhow::Result<Vec<UsageRecord>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    read_records(file).with_context(|| format!("failed to parse {}", csv_path.display()))
}

pub fn write_records(writer: impl io::Write, records: &[UsageRecord]) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(CsvRow {
            date: format_date(&record.date),
            active_users: record.active_users,
            potential_users: record.potential_users,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv(csv_path: &Path, records: &[UsageRecord]) -> anyhow::Result<()> {
    let file = std::fs::File::create(csv_path)
        .with_context(|| format!("failed to create {}", csv_path.display()))?;
    write_records(file, records)
}

/// Keeps records whose date is valid and falls in both selections. An
/// empty selection matches nothing.
pub fn filter_records(
    records: &[UsageRecord],
    years: &BTreeSet<i32>,
    months: &BTreeSet<u32>,
) -> Vec<UsageRecord> {
    records
        .iter()
        .filter(|record| match record.date.as_date() {
            Some(date) => years.contains(&date.year()) && months.contains(&date.month()),
            None => false,
        })
        .cloned()
        .collect()
}

/// Distinct years present in the dataset's valid dates, ascending.
pub fn year_options(records: &[UsageRecord]) -> BTreeSet<i32> {
    records
        .iter()
        .filter_map(|record| record.date.as_date())
        .map(|date| date.year())
        .collect()
}

/// Distinct months present in the dataset's valid dates, ascending.
pub fn month_options(records: &[UsageRecord]) -> BTreeSet<u32> {
    records
        .iter()
        .filter_map(|record| record.date.as_date())
        .map(|date| date.month())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(raw_date: &str, active: i64, potential: i64) -> UsageRecord {
        UsageRecord {
            date: parse_date(raw_date),
            active_users: active,
            potential_users: potential,
        }
    }

    #[test]
    fn parses_day_first_dates() {
        assert_eq!(
            parse_date("01/06/2025"),
            RecordDate::Valid(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
        );
    }

    #[test]
    fn keeps_raw_text_for_invalid_dates() {
        assert_eq!(
            parse_date("31/13/2024"),
            RecordDate::Invalid("31/13/2024".to_string())
        );
    }

    #[test]
    fn reads_french_headers() {
        let data = "Date,Nombre d'utilisateurs,Nombre total d'utilisateurs potentiels\n\
                    01/06/2025,12,3410\n\
                    02/06/2025,15,3410\n";
        let records = read_records(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].active_users, 12);
        assert_eq!(records[1].potential_users, 3410);
        assert_eq!(
            records[0].date,
            RecordDate::Valid(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
        );
    }

    #[test]
    fn round_trips_records_including_invalid_dates() {
        let records = vec![
            record("01/01/2024", 10, 100),
            record("31/13/2024", 20, 100),
        ];
        let mut buffer = Vec::new();
        write_records(&mut buffer, &records).unwrap();
        let reloaded = read_records(buffer.as_slice()).unwrap();
        assert_eq!(reloaded, records);
    }

    #[test]
    fn filter_requires_both_year_and_month_match() {
        let records = vec![
            record("01/01/2024", 10, 100),
            record("15/01/2024", 20, 100),
            record("01/02/2024", 5, 100),
            record("01/01/2025", 7, 100),
        ];
        let years = BTreeSet::from([2024]);
        let months = BTreeSet::from([1]);
        let filtered = filter_records(&records, &years, &months);
        assert_eq!(filtered.len(), 2);
        for kept in &filtered {
            let date = kept.date.as_date().unwrap();
            assert_eq!(date.year(), 2024);
            assert_eq!(date.month(), 1);
            assert!(records.contains(kept));
        }
    }

    #[test]
    fn empty_selection_matches_nothing() {
        let records = vec![record("01/01/2024", 10, 100)];
        let filtered = filter_records(&records, &BTreeSet::new(), &BTreeSet::from([1]));
        assert!(filtered.is_empty());
        let filtered = filter_records(&records, &BTreeSet::from([2024]), &BTreeSet::new());
        assert!(filtered.is_empty());
    }

    #[test]
    fn invalid_dates_never_match_and_never_list_options() {
        let records = vec![record("31/13/2024", 10, 100), record("01/03/2024", 4, 100)];
        let years = year_options(&records);
        let months = month_options(&records);
        assert_eq!(years, BTreeSet::from([2024]));
        assert_eq!(months, BTreeSet::from([3]));

        let filtered = filter_records(&records, &years, &BTreeSet::from_iter(1..=12));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].active_users, 4);
    }

    #[test]
    fn no_june_dates_yields_empty_result() {
        let records = vec![record("01/01/2024", 10, 100), record("01/02/2024", 5, 100)];
        let filtered = filter_records(&records, &year_options(&records), &BTreeSet::from([6]));
        assert!(filtered.is_empty());
    }

    #[test]
    fn month_mapping_is_bidirectional() {
        assert_eq!(month_name(1), Some("Janvier"));
        assert_eq!(month_name(8), Some("Août"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
        assert_eq!(month_number("Décembre"), Some(12));
        assert_eq!(month_number("Janvier"), Some(1));
        assert_eq!(month_number("Smarch"), None);
    }
}
