use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;

/// A date column value: either a parsed calendar date or the raw text that
/// failed to parse. Invalid dates stay in the dataset but never match a
/// filter or land in a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordDate {
    Valid(NaiveDate),
    Invalid(String),
}

impl RecordDate {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            RecordDate::Valid(date) => Some(*date),
            RecordDate::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub date: RecordDate,
    pub active_users: i64,
    pub potential_users: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl Granularity {
    /// Representative date for the bucket holding `date`: the day itself,
    /// the first of its month, or January 1 of its year.
    pub fn bucket_date(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Month => {
                NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
            }
            Granularity::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Granularity::Day => "daily",
            Granularity::Month => "monthly",
            Granularity::Year => "yearly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageBucket {
    pub bucket_date: NaiveDate,
    pub max_active_users: i64,
    pub max_potential_users: i64,
}

#[derive(Debug, Clone)]
pub struct AggregatedRow {
    pub bucket_date: NaiveDate,
    pub max_active_users: i64,
    pub max_potential_users: i64,
    /// NaN when the bucket has no potential users.
    pub active_ratio: f64,
    pub target_active: f64,
}
