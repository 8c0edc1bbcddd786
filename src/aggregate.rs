use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::{Granularity, UsageBucket, UsageRecord};

/// Buckets valid-dated records at the given granularity, reducing each
/// count column by max independently. Counts are treated as
/// cumulative-like within a bucket, so max smooths out intra-period dips.
/// Result is sorted by bucket date ascending.
pub fn aggregate(records: &[UsageRecord], granularity: Granularity) -> Vec<UsageBucket> {
    let mut groups: HashMap<NaiveDate, (i64, i64)> = HashMap::new();

    for record in records {
        let Some(date) = record.date.as_date() else {
            continue;
        };
        let entry = groups
            .entry(granularity.bucket_date(date))
            .or_insert((record.active_users, record.potential_users));
        entry.0 = entry.0.max(record.active_users);
        entry.1 = entry.1.max(record.potential_users);
    }

    let mut buckets: Vec<UsageBucket> = groups
        .into_iter()
        .map(|(bucket_date, (max_active, max_potential))| UsageBucket {
            bucket_date,
            max_active_users: max_active,
            max_potential_users: max_potential,
        })
        .collect();

    buckets.sort_by_key(|bucket| bucket.bucket_date);
    buckets
}
