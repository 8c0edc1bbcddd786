use crate::models::{AggregatedRow, UsageBucket};

/// Active users must reach 30% of the potential population to be on
/// target.
pub const TARGET_RATIO: f64 = 0.30;

/// Derives the active/potential ratio and the target line for each
/// bucket. A bucket with no potential users gets a NaN ratio rather than
/// a division failure.
pub fn annotate(buckets: Vec<UsageBucket>) -> Vec<AggregatedRow> {
    buckets
        .into_iter()
        .map(|bucket| {
            let potential = bucket.max_potential_users as f64;
            let active_ratio = if bucket.max_potential_users == 0 {
                f64::NAN
            } else {
                bucket.max_active_users as f64 / potential
            };
            AggregatedRow {
                bucket_date: bucket.bucket_date,
                max_active_users: bucket.max_active_users,
                max_potential_users: bucket.max_potential_users,
                active_ratio,
                target_active: potential * TARGET_RATIO,
            }
        })
        .collect()
}

/// The chronologically last bucket. Rows arrive sorted ascending from the
/// aggregation stage.
pub fn headline(rows: &[AggregatedRow]) -> Option<&AggregatedRow> {
    rows.last()
}

/// NaN ratios are off target.
pub fn on_target(active_ratio: f64) -> bool {
    active_ratio >= TARGET_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bucket(year: i32, month: u32, active: i64, potential: i64) -> UsageBucket {
        UsageBucket {
            bucket_date: NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
            max_active_users: active,
            max_potential_users: potential,
        }
    }

    #[test]
    fn annotates_ratio_and_target() {
        let rows = annotate(vec![bucket(2024, 1, 20, 100)]);
        assert_eq!(rows.len(), 1);
        assert!((rows[0].active_ratio - 0.20).abs() < 1e-9);
        assert!((rows[0].target_active - 30.0).abs() < 1e-9);
    }

    #[test]
    fn zero_potential_yields_nan_ratio_without_panicking() {
        let rows = annotate(vec![bucket(2024, 1, 20, 0)]);
        assert!(rows[0].active_ratio.is_nan());
        assert_eq!(rows[0].target_active, 0.0);
    }

    #[test]
    fn ratios_above_one_are_allowed() {
        // Nothing forces active <= potential.
        let rows = annotate(vec![bucket(2024, 1, 150, 100)]);
        assert!((rows[0].active_ratio - 1.5).abs() < 1e-9);
        assert!(on_target(rows[0].active_ratio));
    }

    #[test]
    fn headline_is_the_last_bucket() {
        let rows = annotate(vec![bucket(2024, 1, 20, 100), bucket(2024, 2, 5, 100)]);
        let last = headline(&rows).unwrap();
        assert_eq!(last.bucket_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(last.max_active_users, 5);
    }

    #[test]
    fn headline_of_empty_table_is_none() {
        assert!(headline(&[]).is_none());
    }

    #[test]
    fn target_threshold_is_inclusive() {
        assert!(on_target(0.30));
        assert!(!on_target(0.299));
        assert!(!on_target(f64::NAN));
    }
}
