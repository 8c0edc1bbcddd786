use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;

use crate::models::{RecordDate, UsageRecord};

/// Exponential ramp rate for the pre-stabilization phase.
const GROWTH_RATE: f64 = 0.1;
/// Multiplicative noise applied to the ramp baseline, drawn from
/// [RAMP_NOISE_MIN, RAMP_NOISE_MAX).
const RAMP_NOISE_MIN: f64 = 0.95;
const RAMP_NOISE_MAX: f64 = 1.05;
/// Extra variation during July and August, inclusive bounds.
const SUMMER_NOISE_MIN: i64 = -100;
const SUMMER_NOISE_MAX: i64 = 100;
/// Small day-to-day fluctuation, drawn from [DAILY_JITTER_MIN, DAILY_JITTER_MAX).
const DAILY_JITTER_MIN: i64 = -5;
const DAILY_JITTER_MAX: i64 = 5;

fn is_summer(date: NaiveDate) -> bool {
    matches!(date.month(), 7 | 8)
}

/// Synthesizes `num_days` of daily usage starting at `start_date`.
///
/// Active users ramp up along a noisy exponential toward
/// `target_users * final_usage_percentage` and are pinned to that plateau
/// from the midpoint of the period onward. July and August add extra noise
/// to both counts; every day gets a small jitter. Counts never go negative.
pub fn generate(
    start_date: NaiveDate,
    num_days: u32,
    target_users: i64,
    final_usage_percentage: f64,
    rng: &mut impl Rng,
) -> Vec<UsageRecord> {
    let max_active_users = (target_users as f64 * final_usage_percentage) as i64;
    let stabilization_day = num_days / 2;

    let mut records = Vec::with_capacity(num_days as usize);
    let mut current_date = start_date;

    for day in 0..num_days {
        let mut daily_users = if day < stabilization_day {
            let baseline = max_active_users as f64 * (1.0 - (-GROWTH_RATE * day as f64).exp());
            let noise_factor = rng.gen_range(RAMP_NOISE_MIN..RAMP_NOISE_MAX);
            (baseline * noise_factor) as i64
        } else {
            max_active_users
        };

        if is_summer(current_date) {
            daily_users += rng.gen_range(SUMMER_NOISE_MIN..=SUMMER_NOISE_MAX);
            daily_users = daily_users.max(0);
        }

        daily_users += rng.gen_range(DAILY_JITTER_MIN..DAILY_JITTER_MAX);
        daily_users = daily_users.max(0);

        let potential_users = if is_summer(current_date) {
            (target_users + rng.gen_range(SUMMER_NOISE_MIN..=SUMMER_NOISE_MAX)).max(0)
        } else {
            target_users
        };

        records.push(UsageRecord {
            date: RecordDate::Valid(current_date),
            active_users: daily_users,
            potential_users,
        });

        current_date += Duration::days(1);
    }

    records
}
