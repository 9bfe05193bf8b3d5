//! Option expiry selection.
//!
//! Uses the provider's listed expiries when available and otherwise falls
//! back to the exchange's weekly schedule. Weekly contracts expire at the
//! 15:30 close on the exchange calendar (Asia/Kolkata).

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Asia::Kolkata;

/// Market close on expiry day, exchange local time.
const EXPIRY_CUTOFF: (u32, u32) = (15, 30);

fn cutoff() -> NaiveTime {
    NaiveTime::from_hms_opt(EXPIRY_CUTOFF.0, EXPIRY_CUTOFF.1, 0).unwrap_or(NaiveTime::MIN)
}

/// Weekday on which weekly options on `underlying` expire.
///
/// `underlying` is a display name or instrument key, e.g. "Nifty Bank".
pub fn weekly_expiry_weekday(underlying: &str) -> Weekday {
    let name = underlying.to_lowercase();
    if name.contains("bank") {
        Weekday::Wed
    } else if name.contains("midcap") || name.contains("midcp") {
        Weekday::Mon
    } else if name.contains("fin") {
        Weekday::Tue
    } else {
        Weekday::Thu
    }
}

/// Whether a contract expiring on `expiry` can still be traded at `now`.
pub fn is_tradable(expiry: NaiveDate, now: DateTime<Utc>) -> bool {
    let local = now.with_timezone(&Kolkata);
    let today = local.date_naive();
    expiry > today || (expiry == today && local.time() < cutoff())
}

/// Next weekly expiry for `underlying`, rolling to the following week once
/// the expiry-day close has passed.
pub fn next_weekly_expiry(underlying: &str, now: DateTime<Utc>) -> NaiveDate {
    let target = weekly_expiry_weekday(underlying);
    let today = now.with_timezone(&Kolkata).date_naive();

    let days_ahead = (7 + target.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        % 7;
    let candidate = today + Duration::days(days_ahead);
    if is_tradable(candidate, now) {
        candidate
    } else {
        candidate + Duration::days(7)
    }
}

/// Nearest tradable expiry from `listed`, or the weekly schedule when none
/// of the listed expiries is still tradable.
pub fn select_expiry(listed: &[NaiveDate], underlying: &str, now: DateTime<Utc>) -> NaiveDate {
    listed
        .iter()
        .copied()
        .filter(|d| is_tradable(*d, now))
        .min()
        .unwrap_or_else(|| next_weekly_expiry(underlying, now))
}
