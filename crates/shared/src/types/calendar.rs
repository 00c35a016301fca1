//! Business-calendar helpers.
//!
//! Documents are dated in the configured business timezone, not UTC.
//! A bill rung up just after midnight in the shop must land on the new
//! local day (and numbering year) even while UTC is still on the old one.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

/// Returns the calendar date of `now` in the business timezone.
#[must_use]
pub fn business_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Returns the calendar year of `now` in the business timezone.
///
/// This is the year stamped into document numbers.
#[must_use]
pub fn business_year(now: DateTime<Utc>, tz: Tz) -> i32 {
    business_date(now, tz).year()
}

/// Returns the due date `days` after the business date of `now`.
#[must_use]
pub fn due_date_after(now: DateTime<Utc>, tz: Tz, days: i64) -> NaiveDate {
    business_date(now, tz) + Duration::days(days)
}

/// Days elapsed since `due` as of `today`.
///
/// Positive once the due date has passed, zero on the due date itself,
/// negative before it.
#[must_use]
pub fn days_overdue(due: NaiveDate, today: NaiveDate) -> i64 {
    (today - due).num_days()
}
