//! Shared traits and month arithmetic for debt-tracking primitives.

use chrono::{Datelike, Duration, NaiveDate};
use uuid::Uuid;

use crate::payment::PaymentEntry;

/// Exposes a stable identifier for entities stored in the ledger.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Common contract for records that accumulate payment entries.
pub trait PaymentHistory {
    fn payments(&self) -> &[PaymentEntry];

    /// Sum of all recorded payment amounts.
    fn paid_amount(&self) -> f64 {
        self.payments().iter().map(|p| p.amount).sum()
    }

    fn payment_count(&self) -> usize {
        self.payments().len()
    }
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    let last_current = first_next - Duration::days(1);
    last_current.day()
}

/// Date of `day` within `(year, month)`, clamped to the month's last day.
///
/// A plan due on the 31st lands on Feb 28 (29 in leap years) and back on
/// Mar 31; the raw day is never lost to the clamp.
pub fn due_on(year: i32, month: u32, day: u32) -> NaiveDate {
    let clamped = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, clamped).unwrap()
}

/// Shifts `date` by whole months, clamping the day to the target month.
pub fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    due_on(year, month as u32, date.day())
}
