//! Projects ledger state into due-date reminder events.
//!
//! Read-only over the ledger; the current time always arrives through a
//! [`Clock`] so projections stay deterministic.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use duebook_domain::{due_on, DebtRecord, DebtStatus, InstallmentPlan, Ledger};

use crate::{
    format::format_rupiah,
    ics::{render_calendar, Alarm, AlarmTrigger, CalendarEvent, CalendarExport, MonthlyRule},
    time::Clock,
};

const EXPORT_ALL_FILE_NAME: &str = "duebook-schedule.ics";

/// Next date an installment falls due: this month while the due day has not
/// been reached yet, otherwise next month. Days past the target month's end
/// clamp to its last day; the raw due day is reused every month, so a
/// 31st-of-month plan lands on Feb 28 and back on Mar 31.
pub fn next_due_date(plan: &InstallmentPlan, today: NaiveDate) -> NaiveDate {
    if today.day() < plan.due_day {
        due_on(today.year(), today.month(), plan.due_day)
    } else if today.month() == 12 {
        due_on(today.year() + 1, 1, plan.due_day)
    } else {
        due_on(today.year(), today.month() + 1, plan.due_day)
    }
}

/// Signed whole-day difference; negative means overdue, zero means today.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    date.signed_duration_since(today).num_days()
}

/// Builds reminder events and serialized export artifacts from ledger state.
pub struct CalendarService;

impl CalendarService {
    /// One-off reminder for an unpaid debt with a due date; `None` when the
    /// debt has no due date or is already settled.
    pub fn debt_event(debt: &DebtRecord) -> Option<CalendarEvent> {
        let due_date = debt.due_date?;
        if debt.status == DebtStatus::Paid {
            return None;
        }

        let remaining = format_rupiah(debt.remaining());
        let mut description = vec![
            format!("Debt to {}", debt.name),
            format!("Total: {}", format_rupiah(debt.amount)),
            format!("Remaining: {remaining}"),
        ];
        if let Some(note) = &debt.description {
            description.push(format!("Note: {note}"));
        }

        Some(CalendarEvent {
            uid: format!("duebook-{}@duebook", debt.id),
            summary: format!("💸 Debt due: {}", debt.name),
            description,
            start: due_date,
            rrule: None,
            alarms: vec![
                Alarm {
                    trigger: AlarmTrigger::DaysBefore(1),
                    message: format!(
                        "Due tomorrow: debt to {}, remaining {remaining}",
                        debt.name
                    ),
                },
                Alarm {
                    trigger: AlarmTrigger::HoursBefore(2),
                    message: format!("Debt to {} is due today!", debt.name),
                },
            ],
        })
    }

    /// Recurring monthly reminder for the remaining periods of a plan;
    /// `None` once the plan is done or nothing remains.
    pub fn plan_event(plan: &InstallmentPlan, today: NaiveDate) -> Option<CalendarEvent> {
        if plan.is_done() {
            return None;
        }
        let remaining = plan.remaining_installments();
        if remaining == 0 {
            return None;
        }

        let start = next_due_date(plan, today);
        // the UNTIL bound is the COUNT-th occurrence, derived from the same
        // raw due day so the two bounds cannot drift apart
        let until = occurrence(start, plan.due_day, remaining - 1);
        let label = plan.plan_type.label();
        let amount = format_rupiah(plan.installment_amount);

        let mut description = vec![
            format!("{label} {}", plan.name),
            format!("Per month: {amount}"),
            format!("Remaining: {remaining}x of {}x", plan.total_installments),
        ];
        if let Some(notes) = &plan.notes {
            description.push(format!("Notes: {notes}"));
        }

        Some(CalendarEvent {
            uid: format!("duebook-plan-{}@duebook", plan.id),
            summary: format!("🔄 {label}: {}", plan.name),
            description,
            start,
            rrule: Some(MonthlyRule {
                count: remaining,
                until,
            }),
            alarms: vec![
                Alarm {
                    trigger: AlarmTrigger::DaysBefore(2),
                    message: format!("{label} {} due in 2 days: {amount}", plan.name),
                },
                Alarm {
                    trigger: AlarmTrigger::HoursBefore(6),
                    message: format!("{label} {} is due today!", plan.name),
                },
            ],
        })
    }

    /// Serializes reminders for every exportable record; `None` signals
    /// there is nothing to export (no artifact is produced).
    pub fn export_all(ledger: &Ledger, clock: &dyn Clock) -> Option<CalendarExport> {
        let today = clock.today();
        let events: Vec<CalendarEvent> = ledger
            .debts
            .iter()
            .filter_map(Self::debt_event)
            .chain(
                ledger
                    .installments
                    .iter()
                    .filter_map(|plan| Self::plan_event(plan, today)),
            )
            .collect();

        Self::wrap(events, EXPORT_ALL_FILE_NAME.to_string(), clock.now())
    }

    /// Single-debt export; `None` when the record yields no event.
    pub fn export_debt(debt: &DebtRecord, clock: &dyn Clock) -> Option<CalendarExport> {
        let event = Self::debt_event(debt)?;
        Self::wrap(
            vec![event],
            export_one_file_name(&debt.name),
            clock.now(),
        )
    }

    /// Single-plan export; `None` when the record yields no event.
    pub fn export_plan(plan: &InstallmentPlan, clock: &dyn Clock) -> Option<CalendarExport> {
        let event = Self::plan_event(plan, clock.today())?;
        Self::wrap(
            vec![event],
            export_one_file_name(&plan.name),
            clock.now(),
        )
    }

    fn wrap(
        events: Vec<CalendarEvent>,
        file_name: String,
        stamp: DateTime<Utc>,
    ) -> Option<CalendarExport> {
        if events.is_empty() {
            return None;
        }
        Some(CalendarExport {
            file_name,
            contents: render_calendar(stamp, &events),
        })
    }
}

/// Due date of occurrence `k` (zero-based) counted from `start`, always
/// derived per target month from the raw `due_day`.
fn occurrence(start: NaiveDate, due_day: u32, k: u32) -> NaiveDate {
    let months = start.year() * 12 + start.month0() as i32 + k as i32;
    due_on(months.div_euclid(12), months.rem_euclid(12) as u32 + 1, due_day)
}

fn export_one_file_name(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|ch| if ch.is_whitespace() { '-' } else { ch })
        .filter(|ch| ch.is_alphanumeric() || *ch == '-' || *ch == '_')
        .collect();
    if stem.is_empty() {
        EXPORT_ALL_FILE_NAME.to_string()
    } else {
        format!("duebook-{}.ics", stem.to_lowercase())
    }
}
