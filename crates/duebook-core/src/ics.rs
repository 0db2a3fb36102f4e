//! Minimal iCalendar (RFC 5545) event model and writer.
//!
//! Only the subset the reminder projector emits: all-day VEVENTs with
//! DISPLAY alarms and an optional monthly RRULE carrying both a COUNT and an
//! UNTIL bound.

use std::io::{self, Write};

use chrono::{DateTime, Duration, NaiveDate, Utc};

pub const ICS_PRODID: &str = "-//Duebook//Duebook 0.1//ID";
pub const ICS_CALENDAR_NAME: &str = "Duebook - Due Date Reminders";
pub const ICS_TIMEZONE: &str = "Asia/Jakarta";

const CRLF: &str = "\r\n";

/// Relative reminder offset before the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmTrigger {
    DaysBefore(u32),
    HoursBefore(u32),
}

impl AlarmTrigger {
    fn as_ics(self) -> String {
        match self {
            AlarmTrigger::DaysBefore(days) => format!("-P{days}D"),
            AlarmTrigger::HoursBefore(hours) => format!("-PT{hours}H"),
        }
    }
}

/// A DISPLAY alarm attached to an event.
#[derive(Debug, Clone, PartialEq)]
pub struct Alarm {
    pub trigger: AlarmTrigger,
    pub message: String,
}

/// Monthly recurrence bounded both by occurrence count and by the date of
/// the final occurrence. Callers must derive `until` from `count` so the two
/// bounds can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyRule {
    pub count: u32,
    pub until: NaiveDate,
}

/// One all-day calendar event, possibly recurring monthly.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    /// Stable per source record, so re-exports yield the same identifier.
    pub uid: String,
    pub summary: String,
    /// Description lines; joined with escaped newlines on write.
    pub description: Vec<String>,
    pub start: NaiveDate,
    pub rrule: Option<MonthlyRule>,
    pub alarms: Vec<Alarm>,
}

/// A serialized calendar artifact ready to be offered as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarExport {
    pub file_name: String,
    pub contents: String,
}

/// Escapes TEXT values per RFC 5545 §3.3.11.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out
}

fn ics_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

fn ics_datetime(stamp: DateTime<Utc>) -> String {
    stamp.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Writes a complete VCALENDAR container around the given events.
pub fn write_calendar<W: Write>(
    mut w: W,
    stamp: DateTime<Utc>,
    events: &[CalendarEvent],
) -> io::Result<()> {
    write!(w, "BEGIN:VCALENDAR{CRLF}")?;
    write!(w, "VERSION:2.0{CRLF}")?;
    write!(w, "PRODID:{ICS_PRODID}{CRLF}")?;
    write!(w, "CALSCALE:GREGORIAN{CRLF}")?;
    write!(w, "METHOD:PUBLISH{CRLF}")?;
    write!(w, "X-WR-CALNAME:{ICS_CALENDAR_NAME}{CRLF}")?;
    write!(w, "X-WR-TIMEZONE:{ICS_TIMEZONE}{CRLF}")?;
    for event in events {
        write_event(&mut w, stamp, event)?;
    }
    write!(w, "END:VCALENDAR{CRLF}")?;
    Ok(())
}

fn write_event<W: Write>(w: &mut W, stamp: DateTime<Utc>, event: &CalendarEvent) -> io::Result<()> {
    let end = event.start + Duration::days(1);
    write!(w, "BEGIN:VEVENT{CRLF}")?;
    write!(w, "UID:{}{CRLF}", event.uid)?;
    write!(w, "DTSTAMP:{}{CRLF}", ics_datetime(stamp))?;
    write!(w, "DTSTART;VALUE=DATE:{}{CRLF}", ics_date(event.start))?;
    write!(w, "DTEND;VALUE=DATE:{}{CRLF}", ics_date(end))?;
    if let Some(rule) = event.rrule {
        write!(
            w,
            "RRULE:FREQ=MONTHLY;COUNT={};UNTIL={}{CRLF}",
            rule.count,
            ics_date(rule.until)
        )?;
    }
    write!(w, "SUMMARY:{}{CRLF}", escape_text(&event.summary))?;
    let description = event
        .description
        .iter()
        .map(|line| escape_text(line))
        .collect::<Vec<_>>()
        .join("\\n");
    write!(w, "DESCRIPTION:{description}{CRLF}")?;
    for alarm in &event.alarms {
        write!(w, "BEGIN:VALARM{CRLF}")?;
        write!(w, "TRIGGER:{}{CRLF}", alarm.trigger.as_ics())?;
        write!(w, "ACTION:DISPLAY{CRLF}")?;
        write!(w, "DESCRIPTION:{}{CRLF}", escape_text(&alarm.message))?;
        write!(w, "END:VALARM{CRLF}")?;
    }
    write!(w, "END:VEVENT{CRLF}")?;
    Ok(())
}

/// Renders the container into an owned string.
pub fn render_calendar(stamp: DateTime<Utc>, events: &[CalendarEvent]) -> String {
    let mut buf = Vec::new();
    // writing to a Vec<u8> cannot fail
    write_calendar(&mut buf, stamp, events).expect("in-memory write");
    String::from_utf8(buf).expect("ics output is valid utf-8")
}
