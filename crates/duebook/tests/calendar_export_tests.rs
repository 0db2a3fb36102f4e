use chrono::NaiveDate;
use duebook::{
    CalendarService, DebtDraft, DebtService, FixedClock, InstallmentService, Ledger, PlanDraft,
    PlanType,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn clock() -> FixedClock {
    FixedClock::at_date(date(2024, 6, 10))
}

fn populated_ledger() -> Ledger {
    let mut ledger = Ledger::new();

    let mut debt = DebtDraft::new("Budi", 500_000.0, date(2024, 6, 1));
    debt.due_date = Some(date(2024, 6, 25));
    debt.description = Some("electricity loan".into());
    let debt_id = DebtService::add(&mut ledger, debt).unwrap();
    DebtService::add_payment(&mut ledger, debt_id, 200_000.0, date(2024, 6, 5), None).unwrap();

    let mut plan = PlanDraft::new("Laptop", 100_000.0, 12, 25, date(2024, 1, 25));
    plan.plan_type = PlanType::Paylater;
    plan.paid_installments = 9;
    InstallmentService::add(&mut ledger, plan).unwrap();

    ledger
}

#[test]
fn export_all_bundles_debts_and_plans_into_one_artifact() {
    let export = CalendarService::export_all(&populated_ledger(), &clock()).expect("artifact");

    assert_eq!(export.file_name, "duebook-schedule.ics");
    let ics = &export.contents;

    assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(ics.ends_with("END:VCALENDAR\r\n"));
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
    assert_eq!(ics.matches("BEGIN:VALARM").count(), 4);

    // debt reminder
    assert!(ics.contains("SUMMARY:💸 Debt due: Budi"));
    assert!(ics.contains("DTSTART;VALUE=DATE:20240625"));
    assert!(ics.contains("DTEND;VALUE=DATE:20240626"));
    assert!(ics.contains("Remaining: Rp 300.000"));
    assert!(ics.contains("TRIGGER:-P1D"));
    assert!(ics.contains("TRIGGER:-PT2H"));

    // installment reminder: 3 periods left from Jun 25 → Aug 25
    assert!(ics.contains("SUMMARY:🔄 PayLater: Laptop"));
    assert!(ics.contains("RRULE:FREQ=MONTHLY;COUNT=3;UNTIL=20240825"));
    assert!(ics.contains("Remaining: 3x of 12x"));
    assert!(ics.contains("TRIGGER:-P2D"));
    assert!(ics.contains("TRIGGER:-PT6H"));
}

#[test]
fn export_uids_are_stable_per_record() {
    let ledger = populated_ledger();
    let first = CalendarService::export_all(&ledger, &clock()).expect("artifact");
    let second = CalendarService::export_all(&ledger, &clock()).expect("artifact");
    assert_eq!(first.contents, second.contents);

    let debt_uid = format!("UID:duebook-{}@duebook", ledger.debts[0].id);
    let plan_uid = format!("UID:duebook-plan-{}@duebook", ledger.installments[0].id);
    assert!(first.contents.contains(&debt_uid));
    assert!(first.contents.contains(&plan_uid));
}

#[test]
fn nothing_to_export_yields_no_artifact() {
    assert!(CalendarService::export_all(&Ledger::new(), &clock()).is_none());

    // only settled and finished records: still nothing
    let mut ledger = populated_ledger();
    let debt_id = ledger.debts[0].id;
    DebtService::toggle_status(&mut ledger, debt_id).unwrap();
    let plan_id = ledger.installments[0].id;
    for month in [6u32, 7, 8] {
        InstallmentService::pay(&mut ledger, plan_id, 100_000.0, date(2024, month, 25), None)
            .unwrap();
    }
    assert!(CalendarService::export_all(&ledger, &clock()).is_none());
}

#[test]
fn single_record_exports_use_the_sanitized_record_name() {
    let ledger = populated_ledger();
    let export = CalendarService::export_debt(&ledger.debts[0], &clock()).expect("artifact");
    assert_eq!(export.file_name, "duebook-budi.ics");
    assert_eq!(export.contents.matches("BEGIN:VEVENT").count(), 1);

    let export = CalendarService::export_plan(&ledger.installments[0], &clock()).expect("artifact");
    assert_eq!(export.file_name, "duebook-laptop.ics");
    assert!(export.contents.contains("RRULE:FREQ=MONTHLY;COUNT=3"));
}
