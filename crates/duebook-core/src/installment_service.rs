//! Validated mutations for installment plans.
//!
//! `paid_installments` and the payment list move in lockstep: only `pay` and
//! `remove_payment` touch both, and the edit path refuses to desynchronize
//! them once any payment entries exist.

use chrono::NaiveDate;
use uuid::Uuid;

use duebook_domain::{InstallmentPlan, Ledger, PaymentEntry, PlanType};

use crate::CoreError;

/// Form input for adding or editing an installment plan.
#[derive(Debug, Clone)]
pub struct PlanDraft {
    pub name: String,
    pub plan_type: PlanType,
    pub total_amount: Option<f64>,
    pub installment_amount: f64,
    pub total_installments: u32,
    pub paid_installments: u32,
    pub due_day: u32,
    pub start_date: NaiveDate,
    pub notes: Option<String>,
}

impl PlanDraft {
    pub fn new(
        name: impl Into<String>,
        installment_amount: f64,
        total_installments: u32,
        due_day: u32,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            plan_type: PlanType::default(),
            total_amount: None,
            installment_amount,
            total_installments,
            paid_installments: 0,
            due_day,
            start_date,
            notes: None,
        }
    }
}

/// Provides validated mutations for [`InstallmentPlan`] entities.
pub struct InstallmentService;

impl InstallmentService {
    /// Adds a new plan; `paid_installments` may start above zero so a plan
    /// already partway paid can be imported.
    pub fn add(ledger: &mut Ledger, draft: PlanDraft) -> Result<Uuid, CoreError> {
        let name = Self::validate(&draft)?;

        let mut plan = InstallmentPlan::new(
            name,
            draft.installment_amount,
            draft.total_installments,
            draft.due_day,
            draft.start_date,
        );
        plan.plan_type = draft.plan_type;
        plan.total_amount = draft.total_amount;
        plan.paid_installments = draft.paid_installments;
        plan.notes = normalize_note(draft.notes);
        plan.recompute_status();
        Ok(ledger.add_installment(plan))
    }

    /// Updates an existing plan, preserving its payment history.
    ///
    /// A draft `paid_installments` differing from the stored count is
    /// rejected once payment entries exist; the count is derived from the
    /// recorded payments from then on.
    pub fn edit(ledger: &mut Ledger, id: Uuid, draft: PlanDraft) -> Result<(), CoreError> {
        let name = Self::validate(&draft)?;

        let plan = ledger
            .installment_mut(id)
            .ok_or(CoreError::PlanNotFound(id))?;
        if !plan.payments.is_empty() && draft.paid_installments != plan.paid_installments {
            return Err(CoreError::Validation(
                "paid installments are derived from recorded payments".into(),
            ));
        }

        plan.name = name;
        plan.plan_type = draft.plan_type;
        plan.total_amount = draft.total_amount;
        plan.installment_amount = draft.installment_amount;
        plan.total_installments = draft.total_installments;
        plan.paid_installments = draft.paid_installments;
        plan.due_day = draft.due_day;
        plan.start_date = draft.start_date;
        plan.notes = normalize_note(draft.notes);
        plan.recompute_status();
        ledger.touch();
        Ok(())
    }

    /// Removes the plan and all contained payments irrecoverably.
    pub fn remove(ledger: &mut Ledger, id: Uuid) -> Result<(), CoreError> {
        let before = ledger.installments.len();
        ledger.installments.retain(|plan| plan.id != id);
        if ledger.installments.len() == before {
            return Err(CoreError::PlanNotFound(id));
        }
        ledger.touch();
        Ok(())
    }

    /// Records one period payment: appends exactly one entry and advances
    /// `paid_installments` by exactly one.
    pub fn pay(
        ledger: &mut Ledger,
        id: Uuid,
        amount: f64,
        date: NaiveDate,
        note: Option<String>,
    ) -> Result<Uuid, CoreError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::Validation(
                "amount must be a positive number".into(),
            ));
        }
        let plan = ledger
            .installment_mut(id)
            .ok_or(CoreError::PlanNotFound(id))?;
        if plan.remaining_installments() == 0 {
            return Err(CoreError::InvalidOperation(
                "plan is already fully paid".into(),
            ));
        }

        let entry = PaymentEntry::new(amount, date, normalize_note(note));
        let payment_id = entry.id;
        plan.payments.push(entry);
        plan.paid_installments += 1;
        plan.recompute_status();
        ledger.touch();
        Ok(payment_id)
    }

    /// Removes one period payment by id, returning whether anything was
    /// removed; the paid count only moves when an entry actually left.
    pub fn remove_payment(
        ledger: &mut Ledger,
        plan_id: Uuid,
        payment_id: Uuid,
    ) -> Result<bool, CoreError> {
        let plan = ledger
            .installment_mut(plan_id)
            .ok_or(CoreError::PlanNotFound(plan_id))?;
        let before = plan.payments.len();
        plan.payments.retain(|payment| payment.id != payment_id);
        if plan.payments.len() == before {
            return Ok(false);
        }
        plan.paid_installments = plan.paid_installments.saturating_sub(1);
        plan.recompute_status();
        ledger.touch();
        Ok(true)
    }

    fn validate(draft: &PlanDraft) -> Result<String, CoreError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("name must not be empty".into()));
        }
        if !draft.installment_amount.is_finite() || draft.installment_amount <= 0.0 {
            return Err(CoreError::Validation(
                "installment amount must be a positive number".into(),
            ));
        }
        if draft.total_installments == 0 {
            return Err(CoreError::Validation(
                "total installments must be at least 1".into(),
            ));
        }
        if draft.paid_installments > draft.total_installments {
            return Err(CoreError::Validation(
                "paid installments cannot exceed the total".into(),
            ));
        }
        if !(1..=31).contains(&draft.due_day) {
            return Err(CoreError::Validation(
                "due day must be between 1 and 31".into(),
            ));
        }
        if let Some(total) = draft.total_amount {
            if !total.is_finite() || total <= 0.0 {
                return Err(CoreError::Validation(
                    "total amount must be a positive number".into(),
                ));
            }
        }
        Ok(name.to_string())
    }
}

fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use duebook_domain::{PaymentHistory, PlanStatus};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger_with_plan(total: u32) -> (Ledger, Uuid) {
        let mut ledger = Ledger::new();
        let id = InstallmentService::add(
            &mut ledger,
            PlanDraft::new("Laptop", 100_000.0, total, 25, date(2024, 1, 25)),
        )
        .expect("add succeeds");
        (ledger, id)
    }

    #[test]
    fn add_validates_every_field() {
        let mut ledger = Ledger::new();
        let base = || PlanDraft::new("Laptop", 100_000.0, 12, 25, date(2024, 1, 25));

        let mut draft = base();
        draft.name = "  ".into();
        assert!(InstallmentService::add(&mut ledger, draft).is_err());

        let mut draft = base();
        draft.installment_amount = 0.0;
        assert!(InstallmentService::add(&mut ledger, draft).is_err());

        let mut draft = base();
        draft.total_installments = 0;
        assert!(InstallmentService::add(&mut ledger, draft).is_err());

        let mut draft = base();
        draft.due_day = 32;
        assert!(InstallmentService::add(&mut ledger, draft).is_err());

        let mut draft = base();
        draft.paid_installments = 13;
        assert!(InstallmentService::add(&mut ledger, draft).is_err());

        assert!(ledger.installments.is_empty());
    }

    #[test]
    fn paid_count_and_payment_list_stay_in_lockstep() {
        let (mut ledger, id) = ledger_with_plan(12);
        let mut payment_ids = Vec::new();
        for month in 1..=12 {
            let pid =
                InstallmentService::pay(&mut ledger, id, 100_000.0, date(2024, month, 25), None)
                    .unwrap();
            payment_ids.push(pid);
            let plan = ledger.installment(id).unwrap();
            assert_eq!(plan.paid_installments as usize, plan.payment_count());
        }

        let plan = ledger.installment(id).unwrap();
        assert_eq!(plan.status, PlanStatus::Done);
        assert_eq!(plan.paid_installments, 12);

        assert!(InstallmentService::remove_payment(&mut ledger, id, payment_ids[11]).unwrap());
        let plan = ledger.installment(id).unwrap();
        assert_eq!(plan.status, PlanStatus::Active);
        assert_eq!(plan.paid_installments, 11);
        assert_eq!(plan.payment_count(), 11);
    }

    #[test]
    fn status_flips_exactly_at_the_boundary() {
        let (mut ledger, id) = ledger_with_plan(3);
        for month in 1..=2 {
            InstallmentService::pay(&mut ledger, id, 100_000.0, date(2024, month, 25), None)
                .unwrap();
            assert_eq!(ledger.installment(id).unwrap().status, PlanStatus::Active);
        }
        InstallmentService::pay(&mut ledger, id, 100_000.0, date(2024, 3, 25), None).unwrap();
        assert_eq!(ledger.installment(id).unwrap().status, PlanStatus::Done);
    }

    #[test]
    fn paying_a_finished_plan_is_rejected() {
        let (mut ledger, id) = ledger_with_plan(1);
        InstallmentService::pay(&mut ledger, id, 100_000.0, date(2024, 1, 25), None).unwrap();
        let err = InstallmentService::pay(&mut ledger, id, 100_000.0, date(2024, 2, 25), None)
            .expect_err("finished plan must reject payments");
        assert!(matches!(err, CoreError::InvalidOperation(_)));
        assert_eq!(ledger.installment(id).unwrap().paid_installments, 1);
    }

    #[test]
    fn remove_payment_is_idempotent_and_floors_at_zero() {
        let (mut ledger, id) = ledger_with_plan(12);
        assert!(!InstallmentService::remove_payment(&mut ledger, id, Uuid::now_v7()).unwrap());
        assert_eq!(ledger.installment(id).unwrap().paid_installments, 0);
    }

    #[test]
    fn edit_rejects_desynchronizing_the_paid_count() {
        let (mut ledger, id) = ledger_with_plan(12);
        InstallmentService::pay(&mut ledger, id, 100_000.0, date(2024, 1, 25), None).unwrap();

        let mut draft = PlanDraft::new("Laptop", 100_000.0, 12, 25, date(2024, 1, 25));
        draft.paid_installments = 5;
        let err = InstallmentService::edit(&mut ledger, id, draft)
            .expect_err("direct paid count edits must fail once payments exist");
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn edit_recomputes_status_in_both_directions() {
        let (mut ledger, id) = ledger_with_plan(12);

        // shrink the plan under an imported paid count: becomes done
        let mut draft = PlanDraft::new("Laptop", 100_000.0, 12, 25, date(2024, 1, 25));
        draft.paid_installments = 6;
        InstallmentService::edit(&mut ledger, id, draft).unwrap();
        let mut draft = PlanDraft::new("Laptop", 100_000.0, 6, 25, date(2024, 1, 25));
        draft.paid_installments = 6;
        InstallmentService::edit(&mut ledger, id, draft).unwrap();
        assert_eq!(ledger.installment(id).unwrap().status, PlanStatus::Done);

        // grow it again: reverts to active
        let mut draft = PlanDraft::new("Laptop", 100_000.0, 10, 25, date(2024, 1, 25));
        draft.paid_installments = 6;
        InstallmentService::edit(&mut ledger, id, draft).unwrap();
        assert_eq!(ledger.installment(id).unwrap().status, PlanStatus::Active);
    }

    #[test]
    fn imported_plans_can_start_partway_paid() {
        let mut ledger = Ledger::new();
        let mut draft = PlanDraft::new("Motor", 500_000.0, 24, 5, date(2023, 9, 5));
        draft.paid_installments = 10;
        let id = InstallmentService::add(&mut ledger, draft).unwrap();

        let plan = ledger.installment(id).unwrap();
        assert_eq!(plan.remaining_installments(), 14);
        assert_eq!(plan.status, PlanStatus::Active);
        assert!(plan.payments.is_empty());
    }
}
