//! Validated mutations for debt records and their payment history.

use chrono::NaiveDate;
use uuid::Uuid;

use duebook_domain::{DebtRecord, DebtStatus, Ledger, PaymentEntry};

use crate::CoreError;

/// Form input for adding or editing a debt record.
///
/// Every field is explicit; nothing is carried over from stale snapshots by
/// accident. `status` is honored verbatim (the manual-override half of the
/// status rules) before the upgrade-only recompute runs.
#[derive(Debug, Clone)]
pub struct DebtDraft {
    pub name: String,
    pub amount: f64,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: Option<DebtStatus>,
}

impl DebtDraft {
    pub fn new(name: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            amount,
            description: None,
            date,
            due_date: None,
            status: None,
        }
    }
}

/// Provides validated mutations for [`DebtRecord`] entities.
pub struct DebtService;

impl DebtService {
    /// Adds a new debt record, prepending it to the ledger.
    pub fn add(ledger: &mut Ledger, draft: DebtDraft) -> Result<Uuid, CoreError> {
        let name = Self::validate_name(&draft.name)?;
        Self::validate_amount(draft.amount)?;

        let mut debt = DebtRecord::new(name, draft.amount, draft.date);
        debt.description = normalize_note(draft.description);
        debt.due_date = draft.due_date;
        if let Some(status) = draft.status {
            debt.status = status;
        }
        Ok(ledger.add_debt(debt))
    }

    /// Updates an existing record, preserving its payment history.
    ///
    /// Status handling mirrors add-time behavior: a draft status is applied
    /// as given, then upgraded to `Paid` when the recorded payments already
    /// cover the new amount. A manual `Paid` is never downgraded here.
    pub fn edit(ledger: &mut Ledger, id: Uuid, draft: DebtDraft) -> Result<(), CoreError> {
        let name = Self::validate_name(&draft.name)?;
        Self::validate_amount(draft.amount)?;

        let debt = ledger.debt_mut(id).ok_or(CoreError::DebtNotFound(id))?;
        debt.name = name;
        debt.amount = draft.amount;
        debt.description = normalize_note(draft.description);
        debt.date = draft.date;
        debt.due_date = draft.due_date;
        if let Some(status) = draft.status {
            debt.status = status;
        }
        debt.settle_if_covered();
        ledger.touch();
        Ok(())
    }

    /// Removes the record and all contained payments irrecoverably.
    pub fn remove(ledger: &mut Ledger, id: Uuid) -> Result<(), CoreError> {
        let before = ledger.debts.len();
        ledger.debts.retain(|debt| debt.id != id);
        if ledger.debts.len() == before {
            return Err(CoreError::DebtNotFound(id));
        }
        ledger.touch();
        Ok(())
    }

    /// Manual override: flips paid/unpaid unconditionally, ignoring sums.
    pub fn toggle_status(ledger: &mut Ledger, id: Uuid) -> Result<DebtStatus, CoreError> {
        let debt = ledger.debt_mut(id).ok_or(CoreError::DebtNotFound(id))?;
        let next = debt.status.flipped();
        debt.set_status_manually(next);
        ledger.touch();
        Ok(next)
    }

    /// Records a payment and recomputes the status from the new sum.
    pub fn add_payment(
        ledger: &mut Ledger,
        id: Uuid,
        amount: f64,
        date: NaiveDate,
        note: Option<String>,
    ) -> Result<Uuid, CoreError> {
        Self::validate_amount(amount)?;
        let debt = ledger.debt_mut(id).ok_or(CoreError::DebtNotFound(id))?;
        let entry = PaymentEntry::new(amount, date, normalize_note(note));
        let payment_id = entry.id;
        debt.payments.push(entry);
        debt.recompute_status();
        ledger.touch();
        Ok(payment_id)
    }

    /// Removes a payment by id, returning whether anything was removed.
    ///
    /// Removing an id that is already gone is an idempotent no-op, so a
    /// stale view on a second device cannot fail the operation.
    pub fn remove_payment(
        ledger: &mut Ledger,
        debt_id: Uuid,
        payment_id: Uuid,
    ) -> Result<bool, CoreError> {
        let debt = ledger
            .debt_mut(debt_id)
            .ok_or(CoreError::DebtNotFound(debt_id))?;
        let before = debt.payments.len();
        debt.payments.retain(|payment| payment.id != payment_id);
        if debt.payments.len() == before {
            return Ok(false);
        }
        debt.recompute_status();
        ledger.touch();
        Ok(true)
    }

    fn validate_name(candidate: &str) -> Result<String, CoreError> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("name must not be empty".into()));
        }
        Ok(trimmed.to_string())
    }

    fn validate_amount(amount: f64) -> Result<(), CoreError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::Validation(
                "amount must be a positive number".into(),
            ));
        }
        Ok(())
    }
}

fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
