//! One-off debt records with free-form partial payments.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::{Displayable, Identifiable, NamedEntity, PaymentHistory},
    payment::PaymentEntry,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DebtStatus {
    #[default]
    Unpaid,
    Paid,
}

impl DebtStatus {
    pub fn flipped(self) -> Self {
        match self {
            DebtStatus::Unpaid => DebtStatus::Paid,
            DebtStatus::Paid => DebtStatus::Unpaid,
        }
    }
}

impl fmt::Display for DebtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DebtStatus::Unpaid => "Unpaid",
            DebtStatus::Paid => "Paid",
        };
        f.write_str(label)
    }
}

/// A one-time owed amount with partial payments.
///
/// `status` is derived from the payment sum after every payment mutation,
/// but the user may flip it manually afterwards; the manual choice is never
/// auto-corrected. See [`DebtRecord::recompute_status`] versus
/// [`DebtRecord::set_status_manually`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebtRecord {
    pub id: Uuid,
    pub name: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: DebtStatus,
    #[serde(default)]
    pub payments: Vec<PaymentEntry>,
}

impl DebtRecord {
    pub fn new(name: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            amount,
            description: None,
            date,
            due_date: None,
            status: DebtStatus::Unpaid,
            payments: Vec::new(),
        }
    }

    /// Amount still owed, floored at zero when payments overshoot.
    pub fn remaining(&self) -> f64 {
        (self.amount - self.paid_amount()).max(0.0)
    }

    /// Percentage of the principal covered by payments, capped at 100.
    pub fn percent_paid(&self) -> f64 {
        if self.amount <= f64::EPSILON {
            return 100.0;
        }
        (self.paid_amount() / self.amount * 100.0).min(100.0)
    }

    /// True when a due date is set, the debt is unpaid, and the date passed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        matches!(self.status, DebtStatus::Unpaid)
            && self.due_date.map(|due| due < today).unwrap_or(false)
    }

    /// Authoritative payment-path rule: paid iff the sum covers the amount.
    pub fn recompute_status(&mut self) {
        self.status = if self.paid_amount() >= self.amount {
            DebtStatus::Paid
        } else {
            DebtStatus::Unpaid
        };
    }

    /// Upgrade-only variant used after edits: marks the record paid when the
    /// existing payments cover the (possibly new) amount, but never
    /// downgrades a manually chosen `Paid`.
    pub fn settle_if_covered(&mut self) {
        if self.paid_amount() >= self.amount {
            self.status = DebtStatus::Paid;
        }
    }

    /// Manual override path; ignores the payment sum entirely.
    pub fn set_status_manually(&mut self, status: DebtStatus) {
        self.status = status;
    }
}

impl Identifiable for DebtRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for DebtRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

impl PaymentHistory for DebtRecord {
    fn payments(&self) -> &[PaymentEntry] {
        &self.payments
    }
}

impl Displayable for DebtRecord {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.status)
    }
}
