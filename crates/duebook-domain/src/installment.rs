//! Recurring fixed-amount obligations paid in a fixed number of periods.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::{Displayable, Identifiable, NamedEntity, PaymentHistory},
    payment::PaymentEntry,
};

/// Classification only; no behavioral effect beyond display grouping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    Paylater,
    Microloan,
    #[default]
    MonthlyInstallment,
    CreditLease,
    Other,
}

impl PlanType {
    /// Short label used in reminder summaries and grouping headers.
    pub fn label(self) -> &'static str {
        match self {
            PlanType::Paylater => "PayLater",
            PlanType::Microloan => "Microloan",
            PlanType::MonthlyInstallment => "Installment",
            PlanType::CreditLease => "Lease",
            PlanType::Other => "Installment",
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    #[default]
    Active,
    Done,
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlanStatus::Active => "Active",
            PlanStatus::Done => "Done",
        };
        f.write_str(label)
    }
}

/// An installment obligation: `total_installments` periods of
/// `installment_amount`, due on `due_day` of each month.
///
/// `paid_installments` and `payments` move in lockstep through the pay and
/// remove-payment operations; `status` is fully derived from the counts and
/// has no manual override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstallmentPlan {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub plan_type: PlanType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    pub installment_amount: f64,
    pub total_installments: u32,
    #[serde(default)]
    pub paid_installments: u32,
    pub due_day: u32,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: PlanStatus,
    #[serde(default)]
    pub payments: Vec<PaymentEntry>,
}

impl InstallmentPlan {
    pub fn new(
        name: impl Into<String>,
        installment_amount: f64,
        total_installments: u32,
        due_day: u32,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            plan_type: PlanType::default(),
            total_amount: None,
            installment_amount,
            total_installments,
            paid_installments: 0,
            due_day,
            start_date,
            notes: None,
            status: PlanStatus::Active,
            payments: Vec::new(),
        }
    }

    /// Total principal; falls back to `installment_amount * total_installments`
    /// when no explicit total was supplied.
    pub fn effective_total(&self) -> f64 {
        self.total_amount
            .unwrap_or(self.installment_amount * self.total_installments as f64)
    }

    pub fn remaining_installments(&self) -> u32 {
        self.total_installments.saturating_sub(self.paid_installments)
    }

    /// Percentage of periods paid, capped at 100.
    pub fn percent_paid(&self) -> f64 {
        if self.total_installments == 0 {
            return 100.0;
        }
        (self.paid_installments as f64 / self.total_installments as f64 * 100.0).min(100.0)
    }

    /// Exposure still scheduled: remaining periods times the period amount.
    pub fn outstanding_amount(&self) -> f64 {
        self.remaining_installments() as f64 * self.installment_amount
    }

    pub fn is_done(&self) -> bool {
        matches!(self.status, PlanStatus::Done)
    }

    /// Done exactly when all periods are paid; reverts to Active below that.
    pub fn recompute_status(&mut self) {
        self.status = if self.paid_installments >= self.total_installments {
            PlanStatus::Done
        } else {
            PlanStatus::Active
        };
    }
}

impl Identifiable for InstallmentPlan {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for InstallmentPlan {
    fn name(&self) -> &str {
        &self.name
    }
}

impl PaymentHistory for InstallmentPlan {
    fn payments(&self) -> &[PaymentEntry] {
        &self.payments
    }
}

impl Displayable for InstallmentPlan {
    fn display_label(&self) -> String {
        format!(
            "{} {} ({}/{})",
            self.plan_type.label(),
            self.name,
            self.paid_installments,
            self.total_installments
        )
    }
}
