//! The root aggregate synchronized across devices as one remote document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{debt::DebtRecord, installment::InstallmentPlan};

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Complete snapshot of all tracked debts and installment plans.
///
/// Records are stored newest first; ids are uuid v7, so creation order can
/// always be recovered by sorting regardless of presentation order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ledger {
    pub id: Uuid,
    #[serde(default)]
    pub debts: Vec<DebtRecord>,
    #[serde(default)]
    pub installments: Vec<InstallmentPlan>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            debts: Vec::new(),
            installments: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_debt(&mut self, debt: DebtRecord) -> Uuid {
        let id = debt.id;
        self.debts.insert(0, debt);
        self.touch();
        id
    }

    pub fn add_installment(&mut self, plan: InstallmentPlan) -> Uuid {
        let id = plan.id;
        self.installments.insert(0, plan);
        self.touch();
        id
    }

    pub fn debt(&self, id: Uuid) -> Option<&DebtRecord> {
        self.debts.iter().find(|debt| debt.id == id)
    }

    pub fn debt_mut(&mut self, id: Uuid) -> Option<&mut DebtRecord> {
        self.debts.iter_mut().find(|debt| debt.id == id)
    }

    pub fn installment(&self, id: Uuid) -> Option<&InstallmentPlan> {
        self.installments.iter().find(|plan| plan.id == id)
    }

    pub fn installment_mut(&mut self, id: Uuid) -> Option<&mut InstallmentPlan> {
        self.installments.iter_mut().find(|plan| plan.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.debts.is_empty() && self.installments.is_empty()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
