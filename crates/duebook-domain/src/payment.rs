use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Identifiable;

/// A single recorded payment against a debt or installment plan.
///
/// Entries keep their insertion order; `date` is user supplied and may be
/// backdated, so the list is not necessarily sorted by it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentEntry {
    pub id: Uuid,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl PaymentEntry {
    pub fn new(amount: f64, date: NaiveDate, note: Option<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            amount,
            date,
            note,
        }
    }
}

impl Identifiable for PaymentEntry {
    fn id(&self) -> Uuid {
        self.id
    }
}
