//! duebook-domain
//!
//! Pure domain models (Ledger, DebtRecord, InstallmentPlan, PaymentEntry).
//! No I/O, no storage. Only data types, derived metrics, and date arithmetic.

pub mod common;
pub mod debt;
pub mod installment;
pub mod ledger;
pub mod payment;

pub use common::*;
pub use debt::*;
pub use installment::*;
pub use ledger::*;
pub use payment::*;
