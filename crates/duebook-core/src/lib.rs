//! duebook-core
//!
//! Business logic and services for Duebook.
//! Depends on duebook-domain. No terminal I/O, no direct storage interactions.

pub mod calendar_service;
pub mod debt_service;
pub mod error;
pub mod format;
pub mod ics;
pub mod installment_service;
pub mod summary_service;
pub mod sync;
pub mod time;

pub use calendar_service::*;
pub use debt_service::*;
pub use error::CoreError;
pub use ics::*;
pub use installment_service::*;
pub use summary_service::*;
pub use sync::*;
pub use time::*;
