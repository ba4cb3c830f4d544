//! Fiscal domain errors.

use thiserror::Error;

use crate::fiscal::close::ClosingStatus;
use crate::fiscal::types::{AuditStatus, ExceptionStatus};

/// Errors raised by fiscal business rules.
///
/// These cover programmer-facing rule violations. Outcomes the UI is meant
/// to display (posting denials, close validation failures) are structured
/// return values instead - see `gatekeeper` and `close`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FiscalError {
    /// Start date must be before end date.
    #[error("start date must be before end date")]
    InvalidDateRange,

    /// Fiscal year start must be a valid "MM-DD" string.
    #[error("invalid fiscal year start: {0} (expected MM-DD)")]
    InvalidFiscalYearStart(String),

    /// Invalid audit status transition.
    #[error("invalid audit status transition from {from:?} to {to:?}")]
    InvalidAuditTransition {
        /// Current audit status.
        from: AuditStatus,
        /// Target audit status.
        to: AuditStatus,
    },

    /// Invalid exception status transition.
    #[error("invalid exception status transition from {from:?} to {to:?}")]
    InvalidExceptionTransition {
        /// Current exception status.
        from: ExceptionStatus,
        /// Target exception status.
        to: ExceptionStatus,
    },

    /// Invalid closing status transition.
    #[error("invalid closing status transition from {from:?} to {to:?}")]
    InvalidClosingTransition {
        /// Current closing status.
        from: ClosingStatus,
        /// Target closing status.
        to: ClosingStatus,
    },
}
