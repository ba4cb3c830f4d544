//! Fiscal year and period lifecycle management.
//!
//! This module implements the fiscal-period subsystem:
//! - the posting gatekeeper deciding whether a transaction date is postable,
//! - period lock/unlock and audit-status rules,
//! - year-end close validation, closing entries, and rollover.
//!
//! Business-rule outcomes that callers must render (posting decisions,
//! close validation) are returned as structured values, never as errors.

pub mod audit;
pub mod calendar;
pub mod close;
pub mod error;
pub mod gatekeeper;
pub mod types;

pub use audit::{validate_audit_transition, validate_exception_transition};
pub use calendar::{
    PeriodSpec, fiscal_year_range, generate_periods, next_year_range, parse_fiscal_year_start,
};
pub use close::{
    AccountBalance, AccountKind, CloseValidation, ClosingEntryKind, ClosingEntryLine,
    ClosingStatus, OpeningBalanceLine, RETAINED_EARNINGS_CODE, RETAINED_EARNINGS_NAME,
    generate_closing_entries, generate_opening_balances, validate_closing_transition,
    validate_year_end_close,
};
pub use error::FiscalError;
pub use gatekeeper::{PostingDecision, can_post_transaction, can_post_transaction_with_policy};
pub use types::{
    AdjustmentKind, AuditStatus, ExceptionSeverity, ExceptionStatus, FiscalYearStatus,
    PeriodGranularity, PeriodLock, PeriodSnapshot, PriorPeriodPolicy,
};
