//! Audit-status and exception-status transition rules.

use crate::fiscal::error::FiscalError;
use crate::fiscal::types::{AuditStatus, ExceptionStatus};

/// Validates a period audit-status transition.
///
/// Audits move forward through `not_started -> in_progress -> under_review`
/// and settle in `completed`, `failed`, or `exception`. Settled audits can
/// only be reopened to `in_progress`.
///
/// # Errors
///
/// Returns `FiscalError::InvalidAuditTransition` for anything else.
pub fn validate_audit_transition(from: AuditStatus, to: AuditStatus) -> Result<(), FiscalError> {
    use AuditStatus::{Completed, Exception, Failed, InProgress, NotStarted, UnderReview};

    let valid = match (from, to) {
        _ if from == to => true,
        (NotStarted, InProgress)
        | (InProgress, UnderReview | Completed | Failed | Exception)
        | (UnderReview, Completed | Failed | Exception | InProgress)
        | (Completed | Failed | Exception, InProgress) => true,
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(FiscalError::InvalidAuditTransition { from, to })
    }
}

/// Validates a period-exception status transition.
///
/// Exceptions follow `open -> investigating -> resolved | accepted`; an open
/// exception may also be resolved or accepted directly. Terminal statuses
/// are immutable.
///
/// # Errors
///
/// Returns `FiscalError::InvalidExceptionTransition` for anything else.
pub fn validate_exception_transition(
    from: ExceptionStatus,
    to: ExceptionStatus,
) -> Result<(), FiscalError> {
    use ExceptionStatus::{Accepted, Investigating, Open, Resolved};

    let valid = match (from, to) {
        _ if from == to => true,
        (Open, Investigating | Resolved | Accepted) | (Investigating, Resolved | Accepted) => true,
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(FiscalError::InvalidExceptionTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_forward_transitions() {
        use AuditStatus::{Completed, Exception, Failed, InProgress, NotStarted, UnderReview};

        assert!(validate_audit_transition(NotStarted, InProgress).is_ok());
        assert!(validate_audit_transition(InProgress, UnderReview).is_ok());
        assert!(validate_audit_transition(InProgress, Completed).is_ok());
        assert!(validate_audit_transition(UnderReview, Failed).is_ok());
        assert!(validate_audit_transition(UnderReview, Exception).is_ok());
    }

    #[test]
    fn test_audit_reopen_only_to_in_progress() {
        use AuditStatus::{Completed, Failed, InProgress, NotStarted, UnderReview};

        assert!(validate_audit_transition(Completed, InProgress).is_ok());
        assert!(validate_audit_transition(Failed, InProgress).is_ok());

        assert!(validate_audit_transition(Completed, UnderReview).is_err());
        assert!(validate_audit_transition(Completed, NotStarted).is_err());
        assert!(validate_audit_transition(NotStarted, Completed).is_err());
    }

    #[test]
    fn test_audit_same_status_is_noop() {
        for status in [
            AuditStatus::NotStarted,
            AuditStatus::InProgress,
            AuditStatus::UnderReview,
            AuditStatus::Completed,
            AuditStatus::Failed,
            AuditStatus::Exception,
        ] {
            assert!(validate_audit_transition(status, status).is_ok());
        }
    }

    #[test]
    fn test_exception_lifecycle() {
        use ExceptionStatus::{Accepted, Investigating, Open, Resolved};

        assert!(validate_exception_transition(Open, Investigating).is_ok());
        assert!(validate_exception_transition(Open, Resolved).is_ok());
        assert!(validate_exception_transition(Open, Accepted).is_ok());
        assert!(validate_exception_transition(Investigating, Resolved).is_ok());
        assert!(validate_exception_transition(Investigating, Accepted).is_ok());
    }

    #[test]
    fn test_exception_terminal_statuses_immutable() {
        use ExceptionStatus::{Accepted, Investigating, Open, Resolved};

        assert!(validate_exception_transition(Resolved, Open).is_err());
        assert!(validate_exception_transition(Resolved, Investigating).is_err());
        assert!(validate_exception_transition(Accepted, Open).is_err());
        assert!(validate_exception_transition(Investigating, Open).is_err());
    }
}
