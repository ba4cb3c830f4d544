//! Fiscal domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use oasys_shared::types::{FiscalPeriodId, FiscalYearId, UserId};

/// Status of a fiscal year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiscalYearStatus {
    /// Year is open for posting.
    Open,
    /// Year has completed its year-end close.
    Closed,
    /// Year is archived. Archival is the only way a year leaves the books;
    /// years are never deleted, preserving the audit trail.
    Archived,
}

impl FiscalYearStatus {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Archived => "archived",
        }
    }
}

/// Audit status of a fiscal period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    /// Audit has not begun.
    NotStarted,
    /// Audit is underway.
    InProgress,
    /// Audit results are being reviewed.
    UnderReview,
    /// Audit completed successfully.
    Completed,
    /// Audit failed.
    Failed,
    /// Audit surfaced an exception requiring investigation.
    Exception,
}

impl AuditStatus {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::UnderReview => "under_review",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Exception => "exception",
        }
    }

    /// Parses an audit status from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "under_review" => Some(Self::UnderReview),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "exception" => Some(Self::Exception),
            _ => None,
        }
    }
}

/// Severity of a period exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionSeverity {
    /// Informational discrepancy.
    Low,
    /// Discrepancy worth reviewing.
    Medium,
    /// Material discrepancy.
    High,
    /// Discrepancy blocking close.
    Critical,
}

impl ExceptionSeverity {
    /// Parses a severity from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Lifecycle status of a period exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionStatus {
    /// Newly detected.
    Open,
    /// Under investigation.
    Investigating,
    /// Root cause fixed.
    Resolved,
    /// Accepted as-is (documented, no fix).
    Accepted,
}

impl ExceptionStatus {
    /// Parses an exception status from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "investigating" => Some(Self::Investigating),
            "resolved" => Some(Self::Resolved),
            "accepted" => Some(Self::Accepted),
            _ => None,
        }
    }

    /// Returns true for statuses that end the exception lifecycle.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Accepted)
    }
}

/// How an organization slices its fiscal year into periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodGranularity {
    /// One period per calendar month.
    Monthly,
    /// One period per quarter.
    Quarterly,
    /// A single period spanning the whole year.
    Yearly,
}

impl PeriodGranularity {
    /// Parses a granularity from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

/// Organization policy for posting into non-active prior periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorPeriodPolicy {
    /// Only the active period accepts postings.
    Deny,
    /// Soft-closed, unlocked prior periods accept limited adjustments.
    AllowSoftClosed,
}

impl PriorPeriodPolicy {
    /// Parses a policy from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "deny" => Some(Self::Deny),
            "allow_soft_closed" => Some(Self::AllowSoftClosed),
            _ => None,
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deny => "deny",
            Self::AllowSoftClosed => "allow_soft_closed",
        }
    }
}

/// Kind of a year-end adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentKind {
    /// Expense incurred but not yet invoiced.
    Accrual,
    /// Payment made for a future period.
    Prepayment,
    /// Asset depreciation charge.
    Depreciation,
    /// Provision for an expected liability.
    Provision,
}

impl AdjustmentKind {
    /// Parses an adjustment kind from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "accrual" => Some(Self::Accrual),
            "prepayment" => Some(Self::Prepayment),
            "depreciation" => Some(Self::Depreciation),
            "provision" => Some(Self::Provision),
            _ => None,
        }
    }
}

/// A point-in-time view of a fiscal period, as consumed by the pure
/// posting and close rules. Repositories build these from stored rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodSnapshot {
    /// Period identity.
    pub id: FiscalPeriodId,
    /// Fiscal year this period belongs to.
    pub fiscal_year_id: FiscalYearId,
    /// Period name (e.g. "June 2024").
    pub name: String,
    /// First postable date (inclusive).
    pub start_date: NaiveDate,
    /// Last postable date (inclusive).
    pub end_date: NaiveDate,
    /// Advisory lock preventing any posting.
    pub locked: bool,
    /// Display identity of the locking actor, when locked.
    pub locked_by: Option<String>,
    /// Soft-closed periods accept limited adjustments only.
    pub soft_closed: bool,
    /// Audit progress for this period.
    pub audit_status: AuditStatus,
}

impl PeriodSnapshot {
    /// Returns true if the given date falls within this period
    /// (inclusive on both ends).
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// The lock fields of a period, moved together so the flag, actor, and
/// timestamp never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodLock {
    /// Advisory lock flag.
    pub locked: bool,
    /// Actor holding the lock.
    pub locked_by: Option<UserId>,
    /// When the lock was taken.
    pub locked_at: Option<DateTime<Utc>>,
}

impl PeriodLock {
    /// The field state after `actor` locks the period at `at`.
    #[must_use]
    pub const fn acquired(actor: UserId, at: DateTime<Utc>) -> Self {
        Self {
            locked: true,
            locked_by: Some(actor),
            locked_at: Some(at),
        }
    }

    /// The field state after unlocking: flag cleared, actor and timestamp
    /// erased.
    #[must_use]
    pub const fn released() -> Self {
        Self {
            locked: false,
            locked_by: None,
            locked_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_date_inclusive_bounds() {
        let period = PeriodSnapshot {
            id: FiscalPeriodId::new(),
            fiscal_year_id: FiscalYearId::new(),
            name: "June 2024".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            locked: false,
            locked_by: None,
            soft_closed: false,
            audit_status: AuditStatus::NotStarted,
        };

        assert!(period.contains_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
        assert!(period.contains_date(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()));
        assert!(!period.contains_date(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()));
        assert!(!period.contains_date(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()));
    }

    #[test]
    fn test_enum_wire_round_trips() {
        for status in [
            AuditStatus::NotStarted,
            AuditStatus::InProgress,
            AuditStatus::UnderReview,
            AuditStatus::Completed,
            AuditStatus::Failed,
            AuditStatus::Exception,
        ] {
            assert_eq!(AuditStatus::parse(status.as_str()), Some(status));
        }

        for granularity in [
            PeriodGranularity::Monthly,
            PeriodGranularity::Quarterly,
            PeriodGranularity::Yearly,
        ] {
            assert_eq!(
                PeriodGranularity::parse(granularity.as_str()),
                Some(granularity)
            );
        }

        assert_eq!(
            PriorPeriodPolicy::parse("allow_soft_closed"),
            Some(PriorPeriodPolicy::AllowSoftClosed)
        );
        assert_eq!(PriorPeriodPolicy::parse("bogus"), None);
    }

    #[test]
    fn test_exception_terminal_statuses() {
        assert!(ExceptionStatus::Resolved.is_terminal());
        assert!(ExceptionStatus::Accepted.is_terminal());
        assert!(!ExceptionStatus::Open.is_terminal());
        assert!(!ExceptionStatus::Investigating.is_terminal());
    }

    #[test]
    fn test_unlock_clears_actor_and_timestamp() {
        let actor = UserId::new();
        let locked = PeriodLock::acquired(actor, Utc::now());
        assert!(locked.locked);
        assert_eq!(locked.locked_by, Some(actor));
        assert!(locked.locked_at.is_some());

        // Releasing restores the pristine unlocked state: no stale actor or
        // timestamp survives a lock/unlock round trip.
        let released = PeriodLock::released();
        assert!(!released.locked);
        assert_eq!(released.locked_by, None);
        assert_eq!(released.locked_at, None);
    }
}
