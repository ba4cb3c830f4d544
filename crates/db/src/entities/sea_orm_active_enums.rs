//! Database enum types mapped to Postgres enums.
//!
//! Each enum mirrors a domain enum in `oasys-core`; `From` conversions keep
//! the persistence layer and the pure business rules in sync.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User role within an organization.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    /// Full access, can transfer ownership.
    #[sea_orm(string_value = "owner")]
    Owner,
    /// Full access except ownership transfer.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Can post transactions, lock periods, and run the year-end close.
    #[sea_orm(string_value = "accountant")]
    Accountant,
    /// Read-only access.
    #[sea_orm(string_value = "viewer")]
    Viewer,
}

/// Fiscal year status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "fiscal_year_status")]
pub enum FiscalYearStatus {
    /// Year is open for posting.
    #[sea_orm(string_value = "open")]
    Open,
    /// Year has completed its year-end close.
    #[sea_orm(string_value = "closed")]
    Closed,
    /// Year is archived; never deleted.
    #[sea_orm(string_value = "archived")]
    Archived,
}

/// Fiscal year closing workflow status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "closing_status")]
pub enum ClosingStatus {
    /// Close has not begun.
    #[sea_orm(string_value = "not_started")]
    NotStarted,
    /// Close is underway.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Close finished.
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Fiscal period audit status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "audit_status")]
pub enum AuditStatus {
    /// Audit has not begun.
    #[sea_orm(string_value = "not_started")]
    NotStarted,
    /// Audit is underway.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Audit results are being reviewed.
    #[sea_orm(string_value = "under_review")]
    UnderReview,
    /// Audit completed successfully.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Audit failed.
    #[sea_orm(string_value = "failed")]
    Failed,
    /// Audit surfaced an exception.
    #[sea_orm(string_value = "exception")]
    Exception,
}

/// Period granularity setting.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "period_granularity")]
pub enum PeriodGranularity {
    /// One period per month.
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// One period per quarter.
    #[sea_orm(string_value = "quarterly")]
    Quarterly,
    /// A single period per year.
    #[sea_orm(string_value = "yearly")]
    Yearly,
}

/// Prior-period posting policy setting.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "prior_period_policy")]
pub enum PriorPeriodPolicy {
    /// Only the active period accepts postings.
    #[sea_orm(string_value = "deny")]
    Deny,
    /// Soft-closed unlocked prior periods accept limited adjustments.
    #[sea_orm(string_value = "allow_soft_closed")]
    AllowSoftClosed,
}

/// Period exception severity.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "exception_severity")]
pub enum ExceptionSeverity {
    /// Informational discrepancy.
    #[sea_orm(string_value = "low")]
    Low,
    /// Discrepancy worth reviewing.
    #[sea_orm(string_value = "medium")]
    Medium,
    /// Material discrepancy.
    #[sea_orm(string_value = "high")]
    High,
    /// Discrepancy blocking close.
    #[sea_orm(string_value = "critical")]
    Critical,
}

/// Period exception lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "exception_status")]
pub enum ExceptionStatus {
    /// Newly detected.
    #[sea_orm(string_value = "open")]
    Open,
    /// Under investigation.
    #[sea_orm(string_value = "investigating")]
    Investigating,
    /// Root cause fixed.
    #[sea_orm(string_value = "resolved")]
    Resolved,
    /// Accepted as-is.
    #[sea_orm(string_value = "accepted")]
    Accepted,
}

/// Closing entry kind.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "closing_entry_kind")]
pub enum ClosingEntryKind {
    /// Zeroes a revenue account.
    #[sea_orm(string_value = "revenue_close")]
    RevenueClose,
    /// Zeroes an expense account.
    #[sea_orm(string_value = "expense_close")]
    ExpenseClose,
    /// Rolls net income into retained earnings.
    #[sea_orm(string_value = "retained_earnings")]
    RetainedEarnings,
}

/// Year-end adjustment kind.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "adjustment_kind")]
pub enum AdjustmentKind {
    /// Expense incurred but not yet invoiced.
    #[sea_orm(string_value = "accrual")]
    Accrual,
    /// Payment made for a future period.
    #[sea_orm(string_value = "prepayment")]
    Prepayment,
    /// Asset depreciation charge.
    #[sea_orm(string_value = "depreciation")]
    Depreciation,
    /// Provision for an expected liability.
    #[sea_orm(string_value = "provision")]
    Provision,
}

// Conversions between database enums and oasys-core domain enums.

impl From<UserRole> for oasys_core::auth::UserRole {
    fn from(value: UserRole) -> Self {
        match value {
            UserRole::Owner => Self::Owner,
            UserRole::Admin => Self::Admin,
            UserRole::Accountant => Self::Accountant,
            UserRole::Viewer => Self::Viewer,
        }
    }
}

impl From<oasys_core::auth::UserRole> for UserRole {
    fn from(value: oasys_core::auth::UserRole) -> Self {
        match value {
            oasys_core::auth::UserRole::Owner => Self::Owner,
            oasys_core::auth::UserRole::Admin => Self::Admin,
            oasys_core::auth::UserRole::Accountant => Self::Accountant,
            oasys_core::auth::UserRole::Viewer => Self::Viewer,
        }
    }
}

impl From<FiscalYearStatus> for oasys_core::fiscal::FiscalYearStatus {
    fn from(value: FiscalYearStatus) -> Self {
        match value {
            FiscalYearStatus::Open => Self::Open,
            FiscalYearStatus::Closed => Self::Closed,
            FiscalYearStatus::Archived => Self::Archived,
        }
    }
}

impl From<ClosingStatus> for oasys_core::fiscal::ClosingStatus {
    fn from(value: ClosingStatus) -> Self {
        match value {
            ClosingStatus::NotStarted => Self::NotStarted,
            ClosingStatus::InProgress => Self::InProgress,
            ClosingStatus::Completed => Self::Completed,
        }
    }
}

impl From<oasys_core::fiscal::ClosingStatus> for ClosingStatus {
    fn from(value: oasys_core::fiscal::ClosingStatus) -> Self {
        match value {
            oasys_core::fiscal::ClosingStatus::NotStarted => Self::NotStarted,
            oasys_core::fiscal::ClosingStatus::InProgress => Self::InProgress,
            oasys_core::fiscal::ClosingStatus::Completed => Self::Completed,
        }
    }
}

impl From<AuditStatus> for oasys_core::fiscal::AuditStatus {
    fn from(value: AuditStatus) -> Self {
        match value {
            AuditStatus::NotStarted => Self::NotStarted,
            AuditStatus::InProgress => Self::InProgress,
            AuditStatus::UnderReview => Self::UnderReview,
            AuditStatus::Completed => Self::Completed,
            AuditStatus::Failed => Self::Failed,
            AuditStatus::Exception => Self::Exception,
        }
    }
}

impl From<oasys_core::fiscal::AuditStatus> for AuditStatus {
    fn from(value: oasys_core::fiscal::AuditStatus) -> Self {
        match value {
            oasys_core::fiscal::AuditStatus::NotStarted => Self::NotStarted,
            oasys_core::fiscal::AuditStatus::InProgress => Self::InProgress,
            oasys_core::fiscal::AuditStatus::UnderReview => Self::UnderReview,
            oasys_core::fiscal::AuditStatus::Completed => Self::Completed,
            oasys_core::fiscal::AuditStatus::Failed => Self::Failed,
            oasys_core::fiscal::AuditStatus::Exception => Self::Exception,
        }
    }
}

impl From<PeriodGranularity> for oasys_core::fiscal::PeriodGranularity {
    fn from(value: PeriodGranularity) -> Self {
        match value {
            PeriodGranularity::Monthly => Self::Monthly,
            PeriodGranularity::Quarterly => Self::Quarterly,
            PeriodGranularity::Yearly => Self::Yearly,
        }
    }
}

impl From<oasys_core::fiscal::PeriodGranularity> for PeriodGranularity {
    fn from(value: oasys_core::fiscal::PeriodGranularity) -> Self {
        match value {
            oasys_core::fiscal::PeriodGranularity::Monthly => Self::Monthly,
            oasys_core::fiscal::PeriodGranularity::Quarterly => Self::Quarterly,
            oasys_core::fiscal::PeriodGranularity::Yearly => Self::Yearly,
        }
    }
}

impl From<PriorPeriodPolicy> for oasys_core::fiscal::PriorPeriodPolicy {
    fn from(value: PriorPeriodPolicy) -> Self {
        match value {
            PriorPeriodPolicy::Deny => Self::Deny,
            PriorPeriodPolicy::AllowSoftClosed => Self::AllowSoftClosed,
        }
    }
}

impl From<oasys_core::fiscal::PriorPeriodPolicy> for PriorPeriodPolicy {
    fn from(value: oasys_core::fiscal::PriorPeriodPolicy) -> Self {
        match value {
            oasys_core::fiscal::PriorPeriodPolicy::Deny => Self::Deny,
            oasys_core::fiscal::PriorPeriodPolicy::AllowSoftClosed => Self::AllowSoftClosed,
        }
    }
}

impl From<ExceptionSeverity> for oasys_core::fiscal::ExceptionSeverity {
    fn from(value: ExceptionSeverity) -> Self {
        match value {
            ExceptionSeverity::Low => Self::Low,
            ExceptionSeverity::Medium => Self::Medium,
            ExceptionSeverity::High => Self::High,
            ExceptionSeverity::Critical => Self::Critical,
        }
    }
}

impl From<oasys_core::fiscal::ExceptionSeverity> for ExceptionSeverity {
    fn from(value: oasys_core::fiscal::ExceptionSeverity) -> Self {
        match value {
            oasys_core::fiscal::ExceptionSeverity::Low => Self::Low,
            oasys_core::fiscal::ExceptionSeverity::Medium => Self::Medium,
            oasys_core::fiscal::ExceptionSeverity::High => Self::High,
            oasys_core::fiscal::ExceptionSeverity::Critical => Self::Critical,
        }
    }
}

impl From<ExceptionStatus> for oasys_core::fiscal::ExceptionStatus {
    fn from(value: ExceptionStatus) -> Self {
        match value {
            ExceptionStatus::Open => Self::Open,
            ExceptionStatus::Investigating => Self::Investigating,
            ExceptionStatus::Resolved => Self::Resolved,
            ExceptionStatus::Accepted => Self::Accepted,
        }
    }
}

impl From<oasys_core::fiscal::ExceptionStatus> for ExceptionStatus {
    fn from(value: oasys_core::fiscal::ExceptionStatus) -> Self {
        match value {
            oasys_core::fiscal::ExceptionStatus::Open => Self::Open,
            oasys_core::fiscal::ExceptionStatus::Investigating => Self::Investigating,
            oasys_core::fiscal::ExceptionStatus::Resolved => Self::Resolved,
            oasys_core::fiscal::ExceptionStatus::Accepted => Self::Accepted,
        }
    }
}

impl From<oasys_core::fiscal::ClosingEntryKind> for ClosingEntryKind {
    fn from(value: oasys_core::fiscal::ClosingEntryKind) -> Self {
        match value {
            oasys_core::fiscal::ClosingEntryKind::RevenueClose => Self::RevenueClose,
            oasys_core::fiscal::ClosingEntryKind::ExpenseClose => Self::ExpenseClose,
            oasys_core::fiscal::ClosingEntryKind::RetainedEarnings => Self::RetainedEarnings,
        }
    }
}

impl From<oasys_core::fiscal::AdjustmentKind> for AdjustmentKind {
    fn from(value: oasys_core::fiscal::AdjustmentKind) -> Self {
        match value {
            oasys_core::fiscal::AdjustmentKind::Accrual => Self::Accrual,
            oasys_core::fiscal::AdjustmentKind::Prepayment => Self::Prepayment,
            oasys_core::fiscal::AdjustmentKind::Depreciation => Self::Depreciation,
            oasys_core::fiscal::AdjustmentKind::Provision => Self::Provision,
        }
    }
}
