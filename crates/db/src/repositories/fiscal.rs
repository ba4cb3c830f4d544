//! Fiscal year and period repository for database operations.
//!
//! Owns the persisted side of the period lifecycle: lock/unlock, soft close,
//! activation, audit progress, exceptions, adjustments, and the year-end
//! close and rollover transactions. The pure rules live in `oasys-core`;
//! this module loads rows, builds snapshots, and applies the decisions.

use chrono::NaiveDate;
use oasys_core::fiscal::{
    AccountBalance, AuditStatus, CloseValidation, ClosingStatus, FiscalYearStatus,
    PeriodGranularity, PeriodLock, PeriodSnapshot, PostingDecision,
    can_post_transaction_with_policy, generate_closing_entries, generate_opening_balances,
    generate_periods, next_year_range, validate_audit_transition, validate_closing_transition,
    validate_exception_transition, validate_year_end_close,
};
use oasys_shared::types::{FiscalPeriodId, FiscalYearId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{
    closing_entries, fiscal_periods, fiscal_years, opening_balances, organizations,
    period_exceptions, sea_orm_active_enums, users, year_end_adjustments,
};

/// Error types for fiscal operations.
#[derive(Debug, thiserror::Error)]
pub enum FiscalError {
    /// Start date must be before end date.
    #[error("Start date must be before end date")]
    InvalidDateRange,

    /// Fiscal year overlaps with existing year.
    #[error("Fiscal year overlaps with existing year: {0}")]
    OverlappingYear(String),

    /// Fiscal year not found.
    #[error("Fiscal year not found: {0}")]
    YearNotFound(Uuid),

    /// Fiscal period not found.
    #[error("Fiscal period not found: {0}")]
    PeriodNotFound(Uuid),

    /// Organization not found.
    #[error("Organization not found: {0}")]
    OrganizationNotFound(Uuid),

    /// Period exception not found.
    #[error("Period exception not found: {0}")]
    ExceptionNotFound(Uuid),

    /// The operation requires the fiscal year to be open.
    #[error("Fiscal year {name} is {status}, not open")]
    YearNotOpen {
        /// Year name.
        name: String,
        /// Current status.
        status: String,
    },

    /// The operation requires the fiscal year to be closed.
    #[error("Fiscal year {name} is {status}, not closed")]
    YearNotClosed {
        /// Year name.
        name: String,
        /// Current status.
        status: String,
    },

    /// Business rule violation from the core layer.
    #[error(transparent)]
    Core(#[from] oasys_core::fiscal::FiscalError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Fiscal year with nested periods.
#[derive(Debug, Clone)]
pub struct FiscalYearWithPeriods {
    /// The fiscal year record.
    pub fiscal_year: fiscal_years::Model,
    /// The fiscal periods within this year, ordered by period number.
    pub periods: Vec<fiscal_periods::Model>,
}

/// Input for creating a fiscal year.
#[derive(Debug, Clone)]
pub struct CreateFiscalYearInput {
    /// Organization ID.
    pub organization_id: Uuid,
    /// Fiscal year name (e.g. "FY 2026").
    pub name: String,
    /// Start date of the fiscal year.
    pub start_date: NaiveDate,
    /// End date of the fiscal year.
    pub end_date: NaiveDate,
    /// Period granularity for generated periods.
    pub granularity: PeriodGranularity,
}

/// Input for recording a period exception.
#[derive(Debug, Clone)]
pub struct CreateExceptionInput {
    /// Period the discrepancy was found in.
    pub fiscal_period_id: Uuid,
    /// Short title.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Severity.
    pub severity: oasys_core::fiscal::ExceptionSeverity,
    /// Reporting user.
    pub created_by: Uuid,
}

/// Input for recording a year-end adjustment.
#[derive(Debug, Clone)]
pub struct CreateAdjustmentInput {
    /// Fiscal year the adjustment belongs to.
    pub fiscal_year_id: Uuid,
    /// Adjustment kind.
    pub kind: oasys_core::fiscal::AdjustmentKind,
    /// Description of the adjustment.
    pub description: String,
    /// Account the adjustment posts to.
    pub account_code: String,
    /// Adjustment amount.
    pub amount: rust_decimal::Decimal,
    /// Effective date.
    pub entry_date: NaiveDate,
    /// Recording user.
    pub created_by: Uuid,
}

/// The outcome of a year-end close attempt.
///
/// Validation failures are a structured outcome, not an error: the caller
/// gets the blocker list back with a 200.
#[derive(Debug, Clone)]
pub enum CloseOutcome {
    /// The close was blocked; nothing was persisted.
    Blocked(CloseValidation),
    /// The year was closed and closing entries were persisted.
    Closed {
        /// The closed year.
        fiscal_year: fiscal_years::Model,
        /// The generated closing entries.
        entries: Vec<closing_entries::Model>,
    },
}

/// Validates that `start_date` is strictly before `end_date`.
///
/// # Errors
///
/// Returns `FiscalError::InvalidDateRange` when it is not.
pub fn validate_date_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), FiscalError> {
    if start_date >= end_date {
        return Err(FiscalError::InvalidDateRange);
    }
    Ok(())
}

/// Checks if two inclusive date ranges overlap.
#[must_use]
pub fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Fiscal year and period repository.
#[derive(Debug, Clone)]
pub struct FiscalRepository {
    db: DatabaseConnection,
}

impl FiscalRepository {
    /// Creates a new fiscal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a fiscal year with auto-generated periods.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `start_date >= end_date`
    /// - the range overlaps an existing fiscal year of the organization
    /// - the database operation fails
    pub async fn create_fiscal_year(
        &self,
        input: CreateFiscalYearInput,
    ) -> Result<FiscalYearWithPeriods, FiscalError> {
        validate_date_range(input.start_date, input.end_date)?;

        let overlapping = fiscal_years::Entity::find()
            .filter(fiscal_years::Column::OrganizationId.eq(input.organization_id))
            .filter(fiscal_years::Column::StartDate.lte(input.end_date))
            .filter(fiscal_years::Column::EndDate.gte(input.start_date))
            .one(&self.db)
            .await?;

        if let Some(existing) = overlapping {
            return Err(FiscalError::OverlappingYear(existing.name));
        }

        let txn = self.db.begin().await?;
        let created = insert_year_with_periods(
            &txn,
            input.organization_id,
            &input.name,
            input.start_date,
            input.end_date,
            input.granularity,
            None,
        )
        .await?;
        txn.commit().await?;

        Ok(created)
    }

    /// Lists fiscal years with nested periods for an organization, most
    /// recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_fiscal_years(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<FiscalYearWithPeriods>, FiscalError> {
        let years = fiscal_years::Entity::find()
            .filter(fiscal_years::Column::OrganizationId.eq(organization_id))
            .order_by_desc(fiscal_years::Column::StartDate)
            .all(&self.db)
            .await?;

        let mut results = Vec::with_capacity(years.len());
        for fy in years {
            let periods = self.periods_of_year(fy.id).await?;
            results.push(FiscalYearWithPeriods {
                fiscal_year: fy,
                periods,
            });
        }

        Ok(results)
    }

    /// Finds a fiscal year by ID with its periods.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_fiscal_year_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<FiscalYearWithPeriods>, FiscalError> {
        let Some(fy) = fiscal_years::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let periods = self.periods_of_year(fy.id).await?;
        Ok(Some(FiscalYearWithPeriods {
            fiscal_year: fy,
            periods,
        }))
    }

    /// Finds a fiscal period by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_period_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<fiscal_periods::Model>, FiscalError> {
        let period = fiscal_periods::Entity::find_by_id(id).one(&self.db).await?;
        Ok(period)
    }

    /// Finds the organization's active period, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_active_period(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<fiscal_periods::Model>, FiscalError> {
        let period = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::OrganizationId.eq(organization_id))
            .filter(fiscal_periods::Column::IsActive.eq(true))
            .one(&self.db)
            .await?;
        Ok(period)
    }

    /// Finds the fiscal period containing a specific date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_period_for_date(
        &self,
        organization_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<fiscal_periods::Model>, FiscalError> {
        let period = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::OrganizationId.eq(organization_id))
            .filter(fiscal_periods::Column::StartDate.lte(date))
            .filter(fiscal_periods::Column::EndDate.gte(date))
            .one(&self.db)
            .await?;
        Ok(period)
    }

    /// Makes a period the organization's single active period.
    ///
    /// Clears the flag on every other period of the organization in the
    /// same transaction, so exactly one period stays active.
    ///
    /// # Errors
    ///
    /// Returns an error if the period is missing, its year is not open, or
    /// the database operation fails.
    pub async fn activate_period(
        &self,
        period_id: Uuid,
    ) -> Result<fiscal_periods::Model, FiscalError> {
        let period = self.require_period(period_id).await?;
        self.require_open_year(period.fiscal_year_id).await?;

        let txn = self.db.begin().await?;
        let updated = activate_period_in(&txn, &period).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Locks a period against posting, recording the actor and time.
    ///
    /// Locking an already-locked period is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns an error if the period is missing or the update fails.
    pub async fn lock_period(
        &self,
        period_id: Uuid,
        user_id: Uuid,
    ) -> Result<fiscal_periods::Model, FiscalError> {
        let period = self.require_period(period_id).await?;
        if period.locked {
            return Ok(period);
        }

        let now = chrono::Utc::now();
        let lock = PeriodLock::acquired(UserId::from_uuid(user_id), now);
        let mut active: fiscal_periods::ActiveModel = period.into();
        active.locked = Set(lock.locked);
        active.locked_by = Set(lock.locked_by.map(UserId::into_inner));
        active.locked_at = Set(lock.locked_at.map(Into::into));
        active.updated_at = Set(now.into());

        Ok(active.update(&self.db).await?)
    }

    /// Unlocks a period, clearing the lock flag, actor, and timestamp.
    ///
    /// Unlocking an unlocked period is a no-op success. Periods of a closed
    /// or archived year stay locked.
    ///
    /// # Errors
    ///
    /// Returns an error if the period is missing, its year is not open, or
    /// the update fails.
    pub async fn unlock_period(
        &self,
        period_id: Uuid,
    ) -> Result<fiscal_periods::Model, FiscalError> {
        let period = self.require_period(period_id).await?;
        self.require_open_year(period.fiscal_year_id).await?;

        if !period.locked {
            return Ok(period);
        }

        let lock = PeriodLock::released();
        let mut active: fiscal_periods::ActiveModel = period.into();
        active.locked = Set(lock.locked);
        active.locked_by = Set(lock.locked_by.map(UserId::into_inner));
        active.locked_at = Set(lock.locked_at.map(Into::into));
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Sets or clears a period's soft-closed flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the period is missing, its year is not open, or
    /// the update fails.
    pub async fn set_soft_closed(
        &self,
        period_id: Uuid,
        soft_closed: bool,
    ) -> Result<fiscal_periods::Model, FiscalError> {
        let period = self.require_period(period_id).await?;
        self.require_open_year(period.fiscal_year_id).await?;

        if period.soft_closed == soft_closed {
            return Ok(period);
        }

        let mut active: fiscal_periods::ActiveModel = period.into();
        active.soft_closed = Set(soft_closed);
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Advances a period's audit status, enforcing the transition rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the period is missing, the transition is not
    /// allowed, or the update fails.
    pub async fn update_audit_status(
        &self,
        period_id: Uuid,
        new_status: AuditStatus,
    ) -> Result<fiscal_periods::Model, FiscalError> {
        let period = self.require_period(period_id).await?;
        let current: AuditStatus = period.audit_status.clone().into();
        validate_audit_transition(current, new_status)?;

        let mut active: fiscal_periods::ActiveModel = period.into();
        active.audit_status = Set(new_status.into());
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Decides whether a transaction dated `date` may be posted for the
    /// organization, honoring its prior-period policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the organization is missing or a query fails.
    pub async fn posting_check(
        &self,
        organization_id: Uuid,
        date: NaiveDate,
    ) -> Result<PostingDecision, FiscalError> {
        let org = organizations::Entity::find_by_id(organization_id)
            .one(&self.db)
            .await?
            .ok_or(FiscalError::OrganizationNotFound(organization_id))?;

        let active = self.find_active_period(organization_id).await?;
        let active_snapshot = match &active {
            Some(p) => Some(self.snapshot(p).await?),
            None => None,
        };

        let policy: oasys_core::fiscal::PriorPeriodPolicy = org.prior_period_policy.into();

        // Only the policy path needs the full period set; skip the scan
        // under the default deny policy.
        let all_snapshots = if policy == oasys_core::fiscal::PriorPeriodPolicy::Deny {
            Vec::new()
        } else {
            let periods = fiscal_periods::Entity::find()
                .filter(fiscal_periods::Column::OrganizationId.eq(organization_id))
                .all(&self.db)
                .await?;
            let mut snapshots = Vec::with_capacity(periods.len());
            for p in &periods {
                snapshots.push(self.snapshot(p).await?);
            }
            snapshots
        };

        Ok(can_post_transaction_with_policy(
            date,
            active_snapshot.as_ref(),
            &all_snapshots,
            policy,
        ))
    }

    /// Starts the year-end close: `not_started -> in_progress`.
    ///
    /// When the organization has `auto_lock_on_close` set, every still
    /// unlocked period of the year is locked in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the year is missing or not open, the closing
    /// transition is not allowed, or the database operation fails.
    pub async fn begin_year_end_close(
        &self,
        year_id: Uuid,
        user_id: Uuid,
    ) -> Result<FiscalYearWithPeriods, FiscalError> {
        let fy = self.require_year(year_id).await?;
        require_open(&fy)?;

        let current: ClosingStatus = fy.closing_status.clone().into();
        validate_closing_transition(current, ClosingStatus::InProgress)?;

        let org = organizations::Entity::find_by_id(fy.organization_id)
            .one(&self.db)
            .await?
            .ok_or(FiscalError::OrganizationNotFound(fy.organization_id))?;

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().into();

        if org.auto_lock_on_close {
            let unlocked = fiscal_periods::Entity::find()
                .filter(fiscal_periods::Column::FiscalYearId.eq(year_id))
                .filter(fiscal_periods::Column::Locked.eq(false))
                .all(&txn)
                .await?;

            for period in unlocked {
                let mut active: fiscal_periods::ActiveModel = period.into();
                active.locked = Set(true);
                active.locked_by = Set(Some(user_id));
                active.locked_at = Set(Some(now));
                active.updated_at = Set(now);
                active.update(&txn).await?;
            }
        }

        let mut active: fiscal_years::ActiveModel = fy.into();
        active.closing_status = Set(sea_orm_active_enums::ClosingStatus::InProgress);
        active.updated_at = Set(now);
        let fy = active.update(&txn).await?;

        txn.commit().await?;

        let periods = self.periods_of_year(fy.id).await?;
        Ok(FiscalYearWithPeriods {
            fiscal_year: fy,
            periods,
        })
    }

    /// Reports what currently blocks the year-end close.
    ///
    /// # Errors
    ///
    /// Returns an error if the year or its organization is missing, or a
    /// query fails.
    pub async fn validate_close(&self, year_id: Uuid) -> Result<CloseValidation, FiscalError> {
        let fy = self.require_year(year_id).await?;

        let org = organizations::Entity::find_by_id(fy.organization_id)
            .one(&self.db)
            .await?
            .ok_or(FiscalError::OrganizationNotFound(fy.organization_id))?;

        let periods = self.periods_of_year(year_id).await?;
        let mut snapshots = Vec::with_capacity(periods.len());
        for p in &periods {
            snapshots.push(self.snapshot(p).await?);
        }

        Ok(validate_year_end_close(
            &snapshots,
            org.require_audit_before_close,
        ))
    }

    /// Closes a fiscal year.
    ///
    /// Validation failures come back as `CloseOutcome::Blocked` with the
    /// blocker list; nothing is persisted in that case. On success the year
    /// is marked closed with actor and timestamp, the closing status moves
    /// to completed, and the closing entries generated from the supplied
    /// balances are persisted, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the year is missing or not open, or the database
    /// operation fails.
    pub async fn close_fiscal_year(
        &self,
        year_id: Uuid,
        user_id: Uuid,
        balances: &[AccountBalance],
    ) -> Result<CloseOutcome, FiscalError> {
        let fy = self.require_year(year_id).await?;
        require_open(&fy)?;

        let validation = self.validate_close(year_id).await?;
        if !validation.valid {
            return Ok(CloseOutcome::Blocked(validation));
        }

        let lines = generate_closing_entries(balances);

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().into();

        let mut entries = Vec::with_capacity(lines.len());
        for line in lines {
            let (debit, credit) = match line.kind {
                // Revenue closes with a debit, expenses and the retained
                // earnings carry close with a credit.
                oasys_core::fiscal::ClosingEntryKind::RevenueClose => {
                    (line.amount, rust_decimal::Decimal::ZERO)
                }
                oasys_core::fiscal::ClosingEntryKind::ExpenseClose
                | oasys_core::fiscal::ClosingEntryKind::RetainedEarnings => {
                    (rust_decimal::Decimal::ZERO, line.amount)
                }
            };

            let entry = closing_entries::ActiveModel {
                id: Set(Uuid::new_v4()),
                fiscal_year_id: Set(year_id),
                organization_id: Set(fy.organization_id),
                kind: Set(line.kind.into()),
                account_code: Set(line.account_code),
                account_name: Set(line.account_name),
                debit: Set(debit),
                credit: Set(credit),
                created_at: Set(now),
            };
            entries.push(entry.insert(&txn).await?);
        }

        let mut active: fiscal_years::ActiveModel = fy.into();
        active.status = Set(sea_orm_active_enums::FiscalYearStatus::Closed);
        active.closing_status = Set(sea_orm_active_enums::ClosingStatus::Completed);
        active.closed_by = Set(Some(user_id));
        active.closed_at = Set(Some(now));
        active.updated_at = Set(now);
        let fy = active.update(&txn).await?;

        txn.commit().await?;

        Ok(CloseOutcome::Closed {
            fiscal_year: fy,
            entries,
        })
    }

    /// Rolls a closed year over into the next fiscal year.
    ///
    /// Computes the next range from the closed year's end date, generates
    /// periods at the organization's granularity, derives the opening trial
    /// balance from the supplied closing balances, and activates the new
    /// year's first period. All in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the source year is missing or not closed, the
    /// next range overlaps an existing year, or the database operation
    /// fails.
    pub async fn rollover_to_next_year(
        &self,
        year_id: Uuid,
        balances: &[AccountBalance],
    ) -> Result<FiscalYearWithPeriods, FiscalError> {
        let fy = self.require_year(year_id).await?;
        if fy.status != sea_orm_active_enums::FiscalYearStatus::Closed {
            return Err(FiscalError::YearNotClosed {
                name: fy.name,
                status: fiscal_year_status(&fy.status).as_str().to_string(),
            });
        }

        let org = organizations::Entity::find_by_id(fy.organization_id)
            .one(&self.db)
            .await?
            .ok_or(FiscalError::OrganizationNotFound(fy.organization_id))?;

        let (start, end) = next_year_range(fy.end_date);

        let overlapping = fiscal_years::Entity::find()
            .filter(fiscal_years::Column::OrganizationId.eq(fy.organization_id))
            .filter(fiscal_years::Column::StartDate.lte(end))
            .filter(fiscal_years::Column::EndDate.gte(start))
            .one(&self.db)
            .await?;

        if let Some(existing) = overlapping {
            return Err(FiscalError::OverlappingYear(existing.name));
        }

        let granularity: PeriodGranularity = org.period_granularity.into();
        let name = next_year_name(&fy.name, start);

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().into();

        let created = insert_year_with_periods(
            &txn,
            fy.organization_id,
            &name,
            start,
            end,
            granularity,
            None,
        )
        .await?;

        for line in generate_opening_balances(balances) {
            opening_balances::ActiveModel {
                id: Set(Uuid::new_v4()),
                fiscal_year_id: Set(created.fiscal_year.id),
                source_fiscal_year_id: Set(year_id),
                organization_id: Set(fy.organization_id),
                account_code: Set(line.account_code),
                account_name: Set(line.account_name),
                debit: Set(line.debit),
                credit: Set(line.credit),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        let mut periods = created.periods;
        if let Some(first) = periods.first().cloned() {
            let activated = activate_period_in(&txn, &first).await?;
            periods[0] = activated;
        }

        txn.commit().await?;

        Ok(FiscalYearWithPeriods {
            fiscal_year: created.fiscal_year,
            periods,
        })
    }

    /// Archives a closed fiscal year. Years are archived, never deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the year is missing or not closed, or the update
    /// fails.
    pub async fn archive_fiscal_year(
        &self,
        year_id: Uuid,
    ) -> Result<fiscal_years::Model, FiscalError> {
        let fy = self.require_year(year_id).await?;
        if fy.status != sea_orm_active_enums::FiscalYearStatus::Closed {
            return Err(FiscalError::YearNotClosed {
                name: fy.name,
                status: fiscal_year_status(&fy.status).as_str().to_string(),
            });
        }

        let mut active: fiscal_years::ActiveModel = fy.into();
        active.status = Set(sea_orm_active_enums::FiscalYearStatus::Archived);
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Records a period exception in `open` status.
    ///
    /// # Errors
    ///
    /// Returns an error if the period is missing or the insert fails.
    pub async fn create_exception(
        &self,
        input: CreateExceptionInput,
    ) -> Result<period_exceptions::Model, FiscalError> {
        let period = self.require_period(input.fiscal_period_id).await?;
        let now = chrono::Utc::now().into();

        let exception = period_exceptions::ActiveModel {
            id: Set(Uuid::new_v4()),
            fiscal_period_id: Set(period.id),
            organization_id: Set(period.organization_id),
            title: Set(input.title),
            description: Set(input.description),
            severity: Set(input.severity.into()),
            status: Set(sea_orm_active_enums::ExceptionStatus::Open),
            resolution_note: Set(None),
            detected_at: Set(now),
            resolved_at: Set(None),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(exception.insert(&self.db).await?)
    }

    /// Finds a period exception by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_exception_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<period_exceptions::Model>, FiscalError> {
        let exception = period_exceptions::Entity::find_by_id(id).one(&self.db).await?;
        Ok(exception)
    }

    /// Progresses an exception through its lifecycle.
    ///
    /// Terminal statuses (`resolved`, `accepted`) stamp `resolved_at` and
    /// are immutable afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the exception is missing, the transition is not
    /// allowed, or the update fails.
    pub async fn update_exception_status(
        &self,
        exception_id: Uuid,
        new_status: oasys_core::fiscal::ExceptionStatus,
        resolution_note: Option<String>,
    ) -> Result<period_exceptions::Model, FiscalError> {
        let exception = period_exceptions::Entity::find_by_id(exception_id)
            .one(&self.db)
            .await?
            .ok_or(FiscalError::ExceptionNotFound(exception_id))?;

        let current: oasys_core::fiscal::ExceptionStatus = exception.status.clone().into();
        validate_exception_transition(current, new_status)?;

        let now = chrono::Utc::now().into();
        let mut active: period_exceptions::ActiveModel = exception.into();
        active.status = Set(new_status.into());
        if new_status.is_terminal() {
            active.resolved_at = Set(Some(now));
        }
        if let Some(note) = resolution_note {
            active.resolution_note = Set(Some(note));
        }
        active.updated_at = Set(now);

        Ok(active.update(&self.db).await?)
    }

    /// Lists the exceptions of a period, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_exceptions(
        &self,
        period_id: Uuid,
    ) -> Result<Vec<period_exceptions::Model>, FiscalError> {
        let exceptions = period_exceptions::Entity::find()
            .filter(period_exceptions::Column::FiscalPeriodId.eq(period_id))
            .order_by_desc(period_exceptions::Column::DetectedAt)
            .all(&self.db)
            .await?;
        Ok(exceptions)
    }

    /// Records a year-end adjustment against an open year.
    ///
    /// # Errors
    ///
    /// Returns an error if the year is missing or not open, or the insert
    /// fails.
    pub async fn create_adjustment(
        &self,
        input: CreateAdjustmentInput,
    ) -> Result<year_end_adjustments::Model, FiscalError> {
        let fy = self.require_year(input.fiscal_year_id).await?;
        require_open(&fy)?;

        let now = chrono::Utc::now().into();
        let adjustment = year_end_adjustments::ActiveModel {
            id: Set(Uuid::new_v4()),
            fiscal_year_id: Set(fy.id),
            organization_id: Set(fy.organization_id),
            kind: Set(input.kind.into()),
            description: Set(input.description),
            account_code: Set(input.account_code),
            amount: Set(input.amount),
            entry_date: Set(input.entry_date),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(adjustment.insert(&self.db).await?)
    }

    /// Lists the adjustments of a fiscal year, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_adjustments(
        &self,
        year_id: Uuid,
    ) -> Result<Vec<year_end_adjustments::Model>, FiscalError> {
        let adjustments = year_end_adjustments::Entity::find()
            .filter(year_end_adjustments::Column::FiscalYearId.eq(year_id))
            .order_by_desc(year_end_adjustments::Column::EntryDate)
            .all(&self.db)
            .await?;
        Ok(adjustments)
    }

    /// Lists the closing entries of a fiscal year.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_closing_entries(
        &self,
        year_id: Uuid,
    ) -> Result<Vec<closing_entries::Model>, FiscalError> {
        let entries = closing_entries::Entity::find()
            .filter(closing_entries::Column::FiscalYearId.eq(year_id))
            .order_by_asc(closing_entries::Column::AccountCode)
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    /// Lists the opening balances of a fiscal year.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_opening_balances(
        &self,
        year_id: Uuid,
    ) -> Result<Vec<opening_balances::Model>, FiscalError> {
        let balances = opening_balances::Entity::find()
            .filter(opening_balances::Column::FiscalYearId.eq(year_id))
            .order_by_asc(opening_balances::Column::AccountCode)
            .all(&self.db)
            .await?;
        Ok(balances)
    }

    async fn periods_of_year(
        &self,
        year_id: Uuid,
    ) -> Result<Vec<fiscal_periods::Model>, FiscalError> {
        let periods = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::FiscalYearId.eq(year_id))
            .order_by_asc(fiscal_periods::Column::PeriodNumber)
            .all(&self.db)
            .await?;
        Ok(periods)
    }

    async fn require_period(&self, id: Uuid) -> Result<fiscal_periods::Model, FiscalError> {
        fiscal_periods::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(FiscalError::PeriodNotFound(id))
    }

    async fn require_year(&self, id: Uuid) -> Result<fiscal_years::Model, FiscalError> {
        fiscal_years::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(FiscalError::YearNotFound(id))
    }

    async fn require_open_year(&self, year_id: Uuid) -> Result<fiscal_years::Model, FiscalError> {
        let fy = self.require_year(year_id).await?;
        require_open(&fy)?;
        Ok(fy)
    }

    /// Builds the snapshot the core rules consume, resolving `locked_by` to
    /// the actor's email so denial reasons name a person.
    async fn snapshot(&self, period: &fiscal_periods::Model) -> Result<PeriodSnapshot, FiscalError> {
        let locked_by = match period.locked_by {
            Some(user_id) => users::Entity::find_by_id(user_id)
                .one(&self.db)
                .await?
                .map(|u| u.email),
            None => None,
        };

        Ok(PeriodSnapshot {
            id: FiscalPeriodId::from_uuid(period.id),
            fiscal_year_id: FiscalYearId::from_uuid(period.fiscal_year_id),
            name: period.name.clone(),
            start_date: period.start_date,
            end_date: period.end_date,
            locked: period.locked,
            locked_by,
            soft_closed: period.soft_closed,
            audit_status: period.audit_status.clone().into(),
        })
    }
}

fn require_open(fy: &fiscal_years::Model) -> Result<(), FiscalError> {
    if fy.status == sea_orm_active_enums::FiscalYearStatus::Open {
        Ok(())
    } else {
        Err(FiscalError::YearNotOpen {
            name: fy.name.clone(),
            status: fiscal_year_status(&fy.status).as_str().to_string(),
        })
    }
}

const fn fiscal_year_status(status: &sea_orm_active_enums::FiscalYearStatus) -> FiscalYearStatus {
    match status {
        sea_orm_active_enums::FiscalYearStatus::Open => FiscalYearStatus::Open,
        sea_orm_active_enums::FiscalYearStatus::Closed => FiscalYearStatus::Closed,
        sea_orm_active_enums::FiscalYearStatus::Archived => FiscalYearStatus::Archived,
    }
}

/// Derives a name for the year starting at `start`. "FY 2026" style names
/// get the new start year substituted; anything else falls back to
/// "FY <year>".
fn next_year_name(previous: &str, start: NaiveDate) -> String {
    use chrono::Datelike;

    let year = start.year();
    if previous.to_ascii_lowercase().starts_with("fy") {
        let prefix: String = previous.chars().take_while(|c| !c.is_ascii_digit()).collect();
        format!("{prefix}{year}")
    } else {
        format!("FY {year}")
    }
}

/// Inserts a fiscal year and its generated periods on the given connection.
///
/// When `activate_containing` is set, the period containing that date (or
/// the first period) is created active. Used by organization provisioning,
/// which runs inside the organization's own transaction.
pub(crate) async fn insert_year_with_periods<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    name: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    granularity: PeriodGranularity,
    activate_containing: Option<NaiveDate>,
) -> Result<FiscalYearWithPeriods, DbErr> {
    let now = chrono::Utc::now().into();
    let fiscal_year_id = Uuid::new_v4();

    let fiscal_year = fiscal_years::ActiveModel {
        id: Set(fiscal_year_id),
        organization_id: Set(organization_id),
        name: Set(name.to_string()),
        start_date: Set(start_date),
        end_date: Set(end_date),
        status: Set(sea_orm_active_enums::FiscalYearStatus::Open),
        closing_status: Set(sea_orm_active_enums::ClosingStatus::NotStarted),
        closed_at: Set(None),
        closed_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let fiscal_year = fiscal_year.insert(conn).await?;

    let specs = generate_periods(granularity, start_date, end_date);
    let mut periods = Vec::with_capacity(specs.len());

    for spec in specs {
        let is_active = activate_containing
            .is_some_and(|date| date >= spec.start_date && date <= spec.end_date);

        let period = fiscal_periods::ActiveModel {
            id: Set(Uuid::new_v4()),
            fiscal_year_id: Set(fiscal_year_id),
            organization_id: Set(organization_id),
            period_number: Set(spec.number),
            name: Set(spec.name),
            start_date: Set(spec.start_date),
            end_date: Set(spec.end_date),
            is_active: Set(is_active),
            locked: Set(false),
            locked_by: Set(None),
            locked_at: Set(None),
            soft_closed: Set(false),
            audit_status: Set(sea_orm_active_enums::AuditStatus::NotStarted),
            transaction_count: Set(0),
            total_debits: Set(rust_decimal::Decimal::ZERO),
            total_credits: Set(rust_decimal::Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        };
        periods.push(period.insert(conn).await?);
    }

    Ok(FiscalYearWithPeriods {
        fiscal_year,
        periods,
    })
}

/// Sets `period` active and clears the flag everywhere else in the
/// organization, on the given connection.
async fn activate_period_in<C: ConnectionTrait>(
    conn: &C,
    period: &fiscal_periods::Model,
) -> Result<fiscal_periods::Model, DbErr> {
    let now = chrono::Utc::now();

    fiscal_periods::Entity::update_many()
        .col_expr(
            fiscal_periods::Column::IsActive,
            sea_orm::sea_query::Expr::value(false),
        )
        .col_expr(
            fiscal_periods::Column::UpdatedAt,
            sea_orm::sea_query::Expr::value(now),
        )
        .filter(fiscal_periods::Column::OrganizationId.eq(period.organization_id))
        .filter(fiscal_periods::Column::IsActive.eq(true))
        .filter(fiscal_periods::Column::Id.ne(period.id))
        .exec(conn)
        .await?;

    let mut active: fiscal_periods::ActiveModel = period.clone().into();
    active.is_active = Set(true);
    active.updated_at = Set(now.into());
    active.update(conn).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_valid_date_range() {
        assert!(validate_date_range(date(2026, 1, 1), date(2026, 12, 31)).is_ok());
    }

    #[test]
    fn test_same_date_rejected() {
        assert!(matches!(
            validate_date_range(date(2026, 1, 1), date(2026, 1, 1)),
            Err(FiscalError::InvalidDateRange)
        ));
    }

    #[test]
    fn test_end_before_start_rejected() {
        assert!(matches!(
            validate_date_range(date(2026, 12, 31), date(2026, 1, 1)),
            Err(FiscalError::InvalidDateRange)
        ));
    }

    #[test]
    fn test_overlapping_years_detected() {
        assert!(date_ranges_overlap(
            date(2026, 1, 1),
            date(2026, 12, 31),
            date(2026, 7, 1),
            date(2027, 6, 30),
        ));
    }

    #[test]
    fn test_adjacent_years_do_not_overlap() {
        assert!(!date_ranges_overlap(
            date(2025, 1, 1),
            date(2025, 12, 31),
            date(2026, 1, 1),
            date(2026, 12, 31),
        ));
    }

    #[test]
    fn test_next_year_name_fy_style() {
        assert_eq!(next_year_name("FY 2025", date(2026, 1, 1)), "FY 2026");
        assert_eq!(next_year_name("FY2025", date(2026, 1, 1)), "FY2026");
    }

    #[test]
    fn test_next_year_name_fallback() {
        assert_eq!(
            next_year_name("Calendar 2025", date(2026, 1, 1)),
            "FY 2026"
        );
    }
}

#[cfg(test)]
mod props {
    use super::*;
    use proptest::prelude::*;

    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (2020i32..=2030, 1u32..=12, 1u32..=28)
            .prop_map(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day).unwrap())
    }

    fn valid_range() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
        date_strategy().prop_flat_map(|start| {
            (Just(start), 1i64..=365)
                .prop_map(move |(s, days)| (s, s + chrono::Duration::days(days)))
        })
    }

    proptest! {
        #[test]
        fn prop_valid_date_range_accepted((start, end) in valid_range()) {
            prop_assert!(validate_date_range(start, end).is_ok());
        }

        #[test]
        fn prop_overlap_is_symmetric(
            (a_start, a_end) in valid_range(),
            (b_start, b_end) in valid_range(),
        ) {
            prop_assert_eq!(
                date_ranges_overlap(a_start, a_end, b_start, b_end),
                date_ranges_overlap(b_start, b_end, a_start, a_end)
            );
        }

        #[test]
        fn prop_adjacent_ranges_do_not_overlap((a_start, a_end) in valid_range()) {
            let b_start = a_end + chrono::Duration::days(1);
            let b_end = b_start + chrono::Duration::days(30);
            prop_assert!(!date_ranges_overlap(a_start, a_end, b_start, b_end));
        }
    }
}
