//! Organization repository for database operations.
//!
//! Organization creation is the tenant provisioning step: it inserts the
//! organization, the owner membership, and the initial fiscal year with its
//! periods in one transaction, with the period containing today active.

use chrono::NaiveDate;
use oasys_core::fiscal::{self, PeriodGranularity, PriorPeriodPolicy};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{organization_users, organizations, sea_orm_active_enums, users};
use crate::repositories::fiscal::{FiscalError, FiscalYearWithPeriods, insert_year_with_periods};

/// Error types for organization operations.
#[derive(Debug, thiserror::Error)]
pub enum OrganizationError {
    /// Slug is already taken.
    #[error("Organization slug is already taken: {0}")]
    SlugTaken(String),

    /// Organization not found.
    #[error("Organization not found: {0}")]
    NotFound(Uuid),

    /// Invalid fiscal-year-start or policy setting.
    #[error(transparent)]
    InvalidSetting(#[from] fiscal::FiscalError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<FiscalError> for OrganizationError {
    fn from(err: FiscalError) -> Self {
        match err {
            FiscalError::Core(core) => Self::InvalidSetting(core),
            FiscalError::Database(db) => Self::Database(db),
            other => Self::Database(DbErr::Custom(other.to_string())),
        }
    }
}

/// Input for creating an organization.
#[derive(Debug, Clone)]
pub struct CreateOrganizationInput {
    /// Display name.
    pub name: String,
    /// URL-safe unique slug.
    pub slug: String,
    /// ISO 4217 base currency code.
    pub base_currency: String,
    /// IANA timezone name.
    pub timezone: String,
    /// First day of the fiscal year as "MM-DD".
    pub fiscal_year_start: String,
    /// Period granularity for generated fiscal years.
    pub granularity: PeriodGranularity,
    /// Lock all periods automatically when the year-end close begins.
    pub auto_lock_on_close: bool,
    /// Require every period audit to be completed before close.
    pub require_audit_before_close: bool,
    /// Prior-period posting policy.
    pub prior_period_policy: PriorPeriodPolicy,
}

/// Fields that may be updated on an organization.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrganizationInput {
    /// New display name.
    pub name: Option<String>,
    /// New base currency.
    pub base_currency: Option<String>,
    /// New timezone.
    pub timezone: Option<String>,
    /// New auto-lock setting.
    pub auto_lock_on_close: Option<bool>,
    /// New audit requirement.
    pub require_audit_before_close: Option<bool>,
    /// New prior-period policy.
    pub prior_period_policy: Option<PriorPeriodPolicy>,
}

/// Organization repository for CRUD and provisioning operations.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an organization by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds an organization by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug))
            .one(&self.db)
            .await
    }

    /// Checks if a slug is already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, DbErr> {
        let count = organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Creates an organization with an owner and the initial fiscal year.
    ///
    /// The fiscal year range is derived from `fiscal_year_start` around
    /// `today`, periods are generated at the organization's granularity,
    /// and the period containing `today` starts active.
    ///
    /// # Errors
    ///
    /// Returns an error if the slug is taken, `fiscal_year_start` does not
    /// parse, or the database operation fails.
    pub async fn create_with_owner(
        &self,
        input: CreateOrganizationInput,
        owner_user_id: Uuid,
        today: NaiveDate,
    ) -> Result<(organizations::Model, FiscalYearWithPeriods), OrganizationError> {
        if self.slug_exists(&input.slug).await? {
            return Err(OrganizationError::SlugTaken(input.slug));
        }

        let (start_month, start_day) = fiscal::parse_fiscal_year_start(&input.fiscal_year_start)?;
        let (start_date, end_date) = fiscal::fiscal_year_range(start_month, start_day, today);

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().into();
        let org_id = Uuid::new_v4();

        let org = organizations::ActiveModel {
            id: Set(org_id),
            name: Set(input.name),
            slug: Set(input.slug),
            base_currency: Set(input.base_currency),
            timezone: Set(input.timezone),
            fiscal_year_start: Set(input.fiscal_year_start),
            period_granularity: Set(input.granularity.into()),
            auto_lock_on_close: Set(input.auto_lock_on_close),
            require_audit_before_close: Set(input.require_audit_before_close),
            prior_period_policy: Set(input.prior_period_policy.into()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let org = org.insert(&txn).await?;

        let membership = organization_users::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(org_id),
            user_id: Set(owner_user_id),
            role: Set(sea_orm_active_enums::UserRole::Owner),
            created_at: Set(now),
            updated_at: Set(now),
        };
        membership.insert(&txn).await?;

        use chrono::Datelike;
        let year_name = format!("FY {}", start_date.year());
        let fiscal_year = insert_year_with_periods(
            &txn,
            org_id,
            &year_name,
            start_date,
            end_date,
            input.granularity,
            Some(today),
        )
        .await?;

        txn.commit().await?;

        Ok((org, fiscal_year))
    }

    /// Lists a user's organizations with their memberships, one page at a
    /// time. Returns the page rows and the total count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<(organization_users::Model, organizations::Model)>, u64), DbErr> {
        let query = organization_users::Entity::find()
            .filter(organization_users::Column::UserId.eq(user_id))
            .find_also_related(organizations::Entity)
            .order_by_asc(organization_users::Column::CreatedAt);

        let count = organization_users::Entity::find()
            .filter(organization_users::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;

        let rows = query
            .paginate(&self.db, limit.max(1))
            .fetch_page(page.saturating_sub(1))
            .await?;

        let results = rows
            .into_iter()
            .filter_map(|(ou, org)| org.map(|o| (ou, o)))
            .collect();

        Ok((results, count))
    }

    /// Updates an organization's settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the organization is missing or the update fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateOrganizationInput,
    ) -> Result<organizations::Model, OrganizationError> {
        let org = self
            .find_by_id(id)
            .await?
            .ok_or(OrganizationError::NotFound(id))?;

        let mut active: organizations::ActiveModel = org.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(currency) = input.base_currency {
            active.base_currency = Set(currency);
        }
        if let Some(timezone) = input.timezone {
            active.timezone = Set(timezone);
        }
        if let Some(auto_lock) = input.auto_lock_on_close {
            active.auto_lock_on_close = Set(auto_lock);
        }
        if let Some(require_audit) = input.require_audit_before_close {
            active.require_audit_before_close = Set(require_audit);
        }
        if let Some(policy) = input.prior_period_policy {
            active.prior_period_policy = Set(policy.into());
        }
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Gets a user's membership in an organization, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn member_role(
        &self,
        org_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<organization_users::Model>, DbErr> {
        organization_users::Entity::find()
            .filter(organization_users::Column::OrganizationId.eq(org_id))
            .filter(organization_users::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
    }

    /// Lists the members of an organization with their user records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_members(
        &self,
        org_id: Uuid,
    ) -> Result<Vec<(organization_users::Model, users::Model)>, DbErr> {
        organization_users::Entity::find()
            .filter(organization_users::Column::OrganizationId.eq(org_id))
            .find_also_related(users::Entity)
            .all(&self.db)
            .await
            .map(|results| {
                results
                    .into_iter()
                    .filter_map(|(ou, user)| user.map(|u| (ou, u)))
                    .collect()
            })
    }
}
