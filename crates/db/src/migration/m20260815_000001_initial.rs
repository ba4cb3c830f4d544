//! Initial migration: identity and tenancy.
//!
//! Creates the shared enum types, users, organizations, and memberships.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(ORGANIZATION_USERS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DOWN_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE user_role AS ENUM ('owner', 'admin', 'accountant', 'viewer');
CREATE TYPE fiscal_year_status AS ENUM ('open', 'closed', 'archived');
CREATE TYPE closing_status AS ENUM ('not_started', 'in_progress', 'completed');
CREATE TYPE audit_status AS ENUM (
    'not_started', 'in_progress', 'under_review', 'completed', 'failed', 'exception'
);
CREATE TYPE period_granularity AS ENUM ('monthly', 'quarterly', 'yearly');
CREATE TYPE prior_period_policy AS ENUM ('deny', 'allow_soft_closed');
CREATE TYPE exception_severity AS ENUM ('low', 'medium', 'high', 'critical');
CREATE TYPE exception_status AS ENUM ('open', 'investigating', 'resolved', 'accepted');
CREATE TYPE closing_entry_kind AS ENUM ('revenue_close', 'expense_close', 'retained_earnings');
CREATE TYPE adjustment_kind AS ENUM ('accrual', 'prepayment', 'depreciation', 'provision');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    full_name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_email ON users(email);
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    slug VARCHAR(100) NOT NULL UNIQUE,
    base_currency CHAR(3) NOT NULL DEFAULT 'USD',
    timezone VARCHAR(64) NOT NULL DEFAULT 'UTC',
    fiscal_year_start VARCHAR(5) NOT NULL DEFAULT '01-01',
    period_granularity period_granularity NOT NULL DEFAULT 'monthly',
    auto_lock_on_close BOOLEAN NOT NULL DEFAULT false,
    require_audit_before_close BOOLEAN NOT NULL DEFAULT false,
    prior_period_policy prior_period_policy NOT NULL DEFAULT 'deny',
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_organizations_slug ON organizations(slug);
";

const ORGANIZATION_USERS_SQL: &str = r"
CREATE TABLE organization_users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    role user_role NOT NULL DEFAULT 'viewer',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_org_user UNIQUE (organization_id, user_id)
);

CREATE INDEX idx_org_users_user ON organization_users(user_id);
CREATE INDEX idx_org_users_org ON organization_users(organization_id);
";

const DOWN_SQL: &str = r"
DROP TABLE IF EXISTS organization_users CASCADE;
DROP TABLE IF EXISTS organizations CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TYPE IF EXISTS adjustment_kind;
DROP TYPE IF EXISTS closing_entry_kind;
DROP TYPE IF EXISTS exception_status;
DROP TYPE IF EXISTS exception_severity;
DROP TYPE IF EXISTS prior_period_policy;
DROP TYPE IF EXISTS period_granularity;
DROP TYPE IF EXISTS audit_status;
DROP TYPE IF EXISTS closing_status;
DROP TYPE IF EXISTS fiscal_year_status;
DROP TYPE IF EXISTS user_role;
";
