//! Fiscal migration: years, periods, and year-end artifacts.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(FISCAL_YEARS_SQL).await?;
        db.execute_unprepared(FISCAL_PERIODS_SQL).await?;
        db.execute_unprepared(PERIOD_EXCEPTIONS_SQL).await?;
        db.execute_unprepared(CLOSING_ENTRIES_SQL).await?;
        db.execute_unprepared(OPENING_BALANCES_SQL).await?;
        db.execute_unprepared(YEAR_END_ADJUSTMENTS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DOWN_SQL).await?;
        Ok(())
    }
}

const FISCAL_YEARS_SQL: &str = r"
CREATE TABLE fiscal_years (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status fiscal_year_status NOT NULL DEFAULT 'open',
    closing_status closing_status NOT NULL DEFAULT 'not_started',
    closed_at TIMESTAMPTZ,
    closed_by UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_fy_dates CHECK (start_date < end_date)
);

CREATE INDEX idx_fiscal_years_org ON fiscal_years(organization_id, start_date DESC);
";

const FISCAL_PERIODS_SQL: &str = r"
CREATE TABLE fiscal_periods (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    fiscal_year_id UUID NOT NULL REFERENCES fiscal_years(id) ON DELETE CASCADE,
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    period_number SMALLINT NOT NULL,
    name VARCHAR(100) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT false,
    locked BOOLEAN NOT NULL DEFAULT false,
    locked_by UUID REFERENCES users(id),
    locked_at TIMESTAMPTZ,
    soft_closed BOOLEAN NOT NULL DEFAULT false,
    audit_status audit_status NOT NULL DEFAULT 'not_started',
    transaction_count BIGINT NOT NULL DEFAULT 0,
    total_debits NUMERIC(20, 4) NOT NULL DEFAULT 0,
    total_credits NUMERIC(20, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_fp_dates CHECK (start_date <= end_date),
    CONSTRAINT uq_fp_year_number UNIQUE (fiscal_year_id, period_number)
);

CREATE INDEX idx_fiscal_periods_year ON fiscal_periods(fiscal_year_id, period_number);
CREATE INDEX idx_fiscal_periods_org_dates ON fiscal_periods(organization_id, start_date, end_date);

-- At most one active period per organization
CREATE UNIQUE INDEX uq_fiscal_periods_active
    ON fiscal_periods(organization_id) WHERE is_active;
";

const PERIOD_EXCEPTIONS_SQL: &str = r"
CREATE TABLE period_exceptions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    fiscal_period_id UUID NOT NULL REFERENCES fiscal_periods(id) ON DELETE CASCADE,
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    title VARCHAR(255) NOT NULL,
    description TEXT,
    severity exception_severity NOT NULL DEFAULT 'low',
    status exception_status NOT NULL DEFAULT 'open',
    resolution_note TEXT,
    detected_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    resolved_at TIMESTAMPTZ,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_period_exceptions_period ON period_exceptions(fiscal_period_id, detected_at DESC);
";

const CLOSING_ENTRIES_SQL: &str = r"
CREATE TABLE closing_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    fiscal_year_id UUID NOT NULL REFERENCES fiscal_years(id) ON DELETE CASCADE,
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    kind closing_entry_kind NOT NULL,
    account_code VARCHAR(20) NOT NULL,
    account_name VARCHAR(255) NOT NULL,
    debit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_closing_entries_year ON closing_entries(fiscal_year_id, account_code);
";

const OPENING_BALANCES_SQL: &str = r"
CREATE TABLE opening_balances (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    fiscal_year_id UUID NOT NULL REFERENCES fiscal_years(id) ON DELETE CASCADE,
    source_fiscal_year_id UUID NOT NULL REFERENCES fiscal_years(id),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    account_code VARCHAR(20) NOT NULL,
    account_name VARCHAR(255) NOT NULL,
    debit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(20, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_opening_balances_year ON opening_balances(fiscal_year_id, account_code);
";

const YEAR_END_ADJUSTMENTS_SQL: &str = r"
CREATE TABLE year_end_adjustments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    fiscal_year_id UUID NOT NULL REFERENCES fiscal_years(id) ON DELETE CASCADE,
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    kind adjustment_kind NOT NULL,
    description TEXT NOT NULL,
    account_code VARCHAR(20) NOT NULL,
    amount NUMERIC(20, 4) NOT NULL,
    entry_date DATE NOT NULL,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_year_end_adjustments_year ON year_end_adjustments(fiscal_year_id, entry_date DESC);
";

const DOWN_SQL: &str = r"
DROP TABLE IF EXISTS year_end_adjustments CASCADE;
DROP TABLE IF EXISTS opening_balances CASCADE;
DROP TABLE IF EXISTS closing_entries CASCADE;
DROP TABLE IF EXISTS period_exceptions CASCADE;
DROP TABLE IF EXISTS fiscal_periods CASCADE;
DROP TABLE IF EXISTS fiscal_years CASCADE;
";
