//! `SeaORM` entity definitions.

pub mod closing_entries;
pub mod fiscal_periods;
pub mod fiscal_years;
pub mod opening_balances;
pub mod organization_users;
pub mod organizations;
pub mod period_exceptions;
pub mod sea_orm_active_enums;
pub mod sessions;
pub mod users;
pub mod year_end_adjustments;
