//! `SeaORM` Entity for fiscal years.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ClosingStatus, FiscalYearStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fiscal_years")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub status: FiscalYearStatus,
    pub closing_status: ClosingStatus,
    pub closed_at: Option<DateTimeWithTimeZone>,
    pub closed_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id"
    )]
    Organizations,
    #[sea_orm(has_many = "super::fiscal_periods::Entity")]
    FiscalPeriods,
    #[sea_orm(has_many = "super::closing_entries::Entity")]
    ClosingEntries,
    #[sea_orm(has_many = "super::opening_balances::Entity")]
    OpeningBalances,
    #[sea_orm(has_many = "super::year_end_adjustments::Entity")]
    YearEndAdjustments,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl Related<super::fiscal_periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FiscalPeriods.def()
    }
}

impl Related<super::closing_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClosingEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
