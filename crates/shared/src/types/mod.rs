//! Common value types shared across crates.

pub mod id;
pub mod pagination;

pub use id::{FiscalPeriodId, FiscalYearId, OrganizationId, UserId};
pub use pagination::{ApiResponse, PageRequest, Paginated};
