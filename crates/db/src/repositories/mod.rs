//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod fiscal;
pub mod organization;
pub mod session;
pub mod user;

pub use fiscal::{
    CloseOutcome, CreateAdjustmentInput, CreateExceptionInput, CreateFiscalYearInput, FiscalError,
    FiscalRepository, FiscalYearWithPeriods,
};
pub use organization::{
    CreateOrganizationInput, OrganizationError, OrganizationRepository, UpdateOrganizationInput,
};
pub use session::SessionRepository;
pub use user::UserRepository;
