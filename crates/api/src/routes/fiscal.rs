//! Fiscal year and period routes.
//!
//! All routes operate in the organization context carried by the access
//! token. Business-rule outcomes (posting decisions, close validation) are
//! returned as structured 200 responses; only infrastructure and state
//! violations become error statuses.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::error::{error_response, internal_error};
use crate::middleware::auth::AuthUser;
use oasys_core::fiscal::{
    AccountBalance, AuditStatus, ExceptionSeverity, ExceptionStatus, PeriodGranularity,
};
use oasys_db::repositories::fiscal::{
    CloseOutcome, CreateAdjustmentInput, CreateExceptionInput, CreateFiscalYearInput, FiscalError,
    FiscalRepository, FiscalYearWithPeriods,
};
use oasys_db::repositories::organization::OrganizationRepository;
use oasys_shared::AppError;
use oasys_shared::types::ApiResponse;

/// Creates the fiscal router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fiscal-years", get(list_years).post(create_year))
        .route("/fiscal-years/{year_id}", get(get_year))
        .route("/fiscal-years/{year_id}/close/begin", post(begin_close))
        .route("/fiscal-years/{year_id}/close/validate", get(validate_close))
        .route("/fiscal-years/{year_id}/close", post(close_year))
        .route("/fiscal-years/{year_id}/rollover", post(rollover))
        .route("/fiscal-years/{year_id}/archive", post(archive_year))
        .route("/fiscal-years/{year_id}/closing-entries", get(list_closing_entries))
        .route("/fiscal-years/{year_id}/opening-balances", get(list_opening_balances))
        .route(
            "/fiscal-years/{year_id}/adjustments",
            get(list_adjustments).post(create_adjustment),
        )
        .route("/fiscal-periods/{period_id}/lock", post(lock_period))
        .route("/fiscal-periods/{period_id}/unlock", post(unlock_period))
        .route("/fiscal-periods/{period_id}/activate", post(activate_period))
        .route("/fiscal-periods/{period_id}/soft-close", post(soft_close_period))
        .route("/fiscal-periods/{period_id}/reopen", post(reopen_period))
        .route("/fiscal-periods/{period_id}/audit-status", patch(update_audit_status))
        .route(
            "/fiscal-periods/{period_id}/exceptions",
            get(list_exceptions).post(create_exception),
        )
        .route("/exceptions/{exception_id}", patch(update_exception))
        .route("/posting-check", get(posting_check))
}

// Request payloads.

/// POST /fiscal-years body.
#[derive(Debug, Deserialize)]
struct CreateFiscalYearRequest {
    name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    /// Overrides the organization's granularity setting when present.
    granularity: Option<String>,
}

/// Balances supplied to close and rollover.
#[derive(Debug, Deserialize, Default)]
struct BalancesRequest {
    #[serde(default)]
    balances: Vec<AccountBalance>,
}

/// PATCH audit-status body.
#[derive(Debug, Deserialize)]
struct AuditStatusRequest {
    status: String,
}

/// POST exceptions body.
#[derive(Debug, Deserialize)]
struct CreateExceptionRequest {
    title: String,
    description: Option<String>,
    severity: String,
}

/// PATCH exception body.
#[derive(Debug, Deserialize)]
struct UpdateExceptionRequest {
    status: String,
    resolution_note: Option<String>,
}

/// POST adjustments body.
#[derive(Debug, Deserialize)]
struct CreateAdjustmentRequest {
    kind: String,
    description: String,
    account_code: String,
    amount: rust_decimal::Decimal,
    entry_date: NaiveDate,
}

/// GET /posting-check query.
#[derive(Debug, Deserialize)]
struct PostingCheckQuery {
    date: NaiveDate,
}

// Error rendering.

fn fiscal_error_response(err: &FiscalError) -> axum::response::Response {
    let (status, code) = match err {
        FiscalError::YearNotFound(_)
        | FiscalError::PeriodNotFound(_)
        | FiscalError::OrganizationNotFound(_)
        | FiscalError::ExceptionNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        FiscalError::InvalidDateRange => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_date_range"),
        FiscalError::OverlappingYear(_) => (StatusCode::CONFLICT, "overlapping_fiscal_year"),
        FiscalError::YearNotOpen { .. } | FiscalError::YearNotClosed { .. } => {
            (StatusCode::CONFLICT, "invalid_year_status")
        }
        FiscalError::Core(_) => (StatusCode::UNPROCESSABLE_ENTITY, "business_rule_violation"),
        FiscalError::Database(e) => {
            error!(error = %e, "Database error in fiscal route");
            return internal_error("An internal error occurred");
        }
    };

    (
        status,
        Json(json!({ "error": code, "message": err.to_string() })),
    )
        .into_response()
}

fn forbidden() -> axum::response::Response {
    error_response(&AppError::Forbidden(
        "Your role does not allow fiscal management".to_string(),
    ))
}

fn not_found() -> axum::response::Response {
    error_response(&AppError::NotFound("Resource not found".to_string()))
}

fn invalid_field(field: &str, value: &str) -> axum::response::Response {
    error_response(&AppError::Validation(format!(
        "Invalid value for {field}: {value}"
    )))
}

fn year_json(year: &FiscalYearWithPeriods) -> serde_json::Value {
    json!({
        "fiscal_year": year.fiscal_year,
        "periods": year.periods,
    })
}

/// Loads a year and rejects it when it belongs to another tenant.
async fn require_year(
    repo: &FiscalRepository,
    year_id: Uuid,
    org_id: Uuid,
) -> Result<FiscalYearWithPeriods, axum::response::Response> {
    match repo.find_fiscal_year_by_id(year_id).await {
        Ok(Some(year)) if year.fiscal_year.organization_id == org_id => Ok(year),
        Ok(_) => Err(not_found()),
        Err(e) => Err(fiscal_error_response(&e)),
    }
}

/// Loads a period and rejects it when it belongs to another tenant.
async fn require_period(
    repo: &FiscalRepository,
    period_id: Uuid,
    org_id: Uuid,
) -> Result<oasys_db::entities::fiscal_periods::Model, axum::response::Response> {
    match repo.find_period_by_id(period_id).await {
        Ok(Some(period)) if period.organization_id == org_id => Ok(period),
        Ok(_) => Err(not_found()),
        Err(e) => Err(fiscal_error_response(&e)),
    }
}

// Fiscal year handlers.

/// GET /fiscal-years - List the organization's fiscal years with periods.
async fn list_years(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = FiscalRepository::new((*state.db).clone());

    match repo.list_fiscal_years(auth.organization_id()).await {
        Ok(years) => {
            let body: Vec<serde_json::Value> = years.iter().map(year_json).collect();
            (StatusCode::OK, Json(ApiResponse::ok(body))).into_response()
        }
        Err(e) => fiscal_error_response(&e),
    }
}

/// POST /fiscal-years - Create a fiscal year with generated periods.
async fn create_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateFiscalYearRequest>,
) -> impl IntoResponse {
    if !auth.role().can_manage_fiscal() {
        return forbidden();
    }

    let org_repo = OrganizationRepository::new((*state.db).clone());
    let granularity = match payload.granularity {
        Some(ref s) => match PeriodGranularity::parse(s) {
            Some(g) => g,
            None => return invalid_field("granularity", s),
        },
        None => match org_repo.find_by_id(auth.organization_id()).await {
            Ok(Some(org)) => org.period_granularity.into(),
            Ok(None) => return not_found(),
            Err(e) => return fiscal_error_response(&FiscalError::Database(e)),
        },
    };

    let repo = FiscalRepository::new((*state.db).clone());
    let input = CreateFiscalYearInput {
        organization_id: auth.organization_id(),
        name: payload.name,
        start_date: payload.start_date,
        end_date: payload.end_date,
        granularity,
    };

    match repo.create_fiscal_year(input).await {
        Ok(year) => {
            info!(year_id = %year.fiscal_year.id, "Fiscal year created");
            (StatusCode::CREATED, Json(ApiResponse::ok(year_json(&year)))).into_response()
        }
        Err(e) => fiscal_error_response(&e),
    }
}

/// GET /fiscal-years/{year_id} - Fetch one fiscal year with periods.
async fn get_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(year_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = FiscalRepository::new((*state.db).clone());

    match require_year(&repo, year_id, auth.organization_id()).await {
        Ok(year) => (StatusCode::OK, Json(ApiResponse::ok(year_json(&year)))).into_response(),
        Err(resp) => resp,
    }
}

/// POST /fiscal-years/{year_id}/close/begin - Start the year-end close.
async fn begin_close(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(year_id): Path<Uuid>,
) -> impl IntoResponse {
    if !auth.role().can_manage_fiscal() {
        return forbidden();
    }

    let repo = FiscalRepository::new((*state.db).clone());
    if let Err(resp) = require_year(&repo, year_id, auth.organization_id()).await {
        return resp;
    }

    match repo.begin_year_end_close(year_id, auth.user_id()).await {
        Ok(year) => {
            info!(year_id = %year_id, "Year-end close started");
            (StatusCode::OK, Json(ApiResponse::ok(year_json(&year)))).into_response()
        }
        Err(e) => fiscal_error_response(&e),
    }
}

/// GET /fiscal-years/{year_id}/close/validate - Report close blockers.
async fn validate_close(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(year_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = FiscalRepository::new((*state.db).clone());
    if let Err(resp) = require_year(&repo, year_id, auth.organization_id()).await {
        return resp;
    }

    match repo.validate_close(year_id).await {
        Ok(validation) => (StatusCode::OK, Json(ApiResponse::ok(validation))).into_response(),
        Err(e) => fiscal_error_response(&e),
    }
}

/// POST /fiscal-years/{year_id}/close - Close the year.
async fn close_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(year_id): Path<Uuid>,
    Json(payload): Json<BalancesRequest>,
) -> impl IntoResponse {
    if !auth.role().can_manage_fiscal() {
        return forbidden();
    }

    let repo = FiscalRepository::new((*state.db).clone());
    if let Err(resp) = require_year(&repo, year_id, auth.organization_id()).await {
        return resp;
    }

    match repo
        .close_fiscal_year(year_id, auth.user_id(), &payload.balances)
        .await
    {
        Ok(CloseOutcome::Blocked(validation)) => (
            StatusCode::OK,
            Json(ApiResponse::ok(json!({
                "closed": false,
                "validation": validation
            }))),
        )
            .into_response(),
        Ok(CloseOutcome::Closed {
            fiscal_year,
            entries,
        }) => {
            info!(year_id = %year_id, "Fiscal year closed");
            (
                StatusCode::OK,
                Json(ApiResponse::ok(json!({
                    "closed": true,
                    "fiscal_year": fiscal_year,
                    "closing_entries": entries
                }))),
            )
                .into_response()
        }
        Err(e) => fiscal_error_response(&e),
    }
}

/// POST /fiscal-years/{year_id}/rollover - Roll a closed year into the next.
async fn rollover(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(year_id): Path<Uuid>,
    Json(payload): Json<BalancesRequest>,
) -> impl IntoResponse {
    if !auth.role().can_manage_fiscal() {
        return forbidden();
    }

    let repo = FiscalRepository::new((*state.db).clone());
    if let Err(resp) = require_year(&repo, year_id, auth.organization_id()).await {
        return resp;
    }

    match repo.rollover_to_next_year(year_id, &payload.balances).await {
        Ok(year) => {
            info!(
                source_year_id = %year_id,
                new_year_id = %year.fiscal_year.id,
                "Fiscal year rolled over"
            );
            (StatusCode::CREATED, Json(ApiResponse::ok(year_json(&year)))).into_response()
        }
        Err(e) => fiscal_error_response(&e),
    }
}

/// POST /fiscal-years/{year_id}/archive - Archive a closed year.
async fn archive_year(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(year_id): Path<Uuid>,
) -> impl IntoResponse {
    if !auth.role().can_manage_fiscal() {
        return forbidden();
    }

    let repo = FiscalRepository::new((*state.db).clone());
    if let Err(resp) = require_year(&repo, year_id, auth.organization_id()).await {
        return resp;
    }

    match repo.archive_fiscal_year(year_id).await {
        Ok(year) => (StatusCode::OK, Json(ApiResponse::ok(year))).into_response(),
        Err(e) => fiscal_error_response(&e),
    }
}

/// GET /fiscal-years/{year_id}/closing-entries
async fn list_closing_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(year_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = FiscalRepository::new((*state.db).clone());
    if let Err(resp) = require_year(&repo, year_id, auth.organization_id()).await {
        return resp;
    }

    match repo.list_closing_entries(year_id).await {
        Ok(entries) => (StatusCode::OK, Json(ApiResponse::ok(entries))).into_response(),
        Err(e) => fiscal_error_response(&e),
    }
}

/// GET /fiscal-years/{year_id}/opening-balances
async fn list_opening_balances(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(year_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = FiscalRepository::new((*state.db).clone());
    if let Err(resp) = require_year(&repo, year_id, auth.organization_id()).await {
        return resp;
    }

    match repo.list_opening_balances(year_id).await {
        Ok(balances) => (StatusCode::OK, Json(ApiResponse::ok(balances))).into_response(),
        Err(e) => fiscal_error_response(&e),
    }
}

/// POST /fiscal-years/{year_id}/adjustments - Record a year-end adjustment.
async fn create_adjustment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(year_id): Path<Uuid>,
    Json(payload): Json<CreateAdjustmentRequest>,
) -> impl IntoResponse {
    if !auth.role().can_manage_fiscal() {
        return forbidden();
    }

    let Some(kind) = oasys_core::fiscal::AdjustmentKind::parse(&payload.kind) else {
        return invalid_field("kind", &payload.kind);
    };

    let repo = FiscalRepository::new((*state.db).clone());
    if let Err(resp) = require_year(&repo, year_id, auth.organization_id()).await {
        return resp;
    }

    let input = CreateAdjustmentInput {
        fiscal_year_id: year_id,
        kind,
        description: payload.description,
        account_code: payload.account_code,
        amount: payload.amount,
        entry_date: payload.entry_date,
        created_by: auth.user_id(),
    };

    match repo.create_adjustment(input).await {
        Ok(adjustment) => {
            (StatusCode::CREATED, Json(ApiResponse::ok(adjustment))).into_response()
        }
        Err(e) => fiscal_error_response(&e),
    }
}

/// GET /fiscal-years/{year_id}/adjustments
async fn list_adjustments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(year_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = FiscalRepository::new((*state.db).clone());
    if let Err(resp) = require_year(&repo, year_id, auth.organization_id()).await {
        return resp;
    }

    match repo.list_adjustments(year_id).await {
        Ok(adjustments) => (StatusCode::OK, Json(ApiResponse::ok(adjustments))).into_response(),
        Err(e) => fiscal_error_response(&e),
    }
}

// Fiscal period handlers.

/// POST /fiscal-periods/{period_id}/lock
async fn lock_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(period_id): Path<Uuid>,
) -> impl IntoResponse {
    if !auth.role().can_manage_fiscal() {
        return forbidden();
    }

    let repo = FiscalRepository::new((*state.db).clone());
    if let Err(resp) = require_period(&repo, period_id, auth.organization_id()).await {
        return resp;
    }

    match repo.lock_period(period_id, auth.user_id()).await {
        Ok(period) => {
            info!(period_id = %period_id, "Period locked");
            (StatusCode::OK, Json(ApiResponse::ok(period))).into_response()
        }
        Err(e) => fiscal_error_response(&e),
    }
}

/// POST /fiscal-periods/{period_id}/unlock
async fn unlock_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(period_id): Path<Uuid>,
) -> impl IntoResponse {
    if !auth.role().can_manage_fiscal() {
        return forbidden();
    }

    let repo = FiscalRepository::new((*state.db).clone());
    if let Err(resp) = require_period(&repo, period_id, auth.organization_id()).await {
        return resp;
    }

    match repo.unlock_period(period_id).await {
        Ok(period) => {
            info!(period_id = %period_id, "Period unlocked");
            (StatusCode::OK, Json(ApiResponse::ok(period))).into_response()
        }
        Err(e) => fiscal_error_response(&e),
    }
}

/// POST /fiscal-periods/{period_id}/activate
async fn activate_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(period_id): Path<Uuid>,
) -> impl IntoResponse {
    if !auth.role().can_manage_fiscal() {
        return forbidden();
    }

    let repo = FiscalRepository::new((*state.db).clone());
    if let Err(resp) = require_period(&repo, period_id, auth.organization_id()).await {
        return resp;
    }

    match repo.activate_period(period_id).await {
        Ok(period) => (StatusCode::OK, Json(ApiResponse::ok(period))).into_response(),
        Err(e) => fiscal_error_response(&e),
    }
}

/// POST /fiscal-periods/{period_id}/soft-close
async fn soft_close_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(period_id): Path<Uuid>,
) -> impl IntoResponse {
    set_soft_closed(state, auth, period_id, true).await
}

/// POST /fiscal-periods/{period_id}/reopen
async fn reopen_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(period_id): Path<Uuid>,
) -> impl IntoResponse {
    set_soft_closed(state, auth, period_id, false).await
}

async fn set_soft_closed(
    state: AppState,
    auth: AuthUser,
    period_id: Uuid,
    soft_closed: bool,
) -> axum::response::Response {
    if !auth.role().can_manage_fiscal() {
        return forbidden();
    }

    let repo = FiscalRepository::new((*state.db).clone());
    if let Err(resp) = require_period(&repo, period_id, auth.organization_id()).await {
        return resp;
    }

    match repo.set_soft_closed(period_id, soft_closed).await {
        Ok(period) => (StatusCode::OK, Json(ApiResponse::ok(period))).into_response(),
        Err(e) => fiscal_error_response(&e),
    }
}

/// PATCH /fiscal-periods/{period_id}/audit-status
async fn update_audit_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(period_id): Path<Uuid>,
    Json(payload): Json<AuditStatusRequest>,
) -> impl IntoResponse {
    if !auth.role().can_manage_fiscal() {
        return forbidden();
    }

    let Some(status) = AuditStatus::parse(&payload.status) else {
        return invalid_field("status", &payload.status);
    };

    let repo = FiscalRepository::new((*state.db).clone());
    if let Err(resp) = require_period(&repo, period_id, auth.organization_id()).await {
        return resp;
    }

    match repo.update_audit_status(period_id, status).await {
        Ok(period) => (StatusCode::OK, Json(ApiResponse::ok(period))).into_response(),
        Err(e) => fiscal_error_response(&e),
    }
}

/// POST /fiscal-periods/{period_id}/exceptions - Record a discrepancy.
async fn create_exception(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(period_id): Path<Uuid>,
    Json(payload): Json<CreateExceptionRequest>,
) -> impl IntoResponse {
    if !auth.role().can_manage_fiscal() {
        return forbidden();
    }

    let Some(severity) = ExceptionSeverity::parse(&payload.severity) else {
        return invalid_field("severity", &payload.severity);
    };

    let repo = FiscalRepository::new((*state.db).clone());
    if let Err(resp) = require_period(&repo, period_id, auth.organization_id()).await {
        return resp;
    }

    let input = CreateExceptionInput {
        fiscal_period_id: period_id,
        title: payload.title,
        description: payload.description,
        severity,
        created_by: auth.user_id(),
    };

    match repo.create_exception(input).await {
        Ok(exception) => (StatusCode::CREATED, Json(ApiResponse::ok(exception))).into_response(),
        Err(e) => fiscal_error_response(&e),
    }
}

/// GET /fiscal-periods/{period_id}/exceptions
async fn list_exceptions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(period_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = FiscalRepository::new((*state.db).clone());
    if let Err(resp) = require_period(&repo, period_id, auth.organization_id()).await {
        return resp;
    }

    match repo.list_exceptions(period_id).await {
        Ok(exceptions) => (StatusCode::OK, Json(ApiResponse::ok(exceptions))).into_response(),
        Err(e) => fiscal_error_response(&e),
    }
}

/// PATCH /exceptions/{exception_id} - Progress an exception.
async fn update_exception(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(exception_id): Path<Uuid>,
    Json(payload): Json<UpdateExceptionRequest>,
) -> impl IntoResponse {
    if !auth.role().can_manage_fiscal() {
        return forbidden();
    }

    let Some(status) = ExceptionStatus::parse(&payload.status) else {
        return invalid_field("status", &payload.status);
    };

    let repo = FiscalRepository::new((*state.db).clone());

    match repo.find_exception_by_id(exception_id).await {
        Ok(Some(exception)) if exception.organization_id == auth.organization_id() => {}
        Ok(_) => return not_found(),
        Err(e) => return fiscal_error_response(&e),
    }

    match repo
        .update_exception_status(exception_id, status, payload.resolution_note)
        .await
    {
        Ok(exception) => (StatusCode::OK, Json(ApiResponse::ok(exception))).into_response(),
        Err(e) => fiscal_error_response(&e),
    }
}

/// GET /posting-check?date= - Gatekeeper decision for a transaction date.
async fn posting_check(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PostingCheckQuery>,
) -> impl IntoResponse {
    let repo = FiscalRepository::new((*state.db).clone());

    match repo.posting_check(auth.organization_id(), query.date).await {
        Ok(decision) => (StatusCode::OK, Json(ApiResponse::ok(decision))).into_response(),
        Err(e) => fiscal_error_response(&e),
    }
}
