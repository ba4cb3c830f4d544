//! Organization (tenant) routes.
//!
//! Creating an organization is the provisioning step: it also seeds the
//! initial fiscal year and activates the period containing today.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::error::{error_response, internal_error};
use crate::middleware::auth::AuthUser;
use oasys_core::fiscal::{PeriodGranularity, PriorPeriodPolicy};
use oasys_db::repositories::organization::{
    CreateOrganizationInput, OrganizationError, OrganizationRepository, UpdateOrganizationInput,
};
use oasys_shared::AppError;
use oasys_shared::auth::{CreateOrganizationRequest, UpdateOrganizationRequest};
use oasys_shared::types::{ApiResponse, PageRequest, Paginated};

/// Creates the organizations router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations", post(create_organization))
        .route("/organizations", get(list_organizations))
        .route("/organizations/{org_id}", get(get_organization))
        .route("/organizations/{org_id}", patch(update_organization))
}

fn organization_error_response(err: &OrganizationError) -> axum::response::Response {
    match err {
        OrganizationError::SlugTaken(slug) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "slug_taken",
                "message": format!("Organization slug is already taken: {slug}")
            })),
        )
            .into_response(),
        OrganizationError::NotFound(_) => {
            error_response(&AppError::NotFound("Organization not found".to_string()))
        }
        OrganizationError::InvalidSetting(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "invalid_setting", "message": e.to_string() })),
        )
            .into_response(),
        OrganizationError::Database(e) => {
            error!(error = %e, "Database error in organization route");
            internal_error("An internal error occurred")
        }
    }
}

fn invalid_field(field: &str, value: &str) -> axum::response::Response {
    error_response(&AppError::Validation(format!(
        "Invalid value for {field}: {value}"
    )))
}

/// POST /organizations - Provision a new organization.
async fn create_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateOrganizationRequest>,
) -> impl IntoResponse {
    let Some(granularity) = PeriodGranularity::parse(&payload.period_granularity) else {
        return invalid_field("period_granularity", &payload.period_granularity);
    };
    let Some(policy) = PriorPeriodPolicy::parse(&payload.prior_period_policy) else {
        return invalid_field("prior_period_policy", &payload.prior_period_policy);
    };

    let repo = OrganizationRepository::new((*state.db).clone());
    let today = chrono::Utc::now().date_naive();

    let input = CreateOrganizationInput {
        name: payload.name,
        slug: payload.slug,
        base_currency: payload.base_currency,
        timezone: payload.timezone,
        fiscal_year_start: payload.fiscal_year_start,
        granularity,
        auto_lock_on_close: payload.auto_lock_on_close,
        require_audit_before_close: payload.require_audit_before_close,
        prior_period_policy: policy,
    };

    match repo.create_with_owner(input, auth.user_id(), today).await {
        Ok((org, fiscal_year)) => {
            info!(org_id = %org.id, "Organization provisioned");
            (
                StatusCode::CREATED,
                Json(ApiResponse::ok(json!({
                    "organization": org,
                    "fiscal_year": fiscal_year.fiscal_year,
                    "periods": fiscal_year.periods
                }))),
            )
                .into_response()
        }
        Err(e) => organization_error_response(&e),
    }
}

/// GET /organizations - List the caller's organizations, paginated.
async fn list_organizations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let repo = OrganizationRepository::new((*state.db).clone());

    match repo
        .list_for_user(auth.user_id(), u64::from(page.page), page.db_limit())
        .await
    {
        Ok((rows, count)) => {
            let results: Vec<serde_json::Value> = rows
                .into_iter()
                .map(|(membership, org)| {
                    json!({
                        "id": org.id,
                        "name": org.name,
                        "slug": org.slug,
                        "base_currency": org.base_currency,
                        "timezone": org.timezone,
                        "role": membership.role,
                    })
                })
                .collect();

            let body = Paginated::new(results, page.page, page.limit, count);
            (StatusCode::OK, Json(ApiResponse::ok(body))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list organizations");
            internal_error("An internal error occurred")
        }
    }
}

/// GET /organizations/{org_id} - Fetch an organization the caller belongs to.
async fn get_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = OrganizationRepository::new((*state.db).clone());

    match require_membership(&repo, org_id, auth.user_id()).await {
        Ok(()) => {}
        Err(resp) => return resp,
    }

    match repo.find_by_id(org_id).await {
        Ok(Some(org)) => (StatusCode::OK, Json(ApiResponse::ok(org))).into_response(),
        Ok(None) => organization_error_response(&OrganizationError::NotFound(org_id)),
        Err(e) => organization_error_response(&OrganizationError::Database(e)),
    }
}

/// PATCH /organizations/{org_id} - Update organization settings.
async fn update_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<UpdateOrganizationRequest>,
) -> impl IntoResponse {
    if !auth.role().can_modify_settings() {
        return error_response(&AppError::Forbidden(
            "Only owners and admins can modify organization settings".to_string(),
        ));
    }

    let repo = OrganizationRepository::new((*state.db).clone());

    match require_membership(&repo, org_id, auth.user_id()).await {
        Ok(()) => {}
        Err(resp) => return resp,
    }

    let prior_period_policy = match payload.prior_period_policy {
        Some(ref s) => match PriorPeriodPolicy::parse(s) {
            Some(p) => Some(p),
            None => return invalid_field("prior_period_policy", s),
        },
        None => None,
    };

    let input = UpdateOrganizationInput {
        name: payload.name,
        base_currency: payload.base_currency,
        timezone: payload.timezone,
        auto_lock_on_close: payload.auto_lock_on_close,
        require_audit_before_close: payload.require_audit_before_close,
        prior_period_policy,
    };

    match repo.update(org_id, input).await {
        Ok(org) => (StatusCode::OK, Json(ApiResponse::ok(org))).into_response(),
        Err(e) => organization_error_response(&e),
    }
}

/// Rejects callers who are not members of the organization.
async fn require_membership(
    repo: &OrganizationRepository,
    org_id: Uuid,
    user_id: Uuid,
) -> Result<(), axum::response::Response> {
    match repo.member_role(org_id, user_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(error_response(&AppError::NotFound(
            "Organization not found".to_string(),
        ))),
        Err(e) => Err(organization_error_response(&OrganizationError::Database(e))),
    }
}
