//! Authentication routes: register, login, refresh, logout.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use crate::error::internal_error;
use oasys_core::auth::{hash_password, verify_password};
use oasys_db::{SessionRepository, UserRepository, entities::sea_orm_active_enums::UserRole};
use oasys_shared::auth::{
    LoginRequest, LoginResponse, LogoutRequest, RefreshRequest, RegisterRequest, RegisterResponse,
    TokenPair, UserInfo, UserOrganization,
};
use oasys_shared::types::{ApiResponse, OrganizationId, UserId};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Invalid email or password"
        })),
    )
        .into_response()
}

/// POST /auth/register - Register a new user.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.email_exists(&payload.email).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "email_exists",
                    "message": "An account with this email already exists"
                })),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking email");
            return internal_error("An error occurred during registration");
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return internal_error("An error occurred during registration");
        }
    };

    let user = match user_repo
        .create(&payload.email, &password_hash, &payload.full_name)
        .await
    {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Failed to create user");
            return internal_error("An error occurred during registration");
        }
    };

    info!(user_id = %user.id, "New user registered");

    // Accounts are usable immediately; no email verification step exists.
    (
        StatusCode::CREATED,
        Json(ApiResponse::ok(RegisterResponse {
            user: UserInfo {
                id: UserId::from_uuid(user.id),
                email: user.email,
                full_name: user.full_name,
            },
            requires_verification: false,
        })),
    )
        .into_response()
}

/// POST /auth/login - Authenticate user and return tokens.
#[allow(clippy::too_many_lines)]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(email = %payload.email, "Login attempt for non-existent user");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error("An error occurred during login");
        }
    };

    if !user.is_active {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "account_disabled",
                "message": "This account has been disabled"
            })),
        )
            .into_response();
    }

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error("An error occurred during login");
        }
    }

    let orgs = match user_repo.get_user_organizations(user.id).await {
        Ok(o) => o,
        Err(e) => {
            error!(error = %e, "Failed to get user organizations");
            return internal_error("An error occurred during login");
        }
    };

    let Some((default_org, default_membership)) = orgs.first().cloned() else {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "no_organization",
                "message": "User is not a member of any organization"
            })),
        )
            .into_response();
    };

    let role_str = role_to_string(&default_membership.role);

    let access =
        match state
            .jwt_service
            .generate_access_token(user.id, default_org.id, &role_str)
        {
            Ok(t) => t,
            Err(e) => {
                error!(error = %e, "Failed to generate access token");
                return internal_error("An error occurred during login");
            }
        };

    let refresh =
        match state
            .jwt_service
            .generate_refresh_token(user.id, default_org.id, &role_str)
        {
            Ok(t) => t,
            Err(e) => {
                error!(error = %e, "Failed to generate refresh token");
                return internal_error("An error occurred during login");
            }
        };

    // Track the refresh token server-side so logout can revoke it.
    let session_repo = SessionRepository::new((*state.db).clone());
    let expires_at = chrono::Utc::now()
        + chrono::Duration::days(state.jwt_service.refresh_token_expires_days());
    if let Err(e) = session_repo
        .create(user.id, Some(default_org.id), &refresh, expires_at, None, None)
        .await
    {
        error!(error = %e, "Failed to create session");
        return internal_error("An error occurred during login");
    }

    info!(user_id = %user.id, "User logged in");

    let response = LoginResponse {
        tokens: TokenPair {
            access,
            refresh,
            expires_in: state.jwt_service.access_token_expires_in(),
        },
        user: UserInfo {
            id: UserId::from_uuid(user.id),
            email: user.email,
            full_name: user.full_name,
        },
        organizations: orgs
            .into_iter()
            .map(|(org, membership)| UserOrganization {
                id: OrganizationId::from_uuid(org.id),
                name: org.name,
                slug: org.slug,
                role: role_to_string(&membership.role),
            })
            .collect(),
        requires_verification: false,
    };

    (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
}

/// POST /auth/refresh - Rotate the access token using a refresh token.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> impl IntoResponse {
    let claims = match state.jwt_service.validate_token(&payload.refresh_token) {
        Ok(c) => c,
        Err(e) => {
            let (error, message) = match e {
                oasys_shared::JwtError::Expired => ("token_expired", "Refresh token has expired"),
                _ => ("invalid_token", "Invalid refresh token"),
            };
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": error, "message": message })),
            )
                .into_response();
        }
    };

    // The token must also map to a live server-side session.
    let session_repo = SessionRepository::new((*state.db).clone());
    match session_repo.find_valid_by_token(&payload.refresh_token).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "session_revoked",
                    "message": "Session has been revoked or expired"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error during token refresh");
            return internal_error("An error occurred during token refresh");
        }
    }

    let access = match state.jwt_service.generate_access_token(
        claims.user_id(),
        claims.organization_id(),
        &claims.role,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error("An error occurred during token refresh");
        }
    };

    (
        StatusCode::OK,
        Json(ApiResponse::ok(json!({
            "access": access,
            "expires_in": state.jwt_service.access_token_expires_in()
        }))),
    )
        .into_response()
}

/// POST /auth/logout - Revoke the session behind a refresh token.
async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<LogoutRequest>,
) -> impl IntoResponse {
    let session_repo = SessionRepository::new((*state.db).clone());

    match session_repo.revoke_by_token(&payload.refresh_token).await {
        Ok(revoked) => (
            StatusCode::OK,
            Json(ApiResponse::ok(json!({ "revoked": revoked }))),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Database error during logout");
            internal_error("An error occurred during logout")
        }
    }
}

/// Converts `UserRole` enum to string.
fn role_to_string(role: &UserRole) -> String {
    match role {
        UserRole::Owner => "owner".to_string(),
        UserRole::Admin => "admin".to_string(),
        UserRole::Accountant => "accountant".to_string(),
        UserRole::Viewer => "viewer".to_string(),
    }
}
