//! Auth and tenant request/response payloads.

use serde::{Deserialize, Serialize};

use crate::types::{OrganizationId, UserId};

/// Token pair returned after successful authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived).
    pub access: String,
    /// Refresh token (long-lived).
    pub refresh: String,
    /// Access token expiration in seconds.
    pub expires_in: i64,
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Registration request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
    /// User full name.
    pub full_name: String,
}

/// Login response payload (wrapped in the API envelope by the handler).
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Access and refresh tokens.
    pub tokens: TokenPair,
    /// Authenticated user info.
    pub user: UserInfo,
    /// Organizations (tenants) the user belongs to.
    pub organizations: Vec<UserOrganization>,
    /// Whether the account still needs email verification before full use.
    pub requires_verification: bool,
}

/// Registration response payload.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    /// The newly created user.
    pub user: UserInfo,
    /// Whether the account still needs email verification before full use.
    pub requires_verification: bool,
}

/// User info returned in auth responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: UserId,
    /// User email.
    pub email: String,
    /// User full name.
    pub full_name: String,
}

/// Organization info for a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserOrganization {
    /// Organization ID.
    pub id: OrganizationId,
    /// Organization name.
    pub name: String,
    /// Organization slug.
    pub slug: String,
    /// User's role in this organization.
    pub role: String,
}

/// Refresh token request.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token.
    pub refresh_token: String,
}

/// Logout request.
#[derive(Debug, Clone, Deserialize)]
pub struct LogoutRequest {
    /// The refresh token to invalidate.
    pub refresh_token: String,
}

/// Create organization (tenant provisioning) request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrganizationRequest {
    /// Organization name.
    pub name: String,
    /// Organization slug (URL-friendly, used as subdomain).
    pub slug: String,
    /// Base currency (ISO 4217 code).
    pub base_currency: String,
    /// Timezone (IANA format).
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Fiscal year start as "MM-DD".
    #[serde(default = "default_fiscal_year_start")]
    pub fiscal_year_start: String,
    /// Period granularity: "monthly", "quarterly", or "yearly".
    #[serde(default = "default_granularity")]
    pub period_granularity: String,
    /// Lock all periods automatically when a year-end close begins.
    #[serde(default)]
    pub auto_lock_on_close: bool,
    /// Require every period audit to be completed before close.
    #[serde(default)]
    pub require_audit_before_close: bool,
    /// Prior-period posting policy: "deny" or "allow_soft_closed".
    #[serde(default = "default_prior_period_policy")]
    pub prior_period_policy: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_fiscal_year_start() -> String {
    "01-01".to_string()
}

fn default_granularity() -> String {
    "monthly".to_string()
}

fn default_prior_period_policy() -> String {
    "deny".to_string()
}

/// Update organization request.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrganizationRequest {
    /// Organization name (optional).
    pub name: Option<String>,
    /// Base currency (optional, ISO 4217 code).
    pub base_currency: Option<String>,
    /// Timezone (optional, IANA format).
    pub timezone: Option<String>,
    /// Auto-lock behavior (optional).
    pub auto_lock_on_close: Option<bool>,
    /// Audit-before-close requirement (optional).
    pub require_audit_before_close: Option<bool>,
    /// Prior-period posting policy (optional).
    pub prior_period_policy: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserInfo {
        UserInfo {
            id: UserId::new(),
            email: "demo@oasys.dev".to_string(),
            full_name: "Demo User".to_string(),
        }
    }

    #[test]
    fn test_login_response_shape() {
        let response = LoginResponse {
            tokens: TokenPair {
                access: "a".to_string(),
                refresh: "r".to_string(),
                expires_in: 900,
            },
            user: user(),
            organizations: vec![UserOrganization {
                id: OrganizationId::new(),
                name: "Demo Company".to_string(),
                slug: "demo-company".to_string(),
                role: "owner".to_string(),
            }],
            requires_verification: false,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["requires_verification"], false);
        assert_eq!(json["tokens"]["expires_in"], 900);
        // Typed IDs serialize as plain UUID strings.
        assert!(json["user"]["id"].is_string());
        assert!(json["organizations"][0]["id"].is_string());
    }

    #[test]
    fn test_register_response_shape() {
        let response = RegisterResponse {
            user: user(),
            requires_verification: false,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["requires_verification"], false);
        assert_eq!(json["user"]["email"], "demo@oasys.dev");
    }
}
