//! Authentication and password hashing.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//! - User role definitions

mod password;

pub use password::{PasswordError, hash_password, verify_password};

use serde::{Deserialize, Serialize};

/// User roles within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access, can transfer ownership.
    Owner,
    /// Full access except ownership transfer.
    Admin,
    /// Can post transactions, lock periods, and run the year-end close.
    Accountant,
    /// Read-only access.
    Viewer,
}

impl UserRole {
    /// Returns true if this role can lock periods and run year-end closes.
    #[must_use]
    pub const fn can_manage_fiscal(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin | Self::Accountant)
    }

    /// Returns true if this role can post to soft-closed periods.
    #[must_use]
    pub const fn can_post_soft_close(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin | Self::Accountant)
    }

    /// Returns true if this role can manage users.
    #[must_use]
    pub const fn can_manage_users(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Returns true if this role can modify organization settings.
    #[must_use]
    pub const fn can_modify_settings(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Parses a role from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(Self::Owner),
            "admin" => Some(Self::Admin),
            "accountant" => Some(Self::Accountant),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Admin => write!(f, "admin"),
            Self::Accountant => write!(f, "accountant"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(UserRole::Owner.can_manage_fiscal());
        assert!(UserRole::Admin.can_manage_fiscal());
        assert!(UserRole::Accountant.can_manage_fiscal());
        assert!(!UserRole::Viewer.can_manage_fiscal());

        assert!(UserRole::Owner.can_manage_users());
        assert!(UserRole::Admin.can_manage_users());
        assert!(!UserRole::Accountant.can_manage_users());
        assert!(!UserRole::Viewer.can_manage_users());
    }

    #[test]
    fn test_role_parse_round_trip() {
        for role in [
            UserRole::Owner,
            UserRole::Admin,
            UserRole::Accountant,
            UserRole::Viewer,
        ] {
            assert_eq!(UserRole::parse(&role.to_string()), Some(role));
        }
        assert_eq!(UserRole::parse("superuser"), None);
    }
}
