//! Role extraction.
//!
//! Authentication happens upstream; by the time a request arrives here the
//! caller's role is in the `x-user-role` header. [`CurrentUser`] reads it and
//! [`RequireAdmin`] additionally insists on [`Role::Admin`].

use super::{error::AppError, state::AppState};
use axum::{extract::FromRequestParts, http::request::Parts};
use std::{fmt, str::FromStr};

/// Header carrying the caller's role.
pub const ROLE_HEADER: &str = "x-user-role";

/// What a caller is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Full access, including projection rebuilds
    Admin,
    /// Day-to-day record keeping
    Staff,
    /// Read-only
    Viewer,
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "viewer" => Ok(Self::Viewer),
            other => Err(AppError::Unauthorized(format!("Unrecognized role '{other}'"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Viewer => "viewer",
        })
    }
}

/// The caller, as identified by the upstream authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    /// Caller's role
    pub role: Role,
}

impl CurrentUser {
    /// Whether the caller may change records.
    #[must_use]
    pub const fn can_write(self) -> bool {
        matches!(self.role, Role::Admin | Role::Staff)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let role = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized(format!("Missing {ROLE_HEADER} header")))?
            .parse()?;

        Ok(Self { role })
    }
}

/// Requires the admin role. Rejects with 403 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            return Err(AppError::Forbidden("Admin role required".into()));
        }
        Ok(Self(user))
    }
}

/// Requires a role that may change records. Rejects with 403 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct RequireWriter(pub CurrentUser);

impl FromRequestParts<AppState> for RequireWriter {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.can_write() {
            return Err(AppError::Forbidden("Staff or Admin role required".into()));
        }
        Ok(Self(user))
    }
}
