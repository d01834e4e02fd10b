use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

use crate::{auth, models::Role, AppError, AppState};

pub const SESSION_COOKIE: &str = "session";

/// Extracts the JWT from the session cookie (browser) or the Authorization header (services)
fn extract_token_from_request(parts: &Parts) -> Option<String> {
    if let Some(cookie_header) = parts.headers.get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            // cookie = "name=value; name2=value2"
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(value) = cookie
                    .strip_prefix(SESSION_COOKIE)
                    .and_then(|rest| rest.strip_prefix('='))
                {
                    return Some(value.to_string());
                }
            }
        }
    }

    if let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    None
}

/// The verified caller of a request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = extract_token_from_request(parts);
        let state = state.clone();

        async move {
            let token = token.ok_or_else(|| {
                AppError::Unauthorized(
                    "Missing authentication: no session cookie or Authorization header".to_string(),
                )
            })?;

            let claims = auth::validate_jwt(&token, &state.config.jwt_secret).map_err(|e| {
                tracing::debug!(error = %e, "Rejected caller token");
                AppError::Unauthorized(e)
            })?;

            tracing::debug!(user_id = %claims.sub, role = %claims.role, "Caller authenticated");

            Ok(AuthenticatedUser {
                user_id: claims.sub,
                role: claims.role,
            })
        }
    }
}
