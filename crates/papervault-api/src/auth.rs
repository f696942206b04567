//! Shared-credential check for the admin routes.
//!
//! The admin dashboard sends the credential as two plain headers, `username`
//! and `password`. Both are compared in constant time.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use papervault_core::AppError;
use subtle::ConstantTimeEq;

use crate::error::HttpAppError;
use crate::state::AppState;

pub const USERNAME_HEADER: &str = "username";
pub const PASSWORD_HEADER: &str = "password";

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// True when both headers match the configured credential. An unconfigured
/// credential never matches.
pub fn is_admin(headers: &HeaderMap, username: Option<&str>, password: Option<&str>) -> bool {
    let (Some(expected_user), Some(expected_pass)) = (username, password) else {
        return false;
    };
    let (Some(user), Some(pass)) = (
        header(headers, USERNAME_HEADER),
        header(headers, PASSWORD_HEADER),
    ) else {
        return false;
    };
    // Evaluate both comparisons so timing does not reveal which half was wrong.
    let user_ok = secure_compare(user, expected_user);
    let pass_ok = secure_compare(pass, expected_pass);
    user_ok & pass_ok
}

pub async fn admin_auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let security = &state.security;
    if is_admin(
        request.headers(),
        security.admin_username.as_deref(),
        security.admin_password.as_deref(),
    ) {
        return next.run(request).await;
    }

    tracing::warn!(
        path = %request.uri().path(),
        has_username = request.headers().contains_key(USERNAME_HEADER),
        "Rejected admin request"
    );
    HttpAppError(AppError::Unauthorized("Unauthorized".to_string())).into_response()
}
