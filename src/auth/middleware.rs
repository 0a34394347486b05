//! Authentication middleware
//!
//! Two guards share one shape: read `x-access-token`, verify it with the
//! secret of the guard's identity class, then either stop the request with a
//! 401 or attach the decoded identity for the handler. Every refusal looks the
//! same to the client; the reason is only logged.

use crate::api::handlers::AppState;
use crate::auth::jwt::{verify_admin_token, verify_student_token, TokenRejection};
use crate::core::error::CanteenError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Header carrying the bearer token
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

const REJECTION_MESSAGE: &str = "invalid or missing access token";

/// Identity of an admitted student request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudentIdentity {
    pub id: i64,
}

/// Identity of an admitted admin request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminIdentity {
    pub username: String,
}

/// Why the guard refused a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingCredential,
    Token(TokenRejection),
}

impl AuthFailure {
    fn reason(&self) -> &'static str {
        match self {
            AuthFailure::MissingCredential => "missing_credential",
            AuthFailure::Token(rejection) => rejection.as_str(),
        }
    }
}

impl IntoResponse for AuthFailure {
    fn into_response(self) -> Response {
        CanteenError::AuthenticationError(REJECTION_MESSAGE.to_string()).into_response()
    }
}

fn access_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Guard for student routes
pub async fn student_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthFailure> {
    let token = access_token(request.headers()).ok_or_else(|| {
        tracing::debug!(uri = %request.uri(), "Student request without token");
        AuthFailure::MissingCredential
    })?;

    let claims = verify_student_token(token, &state.keys.student).map_err(|rejection| {
        let failure = AuthFailure::Token(rejection);
        tracing::warn!(uri = %request.uri(), reason = failure.reason(), "Student token refused");
        failure
    })?;

    request
        .extensions_mut()
        .insert(StudentIdentity { id: claims.id });

    Ok(next.run(request).await)
}

/// Guard for staff and menu publishing routes
pub async fn admin_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthFailure> {
    let token = access_token(request.headers()).ok_or_else(|| {
        tracing::debug!(uri = %request.uri(), "Admin request without token");
        AuthFailure::MissingCredential
    })?;

    let claims = verify_admin_token(token, &state.keys.admin).map_err(|rejection| {
        let failure = AuthFailure::Token(rejection);
        tracing::warn!(uri = %request.uri(), reason = failure.reason(), "Admin token refused");
        failure
    })?;

    request.extensions_mut().insert(AdminIdentity {
        username: claims.username,
    });

    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for StudentIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthFailure;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<StudentIdentity>()
            .cloned()
            .ok_or(AuthFailure::MissingCredential)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthFailure;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminIdentity>()
            .cloned()
            .ok_or(AuthFailure::MissingCredential)
    }
}
