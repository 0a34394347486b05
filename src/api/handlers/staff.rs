use crate::api::models::WeekQuery;
use crate::auth::middleware::AdminIdentity;
use crate::core::error::{CanteenError, Result};
use axum::{extract::Query, response::IntoResponse};

// Reserved staff reports. Guarded like the rest of /staff but not built yet.

/// Handler for GET /staff/enlistment?year=&week=
pub async fn staff_enlistment(
    admin: AdminIdentity,
    Query(query): Query<WeekQuery>,
) -> Result<impl IntoResponse> {
    tracing::debug!(username = %admin.username, ?query, "Staff enlistment report requested");
    Err::<(), _>(CanteenError::NotImplemented(
        "Staff enlistment report".to_string(),
    ))
}

/// Handler for GET and POST /staff/enrolled_number
pub async fn enrolled_number(admin: AdminIdentity) -> Result<impl IntoResponse> {
    tracing::debug!(username = %admin.username, "Enrolled number requested");
    Err::<(), _>(CanteenError::NotImplemented("Enrolled number".to_string()))
}
