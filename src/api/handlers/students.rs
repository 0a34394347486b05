use crate::api::models::StudentResponse;
use crate::auth::middleware::StudentIdentity;
use crate::core::error::{CanteenError, Result};
use crate::db::repository::Repository;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use super::AppState;

/// Handler for GET /student - The caller's own record
pub async fn get_student(
    State(state): State<AppState>,
    student: StudentIdentity,
) -> Result<impl IntoResponse> {
    let record = state
        .student_repo
        .find_by_key(student.id)
        .await?
        .ok_or_else(|| CanteenError::NotFound("Student not found".to_string()))?;

    Ok(Json(StudentResponse::from(record)))
}

/// Handler for DELETE /student - Remove the caller and their enlistments
pub async fn delete_student(
    State(state): State<AppState>,
    student: StudentIdentity,
) -> Result<impl IntoResponse> {
    let removed = state.student_repo.delete(student.id).await?;

    tracing::info!(student_id = student.id, removed, "Student deleted");

    Ok(StatusCode::GONE)
}
