use crate::api::models::{EnlistmentRequest, EnlistmentResponse, WeekQuery};
use crate::auth::middleware::StudentIdentity;
use crate::core::error::{CanteenError, Result};
use crate::db::repository::Repository;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use super::AppState;

/// Handler for POST /student/enlistment - Enlist for a week
pub async fn create_enlistment(
    State(state): State<AppState>,
    student: StudentIdentity,
    Json(req): Json<EnlistmentRequest>,
) -> Result<impl IntoResponse> {
    let key = req.key()?;

    let enlistment = state
        .enlistment_repo
        .create(student.id, key, req.days())
        .await?;

    tracing::info!(
        student_id = student.id,
        year = key.year,
        week = key.week,
        "Enlistment created"
    );

    Ok((StatusCode::CREATED, Json(EnlistmentResponse::from(enlistment))))
}

/// Handler for PATCH /student/enlistment - Change the days of an enlistment
pub async fn update_enlistment(
    State(state): State<AppState>,
    student: StudentIdentity,
    Json(req): Json<EnlistmentRequest>,
) -> Result<impl IntoResponse> {
    let key = req.key()?;

    if !state
        .enlistment_repo
        .update_days(student.id, key, req.days())
        .await?
    {
        return Err(CanteenError::NotFound(format!(
            "No enlistment for week {} of {}",
            key.week, key.year
        )));
    }

    tracing::info!(
        student_id = student.id,
        year = key.year,
        week = key.week,
        "Enlistment updated"
    );

    Ok(StatusCode::OK)
}

/// Handler for GET /student/enlistment/all
pub async fn list_enlistments(
    State(state): State<AppState>,
    student: StudentIdentity,
) -> Result<impl IntoResponse> {
    let enlistments: Vec<EnlistmentResponse> = state
        .enlistment_repo
        .find_by_student(student.id)
        .await?
        .into_iter()
        .map(EnlistmentResponse::from)
        .collect();

    Ok(Json(enlistments))
}

/// Handler for GET /student/enlistment/single?year=&week=
pub async fn get_enlistment(
    State(state): State<AppState>,
    student: StudentIdentity,
    Query(query): Query<WeekQuery>,
) -> Result<impl IntoResponse> {
    let key = query.key()?;

    let enlistment = state
        .enlistment_repo
        .find_by_key((student.id, key))
        .await?
        .ok_or_else(|| {
            CanteenError::NotFound(format!("No enlistment for week {} of {}", key.week, key.year))
        })?;

    Ok(Json(EnlistmentResponse::from(enlistment)))
}
