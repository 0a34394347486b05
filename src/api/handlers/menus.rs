use crate::api::models::{MenuRequest, MenuResponse, WeekQuery};
use crate::auth::middleware::AdminIdentity;
use crate::core::error::{CanteenError, Result};
use crate::db::repository::Repository;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use super::AppState;

/// Handler for POST /menu - Publish the menu of a week (admin only)
pub async fn create_menu(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Json(req): Json<MenuRequest>,
) -> Result<impl IntoResponse> {
    let key = req.key()?;

    let menu = state.menu_repo.create(key, req.days).await?;

    tracing::info!(
        username = %admin.username,
        year = key.year,
        week = key.week,
        "Menu published"
    );

    Ok((StatusCode::CREATED, Json(MenuResponse::from(menu))))
}

/// Handler for GET /menu/single?year=&week=
pub async fn get_menu(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<impl IntoResponse> {
    let key = query.key()?;

    let menu = state
        .menu_repo
        .find_by_key(key)
        .await?
        .ok_or_else(|| {
            CanteenError::NotFound(format!("No menu for week {} of {}", key.week, key.year))
        })?;

    Ok(Json(MenuResponse::from(menu)))
}

/// Handler for GET /menu/all
pub async fn list_menus(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let menus: Vec<MenuResponse> = state
        .menu_repo
        .find_all()
        .await?
        .into_iter()
        .map(MenuResponse::from)
        .collect();

    Ok(Json(menus))
}
