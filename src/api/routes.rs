//! API routes
//!
//! Paths here are relative to `server.api_base`; the server mounts them.

use crate::api::handlers::{
    create_enlistment, create_menu, delete_student, enrolled_number, get_enlistment, get_menu,
    get_student, list_enlistments, list_menus, staff_enlistment, update_enlistment, AppState,
};
use crate::auth::handlers::{login, register_admin, register_student};
use crate::auth::middleware::{admin_auth, student_auth};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

/// Build the API routes
pub fn build_api_routes(state: AppState) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/student/register", post(register_student))
        .route("/staff/login", post(login))
        .route("/menu/single", get(get_menu))
        .route("/menu/all", get(list_menus));

    // Student routes. route_layer keeps unknown paths at 404 instead of 401.
    let student_routes = Router::new()
        .route("/student", get(get_student).delete(delete_student))
        .route(
            "/student/enlistment",
            post(create_enlistment).patch(update_enlistment),
        )
        .route("/student/enlistment/all", get(list_enlistments))
        .route("/student/enlistment/single", get(get_enlistment))
        .route_layer(middleware::from_fn_with_state(state.clone(), student_auth));

    // Admin routes
    let admin_routes = Router::new()
        .route("/staff/register", post(register_admin))
        .route("/staff/enlistment", get(staff_enlistment))
        .route(
            "/staff/enrolled_number",
            get(enrolled_number).post(enrolled_number),
        )
        .route("/menu", post(create_menu))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth));

    public_routes
        .merge(student_routes)
        .merge(admin_routes)
        .with_state(state)
}
