//! Authentication API handlers
//!
//! Student self-registration, admin registration and admin login, plus the
//! startup bootstrap of the first admin account.

use crate::api::handlers::AppState;
use crate::auth::jwt::{issue_admin_token, issue_student_token};
use crate::auth::middleware::AdminIdentity;
use crate::auth::models::{CredentialsRequest, StudentRegisterRequest, TokenResponse};
use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::core::config::BootstrapConfig;
use crate::core::error::{CanteenError, Result};
use crate::db::models::{Admin, NewStudent};
use crate::db::repository::{AdminRepository, Repository};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

const LOGIN_FAILED: &str = "Username or password incorrect";

/// Handler for POST /student/register - Student self-registration
pub async fn register_student(
    State(state): State<AppState>,
    Json(req): Json<StudentRegisterRequest>,
) -> Result<impl IntoResponse> {
    let (name, enrolled_from, enrolled_to) = req.required_fields()?;
    let new_student = NewStudent::parse(name, enrolled_from, enrolled_to)?;

    let student = state.student_repo.create(new_student).await?;
    let token = issue_student_token(student.id, &state.keys.student)?;

    tracing::info!(student_id = student.id, "Student registered");

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// Handler for POST /staff/register - Create another admin
pub async fn register_admin(
    State(state): State<AppState>,
    caller: AdminIdentity,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse> {
    let (username, password) = req.required_fields()?;

    create_admin(&state.admin_repo, username, password, state.password_cost).await?;

    tracing::info!(
        username = %username,
        registered_by = %caller.username,
        "Admin registered"
    );

    Ok(StatusCode::CREATED)
}

/// Handler for POST /staff/login - Exchange admin credentials for a token
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse> {
    let (username, password) = req.required_fields()?;

    let admin = state.admin_repo.find_by_key(username.to_string()).await?;
    let known = admin.is_some();

    let digest = match admin {
        Some(admin) => admin.password_hash,
        None => state.login_decoy.digest().await?,
    };
    let verified = verify_password_blocking(password.to_string(), digest).await? && known;

    if !verified {
        tracing::warn!(username = %username, "Admin login failed");
        return Err(CanteenError::AuthenticationError(LOGIN_FAILED.to_string()));
    }

    let token = issue_admin_token(username, &state.keys.admin)?;

    tracing::info!(username = %username, "Admin logged in");

    Ok(Json(TokenResponse { token }))
}

/// Hash the password and store a new admin
async fn create_admin(repo: &AdminRepository, username: &str, password: &str, cost: u32) -> Result<()> {
    if repo.find_by_key(username.to_string()).await?.is_some() {
        return Err(CanteenError::AlreadyExists(
            "User already exists, please login".to_string(),
        ));
    }

    let password_hash = hash_password_blocking(password.to_string(), cost).await?;

    // The insert itself still refuses a concurrent duplicate
    repo.create(Admin {
        username: username.to_string(),
        password_hash,
    })
    .await
}

/// Create the configured first admin when no admin exists yet.
///
/// Returns whether an account was created.
pub async fn ensure_bootstrap_admin(
    repo: &AdminRepository,
    bootstrap: &BootstrapConfig,
    cost: u32,
) -> Result<bool> {
    if repo.count().await? > 0 {
        return Ok(false);
    }

    let Some((username, password)) = bootstrap.credentials() else {
        tracing::warn!(
            "No admin account exists and no bootstrap admin is configured; \
             staff registration will be unreachable"
        );
        return Ok(false);
    };

    create_admin(repo, username, password, cost).await?;
    tracing::info!(username = %username, "Bootstrap admin created");

    Ok(true)
}
