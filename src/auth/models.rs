//! Authentication request/response models

use crate::core::error::{CanteenError, Result};
use serde::{Deserialize, Serialize};

const ALL_INPUT_REQUIRED: &str = "All input is required";

/// bcrypt ignores every byte past this length
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Body of `POST /student/register`
#[derive(Debug, Default, Deserialize)]
pub struct StudentRegisterRequest {
    pub name: Option<String>,
    pub enrolled_from: Option<String>,
    pub enrolled_to: Option<String>,
}

impl StudentRegisterRequest {
    /// All three fields, or the "All input is required" rejection
    pub fn required_fields(&self) -> Result<(&str, &str, &str)> {
        match (
            present(&self.name),
            present(&self.enrolled_from),
            present(&self.enrolled_to),
        ) {
            (Some(name), Some(from), Some(to)) => Ok((name, from, to)),
            _ => Err(CanteenError::InvalidRequest(ALL_INPUT_REQUIRED.to_string())),
        }
    }
}

/// Body of `POST /staff/register` and `POST /staff/login`
#[derive(Deserialize, Default)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Username and password, or the "All input is required" rejection.
    ///
    /// Passwords longer than bcrypt can hash are refused outright.
    pub fn required_fields(&self) -> Result<(&str, &str)> {
        let (username, password) = match (present(&self.username), present(&self.password)) {
            (Some(username), Some(password)) => (username, password),
            _ => return Err(CanteenError::InvalidRequest(ALL_INPUT_REQUIRED.to_string())),
        };

        if password.len() > MAX_PASSWORD_BYTES {
            return Err(CanteenError::ValidationError(format!(
                "password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }

        Ok((username, password))
    }
}

// Keeps the password out of logs
impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Response carrying a freshly issued token
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
