//! Canteen Backend Library
//!
//! Meal enlistment and menu publishing for a student cafeteria: student
//! self-registration, weekly enlistments, staff accounts and menus, with
//! separate token classes for students and admins.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;

// Re-export commonly used types
pub use api::{ApiServer, AppState};
pub use crate::core::{CanteenError, Config};
pub use db::DatabaseManager;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
