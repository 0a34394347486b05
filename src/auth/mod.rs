//! Authentication module
//!
//! This module provides authentication functionality including:
//! - Student registration, admin registration and admin login
//! - Per-class JWT issuing and verification
//! - Password hashing and verification
//! - Student and admin guards

pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;

pub use handlers::{ensure_bootstrap_admin, login, register_admin, register_student};
pub use jwt::{AuthKeys, TokenRejection, TokenSecret};
pub use middleware::{admin_auth, student_auth, AdminIdentity, StudentIdentity};
pub use password::{hash_password, verify_password};
