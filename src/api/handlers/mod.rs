pub mod enlistments;
pub mod menus;
pub mod staff;
pub mod students;
pub mod system;

pub use enlistments::*;
pub use menus::*;
pub use staff::*;
pub use students::*;
pub use system::*;

use crate::auth::jwt::AuthKeys;
use crate::auth::password::DecoyDigest;
use crate::db::repository::{
    AdminRepository, EnlistmentRepository, MenuRepository, StudentRepository,
};
use crate::db::DatabaseManager;
use std::sync::Arc;

/// Shared application state for handlers
#[derive(Clone)]
pub struct AppState {
    pub student_repo: Arc<StudentRepository>,
    pub admin_repo: Arc<AdminRepository>,
    pub enlistment_repo: Arc<EnlistmentRepository>,
    pub menu_repo: Arc<MenuRepository>,
    pub keys: Arc<AuthKeys>,
    /// bcrypt cost for new admin passwords
    pub password_cost: u32,
    /// Verified against when a login names no existing admin
    pub login_decoy: Arc<DecoyDigest>,
}

impl AppState {
    pub fn new(db: Arc<DatabaseManager>, keys: AuthKeys, password_cost: u32) -> Self {
        Self {
            student_repo: Arc::new(StudentRepository::new(db.clone())),
            admin_repo: Arc::new(AdminRepository::new(db.clone())),
            enlistment_repo: Arc::new(EnlistmentRepository::new(db.clone())),
            menu_repo: Arc::new(MenuRepository::new(db)),
            keys: Arc::new(keys),
            password_cost,
            login_decoy: Arc::new(DecoyDigest::new(password_cost)),
        }
    }
}
