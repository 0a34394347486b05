pub mod common;
pub mod enlistments;
pub mod menus;
pub mod students;
pub mod system;

pub use common::*;
pub use enlistments::*;
pub use menus::*;
pub use students::*;
pub use system::*;
