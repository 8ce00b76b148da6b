mod models;
pub mod policy;
mod role;

pub use models::*;
pub use policy::{Action, can, can_delete_message};
pub use role::{ParseRoleError, Role};
