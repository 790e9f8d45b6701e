pub mod capabilities;
pub mod dto;
pub mod errors;
pub mod memory;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use capabilities::{Authenticatable, PermissionBearing};
pub use dto::UserFields;
pub use errors::{AccountError, AccountResult};
pub use repo::{PgUserStore, UserStore};
pub use repo_types::{Role, User};
pub use services::{normalize_email, UserManager};
