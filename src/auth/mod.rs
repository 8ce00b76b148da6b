pub mod accounts;
mod password;
mod session;

pub use accounts::{NewAccount, authenticate, register};
pub use password::{PBKDF2_ITERATIONS, hash_password, verify_password};
pub use session::{Session, SessionState};
