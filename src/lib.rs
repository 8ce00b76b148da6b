//! # coursetalk
//!
//! A course discussion forum: staff create courses, students join them,
//! and members post messages. Usable as a console binary or as a library.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use coursetalk::auth::{NewAccount, Session, register};
//! use coursetalk::forum::{board, registry};
//! use coursetalk::store::{SqliteStore, Store};
//! use coursetalk::types::Role;
//!
//! let store = SqliteStore::new("./data/coursetalk.db")?;
//! store.initialize()?;
//!
//! register(&store, &NewAccount {
//!     username: "profA",
//!     password: "pw1",
//!     full_name: "Professor A",
//!     role: Role::Staff,
//! })?;
//!
//! let mut session = Session::default();
//! let who = session.login(&store, "profA", "pw1")?.clone();
//! let course = registry::create_course(&store, &who, "CS101", "Intro")?;
//! board::post(&store, &who, course.id, "Welcome!")?;
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the console front end. Disable with `default-features = false`.

pub mod auth;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod forum;
pub mod seed;
pub mod store;
pub mod types;
pub mod validation;
