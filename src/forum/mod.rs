//! Course and message operations, checked against the role table and
//! enrollment before anything is written.

pub mod board;
pub mod registry;
