mod commands;
mod info;
pub mod pickers;
mod shell;
mod user;

pub use commands::UserCommands;
pub use info::run_info;
pub use shell::run_shell;
pub use user::run_user_add;

use std::fs;

use crate::config::ForumConfig;
use crate::store::{SqliteStore, Store};

/// Open the store for an existing data directory
pub fn init_store(config: &ForumConfig) -> anyhow::Result<SqliteStore> {
    let db_path = config.db_path();

    if !db_path.exists() {
        anyhow::bail!(
            "Database not found at {}. Run 'coursetalk init' first.",
            db_path.display()
        );
    }

    SqliteStore::new(&db_path).map_err(Into::into)
}

/// Create the data directory and schema if missing, then open the store
pub fn prepare_store(config: &ForumConfig) -> anyhow::Result<SqliteStore> {
    fs::create_dir_all(&config.data_dir)?;
    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;
    Ok(store)
}
