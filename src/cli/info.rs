use serde::Serialize;

use crate::config::ForumConfig;
use crate::store::Store;
use crate::types::ForumStats;

use super::init_store;

#[derive(Serialize)]
struct ForumInfo {
    database: String,
    #[serde(flatten)]
    stats: ForumStats,
}

pub fn run_info(config: &ForumConfig, json: bool) -> anyhow::Result<()> {
    let store = init_store(config)?;
    let info = ForumInfo {
        database: config.db_path().display().to_string(),
        stats: store.stats()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        let stats = &info.stats;
        println!();
        println!("coursetalk status");
        println!("{}", "─".repeat(17));
        println!("Database:     {}", info.database);
        println!(
            "Users:        {} ({} staff, {} students)",
            stats.staff + stats.students,
            stats.staff,
            stats.students
        );
        println!("Courses:      {}", stats.courses);
        println!("Enrollments:  {}", stats.enrollments);
        println!("Messages:     {}", stats.messages);
        println!();
    }

    Ok(())
}
