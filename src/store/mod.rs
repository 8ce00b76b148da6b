mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &NewUser) -> Result<User>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    // Course operations
    /// Inserts the course and enrolls its creator in one transaction.
    fn create_course(&self, code: &str, name: &str, created_by: i64) -> Result<Course>;
    fn get_course(&self, id: i64) -> Result<Option<Course>>;
    fn get_course_by_code(&self, code: &str) -> Result<Option<Course>>;
    fn list_enrolled_courses(&self, user_id: i64) -> Result<Vec<CourseSummary>>;
    fn list_unenrolled_courses(&self, user_id: i64) -> Result<Vec<CourseSummary>>;
    fn list_created_courses(&self, user_id: i64) -> Result<Vec<CourseSummary>>;

    // Enrollment operations
    fn add_enrollment(&self, user_id: i64, course_id: i64) -> Result<()>;
    fn is_enrolled(&self, user_id: i64, course_id: i64) -> Result<bool>;

    // Message operations
    /// Inserts a message stamped no earlier than the newest stored message.
    fn create_message(&self, course_id: i64, user_id: i64, text: &str) -> Result<Message>;
    fn get_message(&self, id: i64) -> Result<Option<Message>>;
    fn list_course_messages(&self, course_id: i64) -> Result<Vec<MessageView>>;
    fn delete_message(&self, id: i64) -> Result<bool>;

    fn stats(&self) -> Result<ForumStats>;

    fn close(&self) -> Result<()>;
}
