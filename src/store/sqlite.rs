use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::configure(conn)
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

// Fixed width so text ordering in SQL matches time ordering.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn extended_code(err: &rusqlite::Error) -> Option<i32> {
    match err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Some(e.extended_code)
        }
        _ => None,
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        extended_code(err),
        Some(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    )
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    extended_code(err) == Some(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

const USER_COLUMNS: &str = "id, username, password_hash, role, full_name, created_at";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role: row.get(3)?,
        full_name: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

const COURSE_COLUMNS: &str = "id, course_code, course_name, created_by, created_at";

fn row_to_course(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        course_code: row.get(1)?,
        course_name: row.get(2)?,
        created_by: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn row_to_course_summary(row: &Row<'_>) -> rusqlite::Result<CourseSummary> {
    Ok(CourseSummary {
        course: row_to_course(row)?,
        creator_username: row.get(5)?,
    })
}

const SUMMARY_SELECT: &str =
    "SELECT c.id, c.course_code, c.course_name, c.created_by, c.created_at, u.username
     FROM courses c
     JOIN users u ON u.id = c.created_by";

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        course_id: row.get(1)?,
        user_id: row.get(2)?,
        text: row.get(3)?,
        posted_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

impl SqliteStore {
    fn query_summaries(&self, sql: &str, user_id: i64) -> Result<Vec<CourseSummary>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![user_id], row_to_course_summary)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &NewUser) -> Result<User> {
        let now = Utc::now();
        let conn = self.conn();
        let result = conn.execute(
            "INSERT INTO users (username, password_hash, role, full_name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.username,
                user.password_hash,
                user.role,
                user.full_name,
                format_datetime(&now),
            ],
        );

        match result {
            Ok(_) => Ok(User {
                id: conn.last_insert_rowid(),
                username: user.username.clone(),
                password_hash: user.password_hash.clone(),
                role: user.role,
                full_name: user.full_name.clone(),
                created_at: now,
            }),
            Err(e) if is_unique_violation(&e) => Err(Error::Conflict(format!(
                "username '{}' is already taken",
                user.username
            ))),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            row_to_user,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            params![username],
            row_to_user,
        )
        .optional()
        .map_err(Error::from)
    }

    // Course operations

    fn create_course(&self, code: &str, name: &str, created_by: i64) -> Result<Course> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let now = Utc::now();
        let now_str = format_datetime(&now);

        let inserted = tx.execute(
            "INSERT INTO courses (course_code, course_name, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![code, name, created_by, now_str],
        );
        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(Error::Conflict(format!(
                    "course code '{code}' already exists"
                )));
            }
            Err(e) if is_foreign_key_violation(&e) => return Err(Error::not_found("user")),
            Err(e) => return Err(Error::from(e)),
        }
        let course_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO enrollments (user_id, course_id, enrolled_at) VALUES (?1, ?2, ?3)",
            params![created_by, course_id, now_str],
        )?;

        tx.commit()?;

        Ok(Course {
            id: course_id,
            course_code: code.to_string(),
            course_name: name.to_string(),
            created_by,
            created_at: now,
        })
    }

    fn get_course(&self, id: i64) -> Result<Option<Course>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1"),
            params![id],
            row_to_course,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_course_by_code(&self, code: &str) -> Result<Option<Course>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE course_code = ?1"),
            params![code],
            row_to_course,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_enrolled_courses(&self, user_id: i64) -> Result<Vec<CourseSummary>> {
        self.query_summaries(
            &format!(
                "{SUMMARY_SELECT}
                 JOIN enrollments e ON e.course_id = c.id
                 WHERE e.user_id = ?1
                 ORDER BY c.course_code"
            ),
            user_id,
        )
    }

    fn list_unenrolled_courses(&self, user_id: i64) -> Result<Vec<CourseSummary>> {
        self.query_summaries(
            &format!(
                "{SUMMARY_SELECT}
                 WHERE c.id NOT IN (SELECT course_id FROM enrollments WHERE user_id = ?1)
                 ORDER BY c.course_code"
            ),
            user_id,
        )
    }

    fn list_created_courses(&self, user_id: i64) -> Result<Vec<CourseSummary>> {
        self.query_summaries(
            &format!(
                "{SUMMARY_SELECT}
                 WHERE c.created_by = ?1
                 ORDER BY c.course_code"
            ),
            user_id,
        )
    }

    // Enrollment operations

    fn add_enrollment(&self, user_id: i64, course_id: i64) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO enrollments (user_id, course_id, enrolled_at) VALUES (?1, ?2, ?3)",
            params![user_id, course_id, format_datetime(&Utc::now())],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(Error::Conflict("already enrolled in this course".to_string()))
            }
            Err(e) if is_foreign_key_violation(&e) => Err(Error::not_found("course")),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn is_enrolled(&self, user_id: i64, course_id: i64) -> Result<bool> {
        let conn = self.conn();
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM enrollments WHERE user_id = ?1 AND course_id = ?2",
                params![user_id, course_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    // Message operations

    fn create_message(&self, course_id: i64, user_id: i64, text: &str) -> Result<Message> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let latest: Option<String> =
            tx.query_row("SELECT MAX(posted_at) FROM messages", [], |row| row.get(0))?;
        let now = Utc::now();
        let posted_at = match latest.map(|s| parse_datetime(&s)) {
            Some(latest) if latest > now => latest,
            _ => now,
        };

        let inserted = tx.execute(
            "INSERT INTO messages (course_id, user_id, message, posted_at) VALUES (?1, ?2, ?3, ?4)",
            params![course_id, user_id, text, format_datetime(&posted_at)],
        );
        match inserted {
            Ok(_) => {}
            Err(e) if is_foreign_key_violation(&e) => {
                let course_exists: Option<i64> = tx
                    .query_row("SELECT 1 FROM courses WHERE id = ?1", params![course_id], |row| {
                        row.get(0)
                    })
                    .optional()?;
                let missing = if course_exists.is_some() { "user" } else { "course" };
                return Err(Error::not_found(missing));
            }
            Err(e) => return Err(Error::from(e)),
        }
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Message {
            id,
            course_id,
            user_id,
            text: text.to_string(),
            posted_at,
        })
    }

    fn get_message(&self, id: i64) -> Result<Option<Message>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, course_id, user_id, message, posted_at FROM messages WHERE id = ?1",
            params![id],
            row_to_message,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_course_messages(&self, course_id: i64) -> Result<Vec<MessageView>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT m.id, m.course_id, m.user_id, m.message, m.posted_at, u.username
             FROM messages m
             JOIN users u ON u.id = m.user_id
             WHERE m.course_id = ?1
             ORDER BY m.posted_at, m.id",
        )?;

        let rows = stmt.query_map(params![course_id], |row| {
            Ok(MessageView {
                message: row_to_message(row)?,
                author_username: row.get(5)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_message(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM messages WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn stats(&self) -> Result<ForumStats> {
        let conn = self.conn();
        conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM users WHERE role = 'staff'),
                (SELECT COUNT(*) FROM users WHERE role = 'student'),
                (SELECT COUNT(*) FROM courses),
                (SELECT COUNT(*) FROM enrollments),
                (SELECT COUNT(*) FROM messages)",
            [],
            |row| {
                Ok(ForumStats {
                    staff: row.get(0)?,
                    students: row.get(1)?,
                    courses: row.get(2)?,
                    enrollments: row.get(3)?,
                    messages: row.get(4)?,
                })
            },
        )
        .map_err(Error::from)
    }

    fn close(&self) -> Result<()> {
        let conn = self.conn();
        // Fold the WAL back into the main file so the database is self-contained on exit.
        conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
        tracing::debug!("database checkpointed");
        Ok(())
    }
}
