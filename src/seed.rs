//! Demo data set: one staff member, one student, one shared course and a
//! short conversation. Safe to load repeatedly.

use serde::Serialize;
use tracing::{info, warn};

use crate::auth::{NewAccount, register};
use crate::error::Result;
use crate::forum::{board, registry};
use crate::store::Store;
use crate::types::{Identity, Role};

pub const DEMO_STAFF: (&str, &str) = ("prof_smith", "staff123");
pub const DEMO_STUDENT: (&str, &str) = ("student_john", "student123");
pub const DEMO_COURSE_CODE: &str = "SOE505";
const DEMO_COURSE_NAME: &str = "Software Engineering Security";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub users_created: usize,
    pub course_created: bool,
    pub enrollments_created: usize,
    pub messages_created: usize,
}

/// Registers a demo account, or reuses an existing one with the expected
/// role. A same-named account with another role is left alone and `None`
/// is returned.
fn ensure_user(
    store: &impl Store,
    report: &mut SeedReport,
    (username, password): (&str, &str),
    full_name: &str,
    role: Role,
) -> Result<Option<Identity>> {
    if let Some(user) = store.get_user_by_username(username)? {
        if user.role != role {
            warn!(
                username,
                expected = %role,
                found = %user.role,
                "demo account exists with another role; skipping it"
            );
            return Ok(None);
        }
        return Ok(Some(Identity::from(&user)));
    }

    let user = register(
        store,
        &NewAccount {
            username,
            password,
            full_name,
            role,
        },
    )?;
    report.users_created += 1;
    Ok(Some(Identity::from(&user)))
}

/// Loads the demo data set. Parts whose accounts are unusable are skipped
/// with a warning rather than failing the whole seed.
pub fn seed_demo(store: &impl Store) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    let staff = ensure_user(store, &mut report, DEMO_STAFF, "Professor Smith", Role::Staff)?;
    let student = ensure_user(store, &mut report, DEMO_STUDENT, "John Doe", Role::Student)?;

    let course = match (store.get_course_by_code(DEMO_COURSE_CODE)?, &staff) {
        (Some(course), _) => Some(course),
        (None, Some(staff)) => {
            report.course_created = true;
            Some(registry::create_course(
                store,
                staff,
                DEMO_COURSE_CODE,
                DEMO_COURSE_NAME,
            )?)
        }
        (None, None) => {
            warn!(course = DEMO_COURSE_CODE, "no demo staff account; course not created");
            None
        }
    };

    if let (Some(course), Some(student)) = (&course, &student) {
        if !store.is_enrolled(student.user_id, course.id)? {
            registry::join_course(store, student, course.id)?;
            report.enrollments_created += 1;
        }
    }

    if let (true, Some(course), Some(staff), Some(student)) =
        (report.course_created, &course, &staff, &student)
    {
        let conversation = [
            (staff, "Welcome to SOE505! This week we'll cover secure coding."),
            (student, "Hello Professor! When is Assignment 1 due?"),
            (staff, "Assignment 1 is due next Friday. Check the syllabus."),
            (student, "Thank you! I'll start working on it."),
        ];
        for (author, text) in conversation {
            board::post(store, author, course.id, text)?;
            report.messages_created += 1;
        }
    }

    info!(?report, "demo data loaded");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::authenticate;
    use crate::store::SqliteStore;
    use crate::types::User;

    #[test]
    fn test_seed_creates_demo_data() {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();

        let report = seed_demo(&store).unwrap();
        assert_eq!(
            report,
            SeedReport {
                users_created: 2,
                course_created: true,
                enrollments_created: 1,
                messages_created: 4,
            }
        );

        let student = authenticate(&store, DEMO_STUDENT.0, DEMO_STUDENT.1).unwrap();
        let course = store.get_course_by_code(DEMO_COURSE_CODE).unwrap().unwrap();
        let messages = board::read(&store, &student, course.id).unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].author_username, DEMO_STAFF.0);
    }

    fn preregister(store: &SqliteStore, username: &str, role: Role) -> User {
        register(
            store,
            &NewAccount {
                username,
                password: "taken",
                full_name: "Someone Else",
                role,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_seed_skips_student_name_held_by_staff() {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        let impostor = preregister(&store, DEMO_STUDENT.0, Role::Staff);

        let report = seed_demo(&store).unwrap();
        assert_eq!(report.users_created, 1);
        assert!(report.course_created);
        assert_eq!(report.enrollments_created, 0);
        assert_eq!(report.messages_created, 0);

        let course = store.get_course_by_code(DEMO_COURSE_CODE).unwrap().unwrap();
        assert!(!store.is_enrolled(impostor.id, course.id).unwrap());
        assert_eq!(store.stats().unwrap().enrollments, 1);
    }

    #[test]
    fn test_seed_skips_staff_name_held_by_student() {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        preregister(&store, DEMO_STAFF.0, Role::Student);

        let report = seed_demo(&store).unwrap();
        assert_eq!(report.users_created, 1);
        assert!(!report.course_created);
        assert!(store.get_course_by_code(DEMO_COURSE_CODE).unwrap().is_none());
        assert_eq!(store.stats().unwrap().messages, 0);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();

        seed_demo(&store).unwrap();
        let before = store.stats().unwrap();
        let second = seed_demo(&store).unwrap();

        assert_eq!(second, SeedReport::default());
        assert_eq!(store.stats().unwrap(), before);
    }
}
