use tracing::info;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Action, Course, Identity, Message, MessageView, can, can_delete_message};
use crate::validation::validate_message_text;

fn require_course(store: &impl Store, course_id: i64) -> Result<Course> {
    store
        .get_course(course_id)?
        .ok_or_else(|| Error::not_found("course"))
}

fn require_member(store: &impl Store, who: &Identity, course: &Course) -> Result<()> {
    if store.is_enrolled(who.user_id, course.id)? {
        Ok(())
    } else {
        Err(Error::forbidden(format!(
            "you are not enrolled in {}",
            course.course_code
        )))
    }
}

/// Posts a message to a course the author is enrolled in. The text is
/// stored trimmed.
pub fn post(store: &impl Store, who: &Identity, course_id: i64, text: &str) -> Result<Message> {
    if !can(who.role, Action::PostMessage) {
        return Err(Error::forbidden("posting is not allowed for this role"));
    }
    let course = require_course(store, course_id)?;
    require_member(store, who, &course)?;

    let text = text.trim();
    validate_message_text(text).map_err(Error::Validation)?;

    let message = store.create_message(course.id, who.user_id, text)?;
    info!(message_id = message.id, course = %course.course_code, author = %who.username, "message posted");
    Ok(message)
}

/// Messages of a course, oldest first.
pub fn list(store: &impl Store, course_id: i64) -> Result<Vec<MessageView>> {
    let course = require_course(store, course_id)?;
    store.list_course_messages(course.id)
}

/// Same as [`list`], for members only.
pub fn read(store: &impl Store, who: &Identity, course_id: i64) -> Result<Vec<MessageView>> {
    let course = require_course(store, course_id)?;
    require_member(store, who, &course)?;
    store.list_course_messages(course.id)
}

pub fn delete(store: &impl Store, who: &Identity, message_id: i64) -> Result<()> {
    let message = store
        .get_message(message_id)?
        .ok_or_else(|| Error::not_found("message"))?;
    let course = require_course(store, message.course_id)?;

    if !can_delete_message(who, &message, &course) {
        return Err(Error::forbidden(
            "you can only delete your own messages or messages in courses you created",
        ));
    }

    if !store.delete_message(message.id)? {
        return Err(Error::not_found("message"));
    }
    info!(message_id, course = %course.course_code, by = %who.username, "message deleted");
    Ok(())
}

/// Messages in the course the requester may delete, newest first.
pub fn list_deletable(store: &impl Store, who: &Identity, course_id: i64) -> Result<Vec<MessageView>> {
    let course = require_course(store, course_id)?;
    let mut messages: Vec<_> = store
        .list_course_messages(course.id)?
        .into_iter()
        .filter(|view| can_delete_message(who, &view.message, &course))
        .collect();
    messages.reverse();
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{NewAccount, register};
    use crate::forum::registry::{create_course, join_course};
    use crate::store::SqliteStore;
    use crate::types::Role;

    struct Fixture {
        store: SqliteStore,
        staff: Identity,
        alice: Identity,
        bob: Identity,
        course: Course,
    }

    fn person(store: &SqliteStore, username: &str, role: Role) -> Identity {
        let user = register(
            store,
            &NewAccount {
                username,
                password: "pw",
                full_name: username,
                role,
            },
        )
        .unwrap();
        Identity::from(&user)
    }

    fn fixture() -> Fixture {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        let staff = person(&store, "profA", Role::Staff);
        let alice = person(&store, "alice", Role::Student);
        let bob = person(&store, "bob", Role::Student);
        let course = create_course(&store, &staff, "CS101", "Intro").unwrap();
        join_course(&store, &alice, course.id).unwrap();
        join_course(&store, &bob, course.id).unwrap();
        Fixture {
            store,
            staff,
            alice,
            bob,
            course,
        }
    }

    #[test]
    fn test_post_requires_enrollment() {
        let f = fixture();
        let outsider = person(&f.store, "carol", Role::Student);

        let result = post(&f.store, &outsider, f.course.id, "hi");
        assert!(matches!(result, Err(Error::Forbidden(_))));
        assert!(list(&f.store, f.course.id).unwrap().is_empty());
    }

    #[test]
    fn test_post_rejects_blank_text() {
        let f = fixture();
        let result = post(&f.store, &f.alice, f.course.id, "  \t ");
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_post_trims_text() {
        let f = fixture();
        let message = post(&f.store, &f.alice, f.course.id, "  hello  ").unwrap();
        assert_eq!(message.text, "hello");
    }

    #[test]
    fn test_post_to_missing_course_is_not_found() {
        let f = fixture();
        assert!(matches!(
            post(&f.store, &f.alice, 999, "hi"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(list(&f.store, 999), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_list_is_chronological() {
        let f = fixture();
        post(&f.store, &f.staff, f.course.id, "welcome").unwrap();
        post(&f.store, &f.alice, f.course.id, "question").unwrap();
        post(&f.store, &f.staff, f.course.id, "answer").unwrap();

        let views = list(&f.store, f.course.id).unwrap();
        let pairs: Vec<_> = views
            .iter()
            .map(|v| (v.author_username.as_str(), v.message.text.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [("profA", "welcome"), ("alice", "question"), ("profA", "answer")]
        );
    }

    #[test]
    fn test_read_requires_membership() {
        let f = fixture();
        let outsider = person(&f.store, "carol", Role::Student);
        post(&f.store, &f.alice, f.course.id, "members only").unwrap();

        assert_eq!(read(&f.store, &f.bob, f.course.id).unwrap().len(), 1);
        assert!(matches!(
            read(&f.store, &outsider, f.course.id),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn test_author_deletes_own_message() {
        let f = fixture();
        let message = post(&f.store, &f.alice, f.course.id, "oops").unwrap();

        delete(&f.store, &f.alice, message.id).unwrap();
        assert!(list(&f.store, f.course.id).unwrap().is_empty());
    }

    #[test]
    fn test_student_cannot_delete_another_students_message() {
        let f = fixture();
        let message = post(&f.store, &f.alice, f.course.id, "mine").unwrap();

        let result = delete(&f.store, &f.bob, message.id);
        assert!(matches!(result, Err(Error::Forbidden(_))));
        assert_eq!(list(&f.store, f.course.id).unwrap().len(), 1);
    }

    #[test]
    fn test_course_owner_moderates_any_message() {
        let f = fixture();
        let message = post(&f.store, &f.bob, f.course.id, "spam").unwrap();

        delete(&f.store, &f.staff, message.id).unwrap();
        assert!(list(&f.store, f.course.id).unwrap().is_empty());
    }

    #[test]
    fn test_other_staff_cannot_moderate() {
        let f = fixture();
        let other = person(&f.store, "profB", Role::Staff);
        let message = post(&f.store, &f.bob, f.course.id, "spam").unwrap();

        assert!(matches!(
            delete(&f.store, &other, message.id),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn test_deleting_twice_reports_not_found() {
        let f = fixture();
        let message = post(&f.store, &f.alice, f.course.id, "once").unwrap();

        delete(&f.store, &f.alice, message.id).unwrap();
        assert!(matches!(
            delete(&f.store, &f.alice, message.id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_list_deletable_filters_and_orders_newest_first() {
        let f = fixture();
        post(&f.store, &f.alice, f.course.id, "a1").unwrap();
        post(&f.store, &f.bob, f.course.id, "b1").unwrap();
        post(&f.store, &f.alice, f.course.id, "a2").unwrap();

        let texts = |views: Vec<MessageView>| -> Vec<String> {
            views.into_iter().map(|v| v.message.text).collect()
        };
        assert_eq!(texts(list_deletable(&f.store, &f.alice, f.course.id).unwrap()), ["a2", "a1"]);
        assert_eq!(
            texts(list_deletable(&f.store, &f.staff, f.course.id).unwrap()),
            ["a2", "b1", "a1"]
        );
    }
}
