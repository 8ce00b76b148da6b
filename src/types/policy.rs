use std::fmt;

use super::{Course, Identity, Message, Role};

/// Actions gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateCourse,
    JoinCourse,
    /// Still requires enrollment in the target course.
    PostMessage,
    /// Delete any message in a course the actor created.
    ModerateMessage,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::CreateCourse,
        Action::JoinCourse,
        Action::PostMessage,
        Action::ModerateMessage,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::CreateCourse => "create_course",
            Action::JoinCourse => "join_course",
            Action::PostMessage => "post_message",
            Action::ModerateMessage => "moderate_message",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if the role table permits the action.
#[must_use]
pub const fn can(role: Role, action: Action) -> bool {
    match (role, action) {
        (Role::Staff, Action::CreateCourse) => true,
        (Role::Student, Action::CreateCourse) => false,
        (Role::Staff, Action::JoinCourse) => false,
        (Role::Student, Action::JoinCourse) => true,
        (_, Action::PostMessage) => true,
        (Role::Staff, Action::ModerateMessage) => true,
        (Role::Student, Action::ModerateMessage) => false,
    }
}

/// Authors may always delete their own message. Otherwise the requester
/// must hold the moderate permission and own the message's course.
#[must_use]
pub fn can_delete_message(who: &Identity, message: &Message, course: &Course) -> bool {
    if message.user_id == who.user_id {
        return true;
    }
    can(who.role, Action::ModerateMessage)
        && course.id == message.course_id
        && course.created_by == who.user_id
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn identity(user_id: i64, role: Role) -> Identity {
        Identity {
            user_id,
            username: format!("user{user_id}"),
            role,
        }
    }

    fn course(id: i64, created_by: i64) -> Course {
        Course {
            id,
            course_code: "CS101".to_string(),
            course_name: "Intro".to_string(),
            created_by,
            created_at: Utc::now(),
        }
    }

    fn message(course_id: i64, user_id: i64) -> Message {
        Message {
            id: 1,
            course_id,
            user_id,
            text: "hello".to_string(),
            posted_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_table() {
        assert!(can(Role::Staff, Action::CreateCourse));
        assert!(!can(Role::Student, Action::CreateCourse));
        assert!(!can(Role::Staff, Action::JoinCourse));
        assert!(can(Role::Student, Action::JoinCourse));
        assert!(can(Role::Staff, Action::PostMessage));
        assert!(can(Role::Student, Action::PostMessage));
        assert!(can(Role::Staff, Action::ModerateMessage));
        assert!(!can(Role::Student, Action::ModerateMessage));
    }

    #[test]
    fn test_author_can_delete_own_message() {
        let student = identity(2, Role::Student);
        assert!(can_delete_message(&student, &message(10, 2), &course(10, 1)));
    }

    #[test]
    fn test_student_cannot_delete_other_students_message() {
        let student = identity(2, Role::Student);
        assert!(!can_delete_message(&student, &message(10, 3), &course(10, 1)));
    }

    #[test]
    fn test_course_owner_can_moderate() {
        let staff = identity(1, Role::Staff);
        assert!(can_delete_message(&staff, &message(10, 3), &course(10, 1)));
    }

    #[test]
    fn test_staff_cannot_moderate_someone_elses_course() {
        let staff = identity(4, Role::Staff);
        assert!(!can_delete_message(&staff, &message(10, 3), &course(10, 1)));
    }

    #[test]
    fn test_mismatched_course_is_rejected() {
        let staff = identity(1, Role::Staff);
        assert!(!can_delete_message(&staff, &message(11, 3), &course(10, 1)));
    }

    #[test]
    fn test_action_names() {
        let names: Vec<_> = Action::ALL.iter().map(|a| a.as_str()).collect();
        assert_eq!(
            names,
            ["create_course", "join_course", "post_message", "moderate_message"]
        );
    }
}
