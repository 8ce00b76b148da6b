use tracing::info;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Action, Course, CourseSummary, Identity, can};
use crate::validation::{validate_course_code, validate_course_name};

/// Creates a course owned by a staff member, who is enrolled in the same
/// transaction.
pub fn create_course(store: &impl Store, who: &Identity, code: &str, name: &str) -> Result<Course> {
    if !can(who.role, Action::CreateCourse) {
        return Err(Error::forbidden("only staff can create courses"));
    }

    let code = code.trim();
    let name = name.trim();
    validate_course_code(code).map_err(Error::Validation)?;
    validate_course_name(name).map_err(Error::Validation)?;

    let course = store.create_course(code, name, who.user_id)?;
    info!(course_id = course.id, code = %course.course_code, owner = %who.username, "course created");
    Ok(course)
}

pub fn join_course(store: &impl Store, who: &Identity, course_id: i64) -> Result<()> {
    if !can(who.role, Action::JoinCourse) {
        return Err(Error::forbidden("only students can join courses"));
    }

    let course = store
        .get_course(course_id)?
        .ok_or_else(|| Error::not_found("course"))?;
    if store.is_enrolled(who.user_id, course.id)? {
        return Err(Error::Conflict(format!(
            "already enrolled in {}",
            course.course_code
        )));
    }

    store.add_enrollment(who.user_id, course.id)?;
    info!(course_id = course.id, username = %who.username, "joined course");
    Ok(())
}

/// Courses the user has not joined, by course code.
pub fn list_joinable(store: &impl Store, who: &Identity) -> Result<Vec<CourseSummary>> {
    store.list_unenrolled_courses(who.user_id)
}

/// Courses the user is enrolled in, by course code.
pub fn list_mine(store: &impl Store, who: &Identity) -> Result<Vec<CourseSummary>> {
    store.list_enrolled_courses(who.user_id)
}

pub fn list_owned(store: &impl Store, who: &Identity) -> Result<Vec<CourseSummary>> {
    store.list_created_courses(who.user_id)
}
