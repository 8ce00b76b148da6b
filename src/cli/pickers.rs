use std::fmt;

use chrono::{DateTime, Utc};
use inquire::{Confirm, InquireError, Select};

use crate::types::{CourseSummary, MessageView, Role};

const PREVIEW_CHARS: usize = 50;

/// Course with its creator for display
pub struct CourseDisplay(pub CourseSummary);

impl fmt::Display for CourseDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} (by {})",
            self.0.course.course_code, self.0.course.course_name, self.0.creator_username
        )
    }
}

/// Message preview for selection lists
pub struct MessageDisplay(pub MessageView);

impl fmt::Display for MessageDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = &self.0.message.text;
        let preview: String = text.chars().take(PREVIEW_CHARS).collect();
        let ellipsis = if text.chars().count() > PREVIEW_CHARS {
            "..."
        } else {
            ""
        };
        write!(
            f,
            "{}: {preview}{ellipsis}  ({})",
            self.0.author_username,
            format_relative_time(&self.0.message.posted_at)
        )
    }
}

/// Role choice offered at registration
#[derive(Clone, Copy)]
pub struct RoleOption(pub Role);

impl fmt::Display for RoleOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Role::Staff => write!(f, "Staff (can create courses)"),
            Role::Student => write!(f, "Student (can join courses)"),
        }
    }
}

/// Format a datetime as relative time (e.g., "2 days ago")
#[must_use]
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let diff = Utc::now().signed_duration_since(*dt);

    if diff.num_seconds() < 0 {
        return "in the future".to_string();
    }

    if diff.num_seconds() < 60 {
        return "just now".to_string();
    }

    let (value, unit) = if diff.num_minutes() < 60 {
        (diff.num_minutes(), "minute")
    } else if diff.num_hours() < 24 {
        (diff.num_hours(), "hour")
    } else if diff.num_days() < 30 {
        (diff.num_days(), "day")
    } else if diff.num_days() < 365 {
        (diff.num_days() / 30, "month")
    } else {
        (diff.num_days() / 365, "year")
    };

    if value == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{value} {unit}s ago")
    }
}

/// Print a numbered course list
pub fn print_courses(courses: &[CourseSummary]) {
    for (i, summary) in courses.iter().enumerate() {
        println!(
            "{}. {} - {} (created by {})",
            i + 1,
            summary.course.course_code,
            summary.course.course_name,
            summary.creator_username
        );
    }
}

/// Print a course's messages, oldest first
pub fn print_messages(summary: &CourseSummary, messages: &[MessageView]) {
    println!();
    println!(
        "{} - {}",
        summary.course.course_code, summary.course.course_name
    );
    println!("{}", "-".repeat(50));

    if messages.is_empty() {
        println!("No messages yet. Be the first to post!");
    }
    for view in messages {
        println!();
        println!(
            "{} ({}):",
            view.author_username,
            view.message.posted_at.format("%Y-%m-%d %H:%M")
        );
        println!("  {}", view.message.text);
    }

    println!("{}", "-".repeat(50));
}

/// Maps a cancelled or interrupted prompt to `None`.
fn cancellable<T>(result: Result<T, InquireError>) -> Result<Option<T>, InquireError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Pick a course from the list
pub fn pick_course(
    prompt: &str,
    courses: Vec<CourseSummary>,
) -> Result<Option<CourseSummary>, InquireError> {
    let options = courses.into_iter().map(CourseDisplay).collect();
    let selection = Select::new(prompt, options)
        .with_page_size(15)
        .with_help_message("Type to filter, Enter to select, Esc to go back")
        .with_vim_mode(true)
        .prompt();

    Ok(cancellable(selection)?.map(|display| display.0))
}

/// Pick a message from the list
pub fn pick_message(
    prompt: &str,
    messages: Vec<MessageView>,
) -> Result<Option<MessageView>, InquireError> {
    let options = messages.into_iter().map(MessageDisplay).collect();
    let selection = Select::new(prompt, options)
        .with_page_size(15)
        .with_help_message("Type to filter, Enter to select, Esc to go back")
        .prompt();

    Ok(cancellable(selection)?.map(|display| display.0))
}

/// Pick the role for a new account
pub fn pick_role() -> Result<Option<Role>, InquireError> {
    let options = Role::ALL.into_iter().map(RoleOption).collect();
    let selection = Select::new("Choose your role:", options).prompt();

    Ok(cancellable(selection)?.map(|option| option.0))
}

/// Ask for confirmation; cancelling counts as "no"
pub fn confirm_action(message: &str) -> Result<bool, InquireError> {
    let answer = Confirm::new(message).with_default(false).prompt();
    Ok(cancellable(answer)?.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::types::{Course, Message};

    fn summary() -> CourseSummary {
        CourseSummary {
            course: Course {
                id: 1,
                course_code: "CS101".to_string(),
                course_name: "Intro".to_string(),
                created_by: 1,
                created_at: Utc::now(),
            },
            creator_username: "profA".to_string(),
        }
    }

    #[test]
    fn test_course_display() {
        assert_eq!(CourseDisplay(summary()).to_string(), "CS101 - Intro (by profA)");
    }

    #[test]
    fn test_message_display_truncates_long_text() {
        let view = MessageView {
            message: Message {
                id: 1,
                course_id: 1,
                user_id: 2,
                text: "x".repeat(80),
                posted_at: Utc::now(),
            },
            author_username: "stu1".to_string(),
        };
        let shown = MessageDisplay(view).to_string();
        assert!(shown.starts_with(&format!("stu1: {}...", "x".repeat(50))));
        assert!(shown.ends_with("(just now)"));
    }

    #[test]
    fn test_relative_time_units() {
        let now = Utc::now();
        assert_eq!(format_relative_time(&(now - Duration::minutes(1))), "1 minute ago");
        assert_eq!(format_relative_time(&(now - Duration::hours(5))), "5 hours ago");
        assert_eq!(format_relative_time(&(now - Duration::days(400))), "1 year ago");
        assert_eq!(format_relative_time(&(now + Duration::hours(2))), "in the future");
    }
}
