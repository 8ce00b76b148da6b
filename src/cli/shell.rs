use std::fmt;

use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use tracing::error;

use crate::auth::{NewAccount, Session, SessionState, register};
use crate::error::{Error, ErrorKind};
use crate::forum::{board, registry};
use crate::store::Store;
use crate::types::{CourseSummary, Identity, Role};
use crate::validation::{validate_course_code, validate_username};

use super::pickers::{confirm_action, pick_course, pick_message, pick_role, print_courses, print_messages};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Register,
    Login,
    CreateCourse,
    JoinCourse,
    ViewMyCourses,
    PostMessage,
    ViewMessages,
    DeletePost,
    Logout,
    Exit,
}

fn menu_for(state: SessionState) -> Vec<MenuItem> {
    use MenuItem::*;
    match state {
        SessionState::LoggedOut => vec![Register, Login, Exit],
        SessionState::Staff => vec![
            CreateCourse,
            ViewMyCourses,
            PostMessage,
            ViewMessages,
            DeletePost,
            Logout,
            Exit,
        ],
        SessionState::Student => vec![
            JoinCourse,
            ViewMyCourses,
            PostMessage,
            ViewMessages,
            DeletePost,
            Logout,
            Exit,
        ],
    }
}

/// Menu entry with its position, e.g. "3. Post message"
struct NumberedItem {
    number: usize,
    item: MenuItem,
    state: SessionState,
}

impl fmt::Display for NumberedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.item {
            MenuItem::Register => "Register",
            MenuItem::Login => "Login",
            MenuItem::CreateCourse => "Create new course",
            MenuItem::JoinCourse => "Join a course",
            MenuItem::ViewMyCourses => "View my courses",
            MenuItem::PostMessage => "Post message",
            MenuItem::ViewMessages => "View course messages",
            MenuItem::DeletePost if self.state == SessionState::Staff => "Delete post (moderate)",
            MenuItem::DeletePost => "Delete my post",
            MenuItem::Logout => "Logout",
            MenuItem::Exit => "Exit",
        };
        write!(f, "{}. {label}", self.number)
    }
}

/// Failure of a single menu action.
enum ActionError {
    Forum(Error),
    Prompt(InquireError),
}

impl From<Error> for ActionError {
    fn from(e: Error) -> Self {
        ActionError::Forum(e)
    }
}

impl From<InquireError> for ActionError {
    fn from(e: InquireError) -> Self {
        ActionError::Prompt(e)
    }
}

type ActionResult = Result<(), ActionError>;

fn report(err: &Error) {
    match err.kind() {
        ErrorKind::Internal => {
            error!(error = %err, "action failed");
            println!("Error: something went wrong ({err})");
        }
        _ => println!("Error: {err}"),
    }
}

fn print_header(session: &Session) {
    println!();
    println!("{}", "=".repeat(50));
    match session.identity() {
        Some(who) => println!("MAIN MENU - Logged in as: {} ({})", who.username, who.role),
        None => println!("MAIN MENU - Not logged in"),
    }
    println!("{}", "=".repeat(50));
}

/// Runs the interactive menu until the user exits.
pub fn run_shell(store: &impl Store) -> anyhow::Result<()> {
    let mut session = Session::default();

    loop {
        print_header(&session);

        let state = session.state();
        let options = menu_for(state)
            .into_iter()
            .enumerate()
            .map(|(i, item)| NumberedItem {
                number: i + 1,
                item,
                state,
            })
            .collect();

        let item = match Select::new("Enter your choice:", options)
            .with_page_size(10)
            .prompt()
        {
            Ok(choice) => choice.item,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                MenuItem::Exit
            }
            Err(e) => return Err(e.into()),
        };

        if item == MenuItem::Exit {
            break;
        }

        match dispatch(store, &mut session, item) {
            Ok(()) => {}
            Err(ActionError::Forum(e)) => report(&e),
            Err(ActionError::Prompt(
                InquireError::OperationCanceled | InquireError::OperationInterrupted,
            )) => println!("Cancelled."),
            Err(ActionError::Prompt(e)) => return Err(e.into()),
        }
    }

    session.logout();
    println!();
    println!("Goodbye!");
    Ok(())
}

fn dispatch(store: &impl Store, session: &mut Session, item: MenuItem) -> ActionResult {
    match item {
        MenuItem::Register => register_account(store),
        MenuItem::Login => login(store, session),
        MenuItem::CreateCourse => create_course(store, session),
        MenuItem::JoinCourse => join_course(store, session),
        MenuItem::ViewMyCourses => view_my_courses(store, session),
        MenuItem::PostMessage => post_message(store, session),
        MenuItem::ViewMessages => view_messages(store, session),
        MenuItem::DeletePost => delete_post(store, session),
        MenuItem::Logout => {
            if session.logout().is_some() {
                println!();
                println!("Logged out.");
            }
            Ok(())
        }
        MenuItem::Exit => Ok(()),
    }
}

fn register_account(store: &impl Store) -> ActionResult {
    println!();
    println!("=== CREATE NEW ACCOUNT ===");

    let username = Text::new("Choose username:")
        .with_validator(|input: &str| {
            Ok(validate_username(input.trim())
                .map(|()| inquire::validator::Validation::Valid)
                .unwrap_or_else(|e| inquire::validator::Validation::Invalid(e.into())))
        })
        .prompt()?;
    let password = Password::new("Choose password:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_custom_confirmation_message("Confirm password:")
        .prompt()?;
    let full_name = Text::new("Your full name:").prompt()?;
    let Some(role) = pick_role()? else {
        println!("Registration cancelled.");
        return Ok(());
    };

    let user = register(
        store,
        &NewAccount {
            username: &username,
            password: &password,
            full_name: &full_name,
            role,
        },
    )?;

    println!();
    println!(
        "Account created! You are {}",
        user.role.as_str().to_uppercase()
    );
    Ok(())
}

fn login(store: &impl Store, session: &mut Session) -> ActionResult {
    println!();
    println!("=== LOGIN ===");

    let username = Text::new("Username:").prompt()?;
    let password = Password::new("Password:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;

    let who = session.login(store, &username, &password)?;
    println!();
    println!(
        "Welcome {} {}!",
        who.role.as_str().to_uppercase(),
        who.username
    );
    Ok(())
}

fn create_course(store: &impl Store, session: &Session) -> ActionResult {
    let who = session.require()?;

    println!();
    println!("=== CREATE NEW COURSE ===");
    let code = Text::new("Course code (e.g., SOE505):")
        .with_validator(|input: &str| {
            Ok(validate_course_code(input.trim())
                .map(|()| inquire::validator::Validation::Valid)
                .unwrap_or_else(|e| inquire::validator::Validation::Invalid(e.into())))
        })
        .prompt()?;
    let name = Text::new("Course name:").prompt()?;

    let course = registry::create_course(store, who, &code, &name)?;
    println!("Course '{}' created!", course.course_code);
    Ok(())
}

fn join_course(store: &impl Store, session: &Session) -> ActionResult {
    let who = session.require()?;

    println!();
    println!("=== AVAILABLE COURSES ===");
    let courses = registry::list_joinable(store, who)?;
    if courses.is_empty() {
        println!("No courses available to join.");
        return Ok(());
    }

    let Some(course) = pick_course("Select a course to join:", courses)? else {
        return Ok(());
    };
    registry::join_course(store, who, course.course.id)?;
    println!("Joined {} successfully!", course.course.course_code);
    Ok(())
}

fn view_my_courses(store: &impl Store, session: &Session) -> ActionResult {
    let who = session.require()?;

    println!();
    println!("=== YOUR COURSES ({}) ===", who.role.as_str().to_uppercase());
    let courses = registry::list_mine(store, who)?;
    if courses.is_empty() {
        println!("You are not enrolled in any courses yet.");
    } else {
        print_courses(&courses);
    }
    Ok(())
}

fn post_message(store: &impl Store, session: &Session) -> ActionResult {
    let who = session.require()?;

    println!();
    println!("=== POST MESSAGE ===");
    let courses = registry::list_mine(store, who)?;
    if courses.is_empty() {
        println!("You are not enrolled in any courses yet.");
        return Ok(());
    }

    let Some(course) = pick_course("Select a course to post in:", courses)? else {
        return Ok(());
    };
    let text = Text::new("Your message:").prompt()?;

    board::post(store, who, course.course.id, &text)?;
    println!("Message posted!");
    Ok(())
}

fn view_messages(store: &impl Store, session: &Session) -> ActionResult {
    let who = session.require()?;

    println!();
    println!("=== VIEW COURSE MESSAGES ===");
    let courses = registry::list_mine(store, who)?;
    if courses.is_empty() {
        println!("You are not enrolled in any courses yet.");
        return Ok(());
    }

    let Some(course) = pick_course("Select a course to view:", courses)? else {
        return Ok(());
    };
    let messages = board::read(store, who, course.course.id)?;
    print_messages(&course, &messages);
    Ok(())
}

/// Staff moderate the courses they created; students pick among their own.
fn deletion_courses(store: &impl Store, who: &Identity) -> crate::error::Result<Vec<CourseSummary>> {
    match who.role {
        Role::Staff => registry::list_owned(store, who),
        Role::Student => registry::list_mine(store, who),
    }
}

fn delete_post(store: &impl Store, session: &Session) -> ActionResult {
    let who = session.require()?;

    println!();
    println!("=== DELETE POST ===");
    let courses = deletion_courses(store, who)?;
    if courses.is_empty() {
        match who.role {
            Role::Staff => println!("You have not created any courses yet."),
            Role::Student => println!("You are not enrolled in any courses yet."),
        }
        return Ok(());
    }

    let Some(course) = pick_course("Select a course:", courses)? else {
        return Ok(());
    };
    let messages = board::list_deletable(store, who, course.course.id)?;
    if messages.is_empty() {
        println!("No messages you can delete in this course.");
        return Ok(());
    }

    let Some(view) = pick_message("Select a message to delete:", messages)? else {
        return Ok(());
    };
    if !confirm_action("Delete this message?")? {
        println!("Cancelled.");
        return Ok(());
    }

    board::delete(store, who, view.message.id)?;
    println!("Message deleted!");
    Ok(())
}
