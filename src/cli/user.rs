use std::io::{self, BufRead};

use inquire::{Password, PasswordDisplayMode, Text};

use crate::auth::{NewAccount, register};
use crate::config::ForumConfig;
use crate::types::Role;
use crate::validation::validate_username;

use super::init_store;
use super::pickers::pick_role;

fn read_password_line() -> anyhow::Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        anyhow::bail!("No password received on stdin");
    }
    Ok(password)
}

pub fn run_user_add(
    config: &ForumConfig,
    username: Option<String>,
    full_name: Option<String>,
    role: Option<String>,
    password_stdin: bool,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let store = init_store(config)?;

    let username = if let Some(name) = username {
        name
    } else if non_interactive {
        anyhow::bail!("--username is required in non-interactive mode");
    } else {
        Text::new("Username:")
            .with_validator(|input: &str| {
                Ok(validate_username(input.trim())
                    .map(|()| inquire::validator::Validation::Valid)
                    .unwrap_or_else(|e| inquire::validator::Validation::Invalid(e.into())))
            })
            .prompt()?
    };

    let full_name = if let Some(name) = full_name {
        name
    } else if non_interactive {
        anyhow::bail!("--full-name is required in non-interactive mode");
    } else {
        Text::new("Full name:").prompt()?
    };

    let role = if let Some(role) = role {
        role.parse::<Role>()?
    } else if non_interactive {
        anyhow::bail!("--role is required in non-interactive mode");
    } else {
        match pick_role()? {
            Some(role) => role,
            None => {
                println!("Cancelled.");
                return Ok(());
            }
        }
    };

    let password = if password_stdin {
        read_password_line()?
    } else if non_interactive {
        anyhow::bail!("--password-stdin is required in non-interactive mode");
    } else {
        Password::new("Password:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .with_custom_confirmation_message("Confirm password:")
            .prompt()?
    };

    let user = register(
        &store,
        &NewAccount {
            username: &username,
            password: &password,
            full_name: &full_name,
            role,
        },
    )?;

    println!();
    println!("Created {} \"{}\" (id {})", user.role, user.username, user.id);
    println!();

    Ok(())
}
