//! Registration and login against the user table.

use tracing::{info, warn};

use super::password::{DUMMY_CREDENTIAL, hash_password, verify_password};
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Identity, NewUser, Role, User};
use crate::validation::{validate_full_name, validate_password, validate_username};

/// Registration input as collected from the user.
#[derive(Debug, Clone)]
pub struct NewAccount<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub full_name: &'a str,
    pub role: Role,
}

/// Creates a user with a freshly salted credential. Surrounding whitespace
/// is stripped from every field, the password included.
///
/// A taken username is reported as [`Error::Conflict`]; any other storage
/// failure is passed through unchanged.
pub fn register(store: &impl Store, account: &NewAccount<'_>) -> Result<User> {
    let username = account.username.trim();
    let full_name = account.full_name.trim();
    let password = account.password.trim();
    validate_username(username).map_err(Error::Validation)?;
    validate_full_name(full_name).map_err(Error::Validation)?;
    validate_password(password).map_err(Error::Validation)?;

    let user = store.create_user(&NewUser {
        username: username.to_string(),
        password_hash: hash_password(password),
        role: account.role,
        full_name: full_name.to_string(),
    })?;

    info!(user_id = user.id, username = %user.username, role = %user.role, "registered user");
    Ok(user)
}

/// Checks a username and password and returns the identity to log in as.
///
/// Unknown usernames and wrong passwords yield the same error.
pub fn authenticate(store: &impl Store, username: &str, password: &str) -> Result<Identity> {
    let username = username.trim();
    let user = store.get_user_by_username(username)?;

    let credential = user
        .as_ref()
        .map_or(DUMMY_CREDENTIAL, |u| u.password_hash.as_str());
    let verified = verify_password(credential, password.trim());

    match user {
        Some(user) if verified => {
            info!(user_id = user.id, username = %user.username, "login succeeded");
            Ok(Identity::from(&user))
        }
        _ => {
            warn!(username, "login failed");
            Err(Error::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    fn store() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        store
    }

    fn account<'a>(username: &'a str, password: &'a str, role: Role) -> NewAccount<'a> {
        NewAccount {
            username,
            password,
            full_name: "Test Person",
            role,
        }
    }

    #[test]
    fn test_register_stores_salted_credential() {
        let store = store();
        let user = register(&store, &account("profA", "pw1", Role::Staff)).unwrap();

        let stored = store.get_user(user.id).unwrap().unwrap();
        assert_ne!(stored.password_hash, "pw1");
        assert!(verify_password(&stored.password_hash, "pw1"));
        assert_eq!(stored.role, Role::Staff);
    }

    #[test]
    fn test_register_duplicate_username_is_conflict() {
        let store = store();
        register(&store, &account("stu1", "pw", Role::Student)).unwrap();

        let result = register(&store, &account("stu1", "other", Role::Staff));
        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[test]
    fn test_register_validates_input() {
        let store = store();
        assert!(matches!(
            register(&store, &account("", "pw", Role::Student)),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            register(&store, &account("stu1", "", Role::Student)),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            register(
                &store,
                &NewAccount {
                    full_name: "  ",
                    ..account("stu1", "pw", Role::Student)
                }
            ),
            Err(Error::Validation(_))
        ));
        assert_eq!(store.stats().unwrap().students, 0);
    }

    #[test]
    fn test_authenticate_returns_identity() {
        let store = store();
        let user = register(&store, &account("stu1", "pw2", Role::Student)).unwrap();

        let identity = authenticate(&store, "stu1", "pw2").unwrap();
        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.username, "stu1");
        assert_eq!(identity.role, Role::Student);
    }

    #[test]
    fn test_password_is_trimmed_on_register_and_login() {
        let store = store();
        let user = register(&store, &account("stu1", "  pw2 ", Role::Student)).unwrap();

        assert!(verify_password(&user.password_hash, "pw2"));
        assert!(authenticate(&store, "stu1", "pw2").is_ok());
        assert!(authenticate(&store, "stu1", " pw2\t").is_ok());
        assert!(matches!(
            register(&store, &account("stu2", "   ", Role::Student)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_authenticate_does_not_reveal_which_field_failed() {
        let store = store();
        register(&store, &account("stu1", "pw2", Role::Student)).unwrap();

        let wrong_password = authenticate(&store, "stu1", "nope").unwrap_err();
        let unknown_user = authenticate(&store, "ghost", "pw2").unwrap_err();
        assert!(matches!(wrong_password, Error::InvalidCredentials));
        assert!(matches!(unknown_user, Error::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }
}
