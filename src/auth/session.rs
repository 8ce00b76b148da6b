use super::accounts::authenticate;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Identity, Role};

/// The console's login slot. Passed explicitly to every operation that
/// needs an identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    LoggedOut,
    Active(Identity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    Staff,
    Student,
}

impl Session {
    #[must_use]
    pub fn state(&self) -> SessionState {
        match self {
            Session::LoggedOut => SessionState::LoggedOut,
            Session::Active(identity) => match identity.role {
                Role::Staff => SessionState::Staff,
                Role::Student => SessionState::Student,
            },
        }
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::LoggedOut => None,
            Session::Active(identity) => Some(identity),
        }
    }

    /// Returns the logged-in identity or an auth error.
    pub fn require(&self) -> Result<&Identity> {
        self.identity()
            .ok_or_else(|| Error::forbidden("please log in first"))
    }

    /// LoggedOut -> Staff/Student on success. Failure leaves the session
    /// logged out; logging in over an active session is rejected.
    pub fn login(&mut self, store: &impl Store, username: &str, password: &str) -> Result<&Identity> {
        if let Session::Active(current) = self {
            return Err(Error::Validation(format!(
                "already logged in as {}; log out first",
                current.username
            )));
        }

        let identity = authenticate(store, username, password)?;
        *self = Session::Active(identity);
        self.require()
    }

    /// Returns the identity that was logged out, if any.
    pub fn logout(&mut self) -> Option<Identity> {
        match std::mem::take(self) {
            Session::Active(identity) => {
                tracing::info!(username = %identity.username, "logged out");
                Some(identity)
            }
            Session::LoggedOut => None,
        }
    }
}
