use std::collections::HashMap;

use bookshelf_authz::{AuthError, IssuedToken, TokenService};

/// Fixed username -> password table. Passwords are compared as plain text.
#[derive(Debug, Clone)]
pub struct CredentialTable {
    users: HashMap<String, String>,
}

impl CredentialTable {
    pub fn new<I, U, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            users: entries
                .into_iter()
                .map(|(user, pass)| (user.into(), pass.into()))
                .collect(),
        }
    }

    /// The accounts the service ships with
    pub fn builtin() -> Self {
        Self::new([("admin", "admin123"), ("user", "user123")])
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|expected| expected == password)
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }
}

/// Check a username/password pair and sign a token for it
pub fn issue_token(
    credentials: &CredentialTable,
    tokens: &TokenService,
    username: &str,
    password: &str,
) -> Result<IssuedToken, AuthError> {
    if !credentials.verify(username, password) {
        tracing::warn!(username, "login rejected");
        return Err(AuthError::InvalidCredentials);
    }

    let issued = tokens.issue(username)?;
    tracing::info!(username, expires_in = issued.expires_in, "login succeeded");
    Ok(issued)
}
