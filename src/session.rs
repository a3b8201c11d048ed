// Client-side login gate
//
// There is no identity check: any syntactically valid Gmail address unlocks
// the dashboard on this machine.

use crate::error::{Result, SmartPlanError};
use regex::Regex;
use std::sync::OnceLock;

pub const LOGIN_ERROR: &str = "Please enter a valid Gmail address to access your agenda.";
pub const LOGOUT_CONFIRMATION: &str =
    "Are you sure you want to log out? All your data remains saved locally.";

fn gmail_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9](?:[a-z0-9._%+-]*[a-z0-9_%+-])?@gmail\.com$")
            .unwrap_or_else(|e| panic!("invalid gmail pattern: {}", e))
    })
}

/// Normalize and check a login address
///
/// Returns the trimmed, lower-cased address.
pub fn validate_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    if gmail_pattern().is_match(&email) {
        Ok(email)
    } else {
        Err(SmartPlanError::InvalidInput(LOGIN_ERROR.to_string()))
    }
}

/// Who is signed in, if anyone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    authenticated: bool,
    email: String,
}

impl Session {
    pub fn restore(authenticated: bool, email: String) -> Self {
        if authenticated && email.is_empty() {
            tracing::warn!("Stored session has no email");
        }
        Self { authenticated, email }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Sign in with `raw`; the session is unchanged on error
    pub fn login(&mut self, raw: &str) -> Result<&str> {
        let email = validate_email(raw)?;
        tracing::info!("Signed in as {}", email);
        self.authenticated = true;
        self.email = email;
        Ok(&self.email)
    }

    pub fn logout(&mut self) {
        tracing::info!("Signed out");
        self.authenticated = false;
        self.email.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_gmail_case_insensitive() {
        assert_eq!(validate_email("  Jane.Doe@GMAIL.com ").unwrap(), "jane.doe@gmail.com");
        assert_eq!(validate_email("a+tag@gmail.com").unwrap(), "a+tag@gmail.com");
    }

    #[test]
    fn test_rejects_other_addresses() {
        for bad in [
            "",
            "jane@yahoo.com",
            "@gmail.com",
            "jane@gmail.com.evil.org",
            "ja ne@gmail.com",
            "jane@sub.gmail.com",
            "jane.@gmail.com",
        ] {
            match validate_email(bad) {
                Err(SmartPlanError::InvalidInput(msg)) => assert_eq!(msg, LOGIN_ERROR),
                other => panic!("{:?} should be rejected, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_login_and_logout() {
        let mut session = Session::default();
        assert!(!session.is_authenticated());

        assert!(session.login("nope@outlook.com").is_err());
        assert!(!session.is_authenticated());

        assert_eq!(session.login("Sam@Gmail.com").unwrap(), "sam@gmail.com");
        assert!(session.is_authenticated());
        assert_eq!(session.email(), "sam@gmail.com");

        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(session.email(), "");
    }
}
