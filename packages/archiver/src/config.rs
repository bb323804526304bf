use anyhow::{Context, Result};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use std::env;

pub const USER_ID_VAR: &str = "MIDJOURNEY_USER_ID";
pub const SESSION_TOKEN_VAR: &str = "MIDJOURNEY_SESSION_TOKEN";

/// Midjourney web session credentials
#[derive(Clone)]
pub struct Credentials {
    pub user_id: String,
    pub session_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("session_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Load credentials from the environment, prompting for any that are
    /// missing or empty.
    pub fn load() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let user_id = match non_empty(env::var(USER_ID_VAR).ok()) {
            Some(user_id) => user_id,
            None => Input::<String>::new()
                .with_prompt("user id")
                .interact_text()
                .context("Failed to read user id")?,
        };
        let session_token = match non_empty(env::var(SESSION_TOKEN_VAR).ok()) {
            Some(token) => token,
            None => Password::new()
                .with_prompt("session token")
                .interact()
                .context("Failed to read session token")?,
        };

        Ok(Self {
            user_id,
            session_token,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some(" abc ".into())), Some("abc".to_string()));
    }

    #[test]
    fn test_debug_redacts_token() {
        let credentials = Credentials {
            user_id: "u".into(),
            session_token: "secret".into(),
        };
        assert!(!format!("{credentials:?}").contains("secret"));
    }
}
