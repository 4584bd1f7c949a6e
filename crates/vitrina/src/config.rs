//! Test-account configuration.
//!
//! Credentials live in a TOML file next to the suite, a `[users]` table
//! keyed by username. The login fixture picks one hardcoded account out of
//! it.

use crate::base_page::capitalize;
use crate::result::{VitrinaError, VitrinaResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// The account the login fixture uses
pub const DEFAULT_ACCOUNT: &str = "ferdinand";

/// A username/password pair for the storefront login form.
///
/// The username is stored capitalized, which is how the shop displays it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create credentials, capitalizing the username
    #[must_use]
    pub fn new(username: &str, password: impl Into<String>) -> Self {
        Self {
            username: capitalize(username),
            password: password.into(),
        }
    }

    /// Username as typed into the login form
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password as typed into the login form
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

// Keep the password out of logs and failure messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Parsed suite configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    users: BTreeMap<String, String>,
}

impl Config {
    /// Load the configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> VitrinaResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    /// Parse the configuration from TOML text
    pub fn parse(raw: &str) -> VitrinaResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Credentials for the given username
    pub fn credentials_for(&self, username: &str) -> VitrinaResult<Credentials> {
        self.users
            .get(username)
            .map(|password| Credentials::new(username, password.clone()))
            .ok_or_else(|| VitrinaError::Config {
                message: format!("no credentials configured for user '{username}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "[users]\nferdinand = \"verysecret\"\nmarta = \"qwerty\"\n";

    #[test]
    fn test_parse_users_table() {
        let config = Config::parse(SAMPLE).unwrap();
        let credentials = config.credentials_for(DEFAULT_ACCOUNT).unwrap();
        assert_eq!(credentials.username(), "Ferdinand");
        assert_eq!(credentials.password(), "verysecret");
    }

    #[test]
    fn test_unknown_user_is_a_config_error() {
        let config = Config::parse(SAMPLE).unwrap();
        let result = config.credentials_for("nobody");
        assert!(matches!(result, Err(VitrinaError::Config { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(config.credentials_for("marta").is_ok());
    }

    #[test]
    fn test_malformed_toml_propagates() {
        assert!(matches!(
            Config::parse("[users\n"),
            Err(VitrinaError::Toml(_))
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let credentials = Credentials::new("ferdinand", "verysecret");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("Ferdinand"));
        assert!(!debug.contains("verysecret"));
    }
}
