//! Secure credential container with automatic memory zeroing.
//!
//! # Security
//! - Username and password are stored in `Zeroizing<T>` containers
//! - Memory is cleared when the credentials go out of scope
//! - The password is never exposed in debug output or logs

use zeroize::Zeroizing;

/// A fully resolved database user and password pair.
///
/// # Example
///
/// ```rust
/// use chef_keydb_core::security::Credentials;
///
/// let creds = Credentials::new("opscode_chef", "secret");
/// assert_eq!(creds.username(), "opscode_chef");
/// assert_eq!(creds.password(), "secret");
/// assert!(!format!("{:?}", creds).contains("secret"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Creates new credentials with automatic memory zeroing.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Zeroizing::new(username.into()),
            password: Zeroizing::new(password.into()),
        }
    }

    /// Gets the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Gets the password.
    ///
    /// Callers must not log or persist the returned value.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username.as_str())
            .field("password", &"****")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_new() {
        let creds = Credentials::new("testuser", "testpass");
        assert_eq!(creds.username(), "testuser");
        assert_eq!(creds.password(), "testpass");
    }

    #[test]
    fn test_credentials_debug_redacted() {
        let creds = Credentials::new("testuser", "super_secret_password_123");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("testuser"));
        assert!(!debug.contains("super_secret_password_123"));
    }

    #[test]
    fn test_credentials_clone() {
        let creds1 = Credentials::new("user", "pass");
        let creds2 = creds1.clone();
        assert_eq!(creds1, creds2);
    }
}
