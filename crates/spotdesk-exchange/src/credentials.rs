//! API credential management.
//!
//! The secret is held in a `SecretString` so it never shows up in `Debug`
//! output and is zeroed on drop.

use secrecy::{ExposeSecret, SecretString};

use crate::error::AuthError;

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "API_KEY";
/// Environment variable holding the API secret.
pub const API_SECRET_VAR: &str = "API_SECRET";

/// API key pair for signed requests.
#[derive(Clone)]
pub struct ApiCredentials {
    api_key: String,
    secret_key: SecretString,
}

impl ApiCredentials {
    /// Load credentials from `API_KEY` and `API_SECRET`.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    ///
    /// # Errors
    /// Returns `AuthError::MissingEnvVar` if either variable is unset or empty.
    pub fn from_env() -> Result<Self, AuthError> {
        dotenvy::dotenv().ok();

        let api_key = read_var(API_KEY_VAR)?;
        let secret_key = read_var(API_SECRET_VAR)?;

        Ok(Self::new(api_key, secret_key))
    }

    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key,
            secret_key: SecretString::from(secret_key),
        }
    }

    /// Get the API key (public, safe to log).
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Expose the secret key for signing.
    ///
    /// **WARNING**: Only use this for cryptographic operations.
    pub fn expose_secret(&self) -> &str {
        self.secret_key.expose_secret()
    }

    /// First characters of the API key, for startup logs.
    pub fn api_key_hint(&self) -> String {
        let prefix: String = self.api_key.chars().take(6).collect();
        format!("{prefix}...")
    }
}

fn read_var(name: &str) -> Result<String, AuthError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(AuthError::MissingEnvVar(name.to_string())),
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}
