use crate::{env_required, ConfigError, FromEnv};

/// JWT authentication configuration.
///
/// Access and refresh tokens are signed with separate secrets so a leaked
/// refresh secret cannot mint access tokens (and vice versa).
///
/// Loaded from environment variables:
/// - `JWT_ACCESS_SECRET` (required) - at least 32 characters
/// - `JWT_REFRESH_SECRET` (required) - at least 32 characters
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
}

impl JwtConfig {
    /// Manual construction (for testing).
    ///
    /// # Panics
    /// Panics if either secret is less than 32 characters.
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        let access_secret = access_secret.into();
        let refresh_secret = refresh_secret.into();
        assert!(
            access_secret.len() >= 32 && refresh_secret.len() >= 32,
            "JWT secrets must be at least 32 characters"
        );
        Self {
            access_secret,
            refresh_secret,
        }
    }
}

fn required_secret(key: &str) -> Result<String, ConfigError> {
    let secret = env_required(key)?;

    if secret.len() < 32 {
        return Err(ConfigError::ParseError {
            key: key.to_string(),
            details: format!(
                "must be at least 32 characters for security (got {}). Generate one with: openssl rand -base64 32",
                secret.len()
            ),
        });
    }

    Ok(secret)
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            access_secret: required_secret("JWT_ACCESS_SECRET")?,
            refresh_secret: required_secret("JWT_REFRESH_SECRET")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "this-is-a-valid-secret-with-32-chars!";

    #[test]
    fn test_jwt_config_new_valid() {
        let config = JwtConfig::new(VALID, VALID);
        assert_eq!(config.access_secret, VALID);
        assert_eq!(config.refresh_secret, VALID);
    }

    #[test]
    #[should_panic(expected = "JWT secrets must be at least 32 characters")]
    fn test_jwt_config_new_too_short() {
        JwtConfig::new("short", VALID);
    }

    #[test]
    fn test_jwt_config_from_env_valid() {
        temp_env::with_vars(
            [
                ("JWT_ACCESS_SECRET", Some(VALID)),
                ("JWT_REFRESH_SECRET", Some(VALID)),
            ],
            || {
                let config = JwtConfig::from_env();
                assert!(config.is_ok());
            },
        );
    }

    #[test]
    fn test_jwt_config_from_env_missing_refresh() {
        temp_env::with_vars(
            [
                ("JWT_ACCESS_SECRET", Some(VALID)),
                ("JWT_REFRESH_SECRET", None),
            ],
            || {
                let config = JwtConfig::from_env();
                assert!(config.is_err());
                assert!(config
                    .unwrap_err()
                    .to_string()
                    .contains("JWT_REFRESH_SECRET"));
            },
        );
    }

    #[test]
    fn test_jwt_config_from_env_too_short() {
        temp_env::with_vars(
            [
                ("JWT_ACCESS_SECRET", Some("short")),
                ("JWT_REFRESH_SECRET", Some(VALID)),
            ],
            || {
                let config = JwtConfig::from_env();
                assert!(config.is_err());
                assert!(config.unwrap_err().to_string().contains("32 characters"));
            },
        );
    }
}
