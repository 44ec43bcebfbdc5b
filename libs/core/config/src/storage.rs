use crate::{env_or_default, env_required, ConfigError, FromEnv};

/// Object storage (MinIO / S3-compatible) configuration.
///
/// Loaded from environment variables:
/// - `STORAGE_ENDPOINT` (required) - e.g. "http://localhost:9000"
/// - `STORAGE_ACCESS_KEY` (required)
/// - `STORAGE_SECRET_KEY` (required)
/// - `STORAGE_REGION` (default "us-east-1", MinIO ignores it but the client needs one)
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

impl StorageConfig {
    pub fn new(
        endpoint: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: "us-east-1".to_string(),
        }
    }
}

impl FromEnv for StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: env_required("STORAGE_ENDPOINT")?,
            access_key: env_required("STORAGE_ACCESS_KEY")?,
            secret_key: env_required("STORAGE_SECRET_KEY")?,
            region: env_or_default("STORAGE_REGION", "us-east-1"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_from_env_valid() {
        temp_env::with_vars(
            [
                ("STORAGE_ENDPOINT", Some("http://localhost:9000")),
                ("STORAGE_ACCESS_KEY", Some("minioadmin")),
                ("STORAGE_SECRET_KEY", Some("minioadmin")),
                ("STORAGE_REGION", None),
            ],
            || {
                let config = StorageConfig::from_env().unwrap();
                assert_eq!(config.endpoint, "http://localhost:9000");
                assert_eq!(config.region, "us-east-1");
            },
        );
    }

    #[test]
    fn test_storage_config_from_env_missing_endpoint() {
        temp_env::with_var_unset("STORAGE_ENDPOINT", || {
            let config = StorageConfig::from_env();
            assert!(config.is_err());
            assert!(config.unwrap_err().to_string().contains("STORAGE_ENDPOINT"));
        });
    }
}
