//! Back-office API configuration, read once at startup.

use core_config::database::DatabaseConfig;
use core_config::jwt::JwtConfig;
use core_config::server::ServerConfig;
use core_config::storage::StorageConfig;
use core_config::FromEnv;

pub use core_config::Environment;

#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            storage: StorageConfig::from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "a-test-secret-that-is-32-chars-long!";

    #[test]
    fn config_loads_from_a_complete_environment() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgres://localhost/meddb")),
                ("JWT_ACCESS_SECRET", Some(SECRET)),
                ("JWT_REFRESH_SECRET", Some(SECRET)),
                ("STORAGE_ENDPOINT", Some("http://localhost:9000")),
                ("STORAGE_ACCESS_KEY", Some("minioadmin")),
                ("STORAGE_SECRET_KEY", Some("minioadmin")),
                ("PORT", Some("9100")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.server.port, 9100);
                assert_eq!(config.database.url, "postgres://localhost/meddb");
            },
        );
    }

    #[test]
    fn config_fails_without_a_database_url() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", None),
                ("JWT_ACCESS_SECRET", Some(SECRET)),
                ("JWT_REFRESH_SECRET", Some(SECRET)),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
