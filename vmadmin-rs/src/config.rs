use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::VmadminError::Config(e.to_string()))?;

        toml::from_str(&content)
            .map_err(|e| crate::error::VmadminError::Config(e.to_string()))
    }

    pub fn default() -> Self {
        Self {
            storage: StorageConfig {
                database_url: "sqlite://vmail.db".to_string(),
            },
            logging: LoggingConfig {
                level: "warn".to_string(),
                format: "compact".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.database_url, "sqlite://vmail.db");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[storage]
database_url = "sqlite://test.db"

[logging]
level = "debug"
format = "pretty"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.storage.database_url, "sqlite://test.db");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_from_missing_file() {
        assert!(Config::from_file("/nonexistent/vmadmin.toml").is_err());
    }
}
