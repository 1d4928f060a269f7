use super::Result;
use crate::error::{ConfigError, StorageError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Profile {
    /// AWS region to inventory
    pub region: Option<String>,
    /// Named profile from the shared AWS config, if not the default chain
    pub aws_profile: Option<String>,
    /// Bound on instances collected concurrently
    pub concurrency: Option<usize>,
    /// Per-request timeout for the Connect API
    pub timeout_seconds: Option<u64>,
}

impl Profile {
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Apply one `config set` assignment, validating the value.
    pub fn set_value(&mut self, key: &str, value: &str) -> std::result::Result<(), ConfigError> {
        match key {
            "region" => {
                if value.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "region".to_string(),
                        value: value.to_string(),
                        reason: "must not be empty".to_string(),
                    });
                }
                self.region = Some(value.to_string());
            }
            "aws_profile" => {
                self.aws_profile = Some(value.to_string());
            }
            "concurrency" => {
                let parsed: usize = value.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "concurrency".to_string(),
                    value: value.to_string(),
                    reason: "must be a positive integer".to_string(),
                })?;
                if parsed == 0 {
                    return Err(ConfigError::InvalidValue {
                        field: "concurrency".to_string(),
                        value: value.to_string(),
                        reason: "must be at least 1".to_string(),
                    });
                }
                self.concurrency = Some(parsed);
            }
            "timeout_seconds" => {
                let parsed: u64 = value.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "timeout_seconds".to_string(),
                    value: value.to_string(),
                    reason: "must be a positive integer".to_string(),
                })?;
                self.timeout_seconds = Some(parsed);
            }
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Config {
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|e| StorageError::ConfigParseError {
                message: e.to_string(),
            })?;

        Ok(config)
    }

    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::FileIo {
                path: parent.to_string_lossy().to_string(),
                source,
            })?;
        }

        let toml_content = toml::to_string(self).map_err(|e| StorageError::ConfigSaveFailed {
            message: e.to_string(),
        })?;

        fs::write(&config_path, toml_content).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        Ok(())
    }

    fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(StorageError::ConfigDirNotFound)?;

        let app_config_dir = config_dir.join("connect-audit");
        let config_file = app_config_dir.join("config.toml");

        Ok(config_file)
    }

    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn get_profile_mut(&mut self, name: &str) -> Option<&mut Profile> {
        self.profiles.get_mut(name)
    }

    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_profile, None);
        assert_eq!(config.profiles.len(), 0);
    }

    #[test]
    fn test_profile_management() {
        let mut config = Config::default();
        let profile = Profile {
            region: Some("eu-west-2".to_string()),
            aws_profile: Some("prod".to_string()),
            concurrency: Some(8),
            timeout_seconds: Some(60),
        };
        config.set_profile("test".to_string(), profile.clone());

        let retrieved = config.get_profile("test");
        assert!(retrieved.is_some());
        if let Some(retrieved) = retrieved {
            assert_eq!(retrieved, &profile);
            assert_eq!(retrieved.region(), "eu-west-2");
        }
        assert!(config.get_profile("nonexistent").is_none());
    }

    #[test]
    fn test_profile_region_default() {
        let profile = Profile::default();
        assert_eq!(profile.region(), DEFAULT_REGION);
    }

    #[test]
    fn test_profile_set_value() {
        let mut profile = Profile::default();
        profile.set_value("region", "ap-southeast-2").unwrap();
        profile.set_value("concurrency", "6").unwrap();
        profile.set_value("timeout_seconds", "45").unwrap();
        assert_eq!(profile.region.as_deref(), Some("ap-southeast-2"));
        assert_eq!(profile.concurrency, Some(6));
        assert_eq!(profile.timeout_seconds, Some(45));
    }

    #[test]
    fn test_profile_set_value_rejects_bad_input() {
        let mut profile = Profile::default();
        assert!(matches!(
            profile.set_value("concurrency", "zero"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            profile.set_value("concurrency", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            profile.set_value("region", ""),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            profile.set_value("colour", "blue"),
            Err(ConfigError::UnknownKey { .. })
        ));
    }

    #[test]
    fn test_config_load_save() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.default_profile = Some("test".to_string());
        config.profiles.insert(
            "test".to_string(),
            Profile {
                region: Some("us-west-2".to_string()),
                aws_profile: None,
                concurrency: Some(2),
                timeout_seconds: Some(30),
            },
        );

        config
            .save(Some(config_path.clone()))
            .expect("Failed to save config");

        let loaded_config = Config::load(Some(config_path)).expect("Failed to load config");

        assert_eq!(loaded_config.default_profile, config.default_profile);
        assert_eq!(loaded_config.profiles.len(), 1);
        let profile = loaded_config.get_profile("test").unwrap();
        assert_eq!(profile.region(), "us-west-2");
        assert_eq!(profile.concurrency, Some(2));
    }

    #[test]
    fn test_load_nonexistent_file_yields_default() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config = Config::load(Some(temp_dir.path().join("missing.toml")));
        assert!(config.is_ok());

        let config = config.expect("Failed to load default config");
        assert_eq!(config.default_profile, None);
        assert_eq!(config.profiles.len(), 0);
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "default_profile = [not toml").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(matches!(err, StorageError::ConfigParseError { .. }));
    }
}
