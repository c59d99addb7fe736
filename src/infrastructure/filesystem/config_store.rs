use crate::common::error::ProvisionError;
use crate::common::result::{IoResultExt, ProvisionResult};
use crate::domain::entities::provision_config::ProvisionConfig;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use validator::Validate;

/// Loads YAML configuration documents
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load the provisioning configuration.
    ///
    /// Without a path the defaults are used. An explicit path must exist.
    pub fn load(&self, config_path: Option<&Path>) -> ProvisionResult<ProvisionConfig> {
        let config: ProvisionConfig = match config_path {
            Some(path) => self.read_yaml(path)?,
            None => ProvisionConfig::default(),
        };

        config.validate().map_err(|e| {
            ProvisionError::config_error_with_source(
                "Configuration validation failed",
                config_path.map(Path::to_path_buf),
                e,
            )
        })?;

        Ok(config)
    }

    /// Read any YAML document
    pub fn read_yaml<T, P>(&self, path: P) -> ProvisionResult<T>
    where
        T: DeserializeOwned,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ProvisionError::config_error(
                format!("Configuration file not found: {}", path.display()),
                Some(path.to_path_buf()),
            ));
        }

        let contents = fs::read_to_string(path).with_path("Failed to read file", path)?;
        serde_yaml::from_str(&contents).map_err(|e| {
            ProvisionError::config_error_with_source("YAML parsing failed", Some(path.to_path_buf()), e)
        })
    }
}
