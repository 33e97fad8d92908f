// Linkshelf Settings Engine
// Loads server settings from a JSON file, layers environment overrides on top,
// and supports updating individual values by dot-notation key.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::ServerSettings;

/// Environment variable naming an alternate settings file.
pub const CONFIG_PATH_ENV: &str = "LINKSHELF_CONFIG";

/// Environment variables that override individual settings after the file is loaded.
const ENV_OVERRIDES: [(&str, &str); 3] = [
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("LINKSHELF_DB", "database.path"),
];

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<ServerSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ServerSettings;
    /// Updates a value in memory only.
    fn override_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    /// Updates a value and persists the file.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine implementation that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: ServerSettings,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// If `path_override` is `Some`, uses that path for the config file.
    /// Otherwise, uses the platform-specific config directory with `settings.json`.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = match path_override {
            Some(p) => p,
            None => platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string(),
        };

        Self {
            config_path,
            settings: ServerSettings::default(),
        }
    }

    /// Creates an engine whose path comes from `LINKSHELF_CONFIG`, if set.
    pub fn from_env() -> Self {
        Self::new(std::env::var(CONFIG_PATH_ENV).ok().filter(|p| !p.is_empty()))
    }

    /// Applies `HOST`, `PORT` and `LINKSHELF_DB` using the given lookup.
    ///
    /// The lookup is injected so tests do not have to mutate process env.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (var, key) in ENV_OVERRIDES {
            let Some(raw) = lookup(var).filter(|v| !v.is_empty()) else {
                continue;
            };
            let value = if key == "server.port" {
                let port: u16 = raw.trim().parse().map_err(|_| {
                    SettingsError::InvalidValue(format!("{} must be a port number, got '{}'", var, raw))
                })?;
                serde_json::Value::from(port)
            } else {
                serde_json::Value::String(raw)
            };
            debug!(var, key, "applying environment override");
            self.override_value(key, value)?;
        }
        Ok(())
    }

    /// Applies overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), SettingsError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads settings from the JSON config file.
    ///
    /// If the file does not exist, returns default settings.
    /// If the file exists but is malformed, returns a serialization error.
    /// Keys missing from the file keep their defaults.
    fn load(&mut self) -> Result<ServerSettings, SettingsError> {
        let path = Path::new(&self.config_path);

        if !path.exists() {
            info!(path = %self.config_path, "no settings file, using defaults");
            self.settings = ServerSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;

        let settings: ServerSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;

        info!(path = %self.config_path, "loaded settings file");
        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Saves the current settings to the JSON config file.
    ///
    /// Creates parent directories if they don't exist.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        fs::write(path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    fn get_settings(&self) -> &ServerSettings {
        &self.settings
    }

    /// Navigates the dot-separated key path of the serialized settings,
    /// replaces the leaf, and deserializes back to validate the new value.
    ///
    /// # Examples
    /// - `"server.port"` → updates `settings.server.port`
    /// - `"metadata.timeout_secs"` → updates `settings.metadata.timeout_secs`
    fn override_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let mut json_value = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (parents.split('.').collect::<Vec<_>>(), leaf),
            None => (Vec::new(), key),
        };

        let mut current = &mut json_value;
        for part in parents {
            current = current.get_mut(part).ok_or_else(|| {
                SettingsError::InvalidKey(format!("Key '{}' not found in settings", key))
            })?;
        }
        match current {
            serde_json::Value::Object(map) if map.contains_key(leaf) => {
                map.insert(leaf.to_string(), value);
            }
            serde_json::Value::Object(_) => {
                return Err(SettingsError::InvalidKey(format!(
                    "Key '{}' not found in settings",
                    key
                )));
            }
            _ => {
                return Err(SettingsError::InvalidKey(format!(
                    "Cannot navigate to key '{}': intermediate value is not an object",
                    key
                )));
            }
        }

        self.settings = serde_json::from_value(json_value).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        Ok(())
    }

    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        self.override_value(key, value)?;
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
