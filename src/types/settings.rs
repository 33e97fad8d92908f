use serde::{Deserialize, Serialize};

use crate::platform;

/// Top-level server settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ServerSettings {
    pub server: ListenSettings,
    pub database: DatabaseSettings,
    pub metadata: MetadataSettings,
}

/// Where the HTTP listener binds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListenSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
        }
    }
}

/// Bookmark store location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: platform::get_data_dir()
                .join("linkshelf.db")
                .to_string_lossy()
                .to_string(),
        }
    }
}

/// Outbound page-metadata fetch behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetadataSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Favicon service queried with `?domain=<host>` when a page has no usable icon.
    pub favicon_service_url: String,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 7,
            user_agent: "BookmarkManager/1.0 (+https://example.com)".to_string(),
            favicon_service_url: "https://www.google.com/s2/favicons".to_string(),
        }
    }
}
