use std::fmt;

// === BookmarkError ===

/// Errors related to bookmark management operations.
#[derive(Debug)]
pub enum BookmarkError {
    /// A required field is missing or malformed.
    Validation(String),
    /// Bookmark with the given ID was not found.
    NotFound(String),
    /// A bookmark with the same URL already exists.
    DuplicateUrl(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::Validation(msg) => write!(f, "Invalid bookmark: {}", msg),
            BookmarkError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
            BookmarkError::DuplicateUrl(url) => write!(f, "Duplicate bookmark URL: {}", url),
            BookmarkError::DatabaseError(msg) => {
                write!(f, "Bookmark database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for BookmarkError {}

impl From<rusqlite::Error> for BookmarkError {
    fn from(value: rusqlite::Error) -> Self {
        BookmarkError::DatabaseError(value.to_string())
    }
}

// === MetadataError ===

/// Errors raised while scraping page metadata.
///
/// These never reach API callers: the fetcher degrades to a fallback result.
#[derive(Debug)]
pub enum MetadataError {
    /// The target URL could not be parsed.
    InvalidUrl(String),
    /// The HTTP request failed (connect, timeout, body read).
    Request(String),
    /// The server answered with a non-success status.
    Status(u16),
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataError::InvalidUrl(url) => write!(f, "Invalid metadata URL: {}", url),
            MetadataError::Request(msg) => write!(f, "Metadata request failed: {}", msg),
            MetadataError::Status(code) => {
                write!(f, "Metadata request returned status {}", code)
            }
        }
    }
}

impl std::error::Error for MetadataError {}

impl From<reqwest::Error> for MetadataError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => MetadataError::Status(status.as_u16()),
            None => MetadataError::Request(value.to_string()),
        }
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === ServerError ===

/// Errors that abort server startup or shutdown.
#[derive(Debug)]
pub enum ServerError {
    /// Binding or serving the listener failed.
    Io(std::io::Error),
    /// Settings could not be loaded.
    Settings(SettingsError),
    /// The database could not be opened or migrated.
    Database(String),
    /// The outbound HTTP client could not be built.
    Metadata(MetadataError),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Io(err) => write!(f, "Server I/O error: {}", err),
            ServerError::Settings(err) => write!(f, "{}", err),
            ServerError::Database(msg) => write!(f, "Database initialization failed: {}", msg),
            ServerError::Metadata(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Io(err) => Some(err),
            ServerError::Settings(err) => Some(err),
            ServerError::Database(_) => None,
            ServerError::Metadata(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        ServerError::Io(value)
    }
}

impl From<SettingsError> for ServerError {
    fn from(value: SettingsError) -> Self {
        ServerError::Settings(value)
    }
}

impl From<MetadataError> for ServerError {
    fn from(value: MetadataError) -> Self {
        ServerError::Metadata(value)
    }
}

impl From<rusqlite::Error> for ServerError {
    fn from(value: rusqlite::Error) -> Self {
        ServerError::Database(value.to_string())
    }
}
