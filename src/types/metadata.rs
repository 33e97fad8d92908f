use serde::{Deserialize, Serialize};

/// Title and favicon scraped from a remote page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub favicon: String,
}
