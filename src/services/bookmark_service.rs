//! Bookmark Service for Linkshelf.
//!
//! Orchestrates the store, URL normalization and metadata enrichment behind
//! the operations exposed over HTTP. Holds no per-request state.

use std::sync::Arc;

use tracing::{debug, info};

use crate::database::Database;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::services::metadata_fetcher::MetadataFetcherTrait;
use crate::services::url_normalizer;
use crate::types::bookmark::{
    Bookmark, BookmarkDraft, BookmarkFilter, BookmarkPatch, NewBookmark, TagCount,
};
use crate::types::errors::BookmarkError;
use crate::types::metadata::PageMetadata;

/// Shared, cloneable entry point for all bookmark operations.
#[derive(Clone)]
pub struct BookmarkService {
    db: Arc<Database>,
    fetcher: Arc<dyn MetadataFetcherTrait>,
}

impl BookmarkService {
    pub fn new(db: Arc<Database>, fetcher: Arc<dyn MetadataFetcherTrait>) -> Self {
        Self { db, fetcher }
    }

    /// Runs a store operation on the blocking pool with the connection locked.
    async fn with_store<T, F>(&self, op: F) -> Result<T, BookmarkError>
    where
        T: Send + 'static,
        F: FnOnce(&mut BookmarkManager<'_>) -> Result<T, BookmarkError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let conn = db.connection();
            let mut manager = BookmarkManager::new(&conn);
            op(&mut manager)
        })
        .await
        .map_err(|e| BookmarkError::DatabaseError(format!("store task failed: {}", e)))?
    }

    /// Lists bookmarks matching the filter, in the requested order.
    pub async fn list(&self, filter: BookmarkFilter) -> Result<Vec<Bookmark>, BookmarkError> {
        self.with_store(move |store| store.list_bookmarks(&filter))
            .await
    }

    /// Creates a bookmark.
    ///
    /// The url is normalized and checked for an exact duplicate; a missing
    /// title or favicon is filled from the page metadata, with the url
    /// standing in for a title the page does not provide.
    pub async fn create(&self, input: NewBookmark) -> Result<Bookmark, BookmarkError> {
        let raw = input
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| BookmarkError::Validation("Missing url".to_string()))?;
        let url = canonical_url(raw);

        let candidate = url.clone();
        if self
            .with_store(move |store| store.find_by_url(&candidate))
            .await?
            .is_some()
        {
            return Err(BookmarkError::DuplicateUrl(url));
        }

        let mut title = input.title.filter(|t| !t.trim().is_empty());
        let mut favicon = input.favicon.filter(|f| !f.is_empty());
        if title.is_none() || favicon.is_none() {
            let meta = self.fetcher.fetch_metadata(&url).await;
            title = title.or_else(|| Some(meta.title).filter(|t| !t.is_empty()));
            favicon = favicon.or_else(|| Some(meta.favicon).filter(|f| !f.is_empty()));
        }

        let draft = BookmarkDraft {
            title: title.unwrap_or_else(|| url.clone()),
            url,
            description: input.description.unwrap_or_default(),
            tags: input.tags.unwrap_or_default(),
            favicon: favicon.unwrap_or_default(),
            archived: input.archived.unwrap_or(false),
            pinned: input.pinned.unwrap_or(false),
        };

        let created = self
            .with_store(move |store| {
                // Re-check under the lock: a concurrent create may have landed during the fetch
                if store.find_by_url(&draft.url)?.is_some() {
                    return Err(BookmarkError::DuplicateUrl(draft.url.clone()));
                }
                store.add_bookmark(&draft)
            })
            .await?;
        info!(id = %created.id, url = %created.url, "created bookmark");
        Ok(created)
    }

    /// Loose duplicate lookup across scheme variants, used by the exists query.
    pub async fn find_existing(&self, raw: &str) -> Result<Option<Bookmark>, BookmarkError> {
        if raw.is_empty() {
            return Err(BookmarkError::Validation("Missing url query".to_string()));
        }
        let variants = url_normalizer::lookup_variants(raw);
        debug!(?variants, "checking bookmark existence");
        self.with_store(move |store| store.find_matching(&variants))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Bookmark, BookmarkError> {
        let id = id.to_string();
        self.with_store(move |store| {
            store
                .get_bookmark(&id)?
                .ok_or(BookmarkError::NotFound(id))
        })
        .await
    }

    pub async fn set_pinned(&self, id: &str, pinned: bool) -> Result<Bookmark, BookmarkError> {
        let id = id.to_string();
        self.with_store(move |store| store.set_pinned(&id, pinned))
            .await
    }

    pub async fn set_archived(&self, id: &str, archived: bool) -> Result<Bookmark, BookmarkError> {
        let id = id.to_string();
        self.with_store(move |store| store.set_archived(&id, archived))
            .await
    }

    /// Applies a partial update. A schemeless url gets `http://` prepended;
    /// duplicate detection is not re-run here.
    pub async fn update(&self, id: &str, mut patch: BookmarkPatch) -> Result<Bookmark, BookmarkError> {
        if let Some(url) = patch.url.as_mut() {
            if !url.is_empty() && !url_normalizer::has_scheme(url) {
                *url = url_normalizer::ensure_scheme(url);
            }
        }
        let id = id.to_string();
        self.with_store(move |store| store.update_bookmark(&id, &patch))
            .await
    }

    /// Deletes a bookmark. Unknown ids succeed silently.
    pub async fn delete(&self, id: &str) -> Result<(), BookmarkError> {
        let target = id.to_string();
        let removed = self
            .with_store(move |store| store.remove_bookmark(&target))
            .await?;
        debug!(%id, removed, "delete bookmark");
        Ok(())
    }

    pub async fn tags(&self) -> Result<Vec<TagCount>, BookmarkError> {
        self.with_store(|store| store.tag_counts()).await
    }

    /// Scrapes title and favicon for an arbitrary url. Never fails once the url is present.
    pub async fn metadata(&self, raw: &str) -> Result<PageMetadata, BookmarkError> {
        if raw.trim().is_empty() {
            return Err(BookmarkError::Validation("Missing url".to_string()));
        }
        let url = canonical_url(raw.trim());
        Ok(self.fetcher.fetch_metadata(&url).await)
    }

    /// Counts a click-through and returns the absolute redirect target.
    ///
    /// The increment and read-back happen in one SQL statement, so
    /// concurrent traversals of the same id never lose a count.
    pub async fn resolve_and_track(&self, id: &str) -> Result<String, BookmarkError> {
        let id = id.to_string();
        let visited = self
            .with_store(move |store| store.record_visit(&id))
            .await?;
        debug!(id = %visited.id, view_count = visited.view_count, "recorded visit");
        Ok(url_normalizer::ensure_scheme(&visited.url))
    }
}

/// Normalized form used for storage; unparseable input still gets a scheme.
fn canonical_url(raw: &str) -> String {
    let normalized = url_normalizer::normalize(raw);
    if url_normalizer::has_scheme(&normalized) {
        normalized
    } else {
        url_normalizer::ensure_scheme(&normalized)
    }
}
