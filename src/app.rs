//! App Core for Linkshelf.
//!
//! Owns the database handle and the bookmark service, and manages the
//! server's startup and shutdown.

use std::sync::Arc;

use tracing::{info, warn};

use crate::database::Database;
use crate::http_handler::{build_router, AppState};
use crate::services::bookmark_service::BookmarkService;
use crate::services::metadata_fetcher::{MetadataFetcher, MetadataFetcherTrait};
use crate::types::errors::ServerError;
use crate::types::settings::ServerSettings;

/// Central application struct holding the store and the services built on it.
pub struct App {
    pub db: Arc<Database>,
    pub settings: ServerSettings,
    pub service: BookmarkService,
}

impl App {
    /// Opens the database at `settings.database.path` and wires the service
    /// to a live metadata fetcher.
    pub fn new(settings: ServerSettings) -> Result<Self, ServerError> {
        let fetcher: Arc<dyn MetadataFetcherTrait> =
            Arc::new(MetadataFetcher::new(&settings.metadata)?);
        Self::with_fetcher(settings, fetcher)
    }

    /// Same as [`App::new`] with a caller-supplied metadata fetcher.
    pub fn with_fetcher(
        settings: ServerSettings,
        fetcher: Arc<dyn MetadataFetcherTrait>,
    ) -> Result<Self, ServerError> {
        let db = Arc::new(Database::open(&settings.database.path)?);
        info!(path = %settings.database.path, "bookmark store ready");
        let service = BookmarkService::new(Arc::clone(&db), fetcher);
        Ok(Self {
            db,
            settings,
            service,
        })
    }

    /// Builds the HTTP router over this app's service.
    pub fn router(&self) -> axum::Router {
        build_router(Arc::new(AppState {
            service: self.service.clone(),
        }))
    }

    /// `host:port` the listener should bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.settings.server.host, self.settings.server.port)
    }

    /// Shutdown sequence: drop the service and close the connection.
    ///
    /// If another handle still shares the database, the connection is left
    /// to close on drop.
    pub fn shutdown(self) -> Result<(), ServerError> {
        let App { db, service, .. } = self;
        drop(service);
        match Arc::try_unwrap(db) {
            Ok(db) => {
                db.close()?;
                info!("bookmark store closed");
            }
            Err(_) => warn!("bookmark store still shared at shutdown, closing on drop"),
        }
        Ok(())
    }
}
