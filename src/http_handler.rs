//! HTTP surface for Linkshelf.
//!
//! `build_router` wires every route to the [`BookmarkService`]; it is kept
//! separate from `main` so the router can be driven in tests with
//! `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{error, warn};

use crate::services::bookmark_service::BookmarkService;
use crate::types::bookmark::{
    Bookmark, BookmarkFilter, BookmarkPatch, NewBookmark, SortOrder,
};
use crate::types::errors::BookmarkError;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub service: BookmarkService,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<BookmarkError> for ApiError {
    fn from(value: BookmarkError) -> Self {
        match value {
            BookmarkError::Validation(msg) => Self::bad_request(msg),
            BookmarkError::DuplicateUrl(_) => Self {
                status: StatusCode::CONFLICT,
                message: "Bookmark with this URL already exists".to_string(),
            },
            BookmarkError::NotFound(_) => Self {
                status: StatusCode::NOT_FOUND,
                message: "Not found".to_string(),
            },
            BookmarkError::DatabaseError(msg) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: msg,
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::bad_request(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = %self.message, "request failed");
        }
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/healthz", get(health))
        .route("/bookmarks", get(list_bookmarks).post(create_bookmark))
        .route("/bookmarks/exists", get(bookmark_exists))
        .route(
            "/bookmarks/:id",
            get(get_bookmark).put(update_bookmark).delete(delete_bookmark),
        )
        .route("/bookmarks/:id/pin", patch(pin_bookmark))
        .route("/bookmarks/:id/archive", patch(archive_bookmark))
        .route("/tags", get(list_tags))
        .route("/metadata", post(fetch_metadata))
        .route("/r/:id", get(redirect))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(false))
                .on_response(DefaultOnResponse::new()),
        )
        .layer(cors)
}

async fn root() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "linkshelf" }))
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    search: Option<String>,
    tags: Option<String>,
    archived: Option<String>,
    sort: Option<String>,
}

impl ListParams {
    fn into_filter(self) -> BookmarkFilter {
        BookmarkFilter {
            search: self.search.filter(|s| !s.is_empty()),
            tags: self
                .tags
                .as_deref()
                .map(BookmarkFilter::parse_tags)
                .unwrap_or_default(),
            archived: self.archived.map(|a| a == "true"),
            sort: SortOrder::from_query(self.sort.as_deref()),
        }
    }
}

async fn list_bookmarks(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Bookmark>>> {
    let items = state.service.list(params.into_filter()).await?;
    Ok(Json(items))
}

async fn create_bookmark(
    State(state): State<SharedState>,
    payload: Result<Json<NewBookmark>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Bookmark>)> {
    let Json(input) = payload?;
    let created = state.service.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
struct ExistsParams {
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExistsResponse {
    exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    bookmark: Option<Bookmark>,
}

async fn bookmark_exists(
    State(state): State<SharedState>,
    Query(params): Query<ExistsParams>,
) -> ApiResult<Json<ExistsResponse>> {
    let url = params.url.unwrap_or_default();
    let bookmark = state.service.find_existing(&url).await?;
    Ok(Json(ExistsResponse {
        exists: bookmark.is_some(),
        bookmark,
    }))
}

async fn get_bookmark(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Bookmark>> {
    Ok(Json(state.service.get(&id).await?))
}

#[derive(Debug, Default, Deserialize)]
struct PinBody {
    #[serde(default, deserialize_with = "truthy")]
    pinned: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ArchiveBody {
    #[serde(default, deserialize_with = "truthy")]
    archived: bool,
}

/// Reads any JSON value as a flag: `null`, `false`, `0` and `""` are false,
/// everything else is true.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(flag) => flag,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    })
}

/// Parses a pin/archive body. An empty body reads as `{}`.
fn flag_body<T: DeserializeOwned + Default>(bytes: &[u8]) -> ApiResult<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(bytes)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))
}

async fn pin_bookmark(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Bookmark>> {
    let PinBody { pinned } = flag_body(&body)?;
    Ok(Json(state.service.set_pinned(&id, pinned).await?))
}

async fn archive_bookmark(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Bookmark>> {
    let ArchiveBody { archived } = flag_body(&body)?;
    Ok(Json(state.service.set_archived(&id, archived).await?))
}

async fn update_bookmark(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<BookmarkPatch>, JsonRejection>,
) -> ApiResult<Json<Bookmark>> {
    let Json(patch) = payload?;
    Ok(Json(state.service.update(&id, patch).await?))
}

async fn delete_bookmark(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.service.delete(&id).await?;
    Ok(Json(json!({ "ok": true })))
}

async fn list_tags(State(state): State<SharedState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.tags().await?))
}

#[derive(Debug, Deserialize)]
struct MetadataRequest {
    url: Option<String>,
}

async fn fetch_metadata(
    State(state): State<SharedState>,
    payload: Result<Json<MetadataRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let url = request.url.unwrap_or_default();
    Ok(Json(state.service.metadata(&url).await?))
}

/// Click-through: counts the visit, then answers 302 to the stored url.
/// Errors are plain text here since browsers follow this link directly.
async fn redirect(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    match state.service.resolve_and_track(&id).await {
        Ok(target) => (StatusCode::FOUND, [(header::LOCATION, target)]).into_response(),
        Err(BookmarkError::NotFound(_)) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(err) => {
            warn!(%id, error = %err, "redirect failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}
