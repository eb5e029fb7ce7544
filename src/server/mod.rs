//! Admin and content HTTP API

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::chat::ChatResponder;
use crate::commands::build;
use crate::content::{self, store, ContentStore, Item, ItemId, SiteContent, StoreError};
use crate::i18n::I18n;
use crate::reorder::{Direction, MoveOutcome, ReorderController, ReorderError};
use crate::Folio;

type Controller = ReorderController<dyn ContentStore>;

/// Credentials of the back office, passed explicitly through server state
#[derive(Debug, Clone, Default)]
pub struct AdminSession {
    token: Option<String>,
}

impl AdminSession {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Whether the request carries the configured bearer token
    pub fn authorize(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.token else {
            return true;
        };

        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|token| token.trim() == expected)
            .unwrap_or(false)
    }
}

/// Server state
struct ServerState {
    folio: Folio,
    store: Arc<dyn ContentStore>,
    i18n: I18n,
    session: AdminSession,
    /// One controller per category, shared by every request
    controllers: Mutex<HashMap<String, Arc<Controller>>>,
}

impl ServerState {
    async fn site_content(&self) -> Result<SiteContent, StoreError> {
        content::aggregate(self.store.as_ref(), &self.folio.config, &self.i18n).await
    }

    async fn controller(&self, category: &str) -> Result<Arc<Controller>, ApiError> {
        if self.folio.config.category(category).is_none() {
            return Err(ApiError::new(
                StatusCode::NOT_FOUND,
                format!("Unknown category: {}", category),
            ));
        }

        if let Some(controller) = self.controllers.lock().await.get(category) {
            return Ok(controller.clone());
        }

        // Load without the map locked; a racing first request for the
        // same category keeps whichever controller landed first
        let controller = Controller::load(self.store.clone(), category)
            .await?
            .with_refresh(|category, updates| {
                tracing::info!("Persisted {} orders for {}", updates.len(), category);
            });
        let mut controllers = self.controllers.lock().await;
        Ok(controllers
            .entry(category.to_string())
            .or_insert_with(|| Arc::new(controller))
            .clone())
    }

    /// Rewrite the public content file after a change to the store
    async fn publish(&self) {
        let result = match self.site_content().await {
            Ok(content) => build::write_content(&self.folio.public_dir, &content).await,
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(path) => tracing::debug!("Published {:?}", path),
            Err(e) => tracing::warn!("Failed to publish content: {}", e),
        }
    }
}

/// JSON error response
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Missing or invalid admin token")
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let status = match e {
            StoreError::UnknownCategory(_) | StoreError::UnknownItem { .. } => {
                StatusCode::NOT_FOUND
            }
            StoreError::MissingIds { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<ReorderError> for ApiError {
    fn from(e: ReorderError) -> Self {
        let status = match e {
            ReorderError::Busy(_) => StatusCode::CONFLICT,
            ReorderError::IndexOutOfRange { .. } => StatusCode::BAD_REQUEST,
            ReorderError::Persist(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{}", self.message);
        }
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// List state returned by admin endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub items: Vec<Item>,
    pub pending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moved: Option<bool>,
}

impl ListResponse {
    fn of(controller: &Controller) -> Self {
        Self {
            items: controller.items(),
            pending: controller.is_pending(),
            moved: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Build the router over any content store
pub fn router(folio: Folio, store: Arc<dyn ContentStore>) -> Result<Router> {
    let i18n = folio.i18n()?;
    let session = AdminSession::new(folio.config.admin.token.clone());
    let public_dir = folio.public_dir.clone();

    let state = Arc::new(ServerState {
        folio,
        store,
        i18n,
        session,
        controllers: Mutex::new(HashMap::new()),
    });

    Ok(Router::new()
        .route("/api/content", get(content_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/admin/:category", get(list_handler))
        .route("/api/admin/:category/normalize", post(normalize_handler))
        .route("/api/admin/:category/items/:id", delete(delete_handler))
        .route("/api/admin/:category/:index/:direction", post(move_handler))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the server over the site's file store
pub async fn start(folio: &Folio, ip: &str, port: u16, open: bool) -> Result<()> {
    let store: Arc<dyn ContentStore> = Arc::new(folio.store());
    if folio.config.admin.token.is_none() {
        tracing::warn!("No admin token configured, admin endpoints are open");
    }
    let app = router(folio.clone(), store)?;

    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn content_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<SiteContent>, ApiError> {
    Ok(Json(state.site_content().await?))
}

async fn chat_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let content = state.site_content().await?;
    let responder = ChatResponder::from_content(&state.folio.config, &content);
    Ok(Json(ChatReply {
        reply: responder.respond(&request.message),
    }))
}

async fn list_handler(
    State(state): State<Arc<ServerState>>,
    Path(category): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ListResponse>, ApiError> {
    if !state.session.authorize(&headers) {
        return Err(ApiError::unauthorized());
    }

    // Opening the list always shows the store's current state
    let controller = state.controller(&category).await?;
    controller.reload().await?;
    Ok(Json(ListResponse::of(&controller)))
}

async fn move_handler(
    State(state): State<Arc<ServerState>>,
    Path((category, index, direction)): Path<(String, usize, String)>,
    headers: HeaderMap,
) -> Result<Json<ListResponse>, ApiError> {
    if !state.session.authorize(&headers) {
        return Err(ApiError::unauthorized());
    }

    let direction: Direction = direction
        .parse()
        .map_err(|e: String| ApiError::new(StatusCode::BAD_REQUEST, e))?;

    let controller = state.controller(&category).await?;
    let outcome = controller.move_item(index, direction).await?;
    if outcome == MoveOutcome::Moved {
        state.publish().await;
    }

    let mut response = ListResponse::of(&controller);
    response.moved = Some(outcome == MoveOutcome::Moved);
    Ok(Json(response))
}

async fn delete_handler(
    State(state): State<Arc<ServerState>>,
    Path((category, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    if !state.session.authorize(&headers) {
        return Err(ApiError::unauthorized());
    }

    let controller = state.controller(&category).await?;
    let edit = controller.begin_edit()?;
    let renormalize = state.folio.config.admin.renormalize_on_delete;
    store::remove_item(state.store.as_ref(), &category, &ItemId::from(id), renormalize).await?;

    // The delete stands; a failed reload is retried by the next move
    if let Err(e) = edit.finish().await {
        tracing::warn!("Reload of {} after delete failed: {}", category, e);
    }
    state.publish().await;
    Ok(StatusCode::NO_CONTENT)
}

async fn normalize_handler(
    State(state): State<Arc<ServerState>>,
    Path(category): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ListResponse>, ApiError> {
    if !state.session.authorize(&headers) {
        return Err(ApiError::unauthorized());
    }

    let controller = state.controller(&category).await?;
    let edit = controller.begin_edit()?;
    let changed = store::normalize(state.store.as_ref(), &category).await?;
    edit.finish().await?;

    if changed {
        state.publish().await;
    }
    Ok(Json(ListResponse::of(&controller)))
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    let (program, args): (&str, Vec<&str>) = if cfg!(target_os = "macos") {
        ("open", vec![url])
    } else if cfg!(target_os = "windows") {
        ("cmd", vec!["/c", "start", url])
    } else {
        ("xdg-open", vec![url])
    };

    std::process::Command::new(program).args(args).spawn()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::{Fields, MemoryStore, OrderUpdate};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    fn folio(dir: &std::path::Path, token: Option<&str>) -> Folio {
        let dir = dir.to_path_buf();
        let mut config = SiteConfig::default();
        config.author = "Ada".to_string();
        config.admin.token = token.map(|t| t.to_string());
        Folio {
            config,
            base_dir: dir.clone(),
            content_dir: dir.join("content"),
            public_dir: dir.join("public"),
            i18n_dir: dir.join("languages"),
        }
    }

    fn memory_store() -> MemoryStore {
        let store = MemoryStore::with_categories(SiteConfig::default().category_names());
        store.set_items(
            "skills",
            vec![
                Item::new("A", 0).with_field("title", "Rust"),
                Item::new("B", 1).with_field("title", "Go"),
                Item::new("C", 2).with_field("title", "SQL"),
            ],
        );
        store
    }

    fn app(token: Option<&str>) -> (Arc<MemoryStore>, Router, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(memory_store());
        let router = router(folio(dir.path(), token), store.clone()).unwrap();
        (store, router, dir)
    }

    /// Memory store whose order writes wait until released
    struct HeldStore {
        inner: MemoryStore,
        started: Notify,
        release: Notify,
        /// Category whose next fetch waits for `unstall`
        stall: std::sync::Mutex<Option<String>>,
        stalled: Notify,
        unstall: Notify,
    }

    fn held_store() -> Arc<HeldStore> {
        Arc::new(HeldStore {
            inner: memory_store(),
            started: Notify::new(),
            release: Notify::new(),
            stall: std::sync::Mutex::new(None),
            stalled: Notify::new(),
            unstall: Notify::new(),
        })
    }

    #[async_trait]
    impl ContentStore for HeldStore {
        fn categories(&self) -> Vec<String> {
            self.inner.categories()
        }

        async fn fetch_items(&self, category: &str) -> Result<Vec<Item>, StoreError> {
            let stall = {
                let mut stall = self.stall.lock().unwrap();
                match stall.as_deref() {
                    Some(c) if c == category => stall.take(),
                    _ => None,
                }
            };
            if stall.is_some() {
                self.stalled.notify_one();
                self.unstall.notified().await;
            }
            self.inner.fetch_items(category).await
        }

        async fn persist_order(
            &self,
            category: &str,
            updates: &[OrderUpdate],
        ) -> Result<(), StoreError> {
            self.started.notify_one();
            self.release.notified().await;
            self.inner.persist_order(category, updates).await
        }

        async fn insert_item(&self, category: &str, fields: Fields) -> Result<Item, StoreError> {
            self.inner.insert_item(category, fields).await
        }

        async fn delete_item(&self, category: &str, id: &ItemId) -> Result<(), StoreError> {
            self.inner.delete_item(category, id).await
        }
    }

    async fn stored(store: &impl ContentStore) -> Vec<(String, i64)> {
        store
            .fetch_items("skills")
            .await
            .unwrap()
            .iter()
            .map(|i| (i.id.to_string(), i.order))
            .collect()
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        };
        app.clone().oneshot(request.unwrap()).await.unwrap()
    }

    async fn json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn ids(value: &serde_json::Value) -> Vec<String> {
        value["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_move_endpoint() {
        let (store, app, _dir) = app(None);

        let response = send(&app, "POST", "/api/admin/skills/1/up", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(ids(&body), vec!["B", "A", "C"]);
        assert_eq!(body["moved"], true);
        assert_eq!(body["pending"], false);

        let stored = store.fetch_items("skills").await.unwrap();
        assert_eq!(stored[0].id.as_str(), "B");

        let response = send(&app, "POST", "/api/admin/skills/2/down", None).await;
        assert_eq!(json(response).await["moved"], false);
    }

    #[tokio::test]
    async fn test_move_errors() {
        let (_, app, _dir) = app(None);

        let response = send(&app, "POST", "/api/admin/skills/7/up", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, "POST", "/api/admin/skills/1/sideways", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, "POST", "/api/admin/hobbies/1/up", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_requires_token() {
        let (_, app, _dir) = app(Some("s3cret"));

        let response = send(&app, "GET", "/api/admin/skills", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .uri("/api/admin/skills")
            .header(header::AUTHORIZATION, "Bearer s3cret")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ids(&json(response).await), vec!["A", "B", "C"]);

        // public endpoints stay open
        let response = send(&app, "GET", "/api/content", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_reloads_from_store() {
        let (store, app, _dir) = app(None);
        send(&app, "GET", "/api/admin/skills", None).await;

        store.set_items("skills", vec![Item::new("Z", 0)]);
        let body = json(send(&app, "GET", "/api/admin/skills", None).await).await;
        assert_eq!(ids(&body), vec!["Z"]);
    }

    #[tokio::test]
    async fn test_delete_and_normalize() {
        let (store, app, _dir) = app(None);

        let response = send(&app, "DELETE", "/api/admin/skills/items/A", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let orders: Vec<_> = store
            .fetch_items("skills")
            .await
            .unwrap()
            .iter()
            .map(|i| i.order)
            .collect();
        assert_eq!(orders, vec![1, 2]);

        let response = send(&app, "DELETE", "/api/admin/skills/items/A", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = json(send(&app, "POST", "/api/admin/skills/normalize", None).await).await;
        let orders: Vec<_> = body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["order"].as_i64().unwrap())
            .collect();
        assert_eq!(orders, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_content_and_chat() {
        let (_, app, _dir) = app(None);

        let body = json(send(&app, "GET", "/api/content", None).await).await;
        assert_eq!(body["profile"]["author"], "Ada");
        assert_eq!(body["sections"]["skills"]["items"][0]["title"], "Rust");

        let body = json(
            send(&app, "POST", "/api/chat", Some(r#"{"message": "your skills?"}"#)).await,
        )
        .await;
        assert_eq!(body["reply"], "Skills: Rust, Go, SQL.");
    }

    #[tokio::test]
    async fn test_changes_wait_for_move_in_flight() {
        let dir = TempDir::new().unwrap();
        let store = held_store();
        let app = router(folio(dir.path(), None), store.clone()).unwrap();

        let first = {
            let app = app.clone();
            tokio::spawn(async move { send(&app, "POST", "/api/admin/skills/1/up", None).await })
        };
        store.started.notified().await;

        let response = send(&app, "DELETE", "/api/admin/skills/items/C", None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let response = send(&app, "POST", "/api/admin/skills/normalize", None).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            stored(&store.inner).await,
            vec![("A".to_string(), 0), ("B".to_string(), 1), ("C".to_string(), 2)]
        );

        store.release.notify_one();
        let response = first.await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ids(&json(response).await), vec!["B", "A", "C"]);

        let response = send(&app, "DELETE", "/api/admin/skills/items/C", None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        store.release.notify_one();
        let response = send(&app, "POST", "/api/admin/skills/1/up", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ids(&json(response).await), vec!["A", "B"]);
        assert_eq!(
            stored(&store.inner).await,
            vec![("A".to_string(), 0), ("B".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_slow_category_load_does_not_block_others() {
        let dir = TempDir::new().unwrap();
        let store = held_store();
        *store.stall.lock().unwrap() = Some("projects".to_string());
        let app = router(folio(dir.path(), None), store.clone()).unwrap();

        let slow = {
            let app = app.clone();
            tokio::spawn(async move { send(&app, "GET", "/api/admin/projects", None).await })
        };
        store.stalled.notified().await;

        let response = tokio::time::timeout(
            Duration::from_secs(5),
            send(&app, "GET", "/api/admin/skills", None),
        )
        .await
        .expect("skills waited on the projects load");
        assert_eq!(response.status(), StatusCode::OK);

        store.unstall.notify_one();
        assert_eq!(slow.await.unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_changes_republish_content_file() {
        let (_, app, dir) = app(None);
        let content_file = dir.path().join("public").join(build::CONTENT_FILE);
        let titles = || -> Vec<String> {
            let json: serde_json::Value =
                serde_json::from_str(&std::fs::read_to_string(&content_file).unwrap()).unwrap();
            json["sections"]["skills"]["items"]
                .as_array()
                .unwrap()
                .iter()
                .map(|i| i["title"].as_str().unwrap().to_string())
                .collect()
        };

        send(&app, "POST", "/api/admin/skills/2/up", None).await;
        assert_eq!(titles(), vec!["Rust", "SQL", "Go"]);

        send(&app, "DELETE", "/api/admin/skills/items/A", None).await;
        assert_eq!(titles(), vec!["SQL", "Go"]);

        // served from the public directory
        let response = send(&app, "GET", "/content.json", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_normalize_reports_missing_ids() {
        let (store, app, _dir) = app(None);
        store.set_items("skills", vec![Item::new("A", 0), Item::new("", 4)]);

        let response = send(&app, "POST", "/api/admin/skills/normalize", None).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_session_without_token_is_open() {
        assert!(AdminSession::new(None).authorize(&HeaderMap::new()));
        assert!(AdminSession::new(Some(String::new())).authorize(&HeaderMap::new()));

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer nope".parse().unwrap());
        assert!(!AdminSession::new(Some("yes".to_string())).authorize(&headers));
    }
}
