//! Live preview server implementation.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tower_http::services::ServeDir;

use stillframe_jsx::document;
use stillframe_jsx::sources::logical_path;
use stillframe_jsx::{Conversion, SourceError, SourceSet, Transpiler, DEFAULT_STYLESHEET};

use crate::templates::{ShellContext, TemplateEngine};
use crate::watcher::{FileWatcher, WatchEvent};
use crate::websocket::{hmr_client_script, HmrHub, HmrMessage};

/// Memoized conversions kept before the cache is cleared.
const CACHE_LIMIT: usize = 64;

/// Configuration for the preview server.
#[derive(Debug, Clone)]
pub struct DevServerConfig {
    /// Project root; `public/` under it is served at `/public`
    pub root: PathBuf,

    /// Directory containing component sources
    pub src_dir: PathBuf,

    /// Preferred entry file, relative to `src_dir`
    pub entry: Option<String>,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Open browser on start
    pub open: bool,

    /// CSS embedded in every preview document
    pub stylesheet: String,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            src_dir: PathBuf::from("src"),
            entry: None,
            port: 7777,
            host: "127.0.0.1".to_string(),
            open: true,
            stylesheet: DEFAULT_STYLESHEET.to_string(),
        }
    }
}

impl DevServerConfig {
    fn public_dir(&self) -> PathBuf {
        self.root.join("public")
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// The preview currently served.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Preview {
    file: Option<String>,
    conversion: Conversion,
}

/// Shared server state.
struct ServerState {
    config: DevServerConfig,
    sources: SourceSet,
    transpiler: Transpiler,
    hmr: HmrHub,
    templates: TemplateEngine,
    current: Preview,
    cache: HashMap<u64, Conversion>,
}

type SharedState = Arc<RwLock<ServerState>>;

impl ServerState {
    /// Load sources and render the initial preview.
    ///
    /// `src_dir` and `root` are made absolute so watcher paths can be mapped
    /// back to logical source paths.
    fn new(mut config: DevServerConfig) -> Result<Self, ServerError> {
        let sources = SourceSet::scan(&config.src_dir)?;
        config.src_dir = resolve_path(&config.src_dir);
        config.root = resolve_path(&config.root);

        let transpiler = Transpiler::with_stylesheet(config.stylesheet.clone());

        let mut state = Self {
            config,
            sources,
            transpiler,
            hmr: HmrHub::new(),
            templates: TemplateEngine::new(),
            current: Preview {
                file: None,
                conversion: Conversion {
                    html: String::new(),
                    success: false,
                    error: None,
                },
            },
            cache: HashMap::new(),
        };
        state.refresh();

        Ok(state)
    }

    /// Re-render the entry file. Returns true when the preview changed.
    fn refresh(&mut self) -> bool {
        let preferred = self.config.entry.as_deref();
        let entry = self
            .sources
            .entry(preferred)
            .map(|(path, source)| (path.to_string(), content_hash(path, source)));

        let cached = entry
            .as_ref()
            .and_then(|(_, key)| self.cache.get(key).cloned());

        let conversion = match cached {
            Some(conversion) => conversion,
            None => match self.sources.render_entry(&self.transpiler, preferred) {
                Ok(conversion) => {
                    if let Some((_, key)) = &entry {
                        if self.cache.len() >= CACHE_LIMIT {
                            self.cache.clear();
                        }
                        self.cache.insert(*key, conversion.clone());
                    }
                    conversion
                }
                Err(e) => {
                    let message = e.to_string();
                    tracing::warn!("{}", message);

                    Conversion {
                        html: document::error_page(
                            &self.config.src_dir.display().to_string(),
                            &message,
                            self.transpiler.stylesheet(),
                        ),
                        success: false,
                        error: Some(message),
                    }
                }
            },
        };

        let preview = Preview {
            file: entry.map(|(path, _)| path),
            conversion,
        };

        if preview == self.current {
            return false;
        }

        self.current = preview;
        true
    }

    /// Broadcast the current preview to connected clients.
    fn broadcast(&self) {
        self.hmr.send(HmrMessage::refresh(
            self.current.file.as_deref(),
            &self.current.conversion,
        ));
    }

    /// Logical source path of a watcher path.
    fn logical(&self, path: &Path) -> String {
        logical_path(&self.config.src_dir, &resolve_path(path))
    }

    fn is_public(&self, path: &Path) -> bool {
        resolve_path(path).starts_with(self.config.public_dir())
    }
}

/// Absolute, symlink-free form of `path`.
///
/// A path that no longer exists (a removed file) is resolved through its
/// parent directory.
fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }

    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            resolve_path(parent).join(name)
        }
        _ => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
    }
}

/// Live preview server.
pub struct DevServer {
    config: DevServerConfig,
}

impl DevServer {
    /// Create a new preview server.
    pub fn new(config: DevServerConfig) -> Self {
        Self { config }
    }

    /// Start the preview server.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                ServerError::InvalidAddress(format!("{}:{}", self.config.host, self.config.port))
            })?;

        let state = ServerState::new(self.config.clone())?;
        let public_dir = state.config.public_dir();
        let watch_paths = vec![state.config.src_dir.clone(), public_dir.clone()];
        let state = Arc::new(RwLock::new(state));

        let (watcher, mut rx) =
            FileWatcher::new(&watch_paths).map_err(|e| ServerError::WatchError(e.to_string()))?;

        let state_clone = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                handle_watch_event(&state_clone, event).await;
            }
            // Keep watcher alive
            drop(watcher);
        });

        let app = router(state, &public_dir);

        tracing::info!("Starting preview server at http://{}", addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::debug!("Could not open browser: {}", e);
            }
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

fn router(state: SharedState, public_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/__preview", get(preview_handler))
        .route("/__status", get(status_handler))
        .route("/__hmr", get(ws_handler))
        .route("/__hmr.js", get(hmr_script_handler))
        .nest_service("/public", ServeDir::new(public_dir))
        .with_state(state)
}

/// Handle file watch events.
async fn handle_watch_event(state: &SharedState, event: WatchEvent) {
    let mut state = state.write().await;

    match event {
        WatchEvent::SourceChanged(path) => {
            let logical = state.logical(&path);

            match std::fs::read_to_string(&path) {
                Ok(source) => {
                    tracing::info!("Source changed: {}", logical);
                    state.sources.insert(logical, source);
                }
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                    return;
                }
            }

            if state.refresh() {
                state.broadcast();
            }
        }

        WatchEvent::SourceRemoved(path) => {
            let logical = state.logical(&path);
            tracing::info!("Source removed: {}", logical);

            if state.sources.remove(&logical).is_some() && state.refresh() {
                state.broadcast();
            }
        }

        WatchEvent::Other(path) => {
            if state.is_public(&path) {
                tracing::debug!("Static file changed: {}", path.display());
                state.hmr.send(HmrMessage::Reload);
            }
        }
    }
}

/// Handler for the shell page.
async fn index_handler(State(state): State<SharedState>) -> Response {
    let state = state.read().await;
    let current = &state.current;

    let context = ShellContext {
        file: current.file.clone(),
        html: current.conversion.html.clone(),
        success: current.conversion.success,
        error: current.conversion.error.clone(),
    };

    match state.templates.render_shell(&context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render shell page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Handler for the raw preview document.
async fn preview_handler(State(state): State<SharedState>) -> Html<String> {
    Html(state.read().await.current.conversion.html.clone())
}

#[derive(Debug, Serialize)]
struct StatusBody {
    file: Option<String>,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    /// Logical paths of every loaded source
    sources: Vec<String>,
}

/// Handler for conversion metadata.
async fn status_handler(State(state): State<SharedState>) -> Json<StatusBody> {
    let state = state.read().await;

    Json(StatusBody {
        file: state.current.file.clone(),
        success: state.current.conversion.success,
        error: state.current.conversion.error.clone(),
        sources: state.sources.paths().map(str::to_string).collect(),
    })
}

/// Handler for the WebSocket endpoint.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Forward hub messages to one client.
async fn handle_ws(mut socket: WebSocket, state: SharedState) {
    let mut rx = state.read().await.hmr.subscribe();

    if !send_message(&mut socket, &HmrMessage::Connected).await {
        return;
    }

    while let Ok(msg) = rx.recv().await {
        if !send_message(&mut socket, &msg).await {
            break;
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &HmrMessage) -> bool {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to encode message: {}", e);
            return false;
        }
    };

    socket.send(Message::Text(json.into())).await.is_ok()
}

/// Handler for the client script.
async fn hmr_script_handler() -> impl IntoResponse {
    (
        [("content-type", "application/javascript")],
        hmr_client_script("/__hmr"),
    )
}

fn content_hash(path: &str, source: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    source.hash(&mut hasher);
    hasher.finish()
}
