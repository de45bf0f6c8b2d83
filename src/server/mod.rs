//! Preview server
//!
//! Serves the generated output and renders posts that were published after
//! the last generation on first request.

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::FallbackMode;
use crate::content::PostPage;
use crate::generator::Generator;
use crate::helpers::post_path;
use crate::Spacetraveling;

/// Shown when the content API cannot be reached
const API_UNAVAILABLE: &str = "The content API is unavailable";

/// State of a post rendered in the background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Rendering,
    /// The API has no document for the slug
    Missing,
    /// The API call failed
    Failed,
}

/// Server state
struct ServerState {
    public_dir: PathBuf,
    generator: Arc<Generator>,
    fallback: FallbackMode,
    pending: Mutex<HashMap<String, Pending>>,
}

impl ServerState {
    fn new(site: &Spacetraveling, generator: Arc<Generator>) -> Self {
        Self {
            public_dir: site.public_dir.clone(),
            generator,
            fallback: site.config.prismic.fallback,
            pending: Mutex::new(HashMap::new()),
        }
    }
}

/// Build the router for a generated site
pub fn router(site: &Spacetraveling, generator: Arc<Generator>) -> Router {
    let state = Arc::new(ServerState::new(site, generator));

    Router::new()
        .fallback(fallback_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the preview server
pub async fn start(
    site: &Spacetraveling,
    generator: Arc<Generator>,
    ip: &str,
    port: u16,
    open: bool,
) -> Result<()> {
    let app = router(site, generator);

    // Parse address - handle "localhost" specially
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

/// Serve generated files; render missing post pages on demand
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    if let Some(slug) = post_slug(request.uri().path()) {
        let file_path = state.public_dir.join(post_path(&slug)).join("index.html");
        if let Ok(content) = tokio::fs::read_to_string(&file_path).await {
            return Html(content).into_response();
        }
        return match state.fallback {
            FallbackMode::Blocking => render_blocking(&state, &slug).await,
            FallbackMode::Loading => render_loading(&state, slug).await,
        };
    }

    let mut service = ServeDir::new(&state.public_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(state.public_dir.join("404.html")));
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Fetch and render within the request
async fn render_blocking(state: &ServerState, slug: &str) -> Response {
    tracing::info!("Rendering post {} on demand", slug);
    match state.generator.generate_post(slug).await {
        Ok(true) => {
            let file_path = state.public_dir.join(post_path(slug)).join("index.html");
            match tokio::fs::read_to_string(&file_path).await {
                Ok(content) => Html(content).into_response(),
                Err(e) => error_response(state, StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
            }
        }
        Ok(false) => page_response(state, StatusCode::NOT_FOUND, &PostPage::NotFound),
        Err(e) => {
            tracing::error!("Failed to render post {}: {:#}", slug, e);
            error_response(state, StatusCode::BAD_GATEWAY, API_UNAVAILABLE)
        }
    }
}

/// Answer with the loading placeholder while the page renders in the background
async fn render_loading(state: &Arc<ServerState>, slug: String) -> Response {
    let mut pending = state.pending.lock().await;
    match pending.get(&slug).copied() {
        Some(Pending::Missing) => {
            pending.remove(&slug);
            return page_response(state, StatusCode::NOT_FOUND, &PostPage::NotFound);
        }
        Some(Pending::Failed) => {
            pending.remove(&slug);
            return error_response(state, StatusCode::BAD_GATEWAY, API_UNAVAILABLE);
        }
        Some(Pending::Rendering) => {}
        None => {
            pending.insert(slug.clone(), Pending::Rendering);
            let state = Arc::clone(state);
            tokio::spawn(async move {
                let outcome = match state.generator.generate_post(&slug).await {
                    Ok(true) => None,
                    Ok(false) => Some(Pending::Missing),
                    Err(e) => {
                        tracing::error!("Failed to render post {}: {:#}", slug, e);
                        Some(Pending::Failed)
                    }
                };
                let mut pending = state.pending.lock().await;
                match outcome {
                    Some(done) => {
                        pending.insert(slug, done);
                    }
                    None => {
                        pending.remove(&slug);
                    }
                }
            });
        }
    }
    drop(pending);

    page_response(state, StatusCode::OK, &PostPage::Loading)
}

fn page_response(state: &ServerState, status: StatusCode, page: &PostPage) -> Response {
    match state.generator.render_post_page(page) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => error_response(state, StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    }
}

fn error_response(state: &ServerState, status: StatusCode, message: &str) -> Response {
    match state.generator.render_error(status.as_u16(), message) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(_) => (status, message.to_string()).into_response(),
    }
}

/// Extract the slug from `/post/<slug>` or `/post/<slug>/`
fn post_slug(path: &str) -> Option<String> {
    let rest = path.strip_prefix("/post/")?;
    let raw = rest.strip_suffix('/').unwrap_or(rest);
    if raw.is_empty() || raw.contains('/') {
        return None;
    }
    let slug = percent_encoding::percent_decode_str(raw)
        .decode_utf8()
        .ok()?
        .into_owned();
    Some(slug)
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
