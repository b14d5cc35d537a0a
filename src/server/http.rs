// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 assetflow contributors

//! HTTP routes of the dev server

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use colored::Colorize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::websocket::websocket_handler;
use super::LiveReload;
use crate::errors::{AssetflowError, AssetflowResult};

/// Websocket endpoint
pub const LIVERELOAD_PATH: &str = "/__assetflow/livereload";
/// Browser client script
pub const CLIENT_PATH: &str = "/__assetflow/client.js";

const CLIENT_JS: &str = include_str!("client.js");

// Larger HTML responses fail with a 500
const MAX_HTML_BYTES: usize = 16 * 1024 * 1024;

const BODY_CLOSE: &[u8] = b"</body>";

/// Shared state of the handlers
pub(super) struct ServerState {
    pub(super) reload: LiveReload,
    notify: bool,
}

/// Static file server with live reload
pub struct DevServer {
    root: PathBuf,
    port: u16,
    notify: bool,
    reload: LiveReload,
}

impl DevServer {
    /// Serve `root` (the destination tree) on `port`
    pub fn new(root: impl Into<PathBuf>, port: u16, reload: LiveReload) -> Self {
        Self {
            root: root.into(),
            port,
            notify: true,
            reload,
        }
    }

    /// Show the in-page connection toast
    pub fn with_notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    /// Build the router
    pub fn router(&self) -> Router {
        let state = Arc::new(ServerState {
            reload: self.reload.clone(),
            notify: self.notify,
        });

        Router::new()
            .route(LIVERELOAD_PATH, get(websocket_handler))
            .route(CLIENT_PATH, get(client_script))
            .with_state(state)
            .fallback_service(ServeDir::new(&self.root).append_index_html_on_directories(true))
            .layer(middleware::from_fn(inject_live_reload))
            .layer(TraceLayer::new_for_http())
    }

    /// Listen until the process stops
    pub async fn serve(self) -> AssetflowResult<()> {
        let addr = SocketAddr::from(([127, 0, 0, 1], self.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AssetflowError::Server {
                message: format!("cannot listen on {}: {}", addr, e),
            })?;

        println!(
            "{} {} at {}",
            "Serving".bold(),
            self.root.display(),
            format!("http://localhost:{}", self.port).cyan()
        );

        axum::serve(listener, self.router())
            .await
            .map_err(|e| AssetflowError::Server {
                message: e.to_string(),
            })
    }
}

async fn client_script(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        format!(
            "const ASSETFLOW_NOTIFY = {};\nconst ASSETFLOW_SOCKET = \"{}\";\n{}",
            state.notify, LIVERELOAD_PATH, CLIENT_JS
        ),
    )
}

/// Add the client script tag to HTML responses
async fn inject_live_reload(req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));
    if !is_html || !response.status().is_success() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_HTML_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Could not buffer HTML response: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let html = inject_script_tag(&bytes);
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(html))
}

/// Insert the client script before the closing body tag, or append it
///
/// Works on raw bytes so pages in any ASCII-compatible encoding pass
/// through unchanged.
pub fn inject_script_tag(html: &[u8]) -> Vec<u8> {
    let tag = format!("<script src=\"{}\" async></script>", CLIENT_PATH);
    let close = html
        .windows(BODY_CLOSE.len())
        .rposition(|w| w.eq_ignore_ascii_case(BODY_CLOSE));

    let mut out = Vec::with_capacity(html.len() + tag.len());
    match close {
        Some(pos) => {
            out.extend_from_slice(&html[..pos]);
            out.extend_from_slice(tag.as_bytes());
            out.extend_from_slice(&html[pos..]);
        }
        None => {
            out.extend_from_slice(html);
            out.extend_from_slice(tag.as_bytes());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn server(temp: &TempDir) -> DevServer {
        std::fs::write(
            temp.path().join("index.html"),
            "<html><body><h1>hi</h1></body></html>",
        )
        .unwrap();
        std::fs::write(temp.path().join("style.css"), "body{color:red}").unwrap();
        DevServer::new(temp.path(), 0, LiveReload::new())
    }

    async fn get_body(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_inject_before_body_close() {
        let html = inject_script_tag(b"<html><BODY><p>x</p></BODY></html>");
        assert_eq!(
            html,
            b"<html><BODY><p>x</p><script src=\"/__assetflow/client.js\" async></script></BODY></html>"
        );
    }

    #[test]
    fn test_inject_without_body_appends() {
        assert!(inject_script_tag(b"<p>fragment</p>").ends_with(b"async></script>"));
    }

    #[test]
    fn test_inject_keeps_latin1_bytes() {
        let html = inject_script_tag(b"<html><body><p>caf\xe9</p></body></html>");
        assert!(html.starts_with(b"<html><body><p>caf\xe9</p><script"));
        assert!(html.ends_with(b"</script></body></html>"));
    }

    #[tokio::test]
    async fn test_non_utf8_page_served_intact() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("latin.html"), b"<body>\xe9t\xe9</body>").unwrap();
        let router = DevServer::new(temp.path(), 0, LiveReload::new()).router();

        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .uri("/latin.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"<body>\xe9t\xe9<script"));
    }

    #[tokio::test]
    async fn test_html_gets_client_script() {
        let temp = TempDir::new().unwrap();
        let (status, body) = get_body(server(&temp).router(), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>hi</h1>"));
        assert!(body.contains(CLIENT_PATH));
    }

    #[tokio::test]
    async fn test_css_served_untouched() {
        let temp = TempDir::new().unwrap();
        let (status, body) = get_body(server(&temp).router(), "/style.css").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "body{color:red}");
    }

    #[tokio::test]
    async fn test_client_script_reflects_notify() {
        let temp = TempDir::new().unwrap();
        let router = server(&temp).with_notify(false).router();
        let (status, body) = get_body(router, CLIENT_PATH).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("const ASSETFLOW_NOTIFY = false;"));
        assert!(body.contains(LIVERELOAD_PATH));
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let temp = TempDir::new().unwrap();
        let (status, _) = get_body(server(&temp).router(), "/nope.js").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
