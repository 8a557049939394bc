// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod get;
mod post;
mod state;
mod template;

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_DISPOSITION;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::signal;
use tokio::time::sleep;

use crate::error::Fallible;
use crate::error::MSG_UNKNOWN_ERROR;
use crate::export::ExportFormat;
use crate::export::ExporterRegistry;
use crate::fetch::ContentFetcher;
use crate::generate::CardGenerator;
use crate::server::get::get_handler;
use crate::server::post::post_handler;
use crate::server::post::upload_handler;
use crate::server::state::ServerState;
use crate::session::Orchestrator;
use crate::session::SessionState;

const CACHE_CONTROL_IMMUTABLE: &str = "public, max-age=604800, immutable";

pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

pub async fn start_server<G, F>(
    config: ServerConfig,
    orchestrator: Orchestrator<G, F>,
    exporters: ExporterRegistry,
) -> Fallible<()>
where
    G: CardGenerator + 'static,
    F: ContentFetcher + 'static,
{
    // Leave headroom over the configured maximum so the size check in the
    // pipeline produces the user-facing message instead of a bare 413.
    let body_limit = (orchestrator.max_file_size_mb() as usize + 2) * 1024 * 1024;
    let state = ServerState::new(orchestrator, exporters);

    let app = Router::new();
    let app = app.route("/", get(get_handler));
    let app = app.route("/", post(post_handler));
    let app = app.route("/upload", post(upload_handler));
    let app = app.route("/export/{format}", get(export_handler));
    let app = app.route("/style.css", get(style_handler));
    let app = app.fallback(not_found_handler);
    let app = app.layer(DefaultBodyLimit::max(body_limit));
    let app = app.with_state(state);
    let bind = format!("{}:{}", config.host, config.port);

    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn export_handler<G, F>(
    State(state): State<ServerState<G, F>>,
    Path(format): Path<String>,
) -> Response
where
    G: CardGenerator + 'static,
    F: ContentFetcher + 'static,
{
    let Some(format) = ExportFormat::parse(&format) else {
        return (StatusCode::NOT_FOUND, Html("Not Found".to_string())).into_response();
    };
    let cards = {
        let session = state.session.lock().unwrap();
        match session.state() {
            SessionState::Viewing { viewer } => viewer.deck().cards().to_vec(),
            _ => return Redirect::to("/").into_response(),
        }
    };
    let Some(renderer) = state.exporters.get(format) else {
        state
            .session
            .lock()
            .unwrap()
            .set_error(format.not_ready_message());
        return Redirect::to("/").into_response();
    };
    match renderer.render(&cards) {
        Ok(bytes) => {
            let disposition = format!("attachment; filename=\"{}\"", format.file_name());
            (
                StatusCode::OK,
                [
                    (CONTENT_TYPE, format.content_type()),
                    (CONTENT_DISPOSITION, disposition.as_str()),
                ],
                bytes,
            )
                .into_response()
        }
        Err(err) => {
            log::warn!("Export failed: {err}");
            state.session.lock().unwrap().set_error(MSG_UNKNOWN_ERROR);
            Redirect::to("/").into_response()
        }
    }
}

async fn style_handler() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, CACHE_CONTROL_IMMUTABLE),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}

async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    log::debug!("Received Ctrl+C, shutting down gracefully");
}

pub async fn wait_for_server(host: &str, port: u16) -> Fallible<()> {
    loop {
        if let Ok(stream) = TcpStream::connect(format!("{host}:{port}")).await {
            drop(stream);
            break;
        }
        sleep(Duration::from_millis(1)).await;
    }
    Ok(())
}
