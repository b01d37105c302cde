//! Embedded static pages.
//!
//! The public site and dashboard shell are minimal HTML documents embedded in
//! the binary. The bilingual error pages (401/403/404/500) are presentational
//! only; access decisions happen in the gate, these are just what the browser
//! lands on.

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;
use serde_json::json;
use tracing::error;

use crate::AppState;

#[derive(RustEmbed)]
#[folder = "static/"]
struct Assets;

/// Serve an embedded asset with its guessed MIME type.
fn render(file: &str, status: StatusCode) -> Response {
    match Assets::get(file) {
        Some(content) => {
            let mime = mime_guess::from_path(file).first_or_octet_stream();
            (status, [(header::CONTENT_TYPE, mime.as_ref().to_string())], content.data).into_response()
        }
        None => {
            // Embedded assets are fixed at build time, so a miss is a packaging bug
            error!(%file, "embedded page asset missing");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn index() -> Response {
    render("index.html", StatusCode::OK)
}

pub async fn signin() -> Response {
    render("signin.html", StatusCode::OK)
}

pub async fn dashboard() -> Response {
    render("dashboard.html", StatusCode::OK)
}

pub async fn unauthorized() -> Response {
    render("401.html", StatusCode::UNAUTHORIZED)
}

pub async fn forbidden() -> Response {
    render("403.html", StatusCode::OK)
}

pub async fn server_error() -> Response {
    render("500.html", StatusCode::INTERNAL_SERVER_ERROR)
}

/// Catch-all for unmatched routes: JSON 404 under the API prefix, the 404
/// page everywhere else.
pub async fn not_found(State(state): State<AppState>, request: Request) -> Response {
    let path = request.uri().path();
    if path.starts_with(&state.config.access.api_prefix) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Not found" })),
        )
            .into_response();
    }

    render("404.html", StatusCode::NOT_FOUND)
}
