//! Embedded UI pages and scripts

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};

const INDEX_HTML: &str = include_str!("../../ui/index.html");

/// Files served under `/static/`, with their content types
const STATIC_FILES: &[(&str, &str, &str)] = &[(
    "app.js",
    "application/javascript",
    include_str!("../../ui/app.js"),
)];

/// GET /
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /static/:file
pub async fn serve_static(Path(file): Path<String>) -> Response {
    match STATIC_FILES.iter().find(|(name, _, _)| *name == file) {
        Some((_, content_type, body)) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, *content_type)], *body).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
