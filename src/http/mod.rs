//! HTTP surface: axum router, request tracing and the error boundary.
//!
//! Handlers never touch SQLite directly. Each one hands a closure to
//! [`blocking`], which runs the synchronous inventory call on tokio's
//! blocking pool inside the current request span.

mod request_tracing;
pub mod routes;
pub mod views;

pub use request_tracing::REQUEST_ID_HEADER;

use crate::core::assets;
use crate::core::error::PlushyError;
use crate::core::store::Store;
use crate::inventory::BASE_PATH;
use axum::Router;
use axum::http::{StatusCode, header};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;

#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Store,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to(BASE_PATH) }))
        .route(
            &format!("/{}", assets::STYLESHEET_PATH),
            get(stylesheet_handler),
        )
        .merge(routes::inventory_router())
        .layer(from_fn(request_tracing::request_tracing_middleware))
        .with_state(state)
}

async fn stylesheet_handler() -> Response {
    match assets::get_asset(assets::STYLESHEET_PATH) {
        Some(data) => (
            [(
                header::CONTENT_TYPE,
                assets::content_type(assets::STYLESHEET_PATH),
            )],
            data.into_owned(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Run a synchronous store call off the async runtime.
pub(crate) async fn blocking<F, R>(f: F) -> Result<R, PlushyError>
where
    F: FnOnce() -> Result<R, PlushyError> + Send + 'static,
    R: Send + 'static,
{
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(f))
        .await
        .map_err(|e| PlushyError::WorkerError(e.to_string()))?
}

impl IntoResponse for PlushyError {
    fn into_response(self) -> Response {
        match self {
            PlushyError::NotFound(message) => {
                tracing::info!(%message, "not found");
                (StatusCode::NOT_FOUND, views::error_page(&message)).into_response()
            }
            other => {
                tracing::error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    views::error_page("Something went wrong."),
                )
                    .into_response()
            }
        }
    }
}
