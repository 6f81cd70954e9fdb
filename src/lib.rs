//! Preview, rename and re-download files whose extensions may be disguised
//! (`photo.hng` is a PNG).

pub mod archive;
pub mod config;
pub mod download;
pub mod error;
pub mod extension;
pub mod format;
pub mod naming;
pub mod preview;
pub mod routes;
pub mod state;

use axum::{
    Router,
    routing::{get, patch, post, put},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// All routes, without body limits or CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::health))
        .route("/health", get(routes::health))
        .route("/upload", post(routes::upload))
        .route("/cards", get(routes::list_cards))
        .route("/cards/{id}", get(routes::get_card).delete(routes::delete_card))
        .route("/cards/{id}/raw", get(routes::raw_card))
        .route("/cards/{id}/name", patch(routes::rename_card))
        .route("/cards/{id}/text", put(routes::edit_text))
        .route("/cards/{id}/download", post(routes::prepare_download))
        .route("/d/{id}", get(download::download_blob))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
