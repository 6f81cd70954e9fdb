//! Download tickets.
//!
//! Preparing a download packages the bytes under their final filename and
//! parks them in `AppState::blobs` under a random ticket. Fetching the ticket
//! streams the bytes back and schedules the ticket's release on a background
//! task, so the response never waits on cleanup.

use std::io::Cursor;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::AppError;
use crate::naming::content_disposition;
use crate::state::{AppState, StoredBlob};

#[derive(Debug, Serialize)]
pub struct DownloadTicket {
    pub url: String,
    pub filename: String,
    pub size: u64,
}

/// Park `blob` and return where to fetch it. Unfetched tickets expire after
/// `AppState::ticket_ttl`.
pub fn issue(state: &AppState, blob: StoredBlob) -> DownloadTicket {
    let id = nanoid::nanoid!(12);
    let ticket = DownloadTicket {
        url: format!("/d/{id}"),
        filename: blob.filename.clone(),
        size: blob.size,
    };
    state.blobs.insert(id.clone(), blob);
    schedule_release(state, id, state.ticket_ttl);
    ticket
}

pub async fn download_blob(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let blob = match state.blobs.get(&id) {
        Some(entry) => entry.value().clone(),
        None => return Err(AppError::TicketNotFound),
    };

    schedule_release(&state, id.clone(), state.release_delay);
    info!(ticket = %id, filename = %blob.filename, size = blob.size, "Download served");

    let stream = tokio_util::io::ReaderStream::new(Cursor::new(blob.bytes));
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, blob.content_type),
            (header::CONTENT_DISPOSITION, content_disposition(&blob.filename)),
            (header::CONTENT_LENGTH, blob.size.to_string()),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

fn schedule_release(state: &AppState, id: String, after: Duration) {
    let blobs = state.blobs.clone();
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        if blobs.remove(&id).is_some() {
            debug!(ticket = %id, "Download released");
        }
    });
}
