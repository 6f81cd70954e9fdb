//! Preview dispatch.
//!
//! Each card gets exactly one [`PreviewKind`], chosen from its MIME type. Media
//! and unsupported previews are ready immediately. Text and archive previews
//! start as [`PreviewContent::Loading`] and are filled in by a background task
//! that holds the only sender for that card's preview channel, so a late
//! completion can only ever touch the card it was started for.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::archive::{ArchiveEntry, ArchiveReader};
use crate::format::listing_line;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewKind {
    Image,
    Video,
    Audio,
    Text,
    Archive,
    Unsupported,
}

impl PreviewKind {
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            Self::Image
        } else if mime.starts_with("video/") {
            Self::Video
        } else if mime.starts_with("audio/") {
            Self::Audio
        } else if mime == "text/plain" {
            Self::Text
        } else if mime == "application/zip" {
            Self::Archive
        } else {
            Self::Unsupported
        }
    }
}

/// What a card's preview area currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PreviewContent {
    /// Inline image, video or audio served from `src`.
    Media { src: String },
    Loading,
    /// Editable text area contents.
    Text { content: String },
    Listing {
        lines: Vec<String>,
        entries: Vec<ArchiveEntry>,
    },
    ListingError { message: String },
    Placeholder { message: String },
}

impl PreviewContent {
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Loading)
    }

    pub fn unsupported(real_extension: &str) -> Self {
        let message = if real_extension.is_empty() {
            "Preview not supported (no extension)".to_string()
        } else {
            format!("Preview not supported (.{real_extension})")
        };
        Self::Placeholder { message }
    }
}

/// Start the preview for one card.
///
/// Must be called from within a tokio runtime: text and archive previews are
/// populated on a spawned task.
pub fn dispatch(
    card_id: &str,
    kind: PreviewKind,
    real_extension: &str,
    bytes: Bytes,
    archive: Arc<dyn ArchiveReader>,
) -> watch::Receiver<PreviewContent> {
    let ready = match kind {
        PreviewKind::Image | PreviewKind::Video | PreviewKind::Audio => PreviewContent::Media {
            src: format!("/cards/{card_id}/raw"),
        },
        PreviewKind::Unsupported => PreviewContent::unsupported(real_extension),
        PreviewKind::Text | PreviewKind::Archive => {
            return spawn_population(card_id.to_string(), kind, bytes, archive);
        }
    };
    let (_tx, rx) = watch::channel(ready);
    rx
}

/// Wait until the preview has settled and return it.
pub async fn wait_settled(mut rx: watch::Receiver<PreviewContent>) -> PreviewContent {
    let settled = rx
        .wait_for(PreviewContent::is_settled)
        .await
        .map(|content| content.clone());
    settled.unwrap_or_else(|_| rx.borrow().clone())
}

fn spawn_population(
    card_id: String,
    kind: PreviewKind,
    bytes: Bytes,
    archive: Arc<dyn ArchiveReader>,
) -> watch::Receiver<PreviewContent> {
    let (tx, rx) = watch::channel(PreviewContent::Loading);

    tokio::spawn(async move {
        let work = tokio::task::spawn_blocking(move || match kind {
            PreviewKind::Text => PreviewContent::Text {
                content: decode_text(&bytes),
            },
            _ => list_archive(archive.as_ref(), &bytes),
        });

        let content = match work.await {
            Ok(content) => content,
            Err(err) => {
                warn!(card_id = %card_id, "preview task failed: {err}");
                match kind {
                    PreviewKind::Archive => PreviewContent::ListingError {
                        message: "Could not read archive".to_string(),
                    },
                    _ => PreviewContent::Placeholder {
                        message: "Preview failed".to_string(),
                    },
                }
            }
        };

        if tx.send(content).is_err() {
            debug!(card_id = %card_id, "card released before its preview settled");
        }
    });

    rx
}

/// UTF-8 with replacement characters and without a leading byte-order mark.
pub fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.strip_prefix('\u{FEFF}') {
        Some(rest) => rest.to_string(),
        None => text.into_owned(),
    }
}

fn list_archive(archive: &dyn ArchiveReader, bytes: &[u8]) -> PreviewContent {
    match archive.list(bytes) {
        Ok(entries) => PreviewContent::Listing {
            lines: entries.iter().map(listing_line).collect(),
            entries,
        },
        Err(err) => PreviewContent::ListingError {
            message: format!("Could not read archive: {err}"),
        },
    }
}
