use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, info};

use crate::download::{self, DownloadTicket};
use crate::error::AppError;
use crate::naming::{effective_filename, is_header_safe};
use crate::preview::{PreviewKind, wait_settled};
use crate::state::{AppState, CardView, StoredBlob, UploadedFile};

pub async fn health() -> &'static str {
    "ok"
}

/// Accept a batch of files. Parts are handled in request order; parts that
/// carry no filename, or an empty one, are skipped.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Vec<CardView>>, AppError> {
    let mut cards = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
        else {
            debug!(field = ?field.name(), "Skipping form field without a file");
            continue;
        };
        let declared_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        let card = state.add_upload(UploadedFile {
            name,
            declared_type,
            bytes,
        });
        cards.push(card.view());
    }
    info!(count = cards.len(), "Upload batch processed");
    Ok(Json(cards))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub disguised: Option<bool>,
}

pub async fn list_cards(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<CardView>> {
    let cards = state
        .cards_newest_first()
        .into_iter()
        .filter(|card| {
            query
                .disguised
                .is_none_or(|wanted| card.resolved.disguised == wanted)
        })
        .map(|card| card.view())
        .collect();
    Json(cards)
}

#[derive(Debug, Default, Deserialize)]
pub struct CardQuery {
    #[serde(default)]
    pub wait: bool,
}

pub async fn get_card(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<CardQuery>,
) -> Result<Json<CardView>, AppError> {
    if query.wait {
        let preview = state.card(&id)?.preview;
        wait_settled(preview).await;
    }
    Ok(Json(state.card(&id)?.view()))
}

pub async fn delete_card(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let card = state.remove_card(&id)?;
    info!(card_id = %id, filename = %card.name, "Card released");
    Ok(StatusCode::NO_CONTENT)
}

/// The card's bytes, inline, typed by the resolved MIME type.
pub async fn raw_card(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let card = state.card(&id)?;
    let content_type = if card.mime.is_empty() {
        mime_guess::from_path(&card.name)
            .first_or_octet_stream()
            .to_string()
    } else {
        card.mime.clone()
    };
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_LENGTH, card.size.to_string()),
        ],
        Body::from(card.bytes),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

pub async fn rename_card(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<RenameRequest>,
) -> Result<Json<CardView>, AppError> {
    let card = state.update_card(&id, |card| {
        card.suggested_name = request.name;
        Ok(())
    })?;
    Ok(Json(card.view()))
}

#[derive(Debug, Deserialize)]
pub struct EditTextRequest {
    pub content: String,
}

pub async fn edit_text(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<EditTextRequest>,
) -> Result<Json<CardView>, AppError> {
    let card = state.update_card(&id, |card| {
        if card.kind != PreviewKind::Text {
            return Err(AppError::NotTextCard(card.id.clone()));
        }
        card.edited_text = Some(request.content);
        Ok(())
    })?;
    Ok(Json(card.view()))
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadRequest {
    /// Current rename field contents; the stored field is used when absent.
    pub name: Option<String>,
    /// Current text area contents for text cards.
    pub text: Option<String>,
}

/// Package a card for download under its current name. A POST without a
/// JSON body downloads under the stored rename field.
pub async fn prepare_download(
    Path(id): Path<String>,
    State(state): State<AppState>,
    request: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Json<DownloadTicket>, AppError> {
    let request = match request {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => DownloadRequest::default(),
        Err(rejection) => return Err(rejection.into()),
    };

    let card = match request.name {
        Some(name) => state.update_card(&id, |card| {
            card.suggested_name = name;
            Ok(())
        })?,
        None => state.card(&id)?,
    };

    let filename = effective_filename(&card.suggested_name, &card.name).to_string();
    if !is_header_safe(&filename) {
        return Err(AppError::InvalidFilename(filename));
    }
    let (content_type, bytes) = match card.text_payload(request.text) {
        Some(text) => (
            "text/plain; charset=utf-8".to_string(),
            Bytes::from(text.into_bytes()),
        ),
        None if card.mime.is_empty() => (
            mime_guess::from_path(&filename)
                .first_or_octet_stream()
                .to_string(),
            card.bytes.clone(),
        ),
        None => (card.mime.clone(), card.bytes.clone()),
    };

    let ticket = download::issue(
        &state,
        StoredBlob {
            size: bytes.len() as u64,
            filename,
            content_type,
            bytes,
        },
    );
    info!(card_id = %id, filename = %ticket.filename, "Download prepared");
    Ok(Json(ticket))
}
