use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

use crate::archive::{ArchiveReader, ZipReader};
use crate::error::AppError;
use crate::extension::{ResolvedExtension, TypeTables};
use crate::format::human_size;
use crate::naming::disguised_name;
use crate::preview::{self, PreviewContent, PreviewKind};

#[derive(Clone)]
pub struct AppState {
    pub cards: Arc<DashMap<String, Card>>,
    pub blobs: Arc<DashMap<String, StoredBlob>>,
    pub tables: Arc<TypeTables>,
    pub archive: Arc<dyn ArchiveReader>,
    pub release_delay: Duration,
    pub ticket_ttl: Duration,
    next_seq: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(tables: TypeTables, release_delay: Duration, ticket_ttl: Duration) -> Self {
        Self {
            cards: Arc::new(DashMap::new()),
            blobs: Arc::new(DashMap::new()),
            tables: Arc::new(tables),
            archive: Arc::new(ZipReader),
            release_delay,
            ticket_ttl,
            next_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Swap the archive collaborator, e.g. for a reader that always fails.
    pub fn with_archive_reader(mut self, archive: Arc<dyn ArchiveReader>) -> Self {
        self.archive = archive;
        self
    }

    /// Turn one uploaded file into a card and start its preview.
    pub fn add_upload(&self, upload: UploadedFile) -> Card {
        let id = nanoid::nanoid!(12);
        let resolved = self.tables.resolve(&upload.name);
        let mime = self.tables.mime_for(&resolved.real).to_string();
        let kind = PreviewKind::from_mime(&mime);
        let preview = preview::dispatch(
            &id,
            kind,
            &resolved.real,
            upload.bytes.clone(),
            Arc::clone(&self.archive),
        );

        let card = Card {
            id: id.clone(),
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            size: upload.bytes.len() as u64,
            disguised_name: disguised_name(&upload.name, &self.tables),
            suggested_name: upload.name.clone(),
            name: upload.name,
            declared_type: upload.declared_type,
            resolved,
            mime,
            kind,
            bytes: upload.bytes,
            edited_text: None,
            preview,
        };

        info!(
            card_id = %id,
            filename = %card.name,
            size = card.size,
            kind = ?card.kind,
            disguised = card.resolved.disguised,
            "Card created"
        );
        self.cards.insert(id, card.clone());
        card
    }

    /// Snapshot of a card. The map guard is not held past this call.
    pub fn card(&self, id: &str) -> Result<Card, AppError> {
        self.cards
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::CardNotFound(id.to_string()))
    }

    /// Apply `f` to one card in place and return the updated snapshot.
    pub fn update_card<F>(&self, id: &str, f: F) -> Result<Card, AppError>
    where
        F: FnOnce(&mut Card) -> Result<(), AppError>,
    {
        let mut entry = self
            .cards
            .get_mut(id)
            .ok_or_else(|| AppError::CardNotFound(id.to_string()))?;
        f(entry.value_mut())?;
        Ok(entry.value().clone())
    }

    pub fn remove_card(&self, id: &str) -> Result<Card, AppError> {
        self.cards
            .remove(id)
            .map(|(_, card)| card)
            .ok_or_else(|| AppError::CardNotFound(id.to_string()))
    }

    /// All cards, newest first.
    pub fn cards_newest_first(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = self.cards.iter().map(|entry| entry.value().clone()).collect();
        cards.sort_by(|a, b| b.seq.cmp(&a.seq));
        cards
    }
}

/// A file as it arrived from the client.
pub struct UploadedFile {
    pub name: String,
    /// Content type claimed by the client. Recorded, never used for dispatch.
    pub declared_type: String,
    pub bytes: Bytes,
}

#[derive(Clone)]
pub struct Card {
    pub id: String,
    pub seq: u64,
    pub name: String,
    pub size: u64,
    pub declared_type: String,
    pub resolved: ResolvedExtension,
    pub mime: String,
    pub kind: PreviewKind,
    pub bytes: Bytes,
    /// Raw contents of the rename field.
    pub suggested_name: String,
    pub disguised_name: Option<String>,
    pub edited_text: Option<String>,
    pub preview: watch::Receiver<PreviewContent>,
}

impl Card {
    pub fn view(&self) -> CardView {
        CardView {
            id: self.id.clone(),
            name: self.name.clone(),
            size: self.size,
            size_label: human_size(self.size),
            declared_type: self.declared_type.clone(),
            extension: self.resolved.token.clone(),
            real_extension: self.resolved.real.clone(),
            disguised: self.resolved.disguised,
            mime: self.mime.clone(),
            kind: self.kind,
            suggested_name: self.suggested_name.clone(),
            disguised_name: self.disguised_name.clone(),
            edited: self.edited_text.is_some(),
            preview: self.preview.borrow().clone(),
        }
    }

    /// Text to package for a text card's download, newest edit first.
    /// `None` for every other kind.
    pub fn text_payload(&self, edit: Option<String>) -> Option<String> {
        if self.kind != PreviewKind::Text {
            return None;
        }
        if let Some(text) = edit.or_else(|| self.edited_text.clone()) {
            return Some(text);
        }
        match &*self.preview.borrow() {
            PreviewContent::Text { content } => Some(content.clone()),
            _ => Some(preview::decode_text(&self.bytes)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CardView {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub size_label: String,
    pub declared_type: String,
    pub extension: String,
    pub real_extension: String,
    pub disguised: bool,
    pub mime: String,
    pub kind: PreviewKind,
    pub suggested_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disguised_name: Option<String>,
    pub edited: bool,
    pub preview: PreviewContent,
}

/// Packaged download waiting to be fetched.
#[derive(Clone)]
pub struct StoredBlob {
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub bytes: Bytes,
}
