//! Archive-reading collaborator used by the archive preview.

use std::io::Cursor;

use serde::Serialize;
use thiserror::Error;
use zip::ZipArchive;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("not a readable zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// One entry of an archive's central directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    pub name: String,
    pub is_dir: bool,
    pub uncompressed_size: u64,
}

/// Enumerates the entries of an archive held in memory.
///
/// Implementations are called from a blocking task, never on the runtime.
pub trait ArchiveReader: Send + Sync {
    fn list(&self, bytes: &[u8]) -> Result<Vec<ArchiveEntry>, ArchiveError>;
}

/// Reads `application/zip` content with the `zip` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipReader;

impl ArchiveReader for ZipReader {
    fn list(&self, bytes: &[u8]) -> Result<Vec<ArchiveEntry>, ArchiveError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let file = archive.by_index_raw(i)?;
            entries.push(ArchiveEntry {
                name: file.name().to_string(),
                is_dir: file.is_dir(),
                uncompressed_size: file.size(),
            });
        }
        Ok(entries)
    }
}
