//! Disguised-extension lookup tables and the filename resolver.
//!
//! A disguised extension swaps the first letter of a real one for `h`
//! (`photo.hng` is really a PNG). The tables here are read-only after startup
//! and are handed to whoever needs them through `AppState`.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

const BUILTIN_MIME_TABLE: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("ogg", "audio/ogg"),
    ("txt", "text/plain"),
    ("zip", "application/zip"),
];

const BUILTIN_EXTENSION_MAP: &[(&str, &str)] = &[
    ("hng", "png"),
    ("hpg", "jpg"),
    ("hpeg", "jpeg"),
    ("hif", "gif"),
    ("hebp", "webp"),
    ("hp4", "mp4"),
    ("hov", "mov"),
    ("hp3", "mp3"),
    ("hav", "wav"),
    ("hgg", "ogg"),
    ("hxt", "txt"),
    ("hip", "zip"),
];

/// A table entry broke one of the lookup invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("extension key {key:?} must be non-empty, lowercase and contain no '.'")]
    InvalidKey { key: String },

    #[error("duplicate extension key {key:?}")]
    DuplicateKey { key: String },

    #[error("disguised extension {disguised:?} maps to {real:?}, which has no MIME type")]
    UnknownTarget { disguised: String, real: String },

    #[error("real extension {real:?} has more than one disguised form")]
    AmbiguousDisguise { real: String },
}

/// ExtensionMap (disguised -> real) plus MimeTable (real -> MIME type).
#[derive(Debug, Clone)]
pub struct TypeTables {
    extension_map: HashMap<String, String>,
    mime_table: HashMap<String, String>,
    disguises: HashMap<String, String>,
}

/// What the resolver made of a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedExtension {
    /// Lowercased text after the final `.`, empty if there is none.
    pub token: String,
    /// The extension used for MIME lookup.
    pub real: String,
    /// Whether `token` was found in the ExtensionMap.
    pub disguised: bool,
}

impl TypeTables {
    /// Build tables from explicit pairs, checking every invariant.
    pub fn new<'a>(
        extension_map: impl IntoIterator<Item = (&'a str, &'a str)>,
        mime_table: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, TableError> {
        let mut mimes = HashMap::new();
        for (ext, mime) in mime_table {
            check_key(ext)?;
            if mimes.insert(ext.to_string(), mime.to_string()).is_some() {
                return Err(TableError::DuplicateKey { key: ext.to_string() });
            }
        }

        let mut map = HashMap::new();
        let mut disguises = HashMap::new();
        let mut seen_real = HashSet::new();
        for (disguised, real) in extension_map {
            check_key(disguised)?;
            if !mimes.contains_key(real) {
                return Err(TableError::UnknownTarget {
                    disguised: disguised.to_string(),
                    real: real.to_string(),
                });
            }
            if map.insert(disguised.to_string(), real.to_string()).is_some() {
                return Err(TableError::DuplicateKey {
                    key: disguised.to_string(),
                });
            }
            if !seen_real.insert(real) {
                return Err(TableError::AmbiguousDisguise {
                    real: real.to_string(),
                });
            }
            disguises.insert(real.to_string(), disguised.to_string());
        }

        Ok(Self {
            extension_map: map,
            mime_table: mimes,
            disguises,
        })
    }

    /// The tables the service ships with.
    pub fn builtin() -> Self {
        let mime_table = BUILTIN_MIME_TABLE
            .iter()
            .map(|(ext, mime)| (ext.to_string(), mime.to_string()))
            .collect();
        let extension_map: HashMap<String, String> = BUILTIN_EXTENSION_MAP
            .iter()
            .map(|(disguised, real)| (disguised.to_string(), real.to_string()))
            .collect();
        let disguises = extension_map
            .iter()
            .map(|(disguised, real)| (real.clone(), disguised.clone()))
            .collect();
        Self {
            extension_map,
            mime_table,
            disguises,
        }
    }

    /// Resolve the logical extension of `name`. Never fails: a name without
    /// an extension resolves to the empty extension.
    pub fn resolve(&self, name: &str) -> ResolvedExtension {
        let token = extension_token(name);
        match self.extension_map.get(&token) {
            Some(real) => ResolvedExtension {
                real: real.clone(),
                token,
                disguised: true,
            },
            None => ResolvedExtension {
                real: token.clone(),
                token,
                disguised: false,
            },
        }
    }

    /// MIME type for a real extension, or `""` when it is not in the table.
    pub fn mime_for(&self, real: &str) -> &str {
        self.mime_table.get(real).map(String::as_str).unwrap_or("")
    }

    /// Disguised form of a real extension, if one exists.
    pub fn disguise(&self, real: &str) -> Option<&str> {
        self.disguises.get(real).map(String::as_str)
    }
}

impl Default for TypeTables {
    fn default() -> Self {
        Self::builtin()
    }
}

fn check_key(key: &str) -> Result<(), TableError> {
    if key.is_empty() || key.contains('.') || key.chars().any(|c| c.is_uppercase()) {
        return Err(TableError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(())
}

fn extension_token(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}
