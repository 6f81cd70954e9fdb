//! Filename rules for renaming and downloads.

use crate::extension::TypeTables;

/// Name a download is offered under: the edited field, trimmed, or the
/// original name when the field was cleared.
pub fn effective_filename<'a>(field: &'a str, original: &'a str) -> &'a str {
    let trimmed = field.trim();
    if trimmed.is_empty() { original } else { trimmed }
}

/// Whether `name` can be carried in a `Content-Disposition` header.
pub fn is_header_safe(name: &str) -> bool {
    !name.chars().any(char::is_control)
}

/// `photo.png` -> `photo.hng` when the extension has a disguised form.
///
/// Names that are already disguised, have no extension, or whose extension has
/// no entry in the ExtensionMap yield `None`.
pub fn disguised_name(name: &str, tables: &TypeTables) -> Option<String> {
    let (base, ext) = name.rsplit_once('.')?;
    let disguise = tables.disguise(&ext.to_lowercase())?;
    Some(format!("{base}.{disguise}"))
}

/// `Content-Disposition` value offering `filename` as an attachment.
pub fn content_disposition(filename: &str) -> String {
    format!("attachment; filename=\"{}\"", filename.replace('"', "\\\""))
}
