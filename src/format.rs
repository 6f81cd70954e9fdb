use crate::archive::ArchiveEntry;

const KB: u64 = 1024;
const MB: u64 = 1024 * 1024;

/// Size label shown on cards and archive listings.
pub fn human_size(bytes: u64) -> String {
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    }
}

/// One line of an archive listing: `docs/ (folder)` or `a.txt (10 B)`.
pub fn listing_line(entry: &ArchiveEntry) -> String {
    if entry.is_dir {
        format!("{} (folder)", entry.name)
    } else {
        format!("{} ({})", entry.name, human_size(entry.uncompressed_size))
    }
}
