// Listing adapter: provider payloads to display entries

use serde::Serialize;

use crate::models::{BucketSummary, ObjectListing};
use crate::preview::{detect_kind, FileKind};
use crate::storage::DELIMITER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Container,
    Folder,
    File,
}

/// One row of a listing: a container at the root, otherwise a folder or a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    /// Full object key (or prefix, for folders). Containers use their name.
    pub key: String,
    pub kind: EntryKind,
    pub size: Option<u64>,
    pub last_modified: Option<String>,
    pub container: Option<String>,
}

impl Entry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn file_kind(&self) -> Option<FileKind> {
        self.is_file().then(|| detect_kind(&self.name))
    }
}

pub fn containers_to_entries(buckets: &[BucketSummary]) -> Vec<Entry> {
    buckets
        .iter()
        .map(|bucket| Entry {
            name: bucket.name.clone(),
            key: bucket.name.clone(),
            kind: EntryKind::Container,
            size: None,
            last_modified: bucket.creation_date.clone(),
            container: Some(bucket.name.clone()),
        })
        .collect()
}

/// Folders first, then files, each group in provider order.
///
/// Every object becomes a file entry, including a directory marker whose key
/// is the queried prefix itself. A key with an empty last segment keeps the
/// full key as its name.
pub fn normalize_listing(container: &str, prefix: &str, listing: &ObjectListing) -> Vec<Entry> {
    let folders = listing.common_prefixes.iter().filter_map(|common| {
        let relative = common
            .prefix
            .strip_prefix(prefix)
            .unwrap_or(&common.prefix)
            .trim_end_matches(DELIMITER);
        if relative.is_empty() {
            return None;
        }
        Some(Entry {
            name: relative.to_string(),
            key: common.prefix.clone(),
            kind: EntryKind::Folder,
            size: None,
            last_modified: None,
            container: Some(container.to_string()),
        })
    });

    let files = listing
        .contents
        .iter()
        .map(|object| Entry {
            name: object
                .key
                .rsplit(DELIMITER)
                .next()
                .filter(|segment| !segment.is_empty())
                .unwrap_or(&object.key)
                .to_string(),
            key: object.key.clone(),
            kind: EntryKind::File,
            size: Some(object.size),
            last_modified: object.last_modified.clone(),
            container: Some(container.to_string()),
        });

    folders.chain(files).collect()
}
