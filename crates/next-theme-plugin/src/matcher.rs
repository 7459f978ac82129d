//! Entry/asset matching.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Only CSS emitted for an entry point receives the theme fragments. CSS
//! produced for split chunks is left alone unless the chunk was prepared with
//! a name at compile time, in which case it counts as an entry too.

use std::collections::BTreeSet;

use crate::host::{EntryMap, PreparedChunk};

const CSS_EXTENSION: &str = ".css";

/// Entry names plus the names of all prepared chunks.
pub fn eligible_names<'a>(
    entry: &'a EntryMap,
    prepared_chunks: Option<&'a [PreparedChunk]>,
) -> BTreeSet<&'a str> {
    let mut names: BTreeSet<&str> = entry.keys().map(String::as_str).collect();
    if let Some(chunks) = prepared_chunks {
        names.extend(chunks.iter().filter_map(|c| c.name.as_deref()));
    }
    names
}

/// Whether `file_name` is the CSS output of an entry point or prepared chunk.
///
/// # Example
///
/// ```
/// use next_theme_plugin::{EntryDescription, EntryMap, PreparedChunk, is_eligible};
///
/// let mut entry = EntryMap::new();
/// entry.insert("app".to_string(), EntryDescription::default());
///
/// assert!(is_eligible("app.css", &entry, None));
/// assert!(!is_eligible("app.js", &entry, None));
/// assert!(!is_eligible("chunk1.css", &entry, None));
/// assert!(is_eligible("chunk1.css", &entry, Some(&[PreparedChunk::named("chunk1")][..])));
/// ```
pub fn is_eligible(
    file_name: &str,
    entry: &EntryMap,
    prepared_chunks: Option<&[PreparedChunk]>,
) -> bool {
    let Some(base_name) = file_name.strip_suffix(CSS_EXTENSION) else {
        return false;
    };
    eligible_names(entry, prepared_chunks).contains(base_name)
}
