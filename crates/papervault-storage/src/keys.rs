//! Shared key generation for storage backends.
//!
//! Key format: `papers/{subject-slug}/{uuid}.{ext}`.

use uuid::Uuid;

const KEY_PREFIX: &str = "papers";
const FALLBACK_FOLDER: &str = "misc";

/// Reduce a subject to a path-safe folder name: lowercase ASCII alphanumerics
/// separated by single dashes.
pub fn folder_slug(folder: &str) -> String {
    let mut slug = String::with_capacity(folder.len());
    for c in folder.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        FALLBACK_FOLDER.to_string()
    } else {
        slug
    }
}

/// Generate a fresh storage key under the folder for `folder`.
///
/// The extension is reduced to lowercase alphanumerics; an empty result drops it.
pub fn generate_storage_key(folder: &str, extension: &str) -> String {
    let ext: String = extension
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let id = Uuid::new_v4();
    if ext.is_empty() {
        format!("{}/{}/{}", KEY_PREFIX, folder_slug(folder), id)
    } else {
        format!("{}/{}/{}.{}", KEY_PREFIX, folder_slug(folder), id, ext)
    }
}
