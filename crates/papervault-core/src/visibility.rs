//! Vote-driven visibility.
//!
//! Visibility is derived on every read and never stored. Admin views bypass it.

use crate::models::PaperResponse;

/// A file with this many downvotes or more is hidden from readers.
pub const DOWNVOTE_THRESHOLD: u64 = 3;

pub fn is_visible(downvotes: u64) -> bool {
    downvotes < DOWNVOTE_THRESHOLD
}

/// Drop hidden files from `paper`; `None` when nothing visible remains.
///
/// Remaining files keep their stored `index`. Idempotent: filtering an already
/// filtered paper returns it unchanged.
pub fn filter_visible(mut paper: PaperResponse) -> Option<PaperResponse> {
    paper.files.retain(|file| is_visible(file.downvotes));
    if paper.files.is_empty() {
        None
    } else {
        Some(paper)
    }
}
