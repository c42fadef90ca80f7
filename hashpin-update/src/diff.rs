//! Unified diff previews of pending rewrites, shown before confirmation.

use std::path::Path;

use similar::TextDiff;

use crate::writer::{apply_changes, LineChange};

/// Unified diff between `text` and `text` with `changes` applied.
pub fn preview_diff(path: &Path, text: &str, changes: &[LineChange]) -> String {
    let updated = apply_changes(text, changes);
    let old_header = format!("a/{}", path.display());
    let new_header = format!("b/{}", path.display());
    TextDiff::from_lines(text, &updated)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(1)
        .to_string()
}
