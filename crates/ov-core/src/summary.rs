//! Truncated summary rendering

use crate::inspect::Inspect;
use tracing::debug;

/// Display budget for a row summary, in characters
pub const SUMMARY_BUDGET: usize = 80;

/// Marker appended to a truncated summary
pub const ELLIPSIS: &str = "...";

/// Cap `text` at `budget` characters, appending [`ELLIPSIS`] when cut.
///
/// Counts `char`s, so a multi-byte character is never split.
pub fn truncate_summary(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + ELLIPSIS.len());
            out.push_str(&text[..cut]);
            out.push_str(ELLIPSIS);
            out
        }
        None => text.to_string(),
    }
}

/// Render `obj` for the summary column. A failed render yields an empty summary.
pub fn summarize(obj: &dyn Inspect, budget: usize) -> String {
    match obj.render() {
        Ok(text) => truncate_summary(&text, budget),
        Err(e) => {
            debug!("Render of {} value failed: {}", obj.type_name(), e);
            String::new()
        }
    }
}
