// src/extract/table.rs

use tracing::debug;

use super::{MarkupNode, MarkupParser};
use crate::crawl::SkipReason;

/// Lines containing any of these are report furniture, not holdings.
pub const NOISE_MARKERS: [&str; 4] = [
    "S REPORT SUMMARY",
    "FORM 13F INFORMATION TABLE",
    "SHARES/ SH/ PUT/ INVSTMT",
    "Total   ( ",
];

pub fn is_noise(line: &str) -> bool {
    NOISE_MARKERS.iter().any(|m| line.contains(m))
}

/// Concatenate the text of every `table` element (any case, nested ones
/// included) and drop noise lines. `None` if the tree has no table at all.
pub fn extract_tables(root: &MarkupNode) -> Option<String> {
    let mut found = 0usize;
    let mut lines: Vec<String> = Vec::new();
    for table in root
        .descendants()
        .filter(|n| n.tag.eq_ignore_ascii_case("table"))
    {
        found += 1;
        let text = table.text();
        lines.extend(text.split('\n').filter(|l| !is_noise(l)).map(str::to_string));
    }
    debug!(tables = found, lines = lines.len(), "extracted table text");
    (found > 0).then(|| lines.join("\n"))
}

/// Parse `raw` with `parser` and pull out its table text.
pub fn extract_from_raw<P: MarkupParser + ?Sized>(
    parser: &P,
    raw: &[u8],
) -> Result<String, SkipReason> {
    let root = parser.parse(raw).ok_or(SkipReason::Unparseable)?;
    extract_tables(&root).ok_or(SkipReason::NoTable)
}
