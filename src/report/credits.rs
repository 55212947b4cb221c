use regex::Regex;
use std::sync::LazyLock;

// Credit separators as they appear in chart exports: "&", ",",
// " feat" / " feat.", and "and" with whitespace on both sides.
static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[&,]| feat\.?| and ").unwrap());

/// Split a combined artist credit into individual names.
/// Names come back trimmed, in source order; an empty credit yields none.
pub fn split_credit(credit: &str) -> Vec<String> {
    if credit.trim().is_empty() {
        return Vec::new();
    }
    SEPARATOR_RE
        .split(credit)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
