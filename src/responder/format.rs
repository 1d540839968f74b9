//! Display formatting for model answers
use regex::Regex;
use std::sync::OnceLock;

/// `‹digits›. ‹label›:` where the label holds no colon, newline or `*`
const LIST_MARKER: &str = r"\d+\.[ \t]+([^:\n*]+?):";

fn list_marker() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(LIST_MARKER).expect("list marker pattern is valid"))
}

/// Turn numbered list entries into emphasized paragraph headings
///
/// `"1. Vitamin C: 90mg"` becomes `"\n\n**Vitamin C**: 90mg"`. Applying it
/// twice gives the same text as applying it once.
pub fn emphasize_list_markers(text: &str) -> String {
    list_marker()
        .replace_all(text, "\n\n**${1}**:")
        .into_owned()
}
