use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static ESCAPE_SEQUENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").expect("escape pattern is valid"));

/// Remove ANSI/VT100 control sequences (colors, cursor movement) from shell
/// output, leaving every other character in place.
pub fn strip_escape_sequences(text: &str) -> Cow<'_, str> {
    ESCAPE_SEQUENCE.replace_all(text, "")
}
