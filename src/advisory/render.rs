//! Display formatting for a reply: line wrapping and label highlighting.

use crate::advisory::reply::AdvisoryReply;
use regex::{Captures, Regex};
use std::sync::LazyLock;

pub const HIGHLIGHT_OPEN: &str = "<span class='highlight'>";
pub const HIGHLIGHT_CLOSE: &str = "</span>";

// Label words may be split across a wrapped line, hence `\s` instead of a space.
static LABEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Problem\sSummary|Suggested\sFixer|Why").expect("label pattern is valid")
});

/// Fill text to `width` columns, breaking only at whitespace.
///
/// The whole text is one paragraph: newlines count as ordinary whitespace, and words are
/// refilled greedily with single spaces between them. A word longer than `width` sits
/// alone on its own line and is never split.
pub fn wrap(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0;

    for word in text.split_whitespace() {
        let len = word.chars().count();
        if column == 0 {
            out.push_str(word);
            column = len;
        } else if column + 1 + len <= width {
            out.push(' ');
            out.push_str(word);
            column += 1 + len;
        } else {
            out.push('\n');
            out.push_str(word);
            column = len;
        }
    }

    out
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap every literal, case-sensitive occurrence of the three labels in the emphasis marker.
///
/// Matching is unanchored, so a label inside ordinary prose or another word ("Whyte")
/// is highlighted as well.
pub fn highlight(text: &str) -> String {
    LABEL_PATTERN
        .replace_all(text, |caps: &Captures| {
            format!("{}{}{}", HIGHLIGHT_OPEN, &caps[0], HIGHLIGHT_CLOSE)
        })
        .into_owned()
}

/// Produce the HTML fragment shown in the response box.
pub fn render(reply: &AdvisoryReply, width: usize) -> String {
    highlight(&escape_html(&wrap(reply.raw_text(), width)))
}
