use std::sync::LazyLock;

use regex::Regex;

/// Thousands-grouped with a space or NBSP, e.g. "12 345".
pub const GROUPED_INT: &str = r"[0-9]{1,3}(?:[ \x{00A0}][0-9]{3})+";
/// Three or more bare digits.
pub const PLAIN_INT: &str = r"[0-9]{3,}";

// Grouped comes first in the alternation so it wins on overlap.
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?:{GROUPED_INT})|(?:{PLAIN_INT})")).unwrap());

const CONTEXT_CHARS: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    KeywordAdjacent,
    SlashTotal,
    PhraseExact,
    Bare,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericCandidate {
    pub value: u64,
    /// The matched substring, separators included.
    pub raw: String,
    /// Text immediately before the match, at most `CONTEXT_CHARS` chars.
    pub before: String,
    /// Text immediately after the match, at most `CONTEXT_CHARS` chars.
    pub after: String,
    pub kind: MatchKind,
}

/// Scan `text` left to right for integer-like substrings.
///
/// Duplicates are kept; every match starts out as `MatchKind::Bare` and is
/// classified later against a source's keywords.
pub fn tokenize(text: &str) -> Vec<NumericCandidate> {
    NUMBER_RE
        .find_iter(text)
        .filter_map(|m| {
            let value = clean_to_int(m.as_str())?;
            Some(NumericCandidate {
                value,
                raw: m.as_str().to_string(),
                before: tail_chars(&text[..m.start()], CONTEXT_CHARS).to_string(),
                after: text[m.end()..].chars().take(CONTEXT_CHARS).collect(),
                kind: MatchKind::Bare,
            })
        })
        .collect()
}

/// Strip everything but ASCII digits and parse. Empty or overflowing input is `None`.
pub fn clean_to_int(s: &str) -> Option<u64> {
    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// A bare four-digit 19xx/20xx run, i.e. a copyright or date year.
pub fn looks_like_year(raw: &str) -> bool {
    static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:19|20)[0-9]{2}$").unwrap());
    RE.is_match(raw)
}

/// Last `n` chars of `s`, walking back from the end only as far as needed.
fn tail_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match s.char_indices().rev().nth(n - 1) {
        Some((i, _)) => &s[i..],
        None => s,
    }
}
