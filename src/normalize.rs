//! Pattern normalization applied before either engine sees a pattern.
//!
//! Two passes, in order:
//!
//! 1. `\uXXXX` escapes are expanded to the code point they denote. PCRE2
//!    rejects the four-digit form, and the script check below needs to see
//!    the actual characters.
//! 2. `\b` assertions are removed when the pattern targets CJK text. Korean
//!    particles and Japanese okurigana attach directly to the word they
//!    follow, so a boundary assertion next to a Hangul or Han character
//!    rarely matches where the author intended, and these scripts are
//!    delimited by whitespace and punctuation anyway.
//!
//! Script detection is a heuristic over the literal pattern text. A CJK range
//! written in a form not listed in [`CJK_MARKERS`] (for example
//! `[\x{AC00}-\x{D7A3}]` or `\p{Script=Han}`) does not trigger the rewrite.

use std::borrow::Cow;

use log::debug;

/// Code point ranges treated as CJK for word-boundary purposes.
pub const CJK_RANGES: &[(u32, u32)] = &[
    (0x4E00, 0x9FFF), // CJK Unified Ideographs
    (0x3400, 0x4DBF), // CJK Unified Ideographs Extension A
    (0xAC00, 0xD7AF), // Hangul Syllables
    (0x3040, 0x309F), // Hiragana
    (0x30A0, 0x30FF), // Katakana
    (0x1100, 0x11FF), // Hangul Jamo
    (0x3130, 0x318F), // Hangul Compatibility Jamo
];

/// Literal substrings that mark a pattern as CJK-oriented.
pub const CJK_MARKERS: &[&str] = &[
    // Character class ranges
    "가-힣",
    "ㄱ-ㅎ",
    "ㅏ-ㅣ",
    "一-龯",
    "一-龥",
    "ぁ-ん",
    "ァ-ン",
    // Script property escapes
    r"\p{Han}",
    r"\p{Hangul}",
    r"\p{Hiragana}",
    r"\p{Katakana}",
    // Leftover escapes that were not expanded
    r"\u",
];

/// Run both normalization passes.
#[must_use]
pub fn normalize(pattern: &str) -> String {
    let expanded = expand_unicode_escapes(pattern);
    let rewritten = rewrite_word_boundaries(&expanded);
    if rewritten != pattern {
        debug!("normalized pattern {pattern:?} -> {rewritten:?}");
    }
    rewritten.into_owned()
}

/// Replace each `\uXXXX` escape (exactly four hex digits) with its code point.
///
/// Malformed escapes, escaped backslashes (`\\u0041`) and surrogate code
/// points are left as written. Expanded regex metacharacters are escaped so
/// they keep matching literally.
#[must_use]
pub fn expand_unicode_escapes(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains(r"\u") {
        return Cow::Borrowed(pattern);
    }

    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(ch) = decode_escape(tail) {
            if regex::escape(ch.encode_utf8(&mut [0; 4])).len() > ch.len_utf8() {
                out.push('\\');
            }
            out.push(ch);
            rest = &tail[6..];
            continue;
        }
        // Copy the backslash and whatever it escapes verbatim.
        let escaped_len = tail[1..].chars().next().map_or(0, char::len_utf8);
        out.push_str(&tail[..1 + escaped_len]);
        rest = &tail[1 + escaped_len..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Decode `\uXXXX` at the start of `s`.
fn decode_escape(s: &str) -> Option<char> {
    let hex = s.strip_prefix(r"\u")?.get(..4)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let code = u32::from_str_radix(hex, 16).ok()?;
    char::from_u32(code)
}

/// Returns true if the pattern appears to target Han, Hangul or Kana text.
#[must_use]
pub fn has_cjk_signal(pattern: &str) -> bool {
    CJK_MARKERS.iter().any(|marker| pattern.contains(marker))
        || pattern.chars().any(is_cjk_char)
}

fn is_cjk_char(ch: char) -> bool {
    let code = u32::from(ch);
    CJK_RANGES
        .iter()
        .any(|&(start, end)| (start..=end).contains(&code))
}

/// Remove `\b` assertions from patterns that target CJK text.
///
/// ASCII-only patterns are returned unchanged. `\\b` and `[\b]` are not
/// word-boundary assertions and are kept.
#[must_use]
pub fn rewrite_word_boundaries(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains(r"\b") || !has_cjk_signal(pattern) {
        return Cow::Borrowed(pattern);
    }
    let stripped = strip_word_boundaries(pattern);
    if stripped != pattern {
        debug!("removed word boundaries for CJK pattern: {pattern:?} -> {stripped:?}");
    }
    stripped
}

fn strip_word_boundaries(pattern: &str) -> Cow<'_, str> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.char_indices().peekable();
    let mut in_class = false;
    // Position right after an opening `[` or `[^`, where `]` is literal.
    let mut class_start: Option<usize> = None;
    let mut removed = false;

    while let Some((i, ch)) = chars.next() {
        match ch {
            '\\' => {
                let Some((_, next)) = chars.next() else {
                    out.push(ch);
                    break;
                };
                if next == 'b' && !in_class {
                    removed = true;
                } else {
                    out.push(ch);
                    out.push(next);
                }
            }
            '[' if !in_class => {
                in_class = true;
                out.push(ch);
                let mut start = i + 1;
                if let Some(&(_, '^')) = chars.peek() {
                    chars.next();
                    out.push('^');
                    start += 1;
                }
                class_start = Some(start);
                continue;
            }
            ']' if in_class && class_start != Some(i) => {
                in_class = false;
                out.push(ch);
            }
            _ => out.push(ch),
        }
        class_start = None;
    }

    if removed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_hangul_escape() {
        assert_eq!(expand_unicode_escapes(r"\uAC00"), "가");
        assert_eq!(expand_unicode_escapes(r"[\uAC00-\uD7A3]+"), "[가-힣]+");
    }

    #[test]
    fn leaves_malformed_escapes_untouched() {
        assert_eq!(expand_unicode_escapes(r"\u12"), r"\u12");
        assert_eq!(expand_unicode_escapes(r"\u12G4"), r"\u12G4");
        assert_eq!(expand_unicode_escapes(r"a\u"), r"a\u");
    }

    #[test]
    fn leaves_escaped_backslash_untouched() {
        assert_eq!(expand_unicode_escapes(r"\\u0041"), r"\\u0041");
        assert_eq!(expand_unicode_escapes(r"\\A"), r"\\A");
    }

    #[test]
    fn leaves_surrogates_untouched() {
        assert_eq!(expand_unicode_escapes(r"\uD800"), r"\uD800");
    }

    #[test]
    fn escapes_expanded_metacharacters() {
        assert_eq!(expand_unicode_escapes(r"a\u002Eb"), r"a\.b");
        assert_eq!(expand_unicode_escapes(r"\u0041"), "A");
    }

    #[test]
    fn expansion_preserves_multibyte_neighbours() {
        assert_eq!(expand_unicode_escapes(r"한\u0041\d"), r"한A\d");
    }

    #[test]
    fn detects_literal_cjk_characters() {
        assert!(has_cjk_signal("가"));
        assert!(has_cjk_signal("一"));
        assert!(has_cjk_signal("あ"));
        assert!(has_cjk_signal("カ"));
        assert!(has_cjk_signal("ㄱ"));
        assert!(!has_cjk_signal(r"\d+"));
        assert!(!has_cjk_signal("café"));
    }

    #[test]
    fn detects_property_escapes_and_leftover_markers() {
        assert!(has_cjk_signal(r"\p{Hangul}+"));
        assert!(has_cjk_signal(r"\p{Han}"));
        assert!(has_cjk_signal(r"\u12"));
    }

    #[test]
    fn ascii_patterns_keep_word_boundaries() {
        let pattern = r"\b\d{3}-\d{4}\b";
        assert_eq!(normalize(pattern), pattern);
    }

    #[test]
    fn cjk_patterns_lose_word_boundaries() {
        assert_eq!(normalize(r"\b[가-힣]{2,4}\b"), "[가-힣]{2,4}");
        assert_eq!(normalize(r"\b東京\b"), "東京");
    }

    #[test]
    fn escaped_cjk_patterns_lose_word_boundaries() {
        assert_eq!(normalize(r"\b\uD64D\b"), "홍");
    }

    #[test]
    fn other_escapes_survive_boundary_removal() {
        assert_eq!(normalize(r"\b가\B\\b\d"), r"가\B\\b\d");
    }

    #[test]
    fn class_backspace_is_not_a_boundary() {
        assert_eq!(normalize(r"\b가[\b]"), r"가[\b]");
        assert_eq!(normalize(r"\b가[]\b]\b"), r"가[]\b]");
        assert_eq!(normalize(r"[^]\b]가\b"), r"[^]\b]가");
    }

    #[test]
    fn pattern_without_boundary_is_unchanged() {
        assert_eq!(normalize("[가-힣]+"), "[가-힣]+");
    }
}
