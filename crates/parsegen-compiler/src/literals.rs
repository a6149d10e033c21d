//! Decoding of quoted literals and `[...]` character sets.
//!
//! Escapes follow the grammar surface syntax: `\n \r \t \f \b \\ \' \]`,
//! `\uXXXX`, and `\u{XXXXXX}`. Decoders return `None` on malformed input;
//! callers turn that into a diagnostic.

use parsegen_core::{Interval, IntervalSet};

/// Strip the surrounding quotes of a string literal token.
pub fn unquote(text: &str) -> &str {
    text.strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(text)
}

/// Decode the escaped body of a string literal (quotes included).
pub fn unescape_string(text: &str) -> Option<String> {
    let mut out = String::new();
    let mut chars = unquote(text).chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        out.push(unescape_one(&mut chars)?);
    }
    Some(out)
}

fn unescape_one(chars: &mut std::str::Chars<'_>) -> Option<char> {
    let c = chars.next()?;
    Some(match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'f' => '\u{000C}',
        'b' => '\u{0008}',
        'u' => return unescape_unicode(chars),
        // Any other escaped character stands for itself: \' \\ \] \- ...
        other => other,
    })
}

fn unescape_unicode(chars: &mut std::str::Chars<'_>) -> Option<char> {
    let mut value = 0u32;
    let first = chars.next()?;
    if first == '{' {
        let mut any = false;
        for c in chars.by_ref() {
            if c == '}' {
                return if any { char::from_u32(value) } else { None };
            }
            value = value.checked_mul(16)?.checked_add(c.to_digit(16)?)?;
            any = true;
        }
        None
    } else {
        value = first.to_digit(16)?;
        for _ in 0..3 {
            value = value * 16 + chars.next()?.to_digit(16)?;
        }
        char::from_u32(value)
    }
}

/// Result of decoding a `[...]` character set.
pub struct DecodedCharSet {
    pub set: IntervalSet,
    /// Sub-ranges that appeared more than once while building the set.
    pub collisions: Vec<Interval>,
    /// Explicit `a-b` ranges as written, for range-sanity diagnostics.
    pub ranges: Vec<(char, char)>,
}

/// Decode a bracketed character set like `[a-z0-9\n]`.
///
/// Returns `None` on malformed escapes or reversed ranges.
pub fn decode_charset(text: &str) -> Option<DecodedCharSet> {
    let body = text
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .unwrap_or(text);

    // First pass: unescape into (char, was_escaped) items so an escaped
    // dash never reads as a range operator.
    let mut items: Vec<(char, bool)> = Vec::new();
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            items.push((unescape_one(&mut chars)?, true));
        } else {
            items.push((c, false));
        }
    }

    // Second pass: fold `a-b` triples into ranges.
    let mut set = IntervalSet::new();
    let mut collisions = Vec::new();
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < items.len() {
        let is_range = i + 2 < items.len() && items[i + 1] == ('-', false);
        if is_range {
            let (lo, _) = items[i];
            let (hi, _) = items[i + 2];
            if (hi as u32) < (lo as u32) {
                return None;
            }
            collisions.extend(set.add_range(lo as i32, hi as i32));
            ranges.push((lo, hi));
            i += 3;
        } else {
            let (c, _) = items[i];
            collisions.extend(set.add_range(c as i32, c as i32));
            i += 1;
        }
    }

    Some(DecodedCharSet {
        set,
        collisions,
        ranges,
    })
}

/// Single code point of a one-character literal, if it is one.
pub fn literal_char(text: &str) -> Option<char> {
    let s = unescape_string(text)?;
    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

#[cfg(test)]
mod literals_tests {
    use super::*;

    #[test]
    fn unescape_plain_and_escaped() {
        assert_eq!(unescape_string("'ab'").as_deref(), Some("ab"));
        assert_eq!(unescape_string(r"'a\nb'").as_deref(), Some("a\nb"));
        assert_eq!(unescape_string(r"'\''").as_deref(), Some("'"));
        assert_eq!(unescape_string(r"'\\'").as_deref(), Some("\\"));
        assert_eq!(unescape_string(r"'A'").as_deref(), Some("A"));
        assert_eq!(unescape_string(r"'\u{1F600}'").as_deref(), Some("\u{1F600}"));
        assert_eq!(unescape_string(r"'\u00'"), None);
    }

    #[test]
    fn literal_char_detects_single_code_points() {
        assert_eq!(literal_char("'a'"), Some('a'));
        assert_eq!(literal_char(r"'\n'"), Some('\n'));
        assert_eq!(literal_char("'ab'"), None);
        assert_eq!(literal_char("''"), None);
    }

    #[test]
    fn charset_ranges_and_singles() {
        let d = decode_charset("[a-z0-9_]").unwrap();
        assert!(d.set.contains('a' as i32));
        assert!(d.set.contains('z' as i32));
        assert!(d.set.contains('5' as i32));
        assert!(d.set.contains('_' as i32));
        assert!(!d.set.contains('A' as i32));
        assert!(d.collisions.is_empty());
    }

    #[test]
    fn charset_escapes() {
        let d = decode_charset(r"[\t\r\n\]]").unwrap();
        assert!(d.set.contains('\t' as i32));
        assert!(d.set.contains('\n' as i32));
        assert!(d.set.contains(']' as i32));
    }

    #[test]
    fn charset_collisions_are_reported() {
        let d = decode_charset("[a-zb]").unwrap();
        assert_eq!(d.collisions.len(), 1);
        assert_eq!(d.collisions[0], Interval::new('b' as i32, 'b' as i32));
    }

    #[test]
    fn reversed_range_is_malformed() {
        assert!(decode_charset("[z-a]").is_none());
    }

    #[test]
    fn literal_dash_positions() {
        // Leading dash is literal.
        let d = decode_charset("[-a]").unwrap();
        assert!(d.set.contains('-' as i32));
        assert!(d.set.contains('a' as i32));
        // Trailing dash is literal too.
        let d = decode_charset("[a-]").unwrap();
        assert!(d.set.contains('-' as i32));
        assert!(d.set.contains('a' as i32));
    }
}
