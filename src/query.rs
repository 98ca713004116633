//! Ordered query-string pairs with form-urlencoded semantics.
//!
//! Parameter order is load-bearing here: a rewritten URL must keep every
//! parameter in its original position, with the version stamp updated in
//! place. Pairs are therefore kept as an ordered list, never a map.

/// Parses a query string into ordered `(name, value)` pairs.
///
/// A leading `?` is tolerated and empty `&`-separated chunks are skipped.
/// Returns `None` when any component carries malformed percent-encoding;
/// callers treat such URLs as opaque and leave them alone.
pub fn parse_pairs(query: &str) -> Option<Vec<(String, String)>> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut pairs = Vec::new();
    for part in query.split('&') {
        if part.is_empty() {
            continue;
        }
        let (raw_name, raw_value) = match part.split_once('=') {
            Some((name, value)) => (name, value),
            None => (part, ""),
        };
        pairs.push((decode_component(raw_name)?, decode_component(raw_value)?));
    }
    Some(pairs)
}

/// Serializes pairs back to a query string in form-urlencoded shape:
/// spaces become `+` and bytes outside `[A-Za-z0-9*\-._]` are
/// percent-encoded with uppercase hex digits.
pub fn serialize_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| format!("{}={}", encode_component(name), encode_component(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// First value recorded for `name`, if any.
pub fn get_pair<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, value)| value.as_str())
}

/// Sets `name` to `value`: the first occurrence is updated in place, later
/// occurrences are removed, and the pair is appended when absent.
pub fn set_pair(pairs: &mut Vec<(String, String)>, name: &str, value: &str) {
    let mut seen = false;
    let mut i = 0;
    while i < pairs.len() {
        if pairs[i].0 == name {
            if seen {
                pairs.remove(i);
                continue;
            }
            pairs[i].1 = value.to_string();
            seen = true;
        }
        i += 1;
    }
    if !seen {
        pairs.push((name.to_string(), value.to_string()));
    }
}

fn encode_component(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    for &b in src.as_bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'*' | b'-' | b'.' | b'_') {
            out.push(b as char);
        } else if b == b' ' {
            out.push('+');
        } else {
            out.push('%');
            out.push(hex_upper(b >> 4));
            out.push(hex_upper(b & 0x0f));
        }
    }
    out
}

fn decode_component(src: &str) -> Option<String> {
    let bytes = src.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                if i + 2 >= bytes.len() {
                    return None;
                }
                let hi = (bytes[i + 1] as char).to_digit(16)?;
                let lo = (bytes[i + 2] as char).to_digit(16)?;
                out.push((hi * 16 + lo) as u8);
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

fn hex_upper(nibble: u8) -> char {
    match nibble {
        0..=9 => (b'0' + nibble) as char,
        _ => (b'A' + nibble - 10) as char,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_ordered_pairs() {
        let pairs = parse_pairs("x=1&v=1700000000&y=2").unwrap();
        assert_eq!(pairs, owned(&[("x", "1"), ("v", "1700000000"), ("y", "2")]));
    }

    #[test]
    fn tolerates_leading_question_mark_and_empty_chunks() {
        let pairs = parse_pairs("?a=1&&b=2").unwrap();
        assert_eq!(pairs, owned(&[("a", "1"), ("b", "2")]));
    }

    #[test]
    fn bare_name_gets_empty_value() {
        let pairs = parse_pairs("v").unwrap();
        assert_eq!(pairs, owned(&[("v", "")]));
    }

    #[test]
    fn decodes_percent_and_plus() {
        let pairs = parse_pairs("q=a%20b+c&t=%2Fpath").unwrap();
        assert_eq!(pairs, owned(&[("q", "a b c"), ("t", "/path")]));
    }

    #[test]
    fn malformed_percent_encoding_is_rejected() {
        assert!(parse_pairs("v=%zz").is_none());
        assert!(parse_pairs("v=%2").is_none());
    }

    #[test]
    fn serializes_in_order_with_form_encoding() {
        let pairs = owned(&[("q", "a b/c"), ("v", "123")]);
        assert_eq!(serialize_pairs(&pairs), "q=a+b%2Fc&v=123");
    }

    #[test]
    fn unreserved_bytes_pass_through() {
        let pairs = owned(&[("k", "A9*-._z")]);
        assert_eq!(serialize_pairs(&pairs), "k=A9*-._z");
    }

    #[test]
    fn set_updates_first_occurrence_in_place() {
        let mut pairs = owned(&[("x", "1"), ("v", "old"), ("y", "2")]);
        set_pair(&mut pairs, "v", "new");
        assert_eq!(pairs, owned(&[("x", "1"), ("v", "new"), ("y", "2")]));
    }

    #[test]
    fn set_collapses_duplicate_names() {
        let mut pairs = owned(&[("v", "1"), ("x", "0"), ("v", "2")]);
        set_pair(&mut pairs, "v", "9");
        assert_eq!(pairs, owned(&[("v", "9"), ("x", "0")]));
    }

    #[test]
    fn set_appends_when_absent() {
        let mut pairs = owned(&[("x", "1")]);
        set_pair(&mut pairs, "v", "7");
        assert_eq!(pairs, owned(&[("x", "1"), ("v", "7")]));
    }

    #[test]
    fn get_returns_first_value() {
        let pairs = owned(&[("v", "1"), ("v", "2")]);
        assert_eq!(get_pair(&pairs, "v"), Some("1"));
        assert_eq!(get_pair(&pairs, "w"), None);
    }
}
