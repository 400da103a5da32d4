//! Encoding and decoding of the `Search.setIndex(...)` payload.
//!
//! The generator emits the index with sorted keys, `", "` / `": "` separators and
//! ASCII-only string escapes. [`encode`] reproduces that byte for byte, so reading
//! and rewriting a generated file leaves it unchanged.

use crate::error::{IndexError, Result};
use crate::index::types::SearchIndex;
use memchr::{memchr, memrchr};
use serde::Serialize;
use serde_json::ser::Formatter;
use std::io;

/// Function the search page defines to receive the index
pub const LOADER_FUNCTION: &str = "Search.setIndex";

/// Encode an index as the contents of `searchindex.js`
pub fn encode(index: &SearchIndex) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(4096);
    out.extend_from_slice(LOADER_FUNCTION.as_bytes());
    out.push(b'(');

    let mut ser = serde_json::Serializer::with_formatter(&mut out, SortedAsciiFormatter);
    index.serialize(&mut ser)?;

    out.push(b')');
    Ok(out)
}

/// Decode the contents of `searchindex.js`
pub fn decode(text: &str) -> Result<SearchIndex> {
    let payload = extract_payload(text)?;
    Ok(serde_json::from_str(payload)?)
}

/// Locate the JSON object inside `Search.setIndex(...)`.
///
/// Surrounding whitespace and one trailing `;` are tolerated.
pub fn extract_payload(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
    let bytes = trimmed.as_bytes();

    let open = memchr(b'(', bytes).ok_or(IndexError::MissingWrapper)?;
    let close = memrchr(b')', bytes).ok_or(IndexError::MissingWrapper)?;

    if trimmed[..open].trim_end() != LOADER_FUNCTION || close != bytes.len() - 1 || close <= open {
        return Err(IndexError::MissingWrapper);
    }

    Ok(&trimmed[open + 1..close])
}

/// JSON formatter matching Python's `json.dumps` defaults
struct SortedAsciiFormatter;

impl Formatter for SortedAsciiFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        // Quotes, backslashes and C0 controls never reach here; everything
        // outside printable ASCII becomes \uXXXX (surrogate pairs above U+FFFF).
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            if start < i {
                writer.write_all(fragment[start..i].as_bytes())?;
            }
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        if start < fragment.len() {
            writer.write_all(fragment[start..].as_bytes())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::DocRefs;

    fn small_index() -> SearchIndex {
        let mut index = SearchIndex::default();
        index.docnames = vec!["index".into()];
        index.filenames = vec!["index.md".into()];
        index.titles = vec!["remage\u{2019}s validation suite".into()];
        index
            .alltitles
            .insert("remage\u{2019}s validation suite".into(), vec![(0, None)]);
        index.envversion.insert("sphinx".into(), 64);
        index.terms.insert("vertex".into(), DocRefs::One(0));
        index
    }

    #[test]
    fn test_encode_layout() {
        let bytes = encode(&small_index()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("Search.setIndex({\"alltitles\": {\"remage\\u2019s validation suite\": [[0, null]]}, \"docnames\": [\"index\"]"));
        assert!(text.contains("\"indexentries\": {}, \"objects\": {}"));
        assert!(text.ends_with("})"));
    }

    #[test]
    fn test_escapes_match_python() {
        let mut index = SearchIndex::default();
        index.titles = vec!["tab\there \"q\" \u{7f} \u{1F600}".into()];
        let text = String::from_utf8(encode(&index).unwrap()).unwrap();
        assert!(text.contains(r#""titles": ["tab\there \"q\" \u007f \ud83d\ude00"]"#));
    }

    #[test]
    fn test_decode_roundtrip() {
        let index = small_index();
        let bytes = encode(&index).unwrap();
        let decoded = decode(std::str::from_utf8(&bytes).unwrap()).unwrap();
        assert_eq!(decoded, index);
    }

    #[test]
    fn test_extract_payload_tolerates_whitespace() {
        assert_eq!(extract_payload("  Search.setIndex({})\n").unwrap(), "{}");
        assert_eq!(extract_payload("Search.setIndex ({});").unwrap(), "{}");
    }

    #[test]
    fn test_extract_payload_rejects_other_wrappers() {
        assert!(matches!(extract_payload("{}"), Err(IndexError::MissingWrapper)));
        assert!(matches!(
            extract_payload("Other.setIndex({})"),
            Err(IndexError::MissingWrapper)
        ));
        assert!(matches!(
            extract_payload("Search.setIndex({}) trailing"),
            Err(IndexError::MissingWrapper)
        ));
    }

    #[test]
    fn test_decode_missing_field() {
        let err = decode(r#"Search.setIndex({"docnames": []})"#).unwrap_err();
        assert!(err.requires_rebuild());
        assert!(err.to_string().contains("missing field"));
    }
}
