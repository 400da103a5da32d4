use rustc_hash::FxHashSet;
use unicode_normalization::UnicodeNormalization;

/// Letters NFKD leaves alone that docutils spells out as two ASCII letters
const DIGRAPHS: &[(char, &str)] = &[
    ('\u{00df}', "sz"),
    ('\u{00e6}', "ae"),
    ('\u{0153}', "oe"),
    ('\u{0238}', "db"),
    ('\u{0239}', "qp"),
];

/// Letters with strokes and hooks, which NFKD does not decompose
const STROKES: &[(char, char)] = &[
    ('\u{00f8}', 'o'),
    ('\u{0111}', 'd'),
    ('\u{0127}', 'h'),
    ('\u{0131}', 'i'),
    ('\u{0142}', 'l'),
    ('\u{0167}', 't'),
    ('\u{0180}', 'b'),
    ('\u{0183}', 'b'),
    ('\u{0188}', 'c'),
    ('\u{018c}', 'd'),
    ('\u{0192}', 'f'),
    ('\u{0199}', 'k'),
    ('\u{019a}', 'l'),
    ('\u{019e}', 'n'),
    ('\u{01a5}', 'p'),
    ('\u{01ab}', 't'),
    ('\u{01ad}', 't'),
    ('\u{01b4}', 'y'),
    ('\u{01b6}', 'z'),
    ('\u{01e5}', 'g'),
    ('\u{0225}', 'z'),
    ('\u{0234}', 'l'),
    ('\u{0235}', 'n'),
    ('\u{0236}', 't'),
    ('\u{0237}', 'j'),
    ('\u{023c}', 'c'),
    ('\u{023f}', 's'),
    ('\u{0240}', 'z'),
    ('\u{0247}', 'e'),
    ('\u{0249}', 'j'),
    ('\u{024b}', 'q'),
    ('\u{024d}', 'r'),
    ('\u{024f}', 'y'),
];

fn transliterate(lowered: &str) -> String {
    let mut out = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        if let Some((_, pair)) = DIGRAPHS.iter().find(|(c, _)| *c == ch) {
            out.push_str(pair);
        } else if let Some((_, plain)) = STROKES.iter().find(|(c, _)| *c == ch) {
            out.push(*plain);
        } else {
            out.push(ch);
        }
    }
    out
}

/// Turn a section title into an HTML id, the way docutils does.
///
/// Lowercases, spells out stroked letters and digraphs, decomposes with NFKD
/// and drops whatever is still non-ASCII (accents, curly apostrophes). Runs of
/// anything but `a-z0-9` then collapse into `-`, and leading digits/hyphens
/// and trailing hyphens are stripped. May return an empty string.
pub fn make_id(title: &str) -> String {
    let ascii: String = transliterate(&title.to_lowercase())
        .nfkd()
        .filter(char::is_ascii)
        .collect();

    let mut id = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for ch in ascii.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !id.is_empty() {
                id.push('-');
            }
            pending_dash = false;
            id.push(ch);
        } else {
            pending_dash = true;
        }
    }

    let trimmed = id.trim_start_matches(|c: char| c.is_ascii_digit() || c == '-');
    trimmed.trim_end_matches('-').to_string()
}

/// Hands out unique section ids within one page
#[derive(Debug, Default)]
pub struct AnchorAllocator {
    used: FxHashSet<String>,
    auto_counter: u32,
}

impl AnchorAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id for a title, or `explicit` when the source names one
    pub fn allocate(&mut self, title: &str, explicit: Option<&str>) -> String {
        let candidate = match explicit {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => make_id(title),
        };

        if !candidate.is_empty() && self.used.insert(candidate.clone()) {
            return candidate;
        }

        loop {
            self.auto_counter += 1;
            let id = format!("id{}", self.auto_counter);
            if self.used.insert(id.clone()) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_id() {
        assert_eq!(make_id("Bounding sphere"), "bounding-sphere");
        assert_eq!(
            make_id("Dedicated simulations for Ge in LAr"),
            "dedicated-simulations-for-ge-in-lar"
        );
        assert_eq!(make_id("remage\u{2019}s validation suite"), "remages-validation-suite");
        assert_eq!(make_id("  /RMG/Geometry/  "), "rmg-geometry");
        assert_eq!(make_id("3D plots"), "d-plots");
        assert_eq!(make_id("???"), "");
    }

    #[test]
    fn test_accents_decomposed() {
        assert_eq!(make_id("Zählrate"), "zahlrate");
        assert_eq!(make_id("Énergie déposée"), "energie-deposee");
        assert_eq!(make_id("Straße"), "strasze");
        assert_eq!(make_id("Øresund Łódź"), "oresund-lodz");
        assert_eq!(make_id("E² spectrum"), "e2-spectrum");
        assert_eq!(make_id("γ lines"), "lines");
    }

    #[test]
    fn test_allocator_duplicates() {
        let mut anchors = AnchorAllocator::new();
        assert_eq!(anchors.allocate("Results", None), "results");
        assert_eq!(anchors.allocate("Results", None), "id1");
        assert_eq!(anchors.allocate("???", None), "id2");
        assert_eq!(anchors.allocate("Other", Some("custom")), "custom");
    }
}
