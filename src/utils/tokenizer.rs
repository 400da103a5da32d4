use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::OnceLock;

/// English stopwords dropped from both the index and queries
pub const STOPWORDS: &[&str] = &[
    "a", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "near", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with",
];

/// Hiragana range excluded for one- and two-character words
const HIRAGANA_START: u32 = 12353;
const HIRAGANA_END: u32 = 12436;

fn word_regex() -> &'static Regex {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    WORD_RE.get_or_init(|| Regex::new(r"\w+").expect("static regex"))
}

fn stopword_set() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOPWORDS.iter().copied().collect())
}

/// Split text into words: every maximal run of Unicode word characters
pub fn split_words(text: &str) -> impl Iterator<Item = &str> {
    word_regex().find_iter(text).map(|m| m.as_str())
}

pub fn is_stopword(word: &str) -> bool {
    stopword_set().contains(word)
}

/// Whether a (lowercased) word may become an index key
pub fn is_indexable(word: &str) -> bool {
    let Some(first) = word.chars().next() else {
        return false;
    };
    let code = first as u32;

    if word.chars().count() < 3 && HIRAGANA_START < code && code < HIRAGANA_END {
        return false;
    }
    !(code < 256 && is_stopword(word))
}

/// Whether a query word is made of ASCII digits only
pub fn is_number(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit())
}
