//! Porter stemmer (Snowball `porter` flavour).
//!
//! Each step removes the longest matching suffix from its table; if the
//! region condition fails for that suffix the step does nothing. There is no
//! minimum word length, so `us` stems to `u` and `s` to the empty string.

/// Reduce a word to its stem. The word is lowercased first.
pub fn stem(word: &str) -> String {
    let mut s = Stemmer {
        b: word.to_lowercase().chars().collect(),
    };
    if s.b.is_empty() {
        return String::new();
    }

    s.step1a();
    s.step1b();
    s.step1c();
    s.step2();
    s.step3();
    s.step4();
    s.step5a();
    s.step5b();

    s.b.into_iter().collect()
}

const STEP2: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("abli", "able"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
];

const STEP3: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

const STEP4: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

struct Stemmer {
    b: Vec<char>,
}

impl Stemmer {
    fn is_consonant(&self, i: usize) -> bool {
        match self.b[i] {
            'a' | 'e' | 'i' | 'o' | 'u' => false,
            'y' => i == 0 || !self.is_consonant(i - 1),
            _ => true,
        }
    }

    /// Number of VC sequences in `b[..len]`
    fn measure(&self, len: usize) -> usize {
        let mut n = 0;
        let mut i = 0;

        while i < len && self.is_consonant(i) {
            i += 1;
        }
        loop {
            while i < len && !self.is_consonant(i) {
                i += 1;
            }
            if i >= len {
                return n;
            }
            while i < len && self.is_consonant(i) {
                i += 1;
            }
            n += 1;
            if i >= len {
                return n;
            }
        }
    }

    fn has_vowel(&self, len: usize) -> bool {
        (0..len).any(|i| !self.is_consonant(i))
    }

    fn ends_double_consonant(&self, len: usize) -> bool {
        len >= 2 && self.b[len - 1] == self.b[len - 2] && self.is_consonant(len - 1)
    }

    /// consonant-vowel-consonant ending, last consonant not w, x or y
    fn ends_cvc(&self, len: usize) -> bool {
        len >= 3
            && self.is_consonant(len - 1)
            && !self.is_consonant(len - 2)
            && self.is_consonant(len - 3)
            && !matches!(self.b[len - 1], 'w' | 'x' | 'y')
    }

    fn ends_with(&self, suffix: &str) -> bool {
        let n = suffix.chars().count();
        n <= self.b.len() && self.b[self.b.len() - n..].iter().copied().eq(suffix.chars())
    }

    fn set_suffix(&mut self, strip: usize, replacement: &str) {
        let keep = self.b.len() - strip;
        self.b.truncate(keep);
        self.b.extend(replacement.chars());
    }

    fn longest<'t, T>(&self, table: &'t [T], suffix: impl Fn(&T) -> &str) -> Option<&'t T> {
        table
            .iter()
            .filter(|entry| self.ends_with(suffix(entry)))
            .max_by_key(|entry| suffix(entry).len())
    }

    fn step1a(&mut self) {
        if self.ends_with("sses") {
            self.set_suffix(4, "ss");
        } else if self.ends_with("ies") {
            self.set_suffix(3, "i");
        } else if self.ends_with("ss") {
        } else if self.ends_with("s") {
            self.set_suffix(1, "");
        }
    }

    fn step1b(&mut self) {
        let len = self.b.len();

        if self.ends_with("eed") {
            if self.measure(len - 3) > 0 {
                self.set_suffix(3, "ee");
            }
            return;
        }

        let stripped = if self.ends_with("ed") && self.has_vowel(len - 2) {
            self.set_suffix(2, "");
            true
        } else if self.ends_with("ing") && self.has_vowel(len - 3) {
            self.set_suffix(3, "");
            true
        } else {
            false
        };

        if !stripped {
            return;
        }

        let len = self.b.len();
        if self.ends_with("at") || self.ends_with("bl") || self.ends_with("iz") {
            self.b.push('e');
        } else if self.ends_double_consonant(len) && !matches!(self.b[len - 1], 'l' | 's' | 'z') {
            self.b.pop();
        } else if self.measure(len) == 1 && self.ends_cvc(len) {
            self.b.push('e');
        }
    }

    fn step1c(&mut self) {
        let len = self.b.len();
        if self.ends_with("y") && self.has_vowel(len - 1) {
            self.b[len - 1] = 'i';
        }
    }

    fn step2(&mut self) {
        if let Some(&(suffix, replacement)) = self.longest(STEP2, |e| e.0) {
            let stem_len = self.b.len() - suffix.len();
            if self.measure(stem_len) > 0 {
                self.set_suffix(suffix.len(), replacement);
            }
        }
    }

    fn step3(&mut self) {
        if let Some(&(suffix, replacement)) = self.longest(STEP3, |e| e.0) {
            let stem_len = self.b.len() - suffix.len();
            if self.measure(stem_len) > 0 {
                self.set_suffix(suffix.len(), replacement);
            }
        }
    }

    fn step4(&mut self) {
        if let Some(&suffix) = self.longest(STEP4, |e| *e) {
            let stem_len = self.b.len() - suffix.len();
            if self.measure(stem_len) <= 1 {
                return;
            }
            if suffix == "ion" && !(stem_len > 0 && matches!(self.b[stem_len - 1], 's' | 't')) {
                return;
            }
            self.set_suffix(suffix.len(), "");
        }
    }

    fn step5a(&mut self) {
        if !self.ends_with("e") {
            return;
        }
        let stem_len = self.b.len() - 1;
        let m = self.measure(stem_len);
        if m > 1 || (m == 1 && !self.ends_cvc(stem_len)) {
            self.b.pop();
        }
    }

    fn step5b(&mut self) {
        let len = self.b.len();
        if self.measure(len) > 1 && self.ends_double_consonant(len) && self.b[len - 1] == 'l' {
            self.b.pop();
        }
    }
}
