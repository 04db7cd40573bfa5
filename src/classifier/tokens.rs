/// Lower-cased word sequence of a market name or filter phrase.
///
/// A word is a maximal run of alphanumerics and `-`, so `m4a1-s`, `ak-47` and
/// `five-seven` stay whole while `|`, `(`, `™` and whitespace separate words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSeq {
    words: Vec<String>,
}

impl WordSeq {
    pub fn new(text: &str) -> Self {
        let words = text
            .split(|c: char| !(c.is_alphanumeric() || c == '-'))
            .map(|w| w.trim_matches('-'))
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();
        Self { words }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// True if `phrase` occurs as a contiguous run of whole words.
    pub fn contains_phrase(&self, phrase: &WordSeq) -> bool {
        if phrase.words.is_empty() || phrase.words.len() > self.words.len() {
            return false;
        }
        self.words
            .windows(phrase.words.len())
            .any(|w| w == phrase.words.as_slice())
    }
}
