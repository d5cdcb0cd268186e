//! Banned-word normalization and matching.
//!
//! Text and list entries go through the same folding before comparison:
//! trim, compatibility decomposition (folds full-width and other width
//! variants), removal of combining marks (diacritics), recomposition, and
//! lowercasing. Text is blocked when its folded form contains any folded
//! entry as a substring.
//!
//! Recomposition keeps Hangul syllables intact so an entry cannot match
//! across a syllable boundary at the jamo level.

use serde::Deserialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::CoreError;

/// Stored shape of the banned-word list blob.
#[derive(Debug, Deserialize)]
struct WordListFile {
    words: Vec<String>,
}

/// Fold `text` for insensitive comparison.
pub fn normalize(text: &str) -> String {
    text.trim()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .nfc()
        .flat_map(char::to_lowercase)
        .collect()
}

/// A folded, ready-to-match banned-word list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannedWordList {
    words: Vec<String>,
}

impl BannedWordList {
    /// Build a list from raw entries. Entries that fold to nothing are dropped.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = words
            .into_iter()
            .map(|w| normalize(w.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();
        words.sort();
        words.dedup();
        Self { words }
    }

    /// Decode a `{ "words": [...] }` blob.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let file: WordListFile = serde_json::from_slice(bytes).map_err(|e| {
            CoreError::Validation(format!("Banned-word list is not valid JSON: {e}"))
        })?;
        Ok(Self::new(file.words))
    }

    /// Return the first folded entry contained in `text`, if any.
    pub fn find_match(&self, text: &str) -> Option<&str> {
        if self.words.is_empty() {
            return None;
        }
        let folded = normalize(text);
        self.words
            .iter()
            .find(|w| folded.contains(w.as_str()))
            .map(String::as_str)
    }

    pub fn contains_banned(&self, text: &str) -> bool {
        self.find_match(text).is_some()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize("  HeLLo  "), "hello");
    }

    #[test]
    fn normalize_strips_diacritics() {
        assert_eq!(normalize("Crème Brûlée"), "creme brulee");
    }

    #[test]
    fn normalize_folds_full_width() {
        assert_eq!(normalize("ＳＰＡＭ"), "spam");
    }

    #[test]
    fn normalize_keeps_hangul_syllables() {
        assert_eq!(normalize("바보"), "바보");
    }

    #[test]
    fn substring_match_blocks() {
        let list = BannedWordList::new(["spam"]);
        assert_eq!(list.find_match("this is SPAMMY"), Some("spam"));
    }

    #[test]
    fn folded_entry_matches_folded_text() {
        let list = BannedWordList::new(["Café"]);
        assert!(list.contains_banned("meet me at the CAFE"));
        assert!(list.contains_banned("ｃａｆé au lait"));
    }

    #[test]
    fn hangul_entry_does_not_match_inside_other_syllable() {
        let list = BannedWordList::new(["가"]);
        assert!(!list.contains_banned("각"));
        assert!(list.contains_banned("가나다"));
    }

    #[test]
    fn clean_text_passes() {
        let list = BannedWordList::new(["spam", "scam"]);
        assert!(!list.contains_banned("a perfectly nice comment"));
    }

    #[test]
    fn empty_list_blocks_nothing() {
        let list = BannedWordList::default();
        assert!(list.is_empty());
        assert_eq!(list.find_match("anything"), None);
    }

    #[test]
    fn blank_entries_are_dropped() {
        let list = BannedWordList::new(["", "   ", "Spam", "spam"]);
        assert_eq!(list.len(), 1);
        assert!(!list.contains_banned("hello"));
    }

    #[test]
    fn decode_from_blob() {
        let list = BannedWordList::from_json_bytes(br#"{"words": ["foo", "bar"]}"#).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains_banned("FOOTBALL"));
    }

    #[test]
    fn decode_rejects_bad_blob() {
        assert!(BannedWordList::from_json_bytes(b"not json").is_err());
        assert!(BannedWordList::from_json_bytes(br#"{"items": []}"#).is_err());
    }
}
