//! This module implements loading and normalizing the candidate word list. Words are interned
//! once, up front: each distinct character maps to a `GlyphId` and each distinct normalized word
//! maps to a `WordId`, so that the solver can compare letters and words by index instead of
//! re-examining strings.

use smallvec::{smallvec, SmallVec};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fmt::Debug;
use std::{fmt, fs};
use unicode_normalization::UnicodeNormalization;

use crate::types::{GlyphId, WordId};
use crate::{MAX_GLYPH_COUNT, MAX_SLOT_LENGTH};

/// A struct representing a word in the word list.
#[derive(Debug, Clone)]
pub struct Word {
    /// The word as it would appear in a grid -- lowercased, NFC-normalized, no whitespace.
    pub normalized_string: String,

    /// The word as it appears in the user's word list, with arbitrary formatting.
    pub canonical_string: String,

    /// The glyph ids making up `normalized_string`.
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
}

impl Word {
    /// The number of grid cells this word occupies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Given a raw word string from a word-list file, turn it into the normalized form used
/// everywhere else in the solver.
#[must_use]
pub fn normalize_word(canonical: &str) -> String {
    canonical
        .to_lowercase()
        .nfc() // Normalize Unicode combining forms
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordListError {
    InvalidPath(String),
    EmptyList,
}

impl fmt::Display for WordListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            WordListError::InvalidPath(path) => format!("Can’t read file: “{path}”"),
            WordListError::EmptyList => "Word list contains no words".to_string(),
        };
        write!(f, "{string}")
    }
}

/// A struct representing the loaded word list. This is static for the lifetime of a solve: both
/// the domain store and the search traffic in `WordId`s that index into `words`.
pub struct WordList {
    /// A list of all characters that occur in any (normalized) word. `GlyphId`s used everywhere
    /// else are indices into this list.
    pub glyphs: SmallVec<[char; MAX_GLYPH_COUNT]>,

    /// The inverse of `glyphs`: a map from a character to the `GlyphId` representing it.
    pub glyph_id_by_char: HashMap<char, GlyphId>,

    /// All loaded words, in input order with duplicates collapsed.
    pub words: Vec<Word>,

    /// A map from a normalized string to the id of the Word representing it.
    pub word_id_by_string: HashMap<String, WordId>,
}

impl WordList {
    /// Construct a `WordList` from raw file contents containing one candidate word per line.
    /// Blank lines are skipped; words whose normalized forms collide are collapsed into one
    /// entry, keeping the first spelling seen.
    pub fn from_contents(contents: &str) -> Result<WordList, WordListError> {
        let mut instance = WordList {
            glyphs: smallvec![],
            glyph_id_by_char: HashMap::new(),
            words: vec![],
            word_id_by_string: HashMap::new(),
        };

        for line in contents.lines() {
            let canonical = line.trim();
            let normalized = normalize_word(canonical);
            if normalized.is_empty() || instance.word_id_by_string.contains_key(&normalized) {
                continue;
            }
            instance.add_word(canonical, normalized);
        }

        if instance.words.is_empty() {
            return Err(WordListError::EmptyList);
        }

        Ok(instance)
    }

    /// Construct a `WordList` from a file containing one candidate word per line.
    pub fn from_file(path: &OsStr) -> Result<WordList, WordListError> {
        let contents = fs::read_to_string(path)
            .map_err(|_| WordListError::InvalidPath(path.to_string_lossy().into()))?;

        WordList::from_contents(&contents)
    }

    /// Add a word to the list. The normalized form must be nonempty and not present yet.
    fn add_word(&mut self, canonical: &str, normalized: String) -> WordId {
        let glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]> = normalized
            .chars()
            .map(|c| self.glyph_id_for_char(c))
            .collect();

        let word_id = self.words.len();

        self.words.push(Word {
            normalized_string: normalized.clone(),
            canonical_string: canonical.to_string(),
            glyphs,
        });
        self.word_id_by_string.insert(normalized, word_id);

        word_id
    }

    /// Borrow an existing word by its id.
    #[must_use]
    pub fn get_word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    /// What's the unique glyph id for the given char? We do this lazily, instead of mapping every
    /// letter up front, because word list entries may contain numbers, non-English letters, or
    /// punctuation.
    pub fn glyph_id_for_char(&mut self, ch: char) -> GlyphId {
        self.glyph_id_by_char.get(&ch).copied().unwrap_or_else(|| {
            self.glyphs.push(ch);
            let id = self.glyphs.len() - 1;
            self.glyph_id_by_char.insert(ch, id);
            id
        })
    }
}

impl Debug for WordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordList")
            .field("glyphs", &self.glyphs)
            .field("words", &self.words.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub mod tests {
    use crate::word_list::{normalize_word, WordList, WordListError};

    #[test]
    fn test_loads_words_in_input_order() {
        let word_list = WordList::from_contents("CAT\nDOG\ntoo\n").unwrap();

        assert_eq!(word_list.words.len(), 3);
        assert_eq!(word_list.words[0].normalized_string, "cat");
        assert_eq!(word_list.words[0].canonical_string, "CAT");
        assert_eq!(word_list.words[1].normalized_string, "dog");
        assert_eq!(word_list.words[2].normalized_string, "too");

        assert_eq!(word_list.word_id_by_string.get("dog"), Some(&1));
    }

    #[test]
    fn test_collapses_duplicates_and_blank_lines() {
        let word_list = WordList::from_contents("cat\n\nCat\n  \ncAT\ndog\n").unwrap();

        assert_eq!(word_list.words.len(), 2);
        assert_eq!(word_list.words[0].canonical_string, "cat");
        assert_eq!(word_list.words[1].normalized_string, "dog");
    }

    #[test]
    fn test_empty_list_is_an_error() {
        assert_eq!(
            WordList::from_contents("\n  \n").unwrap_err(),
            WordListError::EmptyList
        );
        assert_eq!(
            WordList::from_contents("").unwrap_err(),
            WordListError::EmptyList
        );
    }

    #[test]
    fn test_glyph_interning() {
        let word_list = WordList::from_contents("aba\nbab\n").unwrap();

        assert_eq!(word_list.glyphs.len(), 2);

        let a = word_list.glyph_id_by_char[&'a'];
        let b = word_list.glyph_id_by_char[&'b'];
        assert_eq!(word_list.words[0].glyphs.as_slice(), &[a, b, a]);
        assert_eq!(word_list.words[1].glyphs.as_slice(), &[b, a, b]);
    }

    #[test]
    #[allow(clippy::unicode_not_nfc)]
    fn test_unusual_characters() {
        // One two-byte `char` vs. two chars with a combining form; both intern per glyph.
        let word_list = WordList::from_contents("monsutâ\nhélen\n").unwrap();

        assert_eq!(word_list.words[0].len(), 7);
        assert_eq!(word_list.words[1].len(), 5);
        assert_eq!(normalize_word("A man"), "aman");
    }
}
