//! The [`Token`] output type shared by both segmentation modes.

/// An immutable segmentation result: `word`, plus character (not byte)
/// offsets into the original input, with `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub word: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(word: impl Into<String>, start: usize, end: usize) -> Self {
        let word = word.into();
        debug_assert_eq!(word.chars().count(), end - start);
        Self { word, start, end }
    }
}
