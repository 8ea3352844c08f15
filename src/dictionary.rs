//! Word list for guess validation.
//!
//! Loaded from a JSON array of words. When the list is unavailable the
//! check degrades to word length only.

use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use crate::contract::WORD_LENGTH;
use crate::error::{Result, WordleishError};

/// Set of playable words.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: HashSet<String>,
}

impl Dictionary {
    /// An empty dictionary (accepts any word of the right length).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dictionary from the given words, lower-cased.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    /// Parses a JSON array of words.
    pub fn from_json(content: &str) -> Result<Self> {
        let words: Vec<String> = serde_json::from_str(content)
            .map_err(|e| WordleishError::config(format!("Invalid dictionary: {e}")))?;
        Ok(Self::from_words(words))
    }

    /// Loads a dictionary file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WordleishError::config(format!("Failed to read dictionary {}: {e}", path.display()))
        })?;
        let dict = Self::from_json(&content)?;
        info!(path = %path.display(), words = dict.len(), "Loaded dictionary");
        Ok(dict)
    }

    /// Loads `path` if given, degrading to an empty dictionary on failure.
    pub fn load_best_effort(path: Option<&Path>) -> Self {
        match path.map(Self::load_from_file) {
            Some(Ok(dict)) => dict,
            Some(Err(e)) => {
                warn!(error = %e, "Failed to load dictionary, checking word length only");
                Self::new()
            }
            None => Self::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Strict membership check.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Membership check that accepts any five-letter word while the list is empty.
    pub fn check_best_effort(&self, word: &str) -> bool {
        if self.words.is_empty() {
            return word.chars().count() == WORD_LENGTH;
        }
        self.contains(word)
    }
}
