//! Forbidden-word content filter.
//!
//! Case-insensitive substring matching against a configured denylist. Words
//! are matched anywhere in the content, so `"hack"` also matches `"hacker"`.

use missive_types::error::MessageError;

/// Denylist of substrings that cause content to be rejected.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    /// `(as configured, lowercased)` pairs; blank entries are dropped.
    words: Vec<(String, String)>,
}

impl ContentFilter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words = words
            .into_iter()
            .map(Into::into)
            .filter(|w| !w.trim().is_empty())
            .map(|w| {
                let lower = w.to_lowercase();
                (w, lower)
            })
            .collect();
        Self { words }
    }

    /// Number of active entries.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Every configured word found in `content`, in configured order.
    pub fn find_matches(&self, content: &str) -> Vec<String> {
        let haystack = content.to_lowercase();
        self.words
            .iter()
            .filter(|(_, lower)| haystack.contains(lower.as_str()))
            .map(|(original, _)| original.clone())
            .collect()
    }

    /// Fail with `InappropriateContent` listing the matched words.
    pub fn check(&self, content: &str) -> Result<(), MessageError> {
        let found = self.find_matches(content);
        if found.is_empty() {
            Ok(())
        } else {
            Err(MessageError::InappropriateContent(found))
        }
    }
}
