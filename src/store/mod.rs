//! Answer storage and durable wizard progress.

mod backend;
mod progress;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use progress::{
    ProgressStore, ANSWERS_KEY, CURRENT_QUESTION_INDEX_KEY, CURRENT_STEP_KEY,
};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode answers: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage backend rejected write for '{0}'")]
    Unavailable(String),
}

/// Mapping from question id to answer text.
///
/// An absent id and an empty string both mean "unanswered". No validation
/// happens here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet {
    answers: BTreeMap<String, String>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value for `id`, or an empty string when unset.
    pub fn get(&self, id: &str) -> &str {
        self.answers.get(id).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, id: impl Into<String>, value: impl Into<String>) {
        self.answers.insert(id.into(), value.into());
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.answers.clone()
    }

    /// True when the trimmed answer for `id` is non-empty.
    pub fn is_answered(&self, id: &str) -> bool {
        !self.get(id).trim().is_empty()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl From<BTreeMap<String, String>> for AnswerSet {
    fn from(answers: BTreeMap<String, String>) -> Self {
        Self { answers }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            answers: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
