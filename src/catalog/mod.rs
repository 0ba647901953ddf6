//! Static question catalog.
//!
//! The catalog is supplied once at startup and is read-only for the rest of
//! the process. Its order defines navigation order, and every question id is
//! unique across the sequence.

mod defaults;

pub use defaults::{application_catalog, feedback_catalog};

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input kind of a question. Determines the implicit validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[serde(alias = "text")]
    ShortText,
    Email,
    #[serde(alias = "tel")]
    Phone,
    #[serde(alias = "textarea")]
    MultiLineText,
    #[serde(alias = "select")]
    SingleSelect,
    Date,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::ShortText => "short_text",
            QuestionKind::Email => "email",
            QuestionKind::Phone => "phone",
            QuestionKind::MultiLineText => "multi_line_text",
            QuestionKind::SingleSelect => "single_select",
            QuestionKind::Date => "date",
        }
    }

    pub fn is_select(&self) -> bool {
        matches!(self, QuestionKind::SingleSelect)
    }
}

/// Extra constraint declared on a question in addition to the ones implied by
/// its kind and `required` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleSpec {
    MinLength {
        value: usize,
        #[serde(default)]
        message: Option<String>,
    },
    MaxLength {
        value: usize,
        #[serde(default)]
        message: Option<String>,
    },
    Pattern {
        regex: String,
        #[serde(default)]
        message: Option<String>,
    },
}

/// A single wizard question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub kind: QuestionKind,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Outbound payload key. Defaults to the id with a capitalized first letter.
    #[serde(default)]
    pub submission_key: Option<String>,
    /// Message reported when the required check fails.
    #[serde(default)]
    pub required_message: Option<String>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

impl Question {
    pub fn new(id: impl Into<String>, kind: QuestionKind, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            subtitle: None,
            required: false,
            options: Vec::new(),
            placeholder: None,
            submission_key: None,
            required_message: None,
            rules: Vec::new(),
        }
    }

    pub fn select<I, S>(id: impl Into<String>, title: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut question = Self::new(id, QuestionKind::SingleSelect, title);
        question.options = options.into_iter().map(Into::into).collect();
        question
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_submission_key(mut self, key: impl Into<String>) -> Self {
        self.submission_key = Some(key.into());
        self
    }

    pub fn with_required_message(mut self, message: impl Into<String>) -> Self {
        self.required_message = Some(message.into());
        self
    }

    pub fn with_rule(mut self, rule: RuleSpec) -> Self {
        self.rules.push(rule);
        self
    }

    /// Key used for this question in the submission payload.
    pub fn payload_key(&self) -> String {
        if let Some(key) = &self.submission_key {
            return key.clone();
        }
        let mut chars = self.id.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog contains no questions")]
    Empty,
    #[error("question id '{0}' appears more than once")]
    DuplicateId(String),
    #[error("question id at position {0} is blank")]
    BlankId(usize),
    #[error("single-select question '{0}' declares no options")]
    MissingOptions(String),
    #[error("question '{0}' declares options but is not a single-select")]
    UnexpectedOptions(String),
    #[error("question '{id}' repeats option '{option}'")]
    DuplicateOption { id: String, option: String },
    #[error("question '{id}' has an invalid pattern: {reason}")]
    InvalidPattern { id: String, reason: String },
}

/// Ordered, validated sequence of questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for (position, question) in questions.iter().enumerate() {
            if question.id.trim().is_empty() {
                return Err(CatalogError::BlankId(position));
            }
            if !seen.insert(question.id.as_str()) {
                return Err(CatalogError::DuplicateId(question.id.clone()));
            }
            match (question.kind.is_select(), question.options.is_empty()) {
                (true, true) => return Err(CatalogError::MissingOptions(question.id.clone())),
                (false, false) => {
                    return Err(CatalogError::UnexpectedOptions(question.id.clone()))
                }
                _ => {}
            }
            let mut options = HashSet::new();
            for option in &question.options {
                if !options.insert(option.as_str()) {
                    return Err(CatalogError::DuplicateOption {
                        id: question.id.clone(),
                        option: option.clone(),
                    });
                }
            }
        }
        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed catalog; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.questions.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn find(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    questions: Vec<Question>,
}

/// Loads a catalog from a YAML (`.yaml`/`.yml`) or JSON file.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<QuestionCatalog> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file {:?}", path))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let file: CatalogFile = if is_json {
        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse catalog file {:?}", path))?
    } else {
        serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse catalog file {:?}", path))?
    };
    let catalog = QuestionCatalog::new(file.questions)
        .with_context(|| format!("Catalog file {:?} is not usable", path))?;
    Ok(catalog)
}
