//! Per-field validation rules.
//!
//! Each question id maps to an ordered list of typed constraints. Evaluation
//! is a pure function of the rule table, the id and the value; fields never
//! look at each other.

mod patterns;

pub use patterns::{is_email, DATE_PATTERN, PHONE_PATTERN};

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogError, QuestionCatalog, QuestionKind, RuleSpec};

/// Typed constraint evaluated against a trimmed answer.
#[derive(Debug, Clone)]
pub enum Constraint {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Pattern(FullMatch),
    Email,
    OneOf(Vec<String>),
}

impl Constraint {
    fn default_message(&self) -> String {
        match self {
            Constraint::Required => "This field is required".to_string(),
            Constraint::MinLength(n) => format!("Must be at least {n} characters"),
            Constraint::MaxLength(n) => format!("Must be at most {n} characters"),
            Constraint::Pattern(_) => "Value has an invalid format".to_string(),
            Constraint::Email => "Please enter a valid email address".to_string(),
            Constraint::OneOf(_) => "Please select one of the listed options".to_string(),
        }
    }

    fn accepts(&self, trimmed: &str) -> bool {
        match self {
            Constraint::Required => !trimmed.is_empty(),
            Constraint::MinLength(n) => trimmed.chars().count() >= *n,
            Constraint::MaxLength(n) => trimmed.chars().count() <= *n,
            Constraint::Pattern(pattern) => pattern.is_match(trimmed),
            Constraint::Email => is_email(trimmed),
            Constraint::OneOf(options) => options.iter().any(|option| option == trimmed),
        }
    }
}

/// Regex anchored at both ends, so it only accepts values it matches in
/// full. Alternations are wrapped in a group before anchoring: `a|ab` accepts
/// `ab`.
#[derive(Debug, Clone)]
pub struct FullMatch(Regex);

impl FullMatch {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{pattern})$")).map(Self)
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }
}

/// A constraint paired with the message shown when it fails.
#[derive(Debug, Clone)]
pub struct Rule {
    pub constraint: Constraint,
    pub message: Option<String>,
}

impl Rule {
    pub fn new(constraint: Constraint) -> Self {
        Self {
            constraint,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn failure_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| self.constraint.default_message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid { message: String },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid { message } => Some(message),
        }
    }
}

/// How much of the validation result blocks forward navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatingPolicy {
    /// Only a required question with a blank answer blocks `next`. Format
    /// errors are shown inline but do not block.
    #[default]
    RequiredOnly,
    /// Any validation failure blocks `next`.
    Strict,
}

/// Explicit mapping from question id to its rules.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: HashMap<String, Vec<Rule>>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the rule table implied by each question's kind and flags, then
    /// appends the question's declared rules.
    pub fn for_catalog(catalog: &QuestionCatalog) -> Result<Self, CatalogError> {
        let mut table = Self::new();
        for question in catalog.iter() {
            let mut rules = Vec::new();
            if question.required {
                let mut rule = Rule::new(Constraint::Required);
                rule.message = question.required_message.clone();
                rules.push(rule);
            }
            match question.kind {
                QuestionKind::Email => rules.push(Rule::new(Constraint::Email)),
                QuestionKind::Phone => rules.push(
                    Rule::new(Constraint::Pattern(compile(&question.id, PHONE_PATTERN)?))
                        .with_message("Please enter a valid phone number"),
                ),
                QuestionKind::Date => rules.push(
                    Rule::new(Constraint::Pattern(compile(&question.id, DATE_PATTERN)?))
                        .with_message("Please enter a valid date in YYYY-MM-DD format"),
                ),
                QuestionKind::SingleSelect => {
                    rules.push(Rule::new(Constraint::OneOf(question.options.clone())))
                }
                QuestionKind::ShortText | QuestionKind::MultiLineText => {}
            }
            for spec in &question.rules {
                rules.push(compile_spec(&question.id, spec)?);
            }
            if !rules.is_empty() {
                table.rules.insert(question.id.clone(), rules);
            }
        }
        Ok(table)
    }

    pub fn insert(&mut self, id: impl Into<String>, rule: Rule) {
        self.rules.entry(id.into()).or_default().push(rule);
    }

    pub fn rules_for(&self, id: &str) -> &[Rule] {
        self.rules.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn validate(&self, id: &str, value: &str) -> ValidationResult {
        validate(self, id, value)
    }
}

/// Evaluates the rules for `id` against `value`.
///
/// A blank value is checked against `Required` only: it fails with the
/// required message when the field is required and passes otherwise. For a
/// non-blank value the remaining constraints run in order and the first
/// failure is reported.
pub fn validate(table: &RuleTable, id: &str, value: &str) -> ValidationResult {
    let rules = table.rules_for(id);
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return match rules
            .iter()
            .find(|rule| matches!(rule.constraint, Constraint::Required))
        {
            Some(rule) => ValidationResult::Invalid {
                message: rule.failure_message(),
            },
            None => ValidationResult::Valid,
        };
    }
    for rule in rules {
        if !rule.constraint.accepts(trimmed) {
            return ValidationResult::Invalid {
                message: rule.failure_message(),
            };
        }
    }
    ValidationResult::Valid
}

fn compile(id: &str, pattern: &str) -> Result<FullMatch, CatalogError> {
    FullMatch::new(pattern).map_err(|err| CatalogError::InvalidPattern {
        id: id.to_string(),
        reason: err.to_string(),
    })
}

fn compile_spec(id: &str, spec: &RuleSpec) -> Result<Rule, CatalogError> {
    let (constraint, message) = match spec {
        RuleSpec::MinLength { value, message } => (Constraint::MinLength(*value), message),
        RuleSpec::MaxLength { value, message } => (Constraint::MaxLength(*value), message),
        RuleSpec::Pattern { regex, message } => (Constraint::Pattern(compile(id, regex)?), message),
    };
    Ok(Rule {
        constraint,
        message: message.clone(),
    })
}
