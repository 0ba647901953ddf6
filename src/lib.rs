pub mod catalog;
pub mod config;
pub mod store;
pub mod submission;
pub mod validation;
pub mod wizard;

// Re-export commonly used types for convenience.
pub use catalog::{Question, QuestionCatalog, QuestionKind};
pub use config::AppConfig;
pub use store::{AnswerSet, FileBackend, MemoryBackend, ProgressStore};
pub use submission::{SubmissionDispatcher, SubmissionEvent, Submitter};
pub use validation::{FullMatch, GatingPolicy, RuleTable, ValidationResult};
pub use wizard::{Navigation, WizardController, WizardState, WizardStep, WizardView};
