//! Outbound submission of a completed answer set.
//!
//! The wizard never waits on the network: it hands a [`SubmissionRequest`] to
//! a [`SubmissionSink`] and moves on. The sink reports the eventual result on
//! a side channel as a [`SubmissionEvent`].

mod dispatcher;
mod http;

pub use dispatcher::{
    Notification, NotificationLevel, SubmissionDispatcher, SubmissionEvent, SubmissionEvents,
    SubmissionOutcome,
};
pub use http::HttpSubmitter;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::catalog::QuestionCatalog;
use crate::store::AnswerSet;

/// Why a submission was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionTrigger {
    /// `next` on the last question.
    Completed,
    /// Restart from the completion screen.
    Restart,
}

#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub submission_id: Uuid,
    pub trigger: SubmissionTrigger,
    pub answers: AnswerSet,
    pub requested_at: DateTime<Utc>,
}

impl SubmissionRequest {
    pub fn new(trigger: SubmissionTrigger, answers: AnswerSet) -> Self {
        Self {
            submission_id: Uuid::new_v4(),
            trigger,
            answers,
            requested_at: Utc::now(),
        }
    }
}

/// JSON body sent to the endpoint: one key per catalog question, in catalog
/// order, with unanswered questions as empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    fields: Vec<(String, String)>,
}

impl SubmissionPayload {
    pub fn build(catalog: &QuestionCatalog, answers: &AnswerSet) -> Self {
        let fields = catalog
            .iter()
            .map(|question| (question.payload_key(), answers.get(&question.id).to_string()))
            .collect();
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Lowercase hex SHA-256 of the serialized body.
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        format!("{:x}", Sha256::digest(&bytes))
    }
}

impl Serialize for SubmissionPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Transport that delivers a payload. Only success versus failure matters.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<()>;
}

/// Accepts submission requests without blocking the caller.
pub trait SubmissionSink: Send + Sync {
    fn dispatch(&self, request: SubmissionRequest);
}
