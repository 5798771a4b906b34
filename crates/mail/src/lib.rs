//! `gatehouse-mail` — transactional notification boundary.
//!
//! The lifecycle treats delivery as fire-and-forget: failures are logged by
//! the caller and never surfaced through the API. Transport mechanics are
//! out of scope; this crate ships a tracing-backed sink for dev/prod logging
//! and a recording sink for tests.

pub mod messages;

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("mail delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Transactional email sink.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Notifier that emits deliveries to the log stream instead of a transport.
///
/// Bodies may carry one-time credentials, so only the recipient and subject
/// are logged at info level.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(to, subject, "outbound mail");
        tracing::debug!(body, "outbound mail body");
        Ok(())
    }
}

/// A delivery captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Test sink that records every delivery and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMail>>,
    fail: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().expect("mail lock poisoned").clone()
    }

    /// Make every subsequent `send` fail (for testing that delivery failures
    /// are swallowed).
    pub fn fail_deliveries(&self, fail: bool) {
        *self.fail.lock().expect("mail lock poisoned") = fail;
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        if *self.fail.lock().expect("mail lock poisoned") {
            return Err(NotifyError("recording notifier set to fail".to_string()));
        }
        self.sent.lock().expect("mail lock poisoned").push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
