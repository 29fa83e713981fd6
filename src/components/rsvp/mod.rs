//! RSVP responses and the stores that keep them.

pub mod models;

pub use models::{RsvpEntry, RsvpStatus, RsvpSubmission};

use crate::error::{event_data_error, InviteResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Store for RSVP responses
#[async_trait]
pub trait RsvpStore: Send + Sync + 'static {
    /// Record a response
    async fn submit(&self, submission: &RsvpSubmission) -> InviteResult<()>;

    /// Responses with `show_name` set, newest first
    async fn list_public(&self, event_id: &str) -> InviteResult<Vec<RsvpEntry>>;
}

/// Reject submissions that would store an anonymous or unkeyed response
pub fn validate_submission(submission: &RsvpSubmission) -> InviteResult<()> {
    if submission.event_id.trim().is_empty() {
        return Err(event_data_error("RSVP is missing an event id"));
    }
    if submission.attendee_name.trim().is_empty() {
        return Err(event_data_error("RSVP is missing the attendee name"));
    }
    Ok(())
}

/// In-memory implementation of the store (for testing and as a fallback)
#[derive(Debug, Default)]
pub struct InMemoryRsvpStore {
    responses: RwLock<HashMap<String, Vec<RsvpEntry>>>,
}

impl InMemoryRsvpStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RsvpStore for InMemoryRsvpStore {
    async fn submit(&self, submission: &RsvpSubmission) -> InviteResult<()> {
        validate_submission(submission)?;
        let mut responses = self.responses.write().await;
        responses
            .entry(submission.event_id.clone())
            .or_default()
            .push(RsvpEntry::from_submission(submission));
        Ok(())
    }

    async fn list_public(&self, event_id: &str) -> InviteResult<Vec<RsvpEntry>> {
        let responses = self.responses.read().await;
        let entries = responses.get(event_id).cloned().unwrap_or_default();
        Ok(models::public_newest_first(entries))
    }
}
