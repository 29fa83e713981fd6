use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An attendee's answer to an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    Yes,
    Later,
    No,
}

impl RsvpStatus {
    /// Translation key of the status label
    pub fn label_key(&self) -> &'static str {
        match self {
            RsvpStatus::Yes => "rsvp_yes",
            RsvpStatus::Later => "rsvp_later",
            RsvpStatus::No => "rsvp_no",
        }
    }
}

/// A response sent by an attendee
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpSubmission {
    pub event_id: String,
    pub attendee_name: String,
    pub status: RsvpStatus,
    pub show_name: bool,
    /// Remember the name for this event on later visits
    #[serde(default)]
    pub remember: bool,
}

/// A stored response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpEntry {
    pub attendee_name: String,
    pub status: RsvpStatus,
    pub created_at: DateTime<Utc>,
    pub show_name: bool,
}

impl RsvpEntry {
    /// Stamp a submission with the current time
    pub fn from_submission(submission: &RsvpSubmission) -> Self {
        RsvpEntry {
            attendee_name: submission.attendee_name.trim().to_string(),
            status: submission.status,
            created_at: Utc::now(),
            show_name: submission.show_name,
        }
    }
}

/// Keep public entries only, newest first
pub fn public_newest_first(mut entries: Vec<RsvpEntry>) -> Vec<RsvpEntry> {
    entries.retain(|entry| entry.show_name);
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    entries
}
