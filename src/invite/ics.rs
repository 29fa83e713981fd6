//! iCalendar (RFC 5545) document generation.

use crate::error::{event_data_error, InviteResult};
use crate::invite::params::EventRequest;
use crate::utils::time::basic_format;
use chrono::{DateTime, Datelike, Utc};
use tracing::debug;
use uuid::Uuid;

/// Media type of generated documents
pub const CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// File name offered for downloads
pub const FILENAME: &str = "invite.ics";

/// A single event ready to be written as a calendar document
#[derive(Debug, Clone)]
pub struct CalendarEvent {
    pub uid: String,
    pub stamp: DateTime<Utc>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Escaped title
    pub summary: String,
    /// Escaped description, `None` when empty
    pub description: Option<String>,
}

impl CalendarEvent {
    /// Build an event stamped now with a fresh UID
    pub fn new(
        title: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        description: &str,
        uid_domain: &str,
    ) -> InviteResult<Self> {
        let start = start.ok_or_else(|| event_data_error("missing start instant"))?;
        let end = end.ok_or_else(|| event_data_error("missing end instant"))?;

        for instant in [&start, &end] {
            if !(0..=9999).contains(&instant.year()) {
                return Err(event_data_error(&format!(
                    "year {} does not fit the basic date format",
                    instant.year()
                )));
            }
        }

        let description = escape_calendar_text(description);

        Ok(CalendarEvent {
            uid: generate_uid(uid_domain),
            stamp: Utc::now(),
            start,
            end,
            summary: escape_calendar_text(title),
            description: (!description.is_empty()).then_some(description),
        })
    }

    /// Build an event from a decoded request
    pub fn from_request(request: &EventRequest, uid_domain: &str) -> InviteResult<Self> {
        Self::new(
            &request.title,
            Some(request.start),
            Some(request.end),
            &request.description,
            uid_domain,
        )
    }

    /// Render the calendar document, lines joined with CRLF
    pub fn to_ics(&self) -> String {
        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "PRODID:-//InviteDay//EN".to_string(),
            "CALSCALE:GREGORIAN".to_string(),
            "METHOD:PUBLISH".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", self.uid),
            format!("DTSTAMP:{}", basic_format(&self.stamp)),
            format!("DTSTART:{}", basic_format(&self.start)),
            format!("DTEND:{}", basic_format(&self.end)),
            format!("SUMMARY:{}", self.summary),
        ];

        if let Some(description) = &self.description {
            lines.push(format!("DESCRIPTION:{}", description));
        }

        // Reminder one day ahead
        lines.extend([
            "BEGIN:VALARM".to_string(),
            "TRIGGER:-P1D".to_string(),
            "ACTION:DISPLAY".to_string(),
            format!("DESCRIPTION:Reminder: {}", self.summary),
            "END:VALARM".to_string(),
            "END:VEVENT".to_string(),
            "END:VCALENDAR".to_string(),
        ]);

        lines.join("\r\n")
    }
}

/// Generate the calendar document for a decoded request
pub fn generate_ics(request: &EventRequest, uid_domain: &str) -> InviteResult<String> {
    let event = CalendarEvent::from_request(request, uid_domain)?;
    debug!("Generated calendar document {}", event.uid);
    Ok(event.to_ics())
}

/// Escape a TEXT value for SUMMARY and DESCRIPTION.
///
/// Backslash first, then `;`, `,` and newline; carriage returns are dropped.
pub fn escape_calendar_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Generate a unique `<millis>-<random>@<domain>` identifier
pub fn generate_uid(domain: &str) -> String {
    format!(
        "{}-{}@{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        domain
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn make_test_event(description: &str) -> CalendarEvent {
        CalendarEvent::new(
            "Team Sync",
            Some(Utc.with_ymd_and_hms(2025, 3, 10, 16, 0, 0).unwrap()),
            Some(Utc.with_ymd_and_hms(2025, 3, 10, 17, 0, 0).unwrap()),
            description,
            "inviteday.app",
        )
        .unwrap()
    }

    #[test]
    fn test_escape_calendar_text() {
        assert_eq!(
            escape_calendar_text("a;b,c\\d\ne"),
            "a\\;b\\,c\\\\d\\ne"
        );
        assert_eq!(escape_calendar_text("line1\r\nline2"), "line1\\nline2");
        assert_eq!(escape_calendar_text(""), "");
    }

    #[test]
    fn test_document_structure() {
        let mut event = make_test_event("Bring snacks, please");
        event.uid = "fixed@inviteday.app".to_string();
        event.stamp = Utc.with_ymd_and_hms(2025, 3, 1, 8, 5, 9).unwrap();

        let expected = [
            "BEGIN:VCALENDAR",
            "VERSION:2.0",
            "PRODID:-//InviteDay//EN",
            "CALSCALE:GREGORIAN",
            "METHOD:PUBLISH",
            "BEGIN:VEVENT",
            "UID:fixed@inviteday.app",
            "DTSTAMP:20250301T080509Z",
            "DTSTART:20250310T160000Z",
            "DTEND:20250310T170000Z",
            "SUMMARY:Team Sync",
            "DESCRIPTION:Bring snacks\\, please",
            "BEGIN:VALARM",
            "TRIGGER:-P1D",
            "ACTION:DISPLAY",
            "DESCRIPTION:Reminder: Team Sync",
            "END:VALARM",
            "END:VEVENT",
            "END:VCALENDAR",
        ]
        .join("\r\n");

        assert_eq!(event.to_ics(), expected);
    }

    #[test]
    fn test_empty_description_is_omitted() {
        let ics = make_test_event("").to_ics();
        let descriptions: Vec<&str> = ics
            .split("\r\n")
            .filter(|l| l.starts_with("DESCRIPTION"))
            .collect();
        assert_eq!(descriptions, vec!["DESCRIPTION:Reminder: Team Sync"]);
    }

    #[test]
    fn test_missing_instant_is_invalid() {
        let result = CalendarEvent::new(
            "Team Sync",
            None,
            Some(Utc.with_ymd_and_hms(2025, 3, 10, 17, 0, 0).unwrap()),
            "",
            "inviteday.app",
        );
        assert!(matches!(
            result,
            Err(crate::error::Error::InvalidEventData(_))
        ));
    }

    #[test]
    fn test_out_of_range_year_is_invalid() {
        let far = Utc.with_ymd_and_hms(12025, 1, 1, 0, 0, 0).unwrap();
        let result = CalendarEvent::new("x", Some(far), Some(far), "", "inviteday.app");
        assert!(result.is_err());
    }

    #[test]
    fn test_uids_do_not_repeat() {
        let uids: HashSet<String> = (0..1000).map(|_| generate_uid("inviteday.app")).collect();
        assert_eq!(uids.len(), 1000);
        assert!(uids.iter().all(|uid| uid.ends_with("@inviteday.app")));
    }
}
