//! Query-string decoding into a validated [`EventRequest`].

use crate::error::{Error, InviteResult};
use crate::utils::time::parse_instant;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Title used when the invite link carries none
pub const DEFAULT_TITLE: &str = "Untitled Event";

/// Timezone used when the invite link carries none
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Query parameters as a browser's `URLSearchParams` would expose them
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    values: HashMap<String, String>,
}

impl QueryParams {
    /// Parse a raw query string (without the leading `?`).
    ///
    /// Standard form decoding applies: `+` becomes a space and `%XX` escapes
    /// are resolved. The first occurrence of a key wins.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut values = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            values
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
        Self { values }
    }

    /// Get a parameter, treating empty values as absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = HashMap::new();
        for (key, value) in iter {
            values.entry(key.into()).or_insert_with(|| value.into());
        }
        Self { values }
    }
}

/// A decoded, validated invitation
#[derive(Debug, Clone, Serialize)]
pub struct EventRequest {
    pub title: String,
    /// Start value as received, after offset repair
    pub start_raw: String,
    /// End value as received, after offset repair
    pub end_raw: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub description: String,
    pub location: String,
    /// IANA zone name, not validated here
    pub timezone: String,
    pub image_url: String,
    pub event_id: Option<String>,
    pub rsvp_enabled: bool,
    /// Requested language code
    pub lang: Option<String>,
}

impl EventRequest {
    /// Decode and validate an invitation from query parameters.
    ///
    /// Fails with `MissingRequiredFields` when `start` or `end` is absent and
    /// with `UnparsableTimestamp` when either cannot be parsed.
    pub fn from_params(params: &QueryParams) -> InviteResult<Self> {
        let (start_raw, end_raw) = match (params.get("start"), params.get("end")) {
            (Some(start), Some(end)) => (repair_offset(start), repair_offset(end)),
            _ => return Err(Error::MissingRequiredFields),
        };

        let start = parse_instant(&start_raw)?;
        let end = parse_instant(&end_raw)?;

        if end < start {
            // Permissive on purpose; surfaced only in the logs
            warn!("Event ends ({}) before it starts ({})", end_raw, start_raw);
        }

        let title = text_param(params, "title");
        let title = if title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            title
        };

        Ok(EventRequest {
            title,
            start_raw,
            end_raw,
            start,
            end,
            description: text_param(params, "desc"),
            location: text_param(params, "location"),
            timezone: params
                .get("tz")
                .unwrap_or(DEFAULT_TIMEZONE)
                .to_string(),
            image_url: params.get("img").unwrap_or_default().to_string(),
            event_id: params.get("eventId").map(str::to_string),
            rsvp_enabled: params.get("rsvp") == Some("1"),
            lang: params.get("lang").map(str::to_string),
        })
    }
}

fn text_param(params: &QueryParams, key: &str) -> String {
    params.get(key).map(decode_param).unwrap_or_default()
}

/// Decode a free-text value: `+` to space, then percent-decoding.
///
/// A malformed escape or invalid UTF-8 leaves the input untouched, so an
/// already-decoded value survives a second pass.
pub fn decode_param(value: &str) -> String {
    let spaced = value.replace('+', " ");
    if !has_valid_escapes(&spaced) {
        debug!("Malformed escape in '{}', keeping raw value", value);
        return value.to_string();
    }
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            debug!("Could not decode '{}': {}", value, e);
            value.to_string()
        }
    }
}

/// Every `%` must start a two-digit hex escape
fn has_valid_escapes(value: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match bytes.get(i + 1..i + 3) {
                Some(pair) if pair.iter().all(u8::is_ascii_hexdigit) => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}

/// Restore a `+HH:MM` offset that URL decoding turned into a space.
///
/// `2025-11-23T21:16:00 02:00` becomes `2025-11-23T21:16:00+02:00`; any
/// other value is returned unchanged.
pub fn repair_offset(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() < 14 {
        return value.to_string();
    }

    // <2 digits>:<2 digits>:<2 digits><space><2 digits>:<2 digits>
    let tail = &bytes[bytes.len() - 14..];
    let matches = tail.iter().enumerate().all(|(i, b)| match i {
        2 | 5 | 11 => *b == b':',
        8 => *b == b' ',
        _ => b.is_ascii_digit(),
    });

    if matches {
        let split = value.len() - 6;
        format!("{}+{}", &value[..split], &value[split + 1..])
    } else {
        value.to_string()
    }
}
