//! Add-to-calendar deep links for Google, Outlook and webcal/ICS.

use crate::error::{link_error, InviteResult};
use crate::invite::params::EventRequest;
use crate::utils::time::basic_format;
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tracing::error;
use url::{form_urlencoded, Url};

pub const GOOGLE_BASE: &str = "https://calendar.google.com/calendar/render";
pub const OUTLOOK_BASE: &str = "https://outlook.live.com/calendar/0/deeplink/compose";

/// Google Calendar template link; dates are basic-format UTC joined by `/`
pub fn google_calendar_url(request: &EventRequest) -> InviteResult<String> {
    let dates = format!(
        "{}/{}",
        google_date(&request.start)?,
        google_date(&request.end)?
    );

    let url = Url::parse_with_params(
        GOOGLE_BASE,
        &[
            ("action", "TEMPLATE"),
            ("text", request.title.as_str()),
            ("dates", dates.as_str()),
            ("details", request.description.as_str()),
            ("ctz", request.timezone.as_str()),
        ],
    )
    .map_err(|e| link_error(&format!("Google Calendar URL: {}", e)))?;

    Ok(url.to_string())
}

/// Outlook compose link; start and end pass through as received
pub fn outlook_calendar_url(request: &EventRequest) -> InviteResult<String> {
    let url = Url::parse_with_params(
        OUTLOOK_BASE,
        &[
            ("path", "/calendar/action/compose"),
            ("rru", "addevent"),
            ("subject", request.title.as_str()),
            ("startdt", request.start_raw.as_str()),
            ("enddt", request.end_raw.as_str()),
            ("body", request.description.as_str()),
        ],
    )
    .map_err(|e| link_error(&format!("Outlook Calendar URL: {}", e)))?;

    Ok(url.to_string())
}

/// `webcal://` link to the generation service.
///
/// Literal `+` left in the encoded query is rewritten to `%2B` so the service
/// does not read it as a space.
pub fn webcal_url(request: &EventRequest, host: &str) -> InviteResult<String> {
    let query = generation_query(request).replace('+', "%2B");
    Ok(format!("webcal://{}/?{}", checked_host(host)?, query))
}

/// HTTPS download link to the generation service, query left as encoded
pub fn ics_download_url(request: &EventRequest, host: &str) -> InviteResult<String> {
    let query = generation_query(request);
    Ok(format!("https://{}/?{}", checked_host(host)?, query))
}

fn generation_query(request: &EventRequest) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("title", &request.title)
        .append_pair("start", &request.start_raw)
        .append_pair("end", &request.end_raw)
        .append_pair("desc", &request.description)
        .append_pair("tz", &request.timezone)
        .finish()
}

fn google_date(instant: &DateTime<Utc>) -> InviteResult<String> {
    if !(0..=9999).contains(&instant.year()) {
        return Err(link_error(&format!("year {} out of range", instant.year())));
    }
    Ok(basic_format(instant))
}

/// The host must stand alone as a URL authority
fn checked_host(host: &str) -> InviteResult<&str> {
    let parsed = Url::parse(&format!("https://{}/", host))
        .map_err(|e| link_error(&format!("invalid service host '{}': {}", host, e)))?;
    if host.is_empty() || host.contains(['/', '?', '#', '@']) || parsed.host().is_none() {
        return Err(link_error(&format!("invalid service host '{}'", host)));
    }
    Ok(host)
}

/// All provider links for one invitation; `None` means the link is unavailable
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProviderLinks {
    pub google: Option<String>,
    pub outlook: Option<String>,
    pub webcal: Option<String>,
    pub ics_download: Option<String>,
}

impl ProviderLinks {
    /// Run every encoder, logging and dropping the ones that fail
    pub fn for_request(request: &EventRequest, host: &str) -> Self {
        ProviderLinks {
            google: available("google", google_calendar_url(request)),
            outlook: available("outlook", outlook_calendar_url(request)),
            webcal: available("webcal", webcal_url(request, host)),
            ics_download: available("ics_download", ics_download_url(request, host)),
        }
    }
}

fn available(provider: &str, result: InviteResult<String>) -> Option<String> {
    match result {
        Ok(url) => Some(url),
        Err(e) => {
            error!("Error generating {} link: {}", provider, e);
            None
        }
    }
}
