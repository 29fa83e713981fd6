//! View model of the invitation page.

use crate::components::remembered::RememberedAttendee;
use crate::components::rsvp::{RsvpEntry, RsvpStatus};
use crate::context::InviteContext;
use crate::error::Error;
use crate::invite::display::{format_event_date_time, DisplayLocale};
use crate::invite::links::ProviderLinks;
use crate::invite::params::{EventRequest, QueryParams};
use chrono::{DateTime, Utc};
use rust_i18n::t;
use serde::Serialize;
use tracing::{error, warn};

/// What the page shows: the event, or an explanation replacing it
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PageState {
    Ready(InviteView),
    Error { message: String, hint: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct InviteView {
    pub title: String,
    pub date: String,
    pub time: String,
    pub description: String,
    pub location: String,
    pub image_url: String,
    pub timezone: String,
    /// Full locale tag the page is rendered in
    pub locale: &'static str,
    pub links: ProviderLinks,
    pub rsvp: Option<RsvpView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RsvpView {
    pub event_id: String,
    /// Set when this client answered before; the form can be skipped
    pub remembered: Option<RememberedAttendee>,
    pub responses: Vec<ResponseView>,
    /// Responses could not be read; shown instead of the list
    pub unavailable_message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseView {
    pub attendee_name: String,
    pub status: RsvpStatus,
    pub status_label: String,
    pub created_at: DateTime<Utc>,
}

impl ResponseView {
    fn new(entry: RsvpEntry, locale: &DisplayLocale) -> Self {
        ResponseView {
            status_label: t!(entry.status.label_key(), locale = locale.code).to_string(),
            attendee_name: entry.attendee_name,
            status: entry.status,
            created_at: entry.created_at,
        }
    }
}

impl PageState {
    fn error(key: &str, locale: &DisplayLocale) -> Self {
        PageState::Error {
            message: t!(key, locale = locale.code).to_string(),
            hint: t!("error_hint", locale = locale.code).to_string(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PageState::Ready(_))
    }
}

/// Build the page for an invite link's query parameters.
///
/// `client_id` identifies the visiting browser; only its own remembered
/// attendee is shown.
pub async fn build_page(
    ctx: &InviteContext,
    params: &QueryParams,
    client_id: Option<&str>,
) -> PageState {
    let locale = ctx.locale(params.get("lang"));

    let request = match EventRequest::from_params(params) {
        Ok(request) => request,
        Err(e) => {
            warn!("Cannot render invite: {}", e);
            let key = match e {
                Error::MissingRequiredFields => "error_missing_fields",
                Error::UnparsableTimestamp(_) => "error_invalid_dates",
                _ => "error_generic",
            };
            return PageState::error(key, locale);
        }
    };

    let display = format_event_date_time(&request.start, &request.end, &request.timezone, locale);
    let links = ProviderLinks::for_request(&request, &ctx.config.ics_service_host);
    let rsvp = rsvp_view(ctx, &request, locale, client_id).await;

    PageState::Ready(InviteView {
        title: request.title,
        date: display.date,
        time: display.time,
        description: request.description,
        location: request.location,
        image_url: request.image_url,
        timezone: request.timezone,
        locale: locale.tag,
        links,
        rsvp,
    })
}

async fn rsvp_view(
    ctx: &InviteContext,
    request: &EventRequest,
    locale: &DisplayLocale,
    client_id: Option<&str>,
) -> Option<RsvpView> {
    if !request.rsvp_enabled {
        return None;
    }
    let Some(event_id) = request.event_id.as_deref() else {
        warn!("RSVP requested without an event id");
        return None;
    };
    let Some(store) = ctx.rsvp_store() else {
        warn!("RSVP requested for {} but no store is configured", event_id);
        return None;
    };

    let (responses, unavailable_message) = match store.list_public(event_id).await {
        Ok(entries) => (
            entries
                .into_iter()
                .map(|entry| ResponseView::new(entry, locale))
                .collect(),
            None,
        ),
        Err(e) => {
            error!("Failed to load RSVPs for {}: {}", event_id, e);
            (
                Vec::new(),
                Some(t!("rsvp_unavailable", locale = locale.code).to_string()),
            )
        }
    };

    Some(RsvpView {
        event_id: event_id.to_string(),
        remembered: ctx.remembered_attendee(client_id, event_id).await,
        responses,
        unavailable_message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::remembered::InMemoryRememberedStore;
    use crate::components::rsvp::{InMemoryRsvpStore, RsvpStore, RsvpSubmission};
    use crate::config::Config;
    use std::sync::Arc;

    const EVENT: &str = "title=Sauna+night&start=2025-03-10T18:00:00%2B02:00\
                         &end=2025-03-10T21:00:00%2B02:00&tz=Europe/Helsinki";

    #[tokio::test]
    async fn test_ready_page() {
        let ctx = InviteContext::new(Config::for_tests());
        let state = build_page(&ctx, &QueryParams::from_query(EVENT), None).await;

        let PageState::Ready(view) = state else {
            panic!("expected a ready page");
        };
        assert_eq!(view.title, "Sauna night");
        assert_eq!(view.date, "Monday, March 10, 2025");
        assert_eq!(view.time, "6:00 PM – 9:00 PM");
        assert_eq!(view.locale, "en-US");
        assert!(view.links.google.is_some());
        assert!(view.links.webcal.is_some());
        assert!(view.rsvp.is_none());
    }

    #[tokio::test]
    async fn test_missing_fields_page_is_localized() {
        let ctx = InviteContext::new(Config::for_tests());
        let state = build_page(&ctx, &QueryParams::from_query("title=x&lang=fi"), None).await;

        match state {
            PageState::Error { message, .. } => {
                assert_eq!(message, "Kutsulinkistä puuttuu tapahtuman tietoja.")
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparsable_dates_page() {
        let ctx = InviteContext::new(Config::for_tests());
        let params = QueryParams::from_query("start=soon&end=later");
        let state = build_page(&ctx, &params, None).await;

        match state {
            PageState::Error { message, .. } => assert_eq!(
                message,
                "This invite link contains a date or time we could not read."
            ),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rsvp_view() {
        let store = Arc::new(InMemoryRsvpStore::new());
        store
            .submit(&RsvpSubmission {
                event_id: "e1".to_string(),
                attendee_name: "Aino".to_string(),
                status: RsvpStatus::Yes,
                show_name: true,
                remember: false,
            })
            .await
            .unwrap();
        let ctx = InviteContext::new(Config::for_tests()).with_rsvp_store(store);

        let query = format!("{EVENT}&eventId=e1&rsvp=1");
        let state = build_page(&ctx, &QueryParams::from_query(&query), Some("c1")).await;
        let PageState::Ready(view) = state else {
            panic!("expected a ready page");
        };

        let rsvp = view.rsvp.expect("rsvp section");
        assert_eq!(rsvp.event_id, "e1");
        assert_eq!(rsvp.responses.len(), 1);
        assert_eq!(rsvp.responses[0].status_label, "Going");
        assert!(rsvp.remembered.is_none());
        assert!(rsvp.unavailable_message.is_none());
    }

    #[tokio::test]
    async fn test_private_answer_is_not_shown_to_other_clients() {
        let ctx = InviteContext::new(Config::for_tests())
            .with_rsvp_store(Arc::new(InMemoryRsvpStore::new()))
            .with_remembered_store(Arc::new(InMemoryRememberedStore::default()));
        ctx.submit_rsvp(
            &RsvpSubmission {
                event_id: "e1".to_string(),
                attendee_name: "Secret Sam".to_string(),
                status: RsvpStatus::No,
                show_name: false,
                remember: true,
            },
            Some("client-a"),
        )
        .await
        .unwrap();

        let params = QueryParams::from_query(&format!("{EVENT}&eventId=e1&rsvp=1"));

        let PageState::Ready(view) = build_page(&ctx, &params, Some("client-b")).await else {
            panic!("expected a ready page");
        };
        let rsvp = view.rsvp.expect("rsvp section");
        assert!(rsvp.responses.is_empty());
        assert!(rsvp.remembered.is_none());

        let PageState::Ready(view) = build_page(&ctx, &params, None).await else {
            panic!("expected a ready page");
        };
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("Secret Sam"));

        let PageState::Ready(view) = build_page(&ctx, &params, Some("client-a")).await else {
            panic!("expected a ready page");
        };
        assert_eq!(
            view.rsvp.and_then(|rsvp| rsvp.remembered).map(|a| a.name),
            Some("Secret Sam".to_string())
        );
    }
}
