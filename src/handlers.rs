use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, warn};

use crate::components::delivery::{select_strategy, Delivery};
use crate::components::remembered::CLIENT_ID_HEADER;
use crate::components::rsvp::{RsvpEntry, RsvpSubmission};
use crate::context::InviteContext;
use crate::error::Error;
use crate::invite::ics::{generate_ics, CONTENT_TYPE, FILENAME};
use crate::invite::page::build_page;
use crate::invite::params::{EventRequest, QueryParams};

/// Converts application errors into plain-text HTTP responses
pub struct AppError(Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = if self.0.is_client_error() {
            (StatusCode::BAD_REQUEST, self.0.to_string())
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error generating calendar file: {}", self.0),
            )
        };
        (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

fn parse_request(query: Option<String>) -> Result<EventRequest, AppError> {
    let params = QueryParams::from_query(query.as_deref().unwrap_or_default());
    EventRequest::from_params(&params).map_err(|e| {
        warn!("Rejected calendar request: {}", e);
        AppError(e)
    })
}

/// The browser's own id, sent by the page script with RSVP requests
fn client_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CLIENT_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

/// Handler for the calendar generation endpoint
pub async fn generate_handler(
    State(ctx): State<InviteContext>,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let request = parse_request(query)?;
    let document = generate_ics(&request, &ctx.config.uid_domain).map_err(|e| {
        error!("Error generating calendar file: {}", e);
        AppError(e)
    })?;

    info!("Serving calendar document for '{}'", request.title);

    Ok((
        [
            (header::CONTENT_TYPE, CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", FILENAME),
            ),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        document,
    )
        .into_response())
}

/// Handler for CORS preflight on the generation endpoint
pub async fn preflight_handler() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

/// Handler building the document locally and delivering it for the client's platform
pub async fn device_handler(
    State(ctx): State<InviteContext>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    let request = parse_request(query)?;
    let document = generate_ics(&request, &ctx.config.uid_domain)?;

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let strategy = select_strategy(user_agent);
    info!("Delivering calendar document via {}", strategy.name());

    let response = match strategy.deliver(&document) {
        Delivery::Attachment {
            filename,
            content_type,
            body,
        } => (
            [
                (header::CONTENT_TYPE, content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ],
            body,
        )
            .into_response(),
        delivery @ Delivery::DataUri { .. } => Json(delivery).into_response(),
    };

    Ok(response)
}

/// Handler for the invitation page view model
pub async fn invite_handler(
    State(ctx): State<InviteContext>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let params = QueryParams::from_query(query.as_deref().unwrap_or_default());
    let state = build_page(&ctx, &params, client_id(&headers)).await;

    let status = if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(state)).into_response()
}

/// Handler for RSVP submissions
pub async fn submit_rsvp_handler(
    State(ctx): State<InviteContext>,
    headers: HeaderMap,
    Json(submission): Json<RsvpSubmission>,
) -> Result<StatusCode, Response> {
    if ctx.rsvp_store().is_none() {
        return Err(rsvp_disabled());
    }

    ctx.submit_rsvp(&submission, client_id(&headers)).await.map_err(|e| {
        error!("RSVP submission failed: {}", e);
        rsvp_error(e)
    })?;

    Ok(StatusCode::CREATED)
}

/// Handler listing public RSVP responses for an event
pub async fn list_rsvps_handler(
    State(ctx): State<InviteContext>,
    Path(event_id): Path<String>,
) -> Result<Json<Vec<RsvpEntry>>, Response> {
    let store = ctx.rsvp_store().ok_or_else(rsvp_disabled)?;

    let entries = store.list_public(&event_id).await.map_err(|e| {
        error!("Failed to list RSVPs for {}: {}", event_id, e);
        rsvp_error(e)
    })?;

    Ok(Json(entries))
}

/// RSVP failures: bad submissions are the caller's, store failures are upstream
fn rsvp_error(err: Error) -> Response {
    let status = match err {
        Error::InvalidEventData(_) => StatusCode::BAD_REQUEST,
        Error::NetworkFailure(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, [(header::CONTENT_TYPE, "text/plain")], err.to_string()).into_response()
}

fn rsvp_disabled() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        [(header::CONTENT_TYPE, "text/plain")],
        "RSVP is not enabled on this server",
    )
        .into_response()
}

/// Handler for health checks
pub async fn health_handler() -> impl IntoResponse {
    "OK"
}
