use crate::params::publish::PublishParams;
use crate::{AppState, Error};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::IntoResponse;
use domain::api_key::check_api_key;
use log::*;
use sse::Message;

pub(crate) const X_API_KEY: &str = "x-api-key";

const APPLICATION_JSON: &str = "application/json";

/// POST publish a message to every consumer subscribed to its event's topic
///
/// The route accepts every method so this handler, rather than the router, answers
/// non-POST requests. Checks run in order and the first failure is returned.
#[utoipa::path(
    post,
    path = "/publish",
    request_body(content = PublishParams, content_type = "application/json"),
    responses(
        (status = 200, description = "Message handed to the broadcast transport; empty body"),
        (status = 400, description = "Content-Type is not application/json or the body is not a valid message", body = String),
        (status = 401, description = "Invalid API key", body = String),
        (status = 405, description = "Method not allowed", body = String)
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn publish(
    State(app_state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, Error> {
    if method != Method::POST {
        return Err(Error::MethodNotAllowed);
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    if content_type != Some(APPLICATION_JSON) {
        return Err(Error::BadContentType);
    }

    let api_key = headers
        .get(X_API_KEY)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !check_api_key(api_key, app_state.config.api_key()) {
        return Err(Error::Unauthorized("Invalid API key".to_string()));
    }

    let params = PublishParams::from_body(&body)?;
    let event_id = app_state.sse_manager.publish(Message::from(params))?;

    trace!("Published event {event_id}");

    Ok(StatusCode::OK)
}
