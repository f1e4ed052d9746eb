use crate::params::stream::StreamParams;
use crate::{AppState, Error};
use async_stream::stream;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::sse::{Event, KeepAlive, Sse};
use domain::session::Session;
use futures::Stream;
use log::*;
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::sync::mpsc;

const LAST_EVENT_ID: &str = "last-event-id";

/// GET open a long-lived event stream
///
/// The session is authorized before any stream framing is written, so a rejected
/// consumer receives a plain 401 response. An authorized consumer stays registered
/// until it disconnects.
#[utoipa::path(
    get,
    path = "/events",
    params(
        StreamParams,
        ("Authorization" = Option<String>, Header, description = "Consumer token, bare or with a `Bearer ` prefix. Takes precedence over `jwt`."),
        ("Last-Event-ID" = Option<String>, Header, description = "Id of the last event received, to resume after a reconnect")
    ),
    responses(
        (status = 200, description = "An event stream of published messages", body = String, content_type = "text/event-stream"),
        (status = 401, description = "Missing or invalid token", body = String)
    ),
    security(
        ("jwt" = [])
    )
)]
pub(crate) async fn sse_handler(
    State(app_state): State<AppState>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    Query(params): Query<StreamParams>,
    headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, Error> {
    let session = Session {
        remote_addr,
        authorization: header_value(&headers, header::AUTHORIZATION.as_str())
            .map(str::to_string),
        jwt_query: params.jwt,
        last_event_id: header_value(&headers, LAST_EVENT_ID)
            .unwrap_or_default()
            .to_string(),
    };

    let subscription = app_state.authorizer.authorize(session)?;

    debug!(
        "Establishing SSE connection for {} on topics {:?}",
        subscription.client.remote_addr, subscription.topics
    );

    let (tx, mut rx) = mpsc::unbounded_channel();

    let guard = app_state
        .sse_manager
        .subscribe(subscription.topics, &subscription.resume_from, tx);

    // The guard lives as long as the stream; dropping the stream on disconnect unregisters it.
    let stream = stream! {
        let _guard = guard;
        while let Some(event) = rx.recv().await {
            yield event;
        }
        debug!("SSE connection closed for {remote_addr}");
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
