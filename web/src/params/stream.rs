use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters accepted by the event stream endpoint.
///
/// # Fields
///
/// * `jwt` - Consumer token, used only when no `Authorization` header is sent. This is how
///   browser `EventSource` clients, which cannot set headers, authenticate.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct StreamParams {
    pub(crate) jwt: Option<String>,
}
