use crate::controller::{health_check_controller, publish_controller};
use crate::params::publish::PublishParams;
use crate::stream::handler;
use crate::AppState;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::{
    routing::{any, get},
    Router,
};
use log::*;
use tower_http::cors::CorsLayer;

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "SSE Relay API"
        ),
        paths(
            publish_controller::publish,
            handler::sse_handler,
            health_check_controller::health_check,
        ),
        components(
            schemas(
                PublishParams,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "sse_relay", description = "Authenticated publish/subscribe relay over Server-Sent Events")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Producers authenticate with a static API key, consumers with a signed token.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "X-API-KEY",
                    "Producer API key configured with API_KEY",
                ))),
            );
            components.add_security_scheme(
                "jwt",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "Token signed with JWT_SECRET_KEY; may instead be passed as the `jwt` query parameter",
                ))),
            );
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config.allowed_origins);

    let router = Router::new()
        .merge(relay_routes(app_state))
        .merge(health_routes())
        .merge(
            RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"),
        );

    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

fn relay_routes(app_state: AppState) -> Router {
    let publish_path = app_state.config.publish_path.clone();
    let sse_path = app_state.config.sse_path.clone();

    Router::new()
        // Every method is routed so the handler can answer non-POST with its own 405 body.
        .route(&publish_path, any(publish_controller::publish))
        .route(&sse_path, get(handler::sse_handler))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
    if allowed_origins.is_empty() {
        return None;
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin:?}");
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([
                AUTHORIZATION,
                CONTENT_TYPE,
                HeaderName::from_static(publish_controller::X_API_KEY),
                HeaderName::from_static("last-event-id"),
            ]),
    )
}
