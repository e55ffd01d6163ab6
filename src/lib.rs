pub mod config;
pub mod error;
pub mod queue;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::queue::QueueRegistry;
use crate::routes::proxy::Upstream;
use crate::state::{AppState, SharedState};

pub fn build_app(config: Config) -> (Router, SharedState) {
    let upstream = config.proxy.as_ref().and_then(|proxy| {
        match reqwest::Client::builder().timeout(proxy.timeout).build() {
            Ok(client) => {
                tracing::info!("Proxy forwarding to {}", proxy.backend_url);
                Some(Arc::new(Upstream {
                    client,
                    backend_url: proxy.backend_url.clone(),
                }))
            }
            Err(e) => {
                tracing::warn!("Proxy not available: {e}");
                None
            }
        }
    });

    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState {
        queues: QueueRegistry::with_max_courses(config.max_courses),
        config,
    });

    let mut app = Router::new().merge(routes::api_routes());
    if let Some(upstream) = upstream {
        app = app.merge(routes::proxy_routes(upstream));
    }

    let app = app
        .route("/health", axum::routing::get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                .layer(RequestBodyLimitLayer::new(max_body_size)),
        )
        .with_state(state.clone());

    (app, state)
}

async fn health() -> &'static str {
    "ok"
}
