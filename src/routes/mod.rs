pub mod events;
pub mod extractor;
pub mod proxy;
pub mod queue;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::routes::proxy::Upstream;
use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .nest("/api/queue", queue_routes())
        .nest("/api/courses/{course}/queue", queue_routes())
        .route("/api/client-config", get(queue::client_config))
}

/// Queue contract, mounted once for the default queue and once per course.
fn queue_routes() -> Router<SharedState> {
    Router::new()
        .route("/add", post(queue::add))
        .route("/getQueue", get(queue::get_queue))
        .route("/getQueueSpot/{id}", get(queue::get_queue_spot))
        .route("/getQueueLength", get(queue::get_queue_length))
        .route("/next", get(queue::next))
        .route("/updateStatus", post(queue::update_status))
        .route("/remove", post(queue::remove))
        .route("/clear", post(queue::clear))
        .route(
            "/accepting",
            get(queue::get_accepting).post(queue::set_accepting),
        )
        .route("/events", get(events::stream_queue))
}

pub fn proxy_routes(upstream: Arc<Upstream>) -> Router<SharedState> {
    let forward = || {
        get(proxy::forward)
            .post(proxy::forward)
            .put(proxy::forward)
            .patch(proxy::forward)
            .delete(proxy::forward)
    };

    // `{*path}` does not match an empty tail, so the backend root needs its own route.
    Router::new()
        .route("/proxy/", forward())
        .route("/proxy/{*path}", forward())
        .with_state(upstream)
}
