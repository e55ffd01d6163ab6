use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::error::AppError;
use crate::queue::QueueStore;
use crate::state::SharedState;

/// The queue a read operates on: the course named by a `{course}` path
/// segment, or the default queue when the route has none. Never registers a
/// course; an unknown one resolves to an empty store.
///
/// Handlers holding this may only call store methods that leave an empty
/// store untouched (reads, and id-addressed writes that fail as not found).
pub struct CourseQueue(pub Arc<QueueStore>);

/// Like [`CourseQueue`], but creates the course queue on first use.
pub struct CourseQueueMut(pub Arc<QueueStore>);

async fn course_param(parts: &mut Parts, state: &SharedState) -> Result<Option<String>, AppError> {
    let params = Option::<Path<HashMap<String, String>>>::from_request_parts(parts, state)
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;

    Ok(params.and_then(|Path(mut params)| params.remove("course")))
}

impl FromRequestParts<SharedState> for CourseQueue {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        match course_param(parts, state).await? {
            Some(course) => Ok(CourseQueue(state.queues.find(&course)?)),
            None => Ok(CourseQueue(state.queues.default_store())),
        }
    }
}

impl FromRequestParts<SharedState> for CourseQueueMut {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        match course_param(parts, state).await? {
            Some(course) => Ok(CourseQueueMut(state.queues.course(&course)?)),
            None => Ok(CourseQueueMut(state.queues.default_store())),
        }
    }
}
