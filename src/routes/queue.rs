use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::queue::{EntryId, EntryView, NewEntry, Status};
use crate::routes::extractor::{CourseQueue, CourseQueueMut};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct AddRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub id: EntryId,
    #[serde(default)]
    pub status: String,
}

#[derive(Deserialize)]
pub struct RemoveRequest {
    pub id: EntryId,
}

#[derive(Deserialize)]
pub struct AcceptingRequest {
    pub accepting: bool,
}

#[derive(Deserialize)]
pub struct SpotPath {
    pub id: String,
}

pub async fn add(
    CourseQueueMut(queue): CourseQueueMut,
    payload: Result<Json<AddRequest>, JsonRejection>,
) -> Result<Json<EntryId>, AppError> {
    let Json(req) = payload?;
    let new = NewEntry::parse(&req.name, &req.section, &req.topic, &req.location)?;
    let id = queue.add(new)?;
    Ok(Json(id))
}

pub async fn get_queue(CourseQueue(queue): CourseQueue) -> Json<Vec<EntryView>> {
    let entries: Vec<EntryView> = queue.snapshot().into_iter().map(EntryView::from).collect();
    tracing::debug!("Serving queue snapshot ({} entries)", entries.len());
    Json(entries)
}

pub async fn get_queue_spot(
    CourseQueue(queue): CourseQueue,
    Path(path): Path<SpotPath>,
) -> Result<Json<usize>, AppError> {
    let id: EntryId = path.id.parse()?;
    Ok(Json(queue.position(id)?))
}

pub async fn get_queue_length(CourseQueue(queue): CourseQueue) -> Json<usize> {
    Json(queue.waiting_len())
}

pub async fn next(CourseQueue(queue): CourseQueue) -> Json<Option<EntryView>> {
    Json(queue.next_waiting().map(EntryView::from))
}

pub async fn update_status(
    CourseQueue(queue): CourseQueue,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(req) = payload?;
    let status: Status = req.status.parse()?;
    queue.update_status(req.id, status)?;
    Ok(Json(json!({ "message": "Status updated" })))
}

pub async fn remove(
    CourseQueue(queue): CourseQueue,
    payload: Result<Json<RemoveRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(req) = payload?;
    queue.remove(req.id)?;
    Ok(Json(json!({ "message": "Removed" })))
}

pub async fn clear(CourseQueueMut(queue): CourseQueueMut) -> Json<serde_json::Value> {
    let cleared = queue.clear();
    Json(json!({ "message": "Cleared", "cleared": cleared }))
}

pub async fn get_accepting(CourseQueue(queue): CourseQueue) -> Json<serde_json::Value> {
    Json(json!({ "accepting": queue.is_accepting() }))
}

pub async fn set_accepting(
    CourseQueueMut(queue): CourseQueueMut,
    payload: Result<Json<AcceptingRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(req) = payload?;
    queue.set_accepting(req.accepting);
    Ok(Json(json!({ "accepting": req.accepting })))
}

pub async fn client_config(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({ "pollIntervalMs": state.config.poll_interval_ms }))
}
