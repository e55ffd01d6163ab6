use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::{self, Stream};

use crate::queue::EntryView;
use crate::routes::extractor::CourseQueueMut;

/// Pushes the full queue snapshot on connect and again after every mutation.
///
/// Subscribing registers the course, so the stream observes its first join.
/// Bursts of writes may coalesce into a single event; each event is a complete
/// snapshot, so nothing is lost. Polling stays available alongside this stream.
pub async fn stream_queue(
    CourseQueueMut(queue): CourseQueueMut,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let revisions = queue.subscribe();
    tracing::debug!("Queue event subscriber connected");

    let events = stream::unfold(
        (queue, revisions, true),
        |(queue, mut revisions, first)| async move {
            if !first && revisions.changed().await.is_err() {
                return None;
            }
            revisions.borrow_and_update();

            let snapshot: Vec<EntryView> =
                queue.snapshot().into_iter().map(EntryView::from).collect();
            let event = Event::default().event("queue").json_data(&snapshot);
            Some((event, (queue, revisions, false)))
        },
    );

    Sse::new(events).keep_alive(KeepAlive::default())
}
