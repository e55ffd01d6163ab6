pub mod entry;
pub mod registry;
pub mod store;

pub use entry::{EntryId, EntryView, Location, NewEntry, QueueEntry, Status, Topic};
pub use registry::QueueRegistry;
pub use store::QueueStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    Validation(String),
    NotFound(EntryId),
    /// The queue is not accepting new entries.
    Closed,
}

impl std::fmt::Display for QueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueError::Validation(msg) => write!(f, "{msg}"),
            QueueError::NotFound(id) => write!(f, "Entry {id} not found"),
            QueueError::Closed => write!(f, "Queue is not accepting new entries"),
        }
    }
}

impl std::error::Error for QueueError {}
