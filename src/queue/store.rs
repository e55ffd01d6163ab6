use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::entry::{EntryId, NewEntry, QueueEntry, Status};
use super::QueueError;

/// Authoritative ordered queue for one session.
///
/// Every operation takes the lock exactly once, so each call is atomic: readers
/// see either none or all of a concurrent mutation. Nothing under the lock
/// performs I/O.
pub struct QueueStore {
    inner: RwLock<Inner>,
    revision: watch::Sender<u64>,
}

struct Inner {
    /// Insertion order is queue order.
    entries: Vec<QueueEntry>,
    next_id: u64,
    last_joined_at: Option<DateTime<Utc>>,
    accepting: bool,
}

impl QueueStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: RwLock::new(Inner {
                entries: Vec::new(),
                next_id: 1,
                last_joined_at: None,
                accepting: true,
            }),
            revision,
        }
    }

    /// Appends a new waiting entry and returns its id.
    pub fn add(&self, new: NewEntry) -> Result<EntryId, QueueError> {
        let id = {
            let mut inner = self.write();
            if !inner.accepting {
                return Err(QueueError::Closed);
            }

            let id = EntryId(inner.next_id);
            inner.next_id += 1;

            // Wall clock may step backwards; joinedAt must not.
            let now = Utc::now();
            let joined_at = match inner.last_joined_at {
                Some(last) if last > now => last,
                _ => now,
            };
            inner.last_joined_at = Some(joined_at);

            inner.entries.push(QueueEntry {
                id,
                name: new.name,
                section: new.section,
                topic: new.topic,
                location: new.location,
                joined_at,
                status: Status::Queue,
            });
            id
        };

        self.bump();
        tracing::info!("Entry {id} joined the queue");
        Ok(id)
    }

    /// Snapshot of every entry, in queue order, regardless of status.
    pub fn snapshot(&self) -> Vec<QueueEntry> {
        self.read().entries.clone()
    }

    /// Number of waiting entries that joined before `id`.
    ///
    /// For a waiting entry this is its zero-based rank among waiting entries.
    /// Entries already in progress or done do not count against anyone.
    pub fn position(&self, id: EntryId) -> Result<usize, QueueError> {
        let inner = self.read();
        let index = inner
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(QueueError::NotFound(id))?;

        Ok(inner.entries[..index]
            .iter()
            .filter(|e| e.status.is_waiting())
            .count())
    }

    /// Number of entries still waiting (status `Queue`).
    pub fn waiting_len(&self) -> usize {
        self.read()
            .entries
            .iter()
            .filter(|e| e.status.is_waiting())
            .count()
    }

    /// The least recently joined entry that is still waiting.
    pub fn next_waiting(&self) -> Option<QueueEntry> {
        self.read()
            .entries
            .iter()
            .find(|e| e.status.is_waiting())
            .cloned()
    }

    /// Overwrites the status in place. Any transition is allowed, including backwards.
    pub fn update_status(&self, id: EntryId, status: Status) -> Result<(), QueueError> {
        {
            let mut inner = self.write();
            let entry = inner
                .entries
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or(QueueError::NotFound(id))?;
            entry.status = status;
        }

        self.bump();
        tracing::info!("Entry {id} status set to {}", status.as_str());
        Ok(())
    }

    pub fn remove(&self, id: EntryId) -> Result<QueueEntry, QueueError> {
        let removed = {
            let mut inner = self.write();
            let index = inner
                .entries
                .iter()
                .position(|e| e.id == id)
                .ok_or(QueueError::NotFound(id))?;
            inner.entries.remove(index)
        };

        self.bump();
        tracing::info!("Entry {id} removed from the queue");
        Ok(removed)
    }

    /// Drops every entry. Ids keep counting from where they were.
    pub fn clear(&self) -> usize {
        let cleared = {
            let mut inner = self.write();
            let cleared = inner.entries.len();
            inner.entries.clear();
            cleared
        };

        self.bump();
        tracing::info!("Queue cleared ({cleared} entries)");
        cleared
    }

    pub fn is_accepting(&self) -> bool {
        self.read().accepting
    }

    pub fn set_accepting(&self, accepting: bool) {
        let changed = {
            let mut inner = self.write();
            std::mem::replace(&mut inner.accepting, accepting) != accepting
        };

        if changed {
            self.bump();
            tracing::info!(
                "Queue is {} new entries",
                if accepting { "accepting" } else { "no longer accepting" }
            );
        }
    }

    /// Receiver that observes a new revision after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    // A panic while holding the lock cannot leave `Inner` half-written: every
    // mutation above is a single push, assignment or remove.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for QueueStore {
    fn default() -> Self {
        Self::new()
    }
}
