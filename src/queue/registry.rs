use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::store::QueueStore;
use super::QueueError;

const MAX_COURSE_LEN: usize = 64;
pub const DEFAULT_MAX_COURSES: usize = 256;

/// Holds the default queue plus one queue per course slug.
///
/// Course queues are created by the first write; reads of an unknown course
/// see `vacant`, an always-empty store that only read paths ever receive.
pub struct QueueRegistry {
    default: Arc<QueueStore>,
    vacant: Arc<QueueStore>,
    courses: DashMap<String, Arc<QueueStore>>,
    created: AtomicUsize,
    max_courses: usize,
}

impl QueueRegistry {
    pub fn new() -> Self {
        Self::with_max_courses(DEFAULT_MAX_COURSES)
    }

    pub fn with_max_courses(max_courses: usize) -> Self {
        Self {
            default: Arc::new(QueueStore::new()),
            vacant: Arc::new(QueueStore::new()),
            courses: DashMap::new(),
            created: AtomicUsize::new(0),
            max_courses,
        }
    }

    pub fn default_store(&self) -> Arc<QueueStore> {
        self.default.clone()
    }

    /// Looks up `course` without registering it. Unknown courses read as empty.
    pub fn find(&self, course: &str) -> Result<Arc<QueueStore>, QueueError> {
        validate_course(course)?;

        Ok(self
            .courses
            .get(course)
            .map(|store| store.clone())
            .unwrap_or_else(|| self.vacant.clone()))
    }

    /// Returns the store for `course`, creating it on first use.
    pub fn course(&self, course: &str) -> Result<Arc<QueueStore>, QueueError> {
        validate_course(course)?;

        match self.courses.entry(course.to_string()) {
            Entry::Occupied(existing) => Ok(existing.get().clone()),
            Entry::Vacant(slot) => {
                // Counted separately: `DashMap::len` would lock the shard this entry holds.
                let reserved = self
                    .created
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                        (n < self.max_courses).then_some(n + 1)
                    })
                    .is_ok();
                if !reserved {
                    return Err(QueueError::Validation(format!(
                        "Course limit reached ({} courses)",
                        self.max_courses
                    )));
                }

                tracing::info!("Created queue for course '{course}'");
                let store = Arc::new(QueueStore::new());
                slot.insert(store.clone());
                Ok(store)
            }
        }
    }

    pub fn course_count(&self) -> usize {
        self.courses.len()
    }
}

impl Default for QueueRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_course(course: &str) -> Result<(), QueueError> {
    let valid = !course.is_empty()
        && course.len() <= MAX_COURSE_LEN
        && course
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(QueueError::Validation(format!("Invalid course: '{course}'")))
    }
}
