use std::sync::Arc;

use crate::config::Config;
use crate::queue::QueueRegistry;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub queues: QueueRegistry,
}
