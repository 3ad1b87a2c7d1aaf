use std::sync::Arc;

use threadline_persist::ThreadActions;

use crate::cache::ResponseCache;
use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The response cache is also the revalidator `actions` reports writes to.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub actions: ThreadActions,
    pub cache: Arc<ResponseCache>,
}

impl AppState {
    pub fn new(config: Config, actions: ThreadActions, cache: Arc<ResponseCache>) -> Self {
        Self {
            config: Arc::new(config),
            actions,
            cache,
        }
    }
}
