use std::sync::Arc;

use crate::config::Config;
use crate::storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Arc<Storage>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let storage = Storage::new(config.storage.base_folder.clone());
        AppState {
            config: Arc::new(config),
            storage: Arc::new(storage),
        }
    }
}
