use std::sync::Arc;

use tokio::sync::Mutex;

use crate::catalog::ErrorCatalog;

pub type SharedCatalog = Arc<Mutex<ErrorCatalog>>;

#[derive(Clone)]
pub struct AppState {
    pub catalog: SharedCatalog,
    pub page_size: usize,
}

impl AppState {
    pub fn new(catalog: ErrorCatalog, page_size: usize) -> Self {
        Self {
            catalog: Arc::new(Mutex::new(catalog)),
            page_size,
        }
    }
}
