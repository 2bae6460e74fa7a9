use std::sync::Arc;

use crate::store::{StoreHandle, TableStore};

#[derive(Clone)]
pub struct AppState {
    pub store: StoreHandle,
}

impl AppState {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    pub fn with_store(store: Arc<dyn TableStore>) -> Self {
        Self::new(StoreHandle::ready(store))
    }
}
