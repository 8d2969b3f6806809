use std::sync::Arc;

use notify_store::ObjectStore;

use crate::matcher::ExclusionCache;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub no_cross_namespace_refs: bool,
    pub(crate) exclusions: Arc<ExclusionCache>,
}

impl AppState {
    pub fn new(store: Arc<dyn ObjectStore>, no_cross_namespace_refs: bool) -> Self {
        Self {
            store,
            no_cross_namespace_refs,
            exclusions: Arc::new(ExclusionCache::default()),
        }
    }
}
