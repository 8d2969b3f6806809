use notify_model::NamespacedName;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} {name} not found")]
    NotFound {
        kind: &'static str,
        name: NamespacedName,
    },

    #[error("store request failed: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, name: &NamespacedName) -> Self {
        StoreError::NotFound {
            kind,
            name: name.clone(),
        }
    }
}
