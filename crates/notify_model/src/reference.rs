use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Selector for objects that may live in another namespace.
///
/// Used both by alerts (to select event sources) and receivers (to name the
/// resources whose reconciliation should be requested).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CrossNamespaceObjectReference {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    pub kind: String,
    /// Object name, or `"*"` to match every object of the kind.
    pub name: String,
    /// Defaults to the referring object's namespace when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
}
