use serde::{Deserialize, Serialize};

use crate::event::Severity;
use crate::meta::{LocalObjectReference, ObjectMeta};
use crate::reference::CrossNamespaceObjectReference;
use crate::status::Condition;

/// Declarative rule selecting events and routing them to a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: AlertSpec,
    #[serde(default)]
    pub status: AlertStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSpec {
    /// Provider this alert routes to, resolved in the alert's namespace.
    pub provider_ref: LocalObjectReference,
    pub event_sources: Vec<CrossNamespaceObjectReference>,
    /// `info` admits every severity; `error` and `trace` match exactly.
    #[serde(default)]
    pub event_severity: Severity,
    /// Regular expressions matched against the event message. A match
    /// excludes the event from this alert.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusion_list: Vec<String>,
    /// Injected into outgoing metadata under the `summary` key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub suspend: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertStatus {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    pub observed_generation: i64,
}
