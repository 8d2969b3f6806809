use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::meta::{LocalObjectReference, ObjectMeta};
use crate::reference::CrossNamespaceObjectReference;
use crate::status::Condition;

pub const WEBHOOK_PATH_PREFIX: &str = "/hook/";

/// The set of supported inbound webhook senders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReceiverKind {
    Generic,
    #[serde(rename = "generic-hmac")]
    GenericHmac,
    #[serde(rename = "github")]
    GitHub,
    #[serde(rename = "gitlab")]
    GitLab,
    Bitbucket,
    Harbor,
    #[serde(rename = "dockerhub")]
    DockerHub,
    Quay,
    Gcr,
    Nexus,
    Acr,
}

impl ReceiverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiverKind::Generic => "generic",
            ReceiverKind::GenericHmac => "generic-hmac",
            ReceiverKind::GitHub => "github",
            ReceiverKind::GitLab => "gitlab",
            ReceiverKind::Bitbucket => "bitbucket",
            ReceiverKind::Harbor => "harbor",
            ReceiverKind::DockerHub => "dockerhub",
            ReceiverKind::Quay => "quay",
            ReceiverKind::Gcr => "gcr",
            ReceiverKind::Nexus => "nexus",
            ReceiverKind::Acr => "acr",
        }
    }
}

impl fmt::Display for ReceiverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReceiverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown receiver type `{s}`"))
    }
}

/// Declarative description of an inbound webhook endpoint that authenticates
/// external calls and requests reconciliation of the referenced resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receiver {
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: ReceiverSpec,
    #[serde(default)]
    pub status: ReceiverStatus,
}

impl Receiver {
    /// Derive the incoming webhook path for the given token.
    ///
    /// The digest is `sha256(token ∥ name ∥ namespace)`, so rotating the
    /// token rotates the path.
    pub fn webhook_path(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hasher.update(self.metadata.name.as_bytes());
        hasher.update(self.metadata.namespace.as_bytes());
        format!("{WEBHOOK_PATH_PREFIX}{}", hex::encode(hasher.finalize()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiverSpec {
    #[serde(rename = "type")]
    pub kind: ReceiverKind,
    /// Reconciliation cadence, consumed by the external reconciler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    /// Hook event types to handle; empty admits every event type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
    /// Resources whose reconciliation is requested on a valid hook.
    pub resources: Vec<CrossNamespaceObjectReference>,
    /// Secret holding the payload validation token under the `token` key.
    pub secret_ref: LocalObjectReference,
    #[serde(default)]
    pub suspend: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReceiverStatus {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    /// Deprecated mirror of `webhook_path`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub webhook_path: String,
    pub observed_generation: i64,
}
