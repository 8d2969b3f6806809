use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use notify_model::{
    Alert, CrossNamespaceObjectReference, NamespacedName, Provider, Receiver, ReceiverStatus,
    Secret,
};

use crate::{ObjectStore, StoreError, RECONCILE_REQUEST_ANNOTATION};

/// Seed document for a [`MemoryStore`], loadable from a JSON file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSeed {
    pub alerts: Vec<Alert>,
    pub providers: Vec<Provider>,
    pub receivers: Vec<Receiver>,
    pub secrets: Vec<Secret>,
    pub objects: Vec<SeedObject>,
}

/// A live in-cluster object the matcher may label-select against.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedObject {
    pub kind: String,
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

#[derive(Default)]
struct Inner {
    alerts: Vec<Alert>,
    receivers: Vec<Receiver>,
    providers: HashMap<NamespacedName, Provider>,
    secrets: HashMap<NamespacedName, Secret>,
    objects: HashMap<(String, NamespacedName), BTreeMap<String, String>>,
    annotations: HashMap<(String, NamespacedName), BTreeMap<String, String>>,
}

/// Map-backed [`ObjectStore`] for tests and standalone runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: StoreSeed) -> Self {
        let mut inner = Inner {
            alerts: seed.alerts,
            receivers: seed.receivers,
            ..Default::default()
        };
        for provider in seed.providers {
            inner
                .providers
                .insert(provider.metadata.namespaced_name(), provider);
        }
        for secret in seed.secrets {
            inner
                .secrets
                .insert(secret.metadata.namespaced_name(), secret);
        }
        for object in seed.objects {
            inner.objects.insert(
                (
                    object.kind,
                    NamespacedName::new(object.namespace, object.name),
                ),
                object.labels,
            );
        }
        Self {
            inner: RwLock::new(inner),
        }
    }

    pub async fn insert_alert(&self, alert: Alert) {
        self.inner.write().await.alerts.push(alert);
    }

    pub async fn insert_receiver(&self, receiver: Receiver) {
        self.inner.write().await.receivers.push(receiver);
    }

    pub async fn insert_provider(&self, provider: Provider) {
        self.inner
            .write()
            .await
            .providers
            .insert(provider.metadata.namespaced_name(), provider);
    }

    pub async fn insert_secret(&self, secret: Secret) {
        self.inner
            .write()
            .await
            .secrets
            .insert(secret.metadata.namespaced_name(), secret);
    }

    pub async fn insert_object_labels(
        &self,
        kind: &str,
        name: NamespacedName,
        labels: BTreeMap<String, String>,
    ) {
        self.inner
            .write()
            .await
            .objects
            .insert((kind.to_string(), name), labels);
    }

    /// Annotation last written on the referenced object, if any.
    pub async fn annotation_of(
        &self,
        kind: &str,
        name: &NamespacedName,
        key: &str,
    ) -> Option<String> {
        self.inner
            .read()
            .await
            .annotations
            .get(&(kind.to_string(), name.clone()))
            .and_then(|set| set.get(key).cloned())
    }

    pub async fn receiver_status(&self, name: &NamespacedName) -> Option<ReceiverStatus> {
        self.inner
            .read()
            .await
            .receivers
            .iter()
            .find(|r| &r.metadata.namespaced_name() == name)
            .map(|r| r.status.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_alerts(&self) -> Result<Vec<Alert>, StoreError> {
        Ok(self.inner.read().await.alerts.clone())
    }

    async fn list_receivers(&self) -> Result<Vec<Receiver>, StoreError> {
        Ok(self.inner.read().await.receivers.clone())
    }

    async fn get_provider(&self, name: &NamespacedName) -> Result<Provider, StoreError> {
        self.inner
            .read()
            .await
            .providers
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Provider", name))
    }

    async fn get_secret(&self, name: &NamespacedName) -> Result<Secret, StoreError> {
        self.inner
            .read()
            .await
            .secrets
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Secret", name))
    }

    async fn get_labels(
        &self,
        kind: &str,
        name: &NamespacedName,
    ) -> Result<BTreeMap<String, String>, StoreError> {
        self.inner
            .read()
            .await
            .objects
            .get(&(kind.to_string(), name.clone()))
            .cloned()
            .ok_or_else(|| StoreError::not_found("object", name))
    }

    async fn request_reconcile(
        &self,
        reference: &CrossNamespaceObjectReference,
        fallback_namespace: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let namespace = if reference.namespace.is_empty() {
            fallback_namespace
        } else {
            &reference.namespace
        };
        let key = (
            reference.kind.clone(),
            NamespacedName::new(namespace, reference.name.clone()),
        );
        self.inner
            .write()
            .await
            .annotations
            .entry(key)
            .or_default()
            .insert(RECONCILE_REQUEST_ANNOTATION.to_string(), at.to_rfc3339());
        Ok(())
    }

    async fn patch_receiver_status(
        &self,
        name: &NamespacedName,
        status: ReceiverStatus,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let receiver = inner
            .receivers
            .iter_mut()
            .find(|r| &r.metadata.namespaced_name() == name)
            .ok_or_else(|| StoreError::not_found("Receiver", name))?;
        receiver.status = status;
        Ok(())
    }
}
