//! Read/watch seam over the declarative object store.
//!
//! The control plane owning `Alert`, `Provider`, `Receiver` and `Secret`
//! objects is an external collaborator. This crate defines the narrow
//! [`ObjectStore`] contract the dispatcher needs, plus [`MemoryStore`], a
//! map-backed implementation used by tests and the standalone server.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use notify_model::{
    Alert, CrossNamespaceObjectReference, NamespacedName, Provider, Receiver, ReceiverStatus,
    Secret,
};

mod error;
mod memory;

pub use error::StoreError;
pub use memory::{MemoryStore, StoreSeed};

/// Annotation set on a resource to request its reconciliation.
pub const RECONCILE_REQUEST_ANNOTATION: &str = "reconcile.fluxcd.io/requestedAt";

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// All alerts known to the store, in insertion order.
    async fn list_alerts(&self) -> Result<Vec<Alert>, StoreError>;

    /// All receivers known to the store, in insertion order.
    async fn list_receivers(&self) -> Result<Vec<Receiver>, StoreError>;

    async fn get_provider(&self, name: &NamespacedName) -> Result<Provider, StoreError>;

    async fn get_secret(&self, name: &NamespacedName) -> Result<Secret, StoreError>;

    /// Labels of a live object, via a partial-metadata read.
    async fn get_labels(
        &self,
        kind: &str,
        name: &NamespacedName,
    ) -> Result<BTreeMap<String, String>, StoreError>;

    /// Set the reconcile-request annotation on the referenced resource.
    /// `fallback_namespace` applies when the reference leaves it empty.
    async fn request_reconcile(
        &self,
        reference: &CrossNamespaceObjectReference,
        fallback_namespace: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Write a receiver's status subresource.
    async fn patch_receiver_status(
        &self,
        name: &NamespacedName,
        status: ReceiverStatus,
    ) -> Result<(), StoreError>;
}
