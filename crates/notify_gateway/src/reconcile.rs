//! Receiver status reconciliation.

use anyhow::Result;
use tracing::{info, warn};

use notify_model::{Condition, NamespacedName, ReceiverStatus};
use notify_store::ObjectStore;

/// Write the deterministic webhook path into every receiver's status.
///
/// The path is derived from the current token, so a rotated secret yields a
/// new path and the old one stops resolving. The deprecated `url` field
/// mirrors the path for compatibility.
pub async fn reconcile_receivers(store: &dyn ObjectStore) -> Result<()> {
    for receiver in store.list_receivers().await? {
        let name = receiver.metadata.namespaced_name();
        let secret_name = NamespacedName::new(
            receiver.metadata.namespace.clone(),
            receiver.spec.secret_ref.name.clone(),
        );
        let token = match store.get_secret(&secret_name).await {
            Ok(secret) => match secret.get_str("token") {
                Some(token) => token,
                None => {
                    warn!(receiver = %name, "receiver secret has no token key, skipping");
                    continue;
                }
            },
            Err(err) => {
                warn!(receiver = %name, error = %err, "failed to read receiver secret, skipping");
                continue;
            }
        };

        let path = receiver.webhook_path(&token);
        let status = ReceiverStatus {
            conditions: vec![Condition::ready(
                "ReconciliationSucceeded",
                format!("Receiver initialized with URL: {path}"),
            )],
            url: path.clone(),
            webhook_path: path.clone(),
            observed_generation: receiver.metadata.generation,
        };
        store.patch_receiver_status(&name, status).await?;
        info!(receiver = %name, path = %path, "receiver webhook path published");
    }
    Ok(())
}
