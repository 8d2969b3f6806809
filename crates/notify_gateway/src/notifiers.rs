//! Resolves a provider's secrets into a ready-to-send notifier.

use std::collections::BTreeMap;

use url::Url;

use notify_model::{NamespacedName, Provider};
use notify_senders::{make_notifier, Notifier, NotifierConfig, SendError};
use notify_store::ObjectStore;

/// Load the provider's secret references and build its notifier.
///
/// Returns the token alongside the sender so the caller can mask it out of
/// any failure text. Secrets are read fresh on every call, never cached.
pub(crate) async fn build_notifier(
    store: &dyn ObjectStore,
    provider: &Provider,
) -> Result<(Box<dyn Notifier>, String), SendError> {
    let mut address = provider.spec.address.clone();
    let mut proxy = provider.spec.proxy.clone();
    let mut username = provider.spec.username.clone();
    let mut token = String::new();
    let mut password = String::new();
    let mut headers: BTreeMap<String, String> = BTreeMap::new();

    if let Some(secret_ref) = &provider.spec.secret_ref {
        let name = NamespacedName::new(&provider.metadata.namespace, &secret_ref.name);
        let secret = store
            .get_secret(&name)
            .await
            .map_err(|e| SendError::SecretMissing(format!("failed to read secret: {e}")))?;

        if let Some(a) = secret.get_str("address") {
            Url::parse(&a)
                .map_err(|e| SendError::ConfigInvalid(format!("invalid address in secret: {e}")))?;
            address = a;
        }
        if let Some(p) = secret.get_str("password") {
            password = p;
        }
        if let Some(p) = secret.get_str("proxy") {
            Url::parse(&p)
                .map_err(|e| SendError::ConfigInvalid(format!("invalid proxy in secret: {e}")))?;
            proxy = p;
        }
        if let Some(t) = secret.get_str("token") {
            token = t;
        }
        if let Some(u) = secret.get_str("username") {
            username = u;
        }
        if let Some(h) = secret.get_bytes("headers") {
            headers = serde_yaml::from_slice(h).map_err(|e| {
                SendError::ConfigInvalid(format!("failed to read headers from secret: {e}"))
            })?;
        }
    }

    let ca_pem = match &provider.spec.cert_secret_ref {
        Some(cert_ref) => {
            let name = NamespacedName::new(&provider.metadata.namespace, &cert_ref.name);
            let secret = store
                .get_secret(&name)
                .await
                .map_err(|e| SendError::SecretMissing(format!("failed to read cert secret: {e}")))?;
            let ca = secret
                .get_bytes("caFile")
                .ok_or_else(|| SendError::SecretMissing("cert secret has no caFile key".into()))?;
            Some(ca.to_vec())
        }
        None => None,
    };

    if address.is_empty() {
        return Err(SendError::ConfigInvalid("provider has no address".into()));
    }

    let config = NotifierConfig {
        address,
        proxy,
        username,
        channel: provider.spec.channel.clone(),
        token: token.clone(),
        password,
        headers,
        ca_pem,
        provider_uid: provider.metadata.uid.clone(),
    };
    let notifier = make_notifier(provider.spec.kind, config)?;
    Ok((notifier, token))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use notify_model::{
        LocalObjectReference, ObjectMeta, ProviderKind, ProviderSpec, Secret,
    };
    use notify_store::MemoryStore;

    use super::*;

    fn provider(address: &str, secret: Option<&str>) -> Provider {
        Provider {
            metadata: ObjectMeta {
                name: "slack".into(),
                namespace: "default".into(),
                uid: "prov-uid".into(),
                ..Default::default()
            },
            spec: ProviderSpec {
                kind: ProviderKind::Slack,
                interval: None,
                channel: "general".into(),
                username: String::new(),
                address: address.into(),
                timeout_secs: None,
                proxy: String::new(),
                secret_ref: secret.map(|name| LocalObjectReference { name: name.into() }),
                cert_secret_ref: None,
                suspend: false,
            },
            status: Default::default(),
        }
    }

    fn secret(name: &str, entries: &[(&str, &str)]) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: name.into(),
                namespace: "default".into(),
                ..Default::default()
            },
            data: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[tokio::test]
    async fn secret_overlays_address_and_token() {
        let store = MemoryStore::new();
        store
            .insert_secret(secret(
                "slack-secret",
                &[
                    ("address", "https://hooks.slack.com/services/override"),
                    ("token", "xoxb-123"),
                ],
            ))
            .await;

        let (_, token) = build_notifier(&store, &provider("", Some("slack-secret")))
            .await
            .unwrap();
        assert_eq!(token, "xoxb-123");
    }

    #[tokio::test]
    async fn empty_address_without_override_is_invalid() {
        let store = MemoryStore::new();
        let err = build_notifier(&store, &provider("", None)).await.unwrap_err();
        assert!(matches!(err, SendError::ConfigInvalid(_)));
    }

    #[tokio::test]
    async fn missing_secret_is_reported_as_such() {
        let store = MemoryStore::new();
        let err = build_notifier(&store, &provider("https://x.example.com", Some("gone")))
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::SecretMissing(_)));
    }

    #[tokio::test]
    async fn headers_key_is_yaml_decoded() {
        let store = MemoryStore::new();
        store
            .insert_secret(secret(
                "slack-secret",
                &[("headers", "X-Env: production\nX-Team: platform\n")],
            ))
            .await;

        let result = build_notifier(
            &store,
            &provider("https://hooks.slack.com/services/x", Some("slack-secret")),
        )
        .await;
        assert!(result.is_ok());
    }
}
