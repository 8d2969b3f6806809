use async_trait::async_trait;
use serde_json::json;
use url::Url;

use notify_model::{Event, Severity};

use crate::error::SendError;
use crate::factory::NotifierConfig;
use crate::transport::{post_json, HttpOptions};
use crate::Notifier;

/// Reports events through the Sentry store API.
///
/// The provider address is a DSN of the form `https://<key>@<host>/<project>`.
#[derive(Debug)]
pub(crate) struct Sentry {
    store_url: Url,
    auth_header: String,
    environment: String,
    opts: HttpOptions,
}

impl Sentry {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        if config.address.is_empty() {
            return Err(SendError::ConfigInvalid("provider has no address".into()));
        }
        let dsn = Url::parse(&config.address)
            .map_err(|e| SendError::ConfigInvalid(format!("invalid sentry DSN: {e}")))?;
        let key = dsn.username();
        if key.is_empty() {
            return Err(SendError::ConfigInvalid(
                "sentry DSN is missing the public key".into(),
            ));
        }
        let project = dsn.path().trim_matches('/');
        if project.is_empty() {
            return Err(SendError::ConfigInvalid(
                "sentry DSN is missing the project id".into(),
            ));
        }
        let host = dsn
            .host_str()
            .ok_or_else(|| SendError::ConfigInvalid("sentry DSN has no host".into()))?;
        let mut store = format!("{}://{host}", dsn.scheme());
        if let Some(port) = dsn.port() {
            store.push_str(&format!(":{port}"));
        }
        store.push_str(&format!("/api/{project}/store/"));
        let store_url = Url::parse(&store)
            .map_err(|e| SendError::ConfigInvalid(format!("invalid sentry DSN: {e}")))?;

        Ok(Self {
            store_url,
            auth_header: format!(
                "Sentry sentry_version=7, sentry_client=notifyd, sentry_key={key}"
            ),
            opts: config.http_options()?,
            environment: config.channel,
        })
    }

    fn level(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => "error",
            Severity::Info => "info",
            Severity::Trace => "debug",
        }
    }
}

#[async_trait]
impl Notifier for Sentry {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let mut tags = json!({
            "kind": event.involved_object.kind,
            "name": event.involved_object.name,
            "namespace": event.involved_object.namespace,
            "reason": event.reason,
        });
        for (k, v) in &event.metadata {
            tags[k.as_str()] = json!(v);
        }

        let payload = json!({
            "timestamp": event.timestamp.to_rfc3339(),
            "message": event.message,
            "level": Self::level(event.severity),
            "platform": "other",
            "environment": self.environment,
            "tags": tags,
        });
        let headers = vec![("X-Sentry-Auth".to_string(), self.auth_header.clone())];
        post_json(&self.opts, &self.store_url, &headers, &payload).await
    }
}
