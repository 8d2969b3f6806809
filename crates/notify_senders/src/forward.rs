use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

use notify_model::Event;

use crate::error::SendError;
use crate::factory::NotifierConfig;
use crate::transport::{parse_address, post_raw, HttpOptions};
use crate::Notifier;

type HmacSha256 = Hmac<Sha256>;

/// Forwards the event verbatim to a generic webhook endpoint.
///
/// The HMAC variant signs the raw body with the provider token and carries
/// the signature in `X-Signature`, so the receiving side can authenticate
/// the payload without a shared transport secret.
#[derive(Debug)]
pub(crate) struct Forwarder {
    url: Url,
    opts: HttpOptions,
    headers: Vec<(String, String)>,
    sign_key: Option<String>,
}

impl Forwarder {
    pub(crate) fn new(config: NotifierConfig, signed: bool) -> Result<Self, SendError> {
        let url = parse_address(&config.address)?;
        let opts = config.http_options()?;
        if signed && config.token.is_empty() {
            return Err(SendError::SecretMissing(
                "generic-hmac provider requires a token to sign with".into(),
            ));
        }
        let mut headers: Vec<(String, String)> =
            config.headers.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        if !config.token.is_empty() && !signed {
            headers.push(("Authorization".into(), format!("Bearer {}", config.token)));
        }
        Ok(Self {
            url,
            opts,
            headers,
            sign_key: signed.then_some(config.token),
        })
    }
}

pub(crate) fn sign_body(key: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl Notifier for Forwarder {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let body = serde_json::to_vec(event)
            .map_err(|e| SendError::Internal(format!("failed to encode event: {e}")))?;

        let mut headers = self.headers.clone();
        headers.push((
            "gotk-component".into(),
            event.reporting_controller.clone(),
        ));
        if let Some(key) = &self.sign_key {
            headers.push(("X-Signature".into(), sign_body(key, &body)));
        }

        post_raw(&self.opts, &self.url, &headers, "application/json", body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sample_event;

    #[test]
    fn hmac_variant_requires_a_token() {
        let config = NotifierConfig {
            address: "https://hooks.example.com/x".into(),
            ..Default::default()
        };
        assert!(matches!(
            Forwarder::new(config, true),
            Err(SendError::SecretMissing(_))
        ));
    }

    #[test]
    fn signature_is_prefixed_hex_hmac() {
        let sig = sign_body("token", b"{}");
        let hex_part = sig.strip_prefix("sha256=").unwrap();
        assert_eq!(hex_part.len(), 64);
        // Signing the same body twice is deterministic.
        assert_eq!(sig, sign_body("token", b"{}"));
        assert_ne!(sig, sign_body("other", b"{}"));
    }

    #[tokio::test]
    async fn forwards_event_with_component_header() {
        let server = httpmock::MockServer::start();
        let hit = server.mock(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/hook")
                .header("gotk-component", "kustomize-controller")
                .body_contains("podinfo");
            then.status(200);
        });

        let config = NotifierConfig {
            address: server.url("/hook"),
            ..Default::default()
        };
        let forwarder = Forwarder::new(config, false).unwrap();
        forwarder.post(&sample_event()).await.unwrap();
        hit.assert_hits(1);
    }
}
