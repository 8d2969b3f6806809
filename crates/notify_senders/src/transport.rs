//! Shared HTTP POST transport with retry, proxy and custom TLS roots.

use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use url::Url;

use crate::error::SendError;

/// Backoff schedule between delivery attempts.
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Size cap for remote error bodies carried into error messages.
const ERROR_BODY_LIMIT: usize = 256;

static SHARED_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .expect("failed to build shared HTTP client")
});

/// Per-provider transport settings applied to every send.
#[derive(Clone, Default, Debug)]
pub(crate) struct HttpOptions {
    pub proxy: Option<Url>,
    /// PEM bundle replacing the system roots when present.
    pub ca_pem: Option<Vec<u8>>,
}

impl HttpOptions {
    fn client(&self) -> Result<Client, SendError> {
        if self.proxy.is_none() && self.ca_pem.is_none() {
            return Ok(SHARED_CLIENT.clone());
        }

        let mut builder = Client::builder().connect_timeout(CONNECT_TIMEOUT);
        if let Some(proxy) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| SendError::ConfigInvalid(format!("invalid proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }
        if let Some(pem) = &self.ca_pem {
            let certs = reqwest::Certificate::from_pem_bundle(pem)
                .map_err(|e| SendError::ConfigInvalid(format!("invalid CA bundle: {e}")))?;
            builder = builder.tls_built_in_root_certs(false);
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }
        builder
            .build()
            .map_err(|e| SendError::Internal(format!("failed to build HTTP client: {e}")))
    }
}

/// POST a JSON payload, retrying transport errors and 5xx with backoff.
pub(crate) async fn post_json<T: Serialize>(
    opts: &HttpOptions,
    url: &Url,
    headers: &[(String, String)],
    payload: &T,
) -> Result<(), SendError> {
    let body = serde_json::to_vec(payload)
        .map_err(|e| SendError::Internal(format!("failed to encode payload: {e}")))?;
    post_raw(opts, url, headers, "application/json", body).await
}

/// POST a pre-encoded body. 4xx is terminal, 5xx and transport errors are
/// retried per [`RETRY_DELAYS_SECS`] before the last error is returned.
pub(crate) async fn post_raw(
    opts: &HttpOptions,
    url: &Url,
    headers: &[(String, String)],
    content_type: &str,
    body: Vec<u8>,
) -> Result<(), SendError> {
    let client = opts.client()?;

    let mut last_err = None;
    for delay_secs in RETRY_DELAYS_SECS {
        match try_send(&client, url, headers, content_type, body.clone()).await {
            Ok(()) => return Ok(()),
            Err(err) if err.is_retryable() => {
                tracing::debug!(url = %url, error = %err, "delivery attempt failed, retrying");
                last_err = Some(err);
                tokio::time::sleep(Duration::from_secs(delay_secs)).await;
            }
            Err(err) => return Err(err),
        }
    }

    match try_send(&client, url, headers, content_type, body).await {
        Ok(()) => Ok(()),
        Err(err) => Err(last_err.unwrap_or(err)),
    }
}

async fn try_send(
    client: &Client,
    url: &Url,
    headers: &[(String, String)],
    content_type: &str,
    body: Vec<u8>,
) -> Result<(), SendError> {
    let mut request = client
        .post(url.clone())
        .header(CONTENT_TYPE, content_type)
        .body(body);
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }

    let response = request
        .send()
        .await
        .map_err(|e| SendError::RemoteUnavailable(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    let body = truncate(&body, ERROR_BODY_LIMIT);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SendError::AuthFailed(format!(
            "{status}: {body}"
        ))),
        s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
            Err(SendError::RemoteError {
                status: s.as_u16(),
                body,
            })
        }
        s => Err(SendError::RemoteRejected {
            status: s.as_u16(),
            body,
        }),
    }
}

fn truncate(text: &str, limit: usize) -> String {
    let mut out: String = text.chars().take(limit).collect();
    if text.chars().count() > limit {
        out.push('…');
    }
    out
}

/// Validate a provider address into a URL the transport can post to.
pub(crate) fn parse_address(address: &str) -> Result<Url, SendError> {
    if address.is_empty() {
        return Err(SendError::ConfigInvalid("provider has no address".into()));
    }
    Url::parse(address)
        .map_err(|e| SendError::ConfigInvalid(format!("invalid address `{address}`: {e}")))
}
