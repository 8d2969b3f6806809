use async_trait::async_trait;
use serde_json::json;
use url::Url;

use notify_model::Event;

use crate::error::SendError;
use crate::factory::NotifierConfig;
use crate::transport::{post_json, HttpOptions};
use crate::util::{involved_ident, parse_git_address};
use crate::Notifier;

/// Fires a `repository_dispatch` event carrying the full event payload.
#[derive(Debug)]
pub(crate) struct GitHubDispatch {
    url: Url,
    opts: HttpOptions,
    token: String,
}

impl GitHubDispatch {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        if config.token.is_empty() {
            return Err(SendError::SecretMissing(
                "githubdispatch provider requires an API token".into(),
            ));
        }
        let (url, owner, repo) = parse_git_address(&config.address)?;
        let api = match url.host_str() {
            Some("github.com") => format!("https://api.github.com/repos/{owner}/{repo}/dispatches"),
            Some(host) => {
                let mut base = format!("{}://{host}", url.scheme());
                if let Some(port) = url.port() {
                    base.push_str(&format!(":{port}"));
                }
                format!("{base}/api/v3/repos/{owner}/{repo}/dispatches")
            }
            None => {
                return Err(SendError::ConfigInvalid(
                    "githubdispatch address has no host".into(),
                ))
            }
        };
        Ok(Self {
            url: Url::parse(&api)
                .map_err(|e| SendError::ConfigInvalid(format!("invalid dispatch URL: {e}")))?,
            opts: config.http_options()?,
            token: config.token,
        })
    }
}

#[async_trait]
impl Notifier for GitHubDispatch {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let payload = json!({
            "event_type": involved_ident(event),
            "client_payload": event,
        });
        let headers = vec![
            ("Authorization".to_string(), format!("token {}", self.token)),
            (
                "Accept".to_string(),
                "application/vnd.github.v3+json".to_string(),
            ),
        ];
        post_json(&self.opts, &self.url, &headers, &payload).await
    }
}
