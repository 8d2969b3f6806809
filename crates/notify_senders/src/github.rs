use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use notify_model::{Event, Severity};

use crate::error::SendError;
use crate::factory::NotifierConfig;
use crate::transport::{post_json, HttpOptions};
use crate::util::{parse_git_address, parse_revision};
use crate::Notifier;

/// Updates the commit status on a GitHub (or GitHub Enterprise) repository.
#[derive(Debug)]
pub(crate) struct GitHub {
    api_base: Url,
    owner: String,
    repo: String,
    opts: HttpOptions,
    token: String,
}

#[derive(Serialize)]
struct CommitStatus {
    state: &'static str,
    context: String,
    description: String,
}

impl GitHub {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        if config.token.is_empty() {
            return Err(SendError::SecretMissing(
                "github provider requires an API token".into(),
            ));
        }
        let (url, owner, repo) = parse_git_address(&config.address)?;
        let api_base = match url.host_str() {
            Some("github.com") => {
                Url::parse("https://api.github.com/").expect("static URL parses")
            }
            Some(host) => {
                let mut base = format!("{}://{host}", url.scheme());
                if let Some(port) = url.port() {
                    base.push_str(&format!(":{port}"));
                }
                base.push_str("/api/v3/");
                Url::parse(&base).map_err(|e| {
                    SendError::ConfigInvalid(format!("invalid enterprise host: {e}"))
                })?
            }
            None => {
                return Err(SendError::ConfigInvalid(
                    "github address has no host".into(),
                ))
            }
        };
        Ok(Self {
            api_base,
            owner,
            repo,
            opts: config.http_options()?,
            token: config.token,
        })
    }

    fn status_state(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => "failure",
            _ => "success",
        }
    }
}

#[async_trait]
impl Notifier for GitHub {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let revision = parse_revision(event)?;
        let url = self
            .api_base
            .join(&format!(
                "repos/{}/{}/statuses/{}",
                self.owner, self.repo, revision
            ))
            .map_err(|e| SendError::Internal(format!("failed to build status URL: {e}")))?;

        let payload = CommitStatus {
            state: Self::status_state(event.severity),
            context: format!(
                "{}/{}",
                event.involved_object.kind, event.involved_object.name
            ),
            description: event.message.clone(),
        };

        let headers = vec![
            ("Authorization".to_string(), format!("token {}", self.token)),
            (
                "Accept".to_string(),
                "application/vnd.github.v3+json".to_string(),
            ),
        ];
        post_json(&self.opts, &url, &headers, &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::event_with_revision;

    fn config(address: &str) -> NotifierConfig {
        NotifierConfig {
            address: address.into(),
            token: "ghp_test".into(),
            ..Default::default()
        }
    }

    #[test]
    fn dotcom_addresses_use_the_public_api() {
        let github = GitHub::new(config("https://github.com/fluxcd/podinfo")).unwrap();
        assert_eq!(github.api_base.as_str(), "https://api.github.com/");
        assert_eq!(github.owner, "fluxcd");
        assert_eq!(github.repo, "podinfo");
    }

    #[test]
    fn enterprise_addresses_use_v3_prefix() {
        let github = GitHub::new(config("https://ghe.example.com/team/app")).unwrap();
        assert_eq!(github.api_base.as_str(), "https://ghe.example.com/api/v3/");
    }

    #[test]
    fn token_is_mandatory() {
        let mut cfg = config("https://github.com/fluxcd/podinfo");
        cfg.token.clear();
        assert!(matches!(
            GitHub::new(cfg),
            Err(SendError::SecretMissing(_))
        ));
    }

    #[tokio::test]
    async fn posts_commit_status_keyed_by_revision() {
        let server = httpmock::MockServer::start();
        let hit = server.mock(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/api/v3/repos/team/app/statuses/5394cb7f48332b2de7c17b2cbd31be2f8bbbf4c6")
                .header("Authorization", "token ghp_test")
                .body_contains("\"state\":\"success\"");
            then.status(201);
        });

        let github = GitHub::new(config(&server.url("/team/app"))).unwrap();
        let event =
            event_with_revision("main@sha1:5394cb7f48332b2de7c17b2cbd31be2f8bbbf4c6");
        github.post(&event).await.unwrap();
        hit.assert_hits(1);
    }
}
