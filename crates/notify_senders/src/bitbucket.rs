use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use notify_model::{Event, Severity};

use crate::error::SendError;
use crate::factory::NotifierConfig;
use crate::transport::{post_json, HttpOptions};
use crate::util::{basic_auth, commit_status_id, parse_git_address, parse_revision};
use crate::Notifier;

/// Updates the build status on a Bitbucket Cloud commit.
#[derive(Debug)]
pub(crate) struct Bitbucket {
    owner: String,
    repo: String,
    opts: HttpOptions,
    username: String,
    password: String,
    provider_uid: String,
}

#[derive(Serialize)]
struct BuildStatus {
    state: &'static str,
    key: String,
    name: String,
    description: String,
    url: String,
}

impl Bitbucket {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        let (_, owner, repo) = parse_git_address(&config.address)?;
        // App passwords arrive as a single `user:password` token.
        let (username, password) = config
            .token
            .split_once(':')
            .ok_or_else(|| {
                SendError::ConfigInvalid(
                    "bitbucket token must be in the format <username>:<app-password>".into(),
                )
            })?;
        Ok(Self {
            owner,
            repo,
            opts: config.http_options()?,
            username: username.to_string(),
            password: password.to_string(),
            provider_uid: config.provider_uid,
        })
    }

    fn status_state(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => "FAILED",
            _ => "SUCCESSFUL",
        }
    }
}

#[async_trait]
impl Notifier for Bitbucket {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let revision = parse_revision(event)?;
        let url = Url::parse(&format!(
            "https://api.bitbucket.org/2.0/repositories/{}/{}/commit/{}/statuses/build",
            self.owner, self.repo, revision
        ))
        .map_err(|e| SendError::Internal(format!("failed to build status URL: {e}")))?;

        let name = format!(
            "{}/{}",
            event.involved_object.kind, event.involved_object.name
        );
        let payload = BuildStatus {
            state: Self::status_state(event.severity),
            key: commit_status_id(&self.provider_uid, &revision),
            name: name.clone(),
            description: event.message.clone(),
            url: format!("https://bitbucket.org/{}/{}", self.owner, self.repo),
        };
        let headers = vec![basic_auth(&self.username, &self.password)];
        post_json(&self.opts, &url, &headers, &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(address: &str, token: &str) -> NotifierConfig {
        NotifierConfig {
            address: address.into(),
            token: token.into(),
            provider_uid: "0c9c2e41".into(),
            ..Default::default()
        }
    }

    #[test]
    fn owner_and_repo_come_from_the_address() {
        let bitbucket = Bitbucket::new(config("https://bitbucket.org/foo/bar", "foo:bar")).unwrap();
        assert_eq!(bitbucket.owner, "foo");
        assert_eq!(bitbucket.repo, "bar");
    }

    #[test]
    fn extra_path_segments_are_rejected() {
        assert!(Bitbucket::new(config("https://bitbucket.org/foo/bar/baz", "foo:bar")).is_err());
    }

    #[test]
    fn token_without_colon_is_rejected() {
        assert!(matches!(
            Bitbucket::new(config("https://bitbucket.org/foo/bar", "bar")),
            Err(SendError::ConfigInvalid(_))
        ));
    }
}
