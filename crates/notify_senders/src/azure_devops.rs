use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use notify_model::{Event, Severity};

use crate::error::SendError;
use crate::factory::NotifierConfig;
use crate::transport::{parse_address, post_json, HttpOptions};
use crate::util::{basic_auth, parse_revision};
use crate::Notifier;

const API_VERSION: &str = "6.0";

/// Updates the git status on an Azure DevOps commit.
#[derive(Debug)]
pub(crate) struct AzureDevOps {
    base: Url,
    org: String,
    project: String,
    repo: String,
    opts: HttpOptions,
    token: String,
}

#[derive(Serialize)]
struct GitStatus {
    state: &'static str,
    description: String,
    context: GitStatusContext,
}

#[derive(Serialize)]
struct GitStatusContext {
    name: String,
    genre: &'static str,
}

impl AzureDevOps {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        if config.token.is_empty() {
            return Err(SendError::SecretMissing(
                "azuredevops provider requires a personal access token".into(),
            ));
        }
        let url = parse_address(&config.address)?;
        let segments: Vec<String> = url
            .path()
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let (org, project, repo) = match segments.as_slice() {
            [org, project, git, repo] if git.as_str() == "_git" => {
                (org.clone(), project.clone(), repo.clone())
            }
            _ => {
                return Err(SendError::ConfigInvalid(
                    "azuredevops address must look like <host>/<org>/<project>/_git/<repo>".into(),
                ))
            }
        };
        let mut base = url.clone();
        base.set_path("");
        Ok(Self {
            base,
            org,
            project,
            repo,
            opts: config.http_options()?,
            token: config.token,
        })
    }

    fn status_state(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => "failed",
            _ => "succeeded",
        }
    }
}

#[async_trait]
impl Notifier for AzureDevOps {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let revision = parse_revision(event)?;
        let url = Url::parse(&format!(
            "{}{}/{}/_apis/git/repositories/{}/commits/{}/statuses?api-version={}",
            self.base, self.org, self.project, self.repo, revision, API_VERSION
        ))
        .map_err(|e| SendError::Internal(format!("failed to build status URL: {e}")))?;

        let payload = GitStatus {
            state: Self::status_state(event.severity),
            description: event.message.clone(),
            context: GitStatusContext {
                name: format!(
                    "{}/{}",
                    event.involved_object.kind, event.involved_object.name
                ),
                genre: "fluxcd",
            },
        };
        // PATs authenticate as basic auth with an empty username.
        let headers = vec![basic_auth("", &self.token)];
        post_json(&self.opts, &url, &headers, &payload).await
    }
}
