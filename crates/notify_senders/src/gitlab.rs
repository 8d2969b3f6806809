use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use notify_model::{Event, Severity};

use crate::error::SendError;
use crate::factory::NotifierConfig;
use crate::transport::{parse_address, post_json, HttpOptions};
use crate::util::parse_revision;
use crate::Notifier;

/// Updates the commit status on a GitLab project.
#[derive(Debug)]
pub(crate) struct GitLab {
    base: Url,
    /// URL-encoded `group/project` path accepted by the v4 API.
    project: String,
    opts: HttpOptions,
    token: String,
}

#[derive(Serialize)]
struct PipelineStatus {
    state: &'static str,
    context: String,
    description: String,
}

impl GitLab {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        if config.token.is_empty() {
            return Err(SendError::SecretMissing(
                "gitlab provider requires an API token".into(),
            ));
        }
        let url = parse_address(&config.address)?;
        let project = url.path().trim_matches('/').to_string();
        if project.is_empty() {
            return Err(SendError::ConfigInvalid(
                "gitlab address must reference a project".into(),
            ));
        }
        let mut base = url.clone();
        base.set_path("");
        Ok(Self {
            base,
            project: project.replace('/', "%2F"),
            opts: config.http_options()?,
            token: config.token,
        })
    }

    fn status_state(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => "failed",
            _ => "success",
        }
    }
}

#[async_trait]
impl Notifier for GitLab {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let revision = parse_revision(event)?;
        let url = Url::parse(&format!(
            "{}api/v4/projects/{}/statuses/{}",
            self.base, self.project, revision
        ))
        .map_err(|e| SendError::Internal(format!("failed to build status URL: {e}")))?;

        let payload = PipelineStatus {
            state: Self::status_state(event.severity),
            context: format!(
                "{}/{}",
                event.involved_object.kind, event.involved_object.name
            ),
            description: event.message.clone(),
        };
        let headers = vec![("PRIVATE-TOKEN".to_string(), self.token.clone())];
        post_json(&self.opts, &url, &headers, &payload).await
    }
}
