use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use url::Url;

use notify_model::Event;

use crate::error::SendError;

/// Stable identifier for a commit status.
///
/// Keyed on provider UID and revision so retries of the same logical event
/// overwrite the prior status instead of stacking new ones.
pub fn commit_status_id(provider_uid: &str, revision: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(provider_uid.as_bytes());
    hasher.update(revision.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..40].to_string()
}

/// Extract the commit SHA from the event's `revision` metadata entry.
///
/// Accepts `<branch>@sha1:<sha>`, `<branch>/<sha>` and a bare SHA.
pub(crate) fn parse_revision(event: &Event) -> Result<String, SendError> {
    let revision = event
        .metadata
        .get("revision")
        .ok_or_else(|| SendError::MalformedInput("event has no revision metadata".into()))?;
    let sha = match revision.rsplit_once("@sha1:") {
        Some((_, sha)) => sha,
        None => match revision.rsplit_once('/') {
            Some((_, sha)) => sha,
            None => revision.as_str(),
        },
    };
    if sha.is_empty() {
        return Err(SendError::MalformedInput(format!(
            "unable to extract a SHA from revision `{revision}`"
        )));
    }
    Ok(sha.to_string())
}

/// `namespace/name.kind`, the display identity used across sender payloads.
pub(crate) fn involved_ident(event: &Event) -> String {
    format!(
        "{}/{}.{}",
        event.involved_object.namespace, event.involved_object.name, event.involved_object.kind
    )
}

/// `Authorization` header pair for HTTP basic authentication.
pub(crate) fn basic_auth(username: &str, password: &str) -> (String, String) {
    let credentials = STANDARD.encode(format!("{username}:{password}"));
    ("Authorization".to_string(), format!("Basic {credentials}"))
}

/// Split a repository address like `https://host/owner/repo` into its base
/// URL and exactly two path segments.
pub(crate) fn parse_git_address(address: &str) -> Result<(Url, String, String), SendError> {
    let url = Url::parse(address)
        .map_err(|e| SendError::ConfigInvalid(format!("invalid address `{address}`: {e}")))?;
    let segments: Vec<&str> = url
        .path()
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let (owner, repo) = match segments.as_slice() {
        [owner, repo] => (owner.to_string(), repo.trim_end_matches(".git").to_string()),
        _ => {
            return Err(SendError::ConfigInvalid(format!(
                "address `{address}` must reference a repository as <host>/<owner>/<repo>"
            )))
        }
    };
    Ok((url, owner, repo))
}
