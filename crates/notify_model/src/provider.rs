use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::meta::{LocalObjectReference, ObjectMeta};
use crate::status::Condition;

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(15);

/// The set of supported notification destinations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Generic,
    #[serde(rename = "generic-hmac")]
    GenericHmac,
    Slack,
    Grafana,
    Discord,
    #[serde(rename = "msteams")]
    MsTeams,
    Rocket,
    #[serde(rename = "github")]
    GitHub,
    #[serde(rename = "gitlab")]
    GitLab,
    Bitbucket,
    #[serde(rename = "azuredevops")]
    AzureDevOps,
    #[serde(rename = "googlechat")]
    GoogleChat,
    Webex,
    Sentry,
    #[serde(rename = "azureeventhub")]
    AzureEventHub,
    Telegram,
    Lark,
    Matrix,
    Opsgenie,
    #[serde(rename = "alertmanager")]
    AlertManager,
    #[serde(rename = "githubdispatch")]
    GitHubDispatch,
    #[serde(rename = "cdevents")]
    CdEvents,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Generic => "generic",
            ProviderKind::GenericHmac => "generic-hmac",
            ProviderKind::Slack => "slack",
            ProviderKind::Grafana => "grafana",
            ProviderKind::Discord => "discord",
            ProviderKind::MsTeams => "msteams",
            ProviderKind::Rocket => "rocket",
            ProviderKind::GitHub => "github",
            ProviderKind::GitLab => "gitlab",
            ProviderKind::Bitbucket => "bitbucket",
            ProviderKind::AzureDevOps => "azuredevops",
            ProviderKind::GoogleChat => "googlechat",
            ProviderKind::Webex => "webex",
            ProviderKind::Sentry => "sentry",
            ProviderKind::AzureEventHub => "azureeventhub",
            ProviderKind::Telegram => "telegram",
            ProviderKind::Lark => "lark",
            ProviderKind::Matrix => "matrix",
            ProviderKind::Opsgenie => "opsgenie",
            ProviderKind::AlertManager => "alertmanager",
            ProviderKind::GitHubDispatch => "githubdispatch",
            ProviderKind::CdEvents => "cdevents",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown provider type `{s}`"))
    }
}

/// Declarative description of a destination plus credentials for outbound
/// notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: ProviderSpec,
    #[serde(default)]
    pub status: ProviderStatus,
}

impl Provider {
    /// Timeout for sending alerts, defaulting to 15 seconds.
    pub fn timeout(&self) -> Duration {
        self.spec
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PROVIDER_TIMEOUT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSpec {
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    /// Reconciliation cadence, consumed by the external reconciler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub channel: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    /// HTTP/S incoming webhook address of this provider.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// HTTP/S address of the proxy server.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub proxy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<LocalObjectReference>,
    /// Secret holding a PEM-encoded CA bundle under the `caFile` key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_secret_ref: Option<LocalObjectReference>,
    #[serde(default)]
    pub suspend: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderStatus {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    pub observed_generation: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_hyphenated_and_compound_names() {
        assert_eq!(
            "generic-hmac".parse::<ProviderKind>().unwrap(),
            ProviderKind::GenericHmac
        );
        assert_eq!(
            "azuredevops".parse::<ProviderKind>().unwrap(),
            ProviderKind::AzureDevOps
        );
        assert!("smoke-signal".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn kind_display_round_trips() {
        for kind in [
            ProviderKind::Slack,
            ProviderKind::GenericHmac,
            ProviderKind::GitHubDispatch,
            ProviderKind::CdEvents,
        ] {
            assert_eq!(kind.as_str().parse::<ProviderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn timeout_defaults_to_fifteen_seconds() {
        let provider = Provider {
            metadata: ObjectMeta::default(),
            spec: ProviderSpec {
                kind: ProviderKind::Slack,
                interval: None,
                channel: String::new(),
                username: String::new(),
                address: "https://hooks.slack.com/services/x".into(),
                timeout_secs: None,
                proxy: String::new(),
                secret_ref: None,
                cert_secret_ref: None,
                suspend: false,
            },
            status: ProviderStatus::default(),
        };
        assert_eq!(provider.timeout(), Duration::from_secs(15));
    }
}
