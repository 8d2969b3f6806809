//! Maps a provider kind plus resolved configuration to a concrete sender.

use std::collections::BTreeMap;

use notify_model::ProviderKind;

use crate::alertmanager::AlertManager;
use crate::azure_devops::AzureDevOps;
use crate::azure_eventhub::AzureEventHub;
use crate::bitbucket::Bitbucket;
use crate::cdevents::CdEventsSink;
use crate::discord::Discord;
use crate::error::SendError;
use crate::forward::Forwarder;
use crate::github::GitHub;
use crate::github_dispatch::GitHubDispatch;
use crate::gitlab::GitLab;
use crate::googlechat::GoogleChat;
use crate::grafana::Grafana;
use crate::lark::Lark;
use crate::matrix::Matrix;
use crate::msteams::MsTeams;
use crate::opsgenie::Opsgenie;
use crate::sentry::Sentry;
use crate::slack::Slack;
use crate::telegram::Telegram;
use crate::webex::Webex;
use crate::Notifier;

/// Resolved provider configuration handed to the factory.
///
/// The gateway assembles this from the provider spec with its secret
/// references already overlaid.
#[derive(Clone, Default)]
pub struct NotifierConfig {
    pub address: String,
    pub proxy: String,
    pub username: String,
    pub channel: String,
    pub token: String,
    pub password: String,
    pub headers: BTreeMap<String, String>,
    /// PEM-encoded CA bundle used as the only TLS root set when present.
    pub ca_pem: Option<Vec<u8>>,
    pub provider_uid: String,
}

impl NotifierConfig {
    /// Transport settings shared by every sender built from this config.
    pub(crate) fn http_options(&self) -> Result<crate::transport::HttpOptions, SendError> {
        let proxy = if self.proxy.is_empty() {
            None
        } else {
            Some(url::Url::parse(&self.proxy).map_err(|e| {
                SendError::ConfigInvalid(format!("invalid proxy `{}`: {e}", self.proxy))
            })?)
        };
        Ok(crate::transport::HttpOptions {
            proxy,
            ca_pem: self.ca_pem.clone(),
        })
    }
}

/// Build the sender for the given provider kind.
///
/// Configuration problems (missing address, unparseable URL, incomplete
/// auth) surface here so the dispatcher never branches on kind and send
/// time never sees an invalid sender.
pub fn make_notifier(
    kind: ProviderKind,
    config: NotifierConfig,
) -> Result<Box<dyn Notifier>, SendError> {
    let notifier: Box<dyn Notifier> = match kind {
        ProviderKind::Generic => Box::new(Forwarder::new(config, false)?),
        ProviderKind::GenericHmac => Box::new(Forwarder::new(config, true)?),
        ProviderKind::Slack => Box::new(Slack::new(config)?),
        ProviderKind::Rocket => Box::new(Slack::rocket(config)?),
        ProviderKind::Discord => Box::new(Discord::new(config)?),
        ProviderKind::MsTeams => Box::new(MsTeams::new(config)?),
        ProviderKind::GoogleChat => Box::new(GoogleChat::new(config)?),
        ProviderKind::Webex => Box::new(Webex::new(config)?),
        ProviderKind::Lark => Box::new(Lark::new(config)?),
        ProviderKind::Matrix => Box::new(Matrix::new(config)?),
        ProviderKind::Grafana => Box::new(Grafana::new(config)?),
        ProviderKind::GitHub => Box::new(GitHub::new(config)?),
        ProviderKind::GitLab => Box::new(GitLab::new(config)?),
        ProviderKind::Bitbucket => Box::new(Bitbucket::new(config)?),
        ProviderKind::AzureDevOps => Box::new(AzureDevOps::new(config)?),
        ProviderKind::CdEvents => Box::new(CdEventsSink::new(config)?),
        ProviderKind::Sentry => Box::new(Sentry::new(config)?),
        ProviderKind::AlertManager => Box::new(AlertManager::new(config)?),
        ProviderKind::Opsgenie => Box::new(Opsgenie::new(config)?),
        ProviderKind::Telegram => Box::new(Telegram::new(config)?),
        ProviderKind::GitHubDispatch => Box::new(GitHubDispatch::new(config)?),
        ProviderKind::AzureEventHub => Box::new(AzureEventHub::new(config)?),
    };
    Ok(notifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(address: &str) -> NotifierConfig {
        NotifierConfig {
            address: address.into(),
            token: "token".into(),
            channel: "general".into(),
            ..Default::default()
        }
    }

    #[test]
    fn every_kind_builds_from_a_plain_webhook_config() {
        // Kinds whose only requirement is a reachable HTTPS address plus a
        // token/channel pair.
        for kind in [
            ProviderKind::Generic,
            ProviderKind::GenericHmac,
            ProviderKind::Slack,
            ProviderKind::Rocket,
            ProviderKind::Discord,
            ProviderKind::MsTeams,
            ProviderKind::GoogleChat,
            ProviderKind::Webex,
            ProviderKind::Lark,
            ProviderKind::Matrix,
            ProviderKind::Grafana,
            ProviderKind::CdEvents,
            ProviderKind::AlertManager,
            ProviderKind::Opsgenie,
            ProviderKind::AzureEventHub,
        ] {
            make_notifier(kind, config("https://hooks.example.com/T0/B0"))
                .unwrap_or_else(|e| panic!("{kind} failed to build: {e}"));
        }
    }

    #[test]
    fn missing_address_is_rejected_at_construction() {
        let err = make_notifier(ProviderKind::Slack, config("")).unwrap_err();
        assert!(matches!(err, SendError::ConfigInvalid(_)));
    }
}
