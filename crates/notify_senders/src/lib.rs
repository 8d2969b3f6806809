//! Outbound notification senders.
//!
//! Every provider kind maps to a [`Notifier`] built by [`factory::make_notifier`].
//! Senders share one retrying HTTP POST transport and differ only in wire
//! shape and authentication. Tokens are treated as sensitive everywhere;
//! [`redact::mask_token`] scrubs them from rendered errors before logging.

use async_trait::async_trait;

use notify_model::Event;

mod error;
pub mod factory;
pub mod redact;
#[cfg(test)]
mod testutil;
mod transport;
mod util;

mod alertmanager;
mod azure_devops;
mod azure_eventhub;
mod bitbucket;
mod cdevents;
mod discord;
mod forward;
mod github;
mod github_dispatch;
mod gitlab;
mod googlechat;
mod grafana;
mod lark;
mod matrix;
mod msteams;
mod opsgenie;
mod sentry;
mod slack;
mod telegram;
mod webex;

pub use error::SendError;
pub use factory::{make_notifier, NotifierConfig};
pub use util::commit_status_id;

/// An instantiated sender for one provider. Stateless after construction.
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    async fn post(&self, event: &Event) -> Result<(), SendError>;
}
