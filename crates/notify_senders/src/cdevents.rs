use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use url::Url;
use uuid::Uuid;

use notify_model::Event;

use crate::error::SendError;
use crate::factory::NotifierConfig;
use crate::transport::{parse_address, post_json, HttpOptions};
use crate::Notifier;

const SPEC_VERSION: &str = "0.3";

/// Delivers events to a CDEvents sink with CloudEvents headers.
#[derive(Debug)]
pub(crate) struct CdEventsSink {
    url: Url,
    opts: HttpOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// The supported CDEvent variants, each carrying its subject content.
///
/// One event reason maps to exactly one variant; serialization happens in a
/// single step once the variant is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CdEventKind {
    EnvironmentModified,
    TaskRunFinished(Outcome),
    TestCaseRunFinished(Outcome),
    ServiceDeployed,
    IncidentDetected,
}

impl CdEventKind {
    /// Map an event reason (case-insensitive) to its CDEvent variant.
    pub(crate) fn from_reason(reason: &str) -> Self {
        match reason.to_lowercase().as_str() {
            "installsucceeded" => CdEventKind::EnvironmentModified,
            "upgradesucceeded" | "rollbacksucceeded" => {
                CdEventKind::TaskRunFinished(Outcome::Success)
            }
            "upgradefailed" | "rollbackfailed" | "driftdetected" => {
                CdEventKind::TaskRunFinished(Outcome::Failure)
            }
            "testsucceeded" => CdEventKind::TestCaseRunFinished(Outcome::Success),
            "testfailed" => CdEventKind::TestCaseRunFinished(Outcome::Failure),
            "reconciliationsucceeded" => CdEventKind::ServiceDeployed,
            _ => CdEventKind::IncidentDetected,
        }
    }

    pub(crate) fn event_type(&self) -> &'static str {
        match self {
            CdEventKind::EnvironmentModified => "dev.cdevents.environment.modified.0.1.1",
            CdEventKind::TaskRunFinished(_) => "dev.cdevents.taskrun.finished.0.1.1",
            CdEventKind::TestCaseRunFinished(_) => "dev.cdevents.testcaserun.finished.0.1.0",
            CdEventKind::ServiceDeployed => "dev.cdevents.service.deployed.0.1.1",
            CdEventKind::IncidentDetected => "dev.cdevents.incident.detected.0.1.0",
        }
    }

    fn subject_content(&self, event: &Event) -> serde_json::Value {
        match self {
            CdEventKind::TaskRunFinished(outcome) | CdEventKind::TestCaseRunFinished(outcome) => {
                json!({ "outcome": outcome.as_str() })
            }
            CdEventKind::ServiceDeployed => json!({
                "artifactId": event.involved_object.uid,
                "environment": {
                    "id": event.involved_object.uid,
                    "source": event.involved_object.name,
                },
            }),
            CdEventKind::EnvironmentModified | CdEventKind::IncidentDetected => json!({}),
        }
    }
}

impl CdEventsSink {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        Ok(Self {
            url: parse_address(&config.address)?,
            opts: config.http_options()?,
        })
    }
}

#[async_trait]
impl Notifier for CdEventsSink {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let kind = CdEventKind::from_reason(&event.reason);
        let source = format!(
            "{}.{}",
            event.involved_object.name, event.involved_object.kind
        );
        let id = Uuid::new_v4().to_string();
        let timestamp = Utc::now();

        let payload = json!({
            "context": {
                "version": SPEC_VERSION,
                "id": id,
                "source": source,
                "type": kind.event_type(),
                "timestamp": timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
            },
            "subject": {
                "id": event.involved_object.uid,
                "source": source,
                "content": kind.subject_content(event),
            },
            "customData": event,
            "customDataContentType": "application/json",
        });

        let headers = vec![
            ("ce-type".to_string(), kind.event_type().to_string()),
            ("ce-specversion".to_string(), SPEC_VERSION.to_string()),
            ("ce-source".to_string(), source),
            ("ce-id".to_string(), id),
            (
                "ce-time".to_string(),
                timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
            ),
            ("prefer".to_string(), "reply".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        post_json(&self.opts, &self.url, &headers, &payload).await
    }
}
