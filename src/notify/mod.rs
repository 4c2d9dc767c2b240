//! Publishing to the notification device through its message broker.

use async_trait::async_trait;
use reqwest::Url;

use crate::error::PulseError;
use crate::pulse::PulseDefinition;

pub const DEFAULT_PATTERN_TOPIC: &str = "pr-pulse/pattern";
pub const DEFAULT_SWITCH_TOPIC: &str = "pr-pulse/switch";

/// At-least-once delivery; the broker's acknowledgement is not inspected
const QOS: &str = "1";

/// Fire-and-forget publisher of device messages.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PulseError>;
}

/// Topic names the device listens on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    pub pattern: String,
    pub switch: String,
}

impl Default for Topics {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN_TOPIC.to_string(),
            switch: DEFAULT_SWITCH_TOPIC.to_string(),
        }
    }
}

/// Send the pattern, then switch the light on.
pub async fn publish_pulse<N: NotificationSink + ?Sized>(
    sink: &N,
    topics: &Topics,
    pulse: &PulseDefinition,
) -> Result<(), PulseError> {
    let payload = serde_json::to_string(pulse).map_err(|e| PulseError::encode("pulse", e))?;
    sink.publish(&topics.pattern, &payload).await?;
    publish_switch(sink, topics, true).await
}

/// Send `"true"` or `"false"` on the switch topic
pub async fn publish_switch<N: NotificationSink + ?Sized>(
    sink: &N,
    topics: &Topics,
    on: bool,
) -> Result<(), PulseError> {
    sink.publish(&topics.switch, if on { "true" } else { "false" })
        .await
}

/// Publishes over HTTPS to an IoT data-plane style endpoint:
/// `POST {endpoint}/topics/{topic}?qos=1` with the payload as body.
#[derive(Clone)]
pub struct HttpNotificationSink {
    http: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpNotificationSink {
    pub fn new(endpoint: Url, token: Option<String>) -> Result<Self, PulseError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("pr-pulse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PulseError::upstream(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    fn topic_url(&self, topic: &str) -> Result<Url, PulseError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| PulseError::Configuration {
                message: format!("sink endpoint cannot be a base: {}", self.endpoint),
            })?
            .pop_if_empty()
            .push("topics")
            .push(topic);
        url.query_pairs_mut().append_pair("qos", QOS);
        Ok(url)
    }
}

#[async_trait]
impl NotificationSink for HttpNotificationSink {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PulseError> {
        let url = self.topic_url(topic)?;
        tracing::debug!(%url, payload, "publishing");

        let mut request = self.http.post(url).body(payload.to_string());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PulseError::upstream(format!("failed to publish to {}: {}", topic, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PulseError::upstream(format!(
                "broker rejected publish to {}: HTTP {}",
                topic,
                status.as_u16()
            )));
        }
        Ok(())
    }
}
