use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::clock;

/// Raw invocation payload for a compliance rule.
///
/// `invoking_event` is delivered as a serialized JSON string and must be
/// parsed separately via [`RuleEvent::parse_invoking_event`].
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleEvent {
    pub result_token: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub invoking_event: Option<String>,
}

impl RuleEvent {
    pub fn parse_invoking_event(&self) -> Result<InvokingEvent, ValidationError> {
        let raw = self
            .invoking_event
            .as_deref()
            .ok_or_else(|| ValidationError::new("rule event is missing invokingEvent"))?;
        serde_json::from_str(raw)
            .map_err(|error| ValidationError::new(format!("malformed invokingEvent: {error}")))
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvokingEvent {
    #[serde(default, deserialize_with = "deserialize_message_type")]
    pub message_type: Option<MessageType>,
    #[serde(default)]
    pub notification_creation_time: Option<String>,
    #[serde(default)]
    pub configuration_item: Option<ConfigurationItem>,
}

impl InvokingEvent {
    pub fn is_scheduled(&self) -> bool {
        self.message_type == Some(MessageType::ScheduledNotification)
    }

    pub fn notification_created_at(&self) -> Result<DateTime<Utc>, ValidationError> {
        let raw = self.notification_creation_time.as_deref().ok_or_else(|| {
            ValidationError::new("invoking event is missing notificationCreationTime")
        })?;
        clock::parse_timestamp(raw)
    }
}

/// Notification tag on the invoking event. Anything that is not a scheduled
/// notification selects the change-triggered path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    ScheduledNotification,
    ConfigurationItemChangeNotification,
    OversizedConfigurationItemChangeNotification,
    Other,
}

impl MessageType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "ScheduledNotification" => Self::ScheduledNotification,
            "ConfigurationItemChangeNotification" => Self::ConfigurationItemChangeNotification,
            "OversizedConfigurationItemChangeNotification" => {
                Self::OversizedConfigurationItemChangeNotification
            }
            _ => Self::Other,
        }
    }
}

fn deserialize_message_type<'de, D>(deserializer: D) -> Result<Option<MessageType>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().map(MessageType::from_tag))
}

/// The changed resource carried by a change-triggered invocation.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ConfigurationItem {
    #[serde(default, rename = "resourceType")]
    pub resource_type: Option<String>,
    #[serde(default, rename = "ARN")]
    pub arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserializes_rule_event_fields() {
        let event: RuleEvent = serde_json::from_value(json!({
            "resultToken": "token-1",
            "accountId": "123456789012",
            "invokingEvent": "{\"messageType\":\"ScheduledNotification\"}"
        }))
        .expect("event should deserialize");

        assert_eq!(event.result_token, "token-1");
        assert_eq!(event.account_id.as_deref(), Some("123456789012"));
    }

    #[test]
    fn rejects_event_without_result_token() {
        let error = serde_json::from_value::<RuleEvent>(json!({
            "accountId": "123456789012"
        }))
        .expect_err("missing resultToken should fail");

        assert!(error.to_string().contains("resultToken"));
    }

    #[test]
    fn parses_embedded_invoking_event_string() {
        let event: RuleEvent = serde_json::from_value(json!({
            "resultToken": "token-1",
            "invokingEvent": json!({
                "messageType": "ConfigurationItemChangeNotification",
                "configurationItem": {
                    "resourceType": "AWS::SecretsManager::Secret",
                    "ARN": "arn:aws:secretsmanager:eu-west-1:123456789012:secret:app/db-AbCdEf"
                }
            })
            .to_string()
        }))
        .expect("event should deserialize");

        let invoking = event
            .parse_invoking_event()
            .expect("invoking event should parse");
        assert!(!invoking.is_scheduled());
        let item = invoking
            .configuration_item
            .expect("configuration item should exist");
        assert_eq!(
            item.resource_type.as_deref(),
            Some("AWS::SecretsManager::Secret")
        );
        assert!(item
            .arn
            .expect("ARN should exist")
            .ends_with(":secret:app/db-AbCdEf"));
    }

    #[test]
    fn missing_invoking_event_is_an_error() {
        let event = RuleEvent {
            result_token: "token-1".to_string(),
            account_id: None,
            invoking_event: None,
        };

        let error = event
            .parse_invoking_event()
            .expect_err("absent invokingEvent should fail");
        assert!(error.message().contains("missing invokingEvent"));
    }

    #[test]
    fn unknown_message_type_falls_back_to_other() {
        let invoking: InvokingEvent = serde_json::from_str(
            "{\"messageType\":\"SomethingNew\",\"notificationCreationTime\":\"2026-02-14T00:00:00Z\"}",
        )
        .expect("invoking event should parse");

        assert_eq!(invoking.message_type, Some(MessageType::Other));
        assert!(!invoking.is_scheduled());
    }

    #[test]
    fn notification_creation_time_parses_to_utc() {
        let invoking: InvokingEvent = serde_json::from_str(
            "{\"messageType\":\"ScheduledNotification\",\"notificationCreationTime\":\"2026-02-14T21:41:32.765Z\"}",
        )
        .expect("invoking event should parse");

        let created = invoking
            .notification_created_at()
            .expect("timestamp should parse");
        assert_eq!(created.to_rfc3339(), "2026-02-14T21:41:32.765+00:00");
    }
}
