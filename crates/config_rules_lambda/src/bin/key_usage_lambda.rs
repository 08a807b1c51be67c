use aws_sdk_kms::types::{KeyManagerType, KeyState};
use chrono::Utc;
use config_rules_core::evaluation::{Compliance, Evaluation};
use config_rules_core::rules::keys::{parse_threshold_days, KeyDescription, KeyManagerKind};
use config_rules_lambda::adapters::evaluation_sink::EvaluationSink;
use config_rules_lambda::adapters::key_inventory::{KeyInventory, KeyPage};
use config_rules_lambda::handlers::keys::{handle_key_usage_event, KeyCheckResponse};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

const THRESHOLD_DAYS_VAR: &str = "THRESHOLD_DAYS";

struct KmsKeyInventory {
    kms_client: aws_sdk_kms::Client,
}

impl KeyInventory for KmsKeyInventory {
    fn list_keys(&self, marker: Option<&str>) -> Result<KeyPage, String> {
        let client = self.kms_client.clone();
        let marker = marker.map(str::to_string);

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .list_keys()
                    .set_marker(marker)
                    .send()
                    .await
                    .map_err(|error| format!("failed to list keys: {error}"))?;

                let key_ids = output
                    .keys()
                    .iter()
                    .filter_map(|entry| entry.key_id().map(str::to_string))
                    .collect();
                Ok(KeyPage {
                    key_ids,
                    next_marker: output.next_marker().map(str::to_string),
                })
            })
        })
    }

    fn describe_key(&self, key_id: &str) -> Result<KeyDescription, String> {
        let client = self.kms_client.clone();
        let requested_key_id = key_id.to_string();

        let output = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .describe_key()
                    .key_id(&requested_key_id)
                    .send()
                    .await
                    .map_err(|error| format!("failed to describe key {requested_key_id}: {error}"))
            })
        })?;

        let metadata = output
            .key_metadata()
            .ok_or_else(|| format!("describe response for key {key_id} carries no metadata"))?;
        Ok(to_key_description(metadata))
    }
}

fn to_key_description(metadata: &aws_sdk_kms::types::KeyMetadata) -> KeyDescription {
    KeyDescription {
        key_id: metadata.key_id().to_string(),
        manager: match metadata.key_manager() {
            Some(KeyManagerType::Customer) => KeyManagerKind::Customer,
            _ => KeyManagerKind::Service,
        },
        enabled: matches!(metadata.key_state(), Some(KeyState::Enabled)),
        // The describe response carries no usage timestamp, so every enabled
        // customer key evaluates through the never-used branch.
        last_used: None,
    }
}

struct ConfigEvaluationSink {
    config_client: aws_sdk_config::Client,
}

impl EvaluationSink for ConfigEvaluationSink {
    fn put_evaluations(&self, batch: &[Evaluation], result_token: &str) -> Result<(), String> {
        let mut wire_batch = Vec::with_capacity(batch.len());
        for evaluation in batch {
            wire_batch.push(to_wire_evaluation(evaluation)?);
        }

        let client = self.config_client.clone();
        let result_token = result_token.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_evaluations()
                    .set_evaluations(Some(wire_batch))
                    .result_token(result_token)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to submit evaluations: {error}"))
            })
        })
    }
}

fn to_wire_evaluation(
    evaluation: &Evaluation,
) -> Result<aws_sdk_config::types::Evaluation, String> {
    aws_sdk_config::types::Evaluation::builder()
        .compliance_resource_type(evaluation.resource_kind.as_str())
        .compliance_resource_id(&evaluation.resource_id)
        .compliance_type(to_compliance_type(evaluation.compliance))
        .set_annotation(evaluation.annotation.clone())
        .ordering_timestamp(aws_sdk_config::primitives::DateTime::from_millis(
            evaluation.ordering_timestamp.timestamp_millis(),
        ))
        .build()
        .map_err(|error| format!("failed to build evaluation record: {error}"))
}

fn to_compliance_type(compliance: Compliance) -> aws_sdk_config::types::ComplianceType {
    match compliance {
        Compliance::Compliant => aws_sdk_config::types::ComplianceType::Compliant,
        Compliance::NonCompliant => aws_sdk_config::types::ComplianceType::NonCompliant,
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<KeyCheckResponse, Error> {
    let threshold_days = parse_threshold_days(std::env::var(THRESHOLD_DAYS_VAR).ok().as_deref())
        .map_err(|error| Error::from(format!("{THRESHOLD_DAYS_VAR}: {error}")))?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let inventory = KmsKeyInventory {
        kms_client: aws_sdk_kms::Client::new(&aws_config),
    };
    let sink = ConfigEvaluationSink {
        config_client: aws_sdk_config::Client::new(&aws_config),
    };

    Ok(handle_key_usage_event(
        event.payload,
        threshold_days,
        Utc::now(),
        &inventory,
        &sink,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
