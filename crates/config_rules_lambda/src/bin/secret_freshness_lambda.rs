use chrono::{DateTime, Utc};
use config_rules_core::evaluation::{Compliance, Evaluation};
use config_rules_core::rules::secrets::SecretDescription;
use config_rules_lambda::adapters::evaluation_sink::EvaluationSink;
use config_rules_lambda::adapters::secret_inventory::{SecretInventory, SecretPage};
use config_rules_lambda::handlers::secrets::{
    handle_secret_freshness_event, SecretCheckSummary,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct SecretsManagerInventory {
    secrets_client: aws_sdk_secretsmanager::Client,
}

impl SecretInventory for SecretsManagerInventory {
    fn list_secrets(&self, next_token: Option<&str>) -> Result<SecretPage, String> {
        let client = self.secrets_client.clone();
        let next_token = next_token.map(str::to_string);

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .list_secrets()
                    .set_next_token(next_token)
                    .send()
                    .await
                    .map_err(|error| format!("failed to list secrets: {error}"))?;

                let secret_arns = output
                    .secret_list()
                    .iter()
                    .filter_map(|entry| entry.arn().map(str::to_string))
                    .collect();
                Ok(SecretPage {
                    secret_arns,
                    next_token: output.next_token().map(str::to_string),
                })
            })
        })
    }

    fn describe_secret(&self, secret_arn: &str) -> Result<SecretDescription, String> {
        let client = self.secrets_client.clone();
        let requested_arn = secret_arn.to_string();

        let output = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .describe_secret()
                    .secret_id(&requested_arn)
                    .send()
                    .await
                    .map_err(|error| {
                        format!("failed to describe secret {requested_arn}: {error}")
                    })
            })
        })?;

        Ok(SecretDescription {
            created_at: output.created_date().and_then(to_utc_datetime),
            last_accessed: output.last_accessed_date().and_then(to_utc_datetime),
        })
    }
}

fn to_utc_datetime(value: &aws_sdk_secretsmanager::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
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

async fn handle_request(event: LambdaEvent<Value>) -> Result<SecretCheckSummary, Error> {
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let inventory = SecretsManagerInventory {
        secrets_client: aws_sdk_secretsmanager::Client::new(&aws_config),
    };
    let sink = ConfigEvaluationSink {
        config_client: aws_sdk_config::Client::new(&aws_config),
    };

    handle_secret_freshness_event(event.payload, Utc::now(), &inventory, &sink)
        .map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
