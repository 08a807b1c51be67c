use chrono::{DateTime, Utc};
use config_rules_core::contract::RuleEvent;
use config_rules_core::evaluation::{Evaluation, ResourceKind};
use config_rules_core::rules::secrets::{describe_failure_evaluation, evaluate_secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapters::evaluation_sink::{submit_in_batches, EvaluationSink};
use crate::adapters::secret_inventory::SecretInventory;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecretCheckSummary {
    pub evaluations_submitted: usize,
    pub batches_submitted: usize,
}

/// Evaluates secret access freshness.
///
/// A scheduled notification scans every secret in the account; any other
/// trigger evaluates only the changed resource, and only when it is a
/// secret. Describe failures become fail-closed non-compliant verdicts;
/// submission failures propagate to the caller.
pub fn handle_secret_freshness_event(
    event: Value,
    now: DateTime<Utc>,
    inventory: &dyn SecretInventory,
    sink: &dyn EvaluationSink,
) -> Result<SecretCheckSummary, String> {
    let event: RuleEvent = serde_json::from_value(event)
        .map_err(|error| format!("malformed rule event: {error}"))?;
    let invoking = event
        .parse_invoking_event()
        .map_err(|error| error.to_string())?;

    let mut evaluations = Vec::new();
    if invoking.is_scheduled() {
        let mut next_token: Option<String> = None;
        loop {
            let page = inventory.list_secrets(next_token.as_deref())?;
            for secret_arn in &page.secret_arns {
                evaluations.push(evaluate_secret_arn(inventory, secret_arn, now));
            }
            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
    } else if let Some(item) = invoking.configuration_item.as_ref() {
        if item.resource_type.as_deref() == Some(ResourceKind::SecretsManagerSecret.as_str()) {
            let secret_arn = item
                .arn
                .as_deref()
                .ok_or_else(|| "configuration item is missing ARN".to_string())?;
            evaluations.push(evaluate_secret_arn(inventory, secret_arn, now));
        }
    }

    let batches_submitted = if evaluations.is_empty() {
        0
    } else {
        submit_in_batches(sink, &evaluations, &event.result_token)?
    };

    Ok(SecretCheckSummary {
        evaluations_submitted: evaluations.len(),
        batches_submitted,
    })
}

fn evaluate_secret_arn(
    inventory: &dyn SecretInventory,
    secret_arn: &str,
    now: DateTime<Utc>,
) -> Evaluation {
    match inventory.describe_secret(secret_arn) {
        Ok(description) => evaluate_secret(secret_arn, &description, now),
        Err(error) => describe_failure_evaluation(secret_arn, &error, now),
    }
}
