use chrono::{DateTime, Utc};
use config_rules_core::contract::RuleEvent;
use config_rules_core::evaluation::Evaluation;
use config_rules_core::rules::keys::evaluate_key;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::adapters::evaluation_sink::{submit_in_batches, EvaluationSink};
use crate::adapters::key_inventory::KeyInventory;

/// Structured invocation result; this checker never signals a failed
/// invocation to the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyCheckResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

/// Evaluates every customer-managed enabled key against the usage threshold.
///
/// Per-key describe failures are logged and the key skipped; any other
/// failure (event parsing, listing, submission) is caught into a 500
/// response rather than propagated.
pub fn handle_key_usage_event(
    event: Value,
    threshold_days: i64,
    now: DateTime<Utc>,
    inventory: &dyn KeyInventory,
    sink: &dyn EvaluationSink,
) -> KeyCheckResponse {
    log_info(
        "evaluation_started",
        json!({ "threshold_days": threshold_days }),
    );

    match run_key_check(event, threshold_days, now, inventory, sink) {
        Ok(evaluations_submitted) => {
            log_info(
                "evaluation_completed",
                json!({ "evaluations_submitted": evaluations_submitted }),
            );
            KeyCheckResponse {
                status_code: 200,
                body: json!({ "message": "Evaluation completed successfully" }).to_string(),
            }
        }
        Err(error) => {
            log_error("evaluation_failed", json!({ "error": error }));
            KeyCheckResponse {
                status_code: 500,
                body: json!({ "error": error }).to_string(),
            }
        }
    }
}

fn run_key_check(
    event: Value,
    threshold_days: i64,
    now: DateTime<Utc>,
    inventory: &dyn KeyInventory,
    sink: &dyn EvaluationSink,
) -> Result<usize, String> {
    let event: RuleEvent = serde_json::from_value(event)
        .map_err(|error| format!("malformed rule event: {error}"))?;

    let evaluations = collect_key_evaluations(inventory, now, threshold_days)?;
    submit_in_batches(sink, &evaluations, &event.result_token)?;
    Ok(evaluations.len())
}

fn collect_key_evaluations(
    inventory: &dyn KeyInventory,
    now: DateTime<Utc>,
    threshold_days: i64,
) -> Result<Vec<Evaluation>, String> {
    let mut evaluations = Vec::new();
    let mut marker: Option<String> = None;

    loop {
        let page = inventory.list_keys(marker.as_deref())?;
        for key_id in page.key_ids {
            match inventory.describe_key(&key_id) {
                Ok(description) => {
                    if let Some(evaluation) = evaluate_key(&description, now, threshold_days) {
                        evaluations.push(evaluation);
                    }
                }
                Err(error) => {
                    // Skip the key, keep scanning the rest of the account.
                    log_error(
                        "key_describe_failed",
                        json!({ "key_id": key_id, "error": error }),
                    );
                }
            }
        }

        match page.next_marker {
            Some(next_marker) => marker = Some(next_marker),
            None => break,
        }
    }

    Ok(evaluations)
}

fn log_info(event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "key_usage_checker",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn log_error(event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "key_usage_checker",
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
