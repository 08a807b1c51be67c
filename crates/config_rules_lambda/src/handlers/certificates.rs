use config_rules_core::contract::RuleEvent;
use config_rules_core::evaluation::{Compliance, Evaluation, ResourceKind};
use config_rules_core::rules::certificates::evaluate_certificate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapters::certificate_inventory::CertificateInventory;
use crate::adapters::evaluation_sink::{submit_in_batches, EvaluationSink};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificateCheckSummary {
    pub evaluations_submitted: usize,
    pub non_compliant: usize,
    pub batches_submitted: usize,
}

/// Flags pending-DNS-validation certificates, falling back to a single
/// account-level compliant record when nothing was flagged.
///
/// Unlike the key and secret checkers, a describe failure here aborts the
/// whole invocation: there is no per-certificate error path. Submission
/// failures also propagate to the caller.
pub fn handle_certificate_event(
    event: Value,
    inventory: &dyn CertificateInventory,
    sink: &dyn EvaluationSink,
) -> Result<CertificateCheckSummary, String> {
    let event: RuleEvent = serde_json::from_value(event)
        .map_err(|error| format!("malformed rule event: {error}"))?;

    let mut evaluations = Vec::new();
    for certificate_arn in inventory.list_pending_validation()? {
        let detail = inventory.describe_certificate(&certificate_arn)?;
        if let Some(evaluation) = evaluate_certificate(&detail) {
            evaluations.push(evaluation);
        }
    }
    let non_compliant = evaluations.len();

    if evaluations.is_empty() {
        let account_id = event
            .account_id
            .clone()
            .ok_or_else(|| "rule event is missing accountId".to_string())?;
        let invoking = event
            .parse_invoking_event()
            .map_err(|error| error.to_string())?;
        let notification_created_at = invoking
            .notification_created_at()
            .map_err(|error| error.to_string())?;
        evaluations.push(Evaluation::new(
            ResourceKind::Account,
            account_id,
            Compliance::Compliant,
            notification_created_at,
        ));
    }

    let batches_submitted = submit_in_batches(sink, &evaluations, &event.result_token)?;

    Ok(CertificateCheckSummary {
        evaluations_submitted: evaluations.len(),
        non_compliant,
        batches_submitted,
    })
}
