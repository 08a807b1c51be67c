use chrono::{DateTime, Utc};

use crate::clock::elapsed_whole_days;
use crate::evaluation::{Compliance, Evaluation, ResourceKind};

/// A secret is stale once it has gone unaccessed for more than this long.
pub const MAX_IDLE_DAYS: i64 = 1;

const ARN_SECRET_MARKER: &str = ":secret:";

/// Secret detail as returned by the secret inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct SecretDescription {
    pub created_at: Option<DateTime<Utc>>,
    pub last_accessed: Option<DateTime<Utc>>,
}

/// The aggregator resource id for a secret: the ARN portion after
/// `":secret:"`, or the full input when the marker is absent.
pub fn secret_resource_id(secret_arn: &str) -> &str {
    match secret_arn.rsplit_once(ARN_SECRET_MARKER) {
        Some((_, suffix)) => suffix,
        None => secret_arn,
    }
}

/// Evaluates one secret's access freshness. Always produces a verdict.
pub fn evaluate_secret(
    secret_arn: &str,
    description: &SecretDescription,
    now: DateTime<Utc>,
) -> Evaluation {
    let mut notes: Vec<String> = Vec::new();

    match description.created_at {
        Some(created) => notes.push(format!("Created: {}", created.format("%Y-%m-%d"))),
        None => notes.push("No creation date".to_string()),
    }

    let compliance = match description.last_accessed {
        Some(last_accessed) => {
            let days = elapsed_whole_days(now, last_accessed);
            notes.push(format!("Last accessed: {days} days ago"));
            if days > MAX_IDLE_DAYS {
                Compliance::NonCompliant
            } else {
                Compliance::Compliant
            }
        }
        None => {
            notes.push("Never accessed".to_string());
            Compliance::NonCompliant
        }
    };

    Evaluation::new(
        ResourceKind::SecretsManagerSecret,
        secret_resource_id(secret_arn),
        compliance,
        now,
    )
    .with_annotation(notes.join(" | "))
}

/// Fail-closed verdict for a secret whose detail fetch failed: the error
/// itself is the (truncated) annotation.
pub fn describe_failure_evaluation(
    secret_arn: &str,
    error: &str,
    now: DateTime<Utc>,
) -> Evaluation {
    Evaluation::new(
        ResourceKind::SecretsManagerSecret,
        secret_resource_id(secret_arn),
        Compliance::NonCompliant,
        now,
    )
    .with_annotation(format!("Error: {error}"))
}
