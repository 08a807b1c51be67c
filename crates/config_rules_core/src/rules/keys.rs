use chrono::{DateTime, Utc};

use crate::clock::elapsed_whole_days;
use crate::contract::ValidationError;
use crate::evaluation::{Compliance, Evaluation, ResourceKind};

pub const DEFAULT_THRESHOLD_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyManagerKind {
    Customer,
    Service,
}

/// Key metadata as returned by the key inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDescription {
    pub key_id: String,
    pub manager: KeyManagerKind,
    pub enabled: bool,
    pub last_used: Option<DateTime<Utc>>,
}

/// Parses the usage threshold from its raw environment value.
///
/// Unset means the default of 90 days; a set but non-integer value is an
/// error surfaced when the invocation first reads its configuration.
pub fn parse_threshold_days(raw: Option<&str>) -> Result<i64, ValidationError> {
    match raw {
        None => Ok(DEFAULT_THRESHOLD_DAYS),
        Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
            ValidationError::new(format!(
                "usage threshold must be a whole number of days, got '{raw}'"
            ))
        }),
    }
}

/// Evaluates one encryption key against the usage threshold.
///
/// Keys that are not customer-managed or not enabled are skipped. A key used
/// exactly `threshold_days` ago is still compliant; only `age > threshold_days`
/// is flagged.
pub fn evaluate_key(
    description: &KeyDescription,
    now: DateTime<Utc>,
    threshold_days: i64,
) -> Option<Evaluation> {
    if description.manager != KeyManagerKind::Customer || !description.enabled {
        return None;
    }

    let (compliance, annotation) = match description.last_used {
        None => (
            Compliance::NonCompliant,
            "Key has never been used.".to_string(),
        ),
        Some(last_used) => {
            let age = elapsed_whole_days(now, last_used);
            if age > threshold_days {
                (
                    Compliance::NonCompliant,
                    format!("Key has not been used for {age} days."),
                )
            } else {
                (Compliance::Compliant, format!("Key used {age} days ago."))
            }
        }
    };

    Some(
        Evaluation::new(
            ResourceKind::KmsKey,
            description.key_id.clone(),
            compliance,
            now,
        )
        .with_annotation(annotation),
    )
}
