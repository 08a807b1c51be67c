use chrono::{DateTime, Utc};

/// Hard per-call record limit of the aggregation service.
pub const PUT_EVALUATIONS_BATCH_LIMIT: usize = 100;

/// Annotation length limit of the aggregation service, in characters.
pub const MAX_ANNOTATION_CHARS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Account,
    AcmCertificate,
    KmsKey,
    SecretsManagerSecret,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Account => "AWS::::Account",
            Self::AcmCertificate => "AWS::ACM::Certificate",
            Self::KmsKey => "AWS::KMS::Key",
            Self::SecretsManagerSecret => "AWS::SecretsManager::Secret",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compliance {
    Compliant,
    NonCompliant,
}

impl Compliance {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compliant => "COMPLIANT",
            Self::NonCompliant => "NON_COMPLIANT",
        }
    }
}

/// One compliance verdict, created during a single invocation and handed to
/// the aggregation service in the same invocation's submission calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub resource_kind: ResourceKind,
    pub resource_id: String,
    pub compliance: Compliance,
    pub annotation: Option<String>,
    pub ordering_timestamp: DateTime<Utc>,
}

impl Evaluation {
    pub fn new(
        resource_kind: ResourceKind,
        resource_id: impl Into<String>,
        compliance: Compliance,
        ordering_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            resource_kind,
            resource_id: resource_id.into(),
            compliance,
            annotation: None,
            ordering_timestamp,
        }
    }

    /// Attaches an annotation, truncated to the aggregator's character limit.
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(truncate_annotation(annotation.into()));
        self
    }
}

fn truncate_annotation(raw: String) -> String {
    if raw.chars().count() <= MAX_ANNOTATION_CHARS {
        raw
    } else {
        raw.chars().take(MAX_ANNOTATION_CHARS).collect()
    }
}

/// Splits a verdict list into contiguous submission batches, preserving
/// original order. An empty list yields no batches.
pub fn batched(evaluations: &[Evaluation]) -> std::slice::Chunks<'_, Evaluation> {
    evaluations.chunks(PUT_EVALUATIONS_BATCH_LIMIT)
}
