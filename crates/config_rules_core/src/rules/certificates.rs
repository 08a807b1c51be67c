use chrono::{DateTime, Utc};

use crate::evaluation::{Compliance, Evaluation, ResourceKind};

pub const PENDING_DNS_ANNOTATION: &str = "Public ACM cert is pending DNS validation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateOrigin {
    AmazonIssued,
    Imported,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateStatus {
    PendingValidation,
    Issued,
    Inactive,
    Expired,
    ValidationTimedOut,
    Revoked,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainValidationMethod {
    Dns,
    Email,
    Other,
}

/// Full certificate detail as returned by the certificate inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateDetail {
    pub arn: String,
    pub origin: CertificateOrigin,
    pub status: CertificateStatus,
    /// Per-domain validation methods, in the inventory's order.
    pub validation_methods: Vec<DomainValidationMethod>,
    pub created_at: DateTime<Utc>,
}

/// Flags Amazon-issued certificates stuck in pending DNS validation.
///
/// Everything else is skipped; no per-certificate compliant verdict exists.
/// The rule inspects the first validation method only.
pub fn evaluate_certificate(detail: &CertificateDetail) -> Option<Evaluation> {
    let pending_dns = detail.origin == CertificateOrigin::AmazonIssued
        && detail.status == CertificateStatus::PendingValidation
        && detail.validation_methods.first() == Some(&DomainValidationMethod::Dns);

    if !pending_dns {
        return None;
    }

    Some(
        Evaluation::new(
            ResourceKind::AcmCertificate,
            detail.arn.clone(),
            Compliance::NonCompliant,
            detail.created_at,
        )
        .with_annotation(PENDING_DNS_ANNOTATION),
    )
}
