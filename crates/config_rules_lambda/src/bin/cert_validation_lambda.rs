use aws_sdk_acm::types::{
    CertificateStatus as AcmCertificateStatus, CertificateType, ValidationMethod,
};
use config_rules_core::evaluation::{Compliance, Evaluation};
use config_rules_core::rules::certificates::{
    CertificateDetail, CertificateOrigin, CertificateStatus, DomainValidationMethod,
};
use config_rules_lambda::adapters::certificate_inventory::CertificateInventory;
use config_rules_lambda::adapters::evaluation_sink::EvaluationSink;
use config_rules_lambda::handlers::certificates::{
    handle_certificate_event, CertificateCheckSummary,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct AcmCertificateInventory {
    acm_client: aws_sdk_acm::Client,
}

impl CertificateInventory for AcmCertificateInventory {
    fn list_pending_validation(&self) -> Result<Vec<String>, String> {
        let client = self.acm_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .list_certificates()
                    .certificate_statuses(AcmCertificateStatus::PendingValidation)
                    .send()
                    .await
                    .map_err(|error| format!("failed to list certificates: {error}"))?;

                let mut certificate_arns = Vec::new();
                for summary in output.certificate_summary_list() {
                    if let Some(certificate_arn) = summary.certificate_arn() {
                        certificate_arns.push(certificate_arn.to_string());
                    }
                }
                Ok(certificate_arns)
            })
        })
    }

    fn describe_certificate(&self, certificate_arn: &str) -> Result<CertificateDetail, String> {
        let client = self.acm_client.clone();
        let requested_arn = certificate_arn.to_string();

        let output = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .describe_certificate()
                    .certificate_arn(&requested_arn)
                    .send()
                    .await
                    .map_err(|error| {
                        format!("failed to describe certificate {requested_arn}: {error}")
                    })
            })
        })?;

        let certificate = output.certificate().ok_or_else(|| {
            format!("describe response for {certificate_arn} carries no certificate")
        })?;
        to_certificate_detail(certificate_arn, certificate)
    }
}

fn to_certificate_detail(
    certificate_arn: &str,
    certificate: &aws_sdk_acm::types::CertificateDetail,
) -> Result<CertificateDetail, String> {
    let origin = match certificate.r#type() {
        Some(CertificateType::AmazonIssued) => CertificateOrigin::AmazonIssued,
        Some(CertificateType::Imported) => CertificateOrigin::Imported,
        Some(CertificateType::Private) => CertificateOrigin::Private,
        other => {
            return Err(format!(
                "certificate {certificate_arn} has unrecognized type: {other:?}"
            ))
        }
    };

    let status = match certificate.status() {
        Some(AcmCertificateStatus::PendingValidation) => CertificateStatus::PendingValidation,
        Some(AcmCertificateStatus::Issued) => CertificateStatus::Issued,
        Some(AcmCertificateStatus::Inactive) => CertificateStatus::Inactive,
        Some(AcmCertificateStatus::Expired) => CertificateStatus::Expired,
        Some(AcmCertificateStatus::ValidationTimedOut) => CertificateStatus::ValidationTimedOut,
        Some(AcmCertificateStatus::Revoked) => CertificateStatus::Revoked,
        Some(AcmCertificateStatus::Failed) => CertificateStatus::Failed,
        other => {
            return Err(format!(
                "certificate {certificate_arn} has unrecognized status: {other:?}"
            ))
        }
    };

    let validation_methods = certificate
        .domain_validation_options()
        .iter()
        .map(|option| match option.validation_method() {
            Some(ValidationMethod::Dns) => DomainValidationMethod::Dns,
            Some(ValidationMethod::Email) => DomainValidationMethod::Email,
            _ => DomainValidationMethod::Other,
        })
        .collect();

    let created_at = certificate
        .created_at()
        .and_then(|created_at| chrono::DateTime::from_timestamp(created_at.secs(), created_at.subsec_nanos()))
        .ok_or_else(|| format!("certificate {certificate_arn} has no creation timestamp"))?;

    Ok(CertificateDetail {
        arn: certificate_arn.to_string(),
        origin,
        status,
        validation_methods,
        created_at,
    })
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

async fn handle_request(event: LambdaEvent<Value>) -> Result<CertificateCheckSummary, Error> {
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let inventory = AcmCertificateInventory {
        acm_client: aws_sdk_acm::Client::new(&aws_config),
    };
    let sink = ConfigEvaluationSink {
        config_client: aws_sdk_config::Client::new(&aws_config),
    };

    handle_certificate_event(event.payload, &inventory, &sink).map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
