use config_rules_core::rules::certificates::CertificateDetail;

pub trait CertificateInventory {
    /// Lists the ARNs of certificates in the pending-validation state.
    /// The listing is filtered server-side; no pagination is involved.
    fn list_pending_validation(&self) -> Result<Vec<String>, String>;

    fn describe_certificate(&self, certificate_arn: &str) -> Result<CertificateDetail, String>;
}
