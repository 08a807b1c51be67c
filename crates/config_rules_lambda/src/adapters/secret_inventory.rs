use config_rules_core::rules::secrets::SecretDescription;

/// One page of the full-account secret listing.
#[derive(Debug, Clone, PartialEq)]
pub struct SecretPage {
    pub secret_arns: Vec<String>,
    /// Cursor for the next page; `None` once the listing is exhausted.
    pub next_token: Option<String>,
}

pub trait SecretInventory {
    fn list_secrets(&self, next_token: Option<&str>) -> Result<SecretPage, String>;

    fn describe_secret(&self, secret_arn: &str) -> Result<SecretDescription, String>;
}
