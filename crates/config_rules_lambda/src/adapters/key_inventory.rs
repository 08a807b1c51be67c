use config_rules_core::rules::keys::KeyDescription;

/// One page of the full-account key listing.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPage {
    pub key_ids: Vec<String>,
    /// Cursor for the next page; `None` once the listing is exhausted.
    pub next_marker: Option<String>,
}

pub trait KeyInventory {
    fn list_keys(&self, marker: Option<&str>) -> Result<KeyPage, String>;

    fn describe_key(&self, key_id: &str) -> Result<KeyDescription, String>;
}
