pub mod certificate_inventory;
pub mod evaluation_sink;
pub mod key_inventory;
pub mod secret_inventory;
