pub mod certificates;
pub mod keys;
pub mod secrets;
