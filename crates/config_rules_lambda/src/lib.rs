//! AWS-oriented adapters and handlers for the compliance checkers.
//!
//! This crate owns runtime integration details (Lambda handlers, inventory
//! and aggregation-sink seams) on top of the contract and rule primitives in
//! `config_rules_core`. The AWS SDK implementations of the adapter traits
//! live with the binaries under `src/bin/`.

pub mod adapters;
pub mod handlers;
