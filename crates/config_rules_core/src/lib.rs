//! Shared compliance-rule domain primitives.
//!
//! This crate owns the rule-invocation event contract, the evaluation record
//! and its batching limits, calendar-day arithmetic, and the pure per-resource
//! rule evaluators. It intentionally excludes AWS SDK and Lambda runtime
//! concerns.

pub mod clock;
pub mod contract;
pub mod evaluation;
pub mod rules;
