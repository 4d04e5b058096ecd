//! Explainable consumer loan decisions.
//!
//! A [`decisioning::PdEstimator`] supplies the probability of default for an applicant and the
//! [`decisioning::RuleEngine`] turns that estimate plus the applicant's features into an
//! approve/reject verdict listing every violated criterion.

pub mod config;
pub mod decisioning;
pub mod error;
pub mod telemetry;
