mod config;
mod rules;
mod verdict;

pub use config::{PolicyOverrides, PolicyParameters};
pub use rules::{missing_field_reason, EligibilityRule};
pub use verdict::{Decision, DecisionVerdict, ALL_CRITERIA_MET};

use super::domain::{ApplicantField, ApplicantRecord};
use rules::{check_rule, RuleCheck};

/// Deterministic eligibility evaluator holding the current policy thresholds.
///
/// `evaluate` never mutates the engine; `update_parameters` is the only way thresholds change.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    parameters: PolicyParameters,
}

impl RuleEngine {
    pub fn new(parameters: PolicyParameters) -> Self {
        Self { parameters }
    }

    pub fn with_overrides(overrides: &PolicyOverrides) -> Self {
        Self::new(PolicyParameters::default().with_overrides(overrides))
    }

    pub fn parameters(&self) -> &PolicyParameters {
        &self.parameters
    }

    /// Run every rule in order and collect one reason per failing rule.
    ///
    /// An absent field fails the rules that read it with a "Missing Required Field" reason. A
    /// NaN PD or a non-numeric value in a compared field is rejected as invalid input.
    pub fn evaluate(
        &self,
        applicant: &ApplicantRecord,
        predicted_pd: f64,
    ) -> Result<DecisionVerdict, EngineError> {
        if predicted_pd.is_nan() {
            return Err(EngineError::IncomparablePd);
        }

        let mut failures = Vec::new();
        for rule in EligibilityRule::ORDERED {
            if let RuleCheck::Fail(reason) =
                check_rule(rule, applicant, predicted_pd, &self.parameters)?
            {
                failures.push(reason);
            }
        }

        Ok(DecisionVerdict::from_failures(failures, predicted_pd))
    }

    pub fn update_parameters(&mut self, updates: &PolicyOverrides) {
        self.parameters.apply(updates);
    }
}

/// Input the engine cannot compare against its thresholds.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("predicted PD is not a comparable number")]
    IncomparablePd,
    #[error("field `{field}` holds non-numeric value `{value}`")]
    NonNumericField { field: ApplicantField, value: String },
}
