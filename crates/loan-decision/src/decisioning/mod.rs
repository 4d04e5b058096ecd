//! Loan application decisioning: PD estimation, eligibility rules, and the service and HTTP
//! surfaces that combine them.

pub mod batch;
pub mod domain;
pub(crate) mod engine;
pub mod estimator;
pub mod history;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use batch::{
    assess_batch, parse_applicants, BatchError, BatchOutcome, BatchReport, BatchRowResult,
    BatchSummary,
};
pub use domain::{
    ApplicantField, ApplicantRecord, ApplicationChannel, AssessmentId, EmploymentLengthBucket,
    FieldLookup, FieldValue, HomeOwnership, LoanApplication, LoanPurpose, LoanTerm, Region,
    UnknownCode,
};
pub use engine::{
    missing_field_reason, Decision, DecisionVerdict, EligibilityRule, EngineError,
    PolicyOverrides, PolicyParameters, RuleEngine, ALL_CRITERIA_MET,
};
pub use estimator::{
    CategoricalTerm, EstimatorError, LogisticScorecard, NumericTerm, PdEstimator,
};
pub use history::{PolicyChange, PolicyHistory, DEFAULT_HISTORY_LIMIT};
pub use router::{decision_router, EvaluateRequest, PolicyUpdateRequest};
pub use service::{Assessment, DecisionServiceError, LoanDecisionService};
