use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::decisioning::domain::{
    ApplicantRecord, ApplicationChannel, EmploymentLengthBucket, HomeOwnership, LoanApplication,
    LoanPurpose, LoanTerm, Region,
};
use crate::decisioning::engine::{PolicyParameters, RuleEngine};
use crate::decisioning::estimator::{EstimatorError, PdEstimator};
use crate::decisioning::service::LoanDecisionService;

/// Applicant inside every default threshold.
pub(super) fn baseline_application() -> LoanApplication {
    LoanApplication {
        age: 30,
        annual_income: 30_000.0,
        employment_length: EmploymentLengthBucket::OneToTwoYears,
        credit_score: 700,
        debt_to_income: 0.20,
        num_open_accounts: 8,
        delinquencies_2y: 0,
        inquiries_6m: 1,
        loan_amount: 10_000.0,
        interest_rate: 0.08,
        purpose: LoanPurpose::Personal,
        home_ownership: HomeOwnership::Rent,
        channel: ApplicationChannel::Online,
        region: Region::North,
        loan_term_months: LoanTerm::Months36,
    }
}

pub(super) fn baseline_applicant() -> ApplicantRecord {
    baseline_application().to_record()
}

/// Applicant that fails nearly every rule and scores a high PD.
pub(super) fn risky_application() -> LoanApplication {
    LoanApplication {
        age: 25,
        annual_income: 20_000.0,
        employment_length: EmploymentLengthBucket::UnderOneYear,
        credit_score: 550,
        debt_to_income: 0.55,
        num_open_accounts: 3,
        delinquencies_2y: 2,
        inquiries_6m: 3,
        loan_amount: 5_000.0,
        interest_rate: 0.20,
        purpose: LoanPurpose::Personal,
        home_ownership: HomeOwnership::Rent,
        channel: ApplicationChannel::Branch,
        region: Region::East,
        loan_term_months: LoanTerm::Months12,
    }
}

pub(super) fn default_engine() -> RuleEngine {
    RuleEngine::default()
}

/// Estimator returning the same probability for every applicant.
pub(super) struct FixedEstimator(pub(super) f64);

impl PdEstimator for FixedEstimator {
    fn estimate(&self, _applicant: &ApplicantRecord) -> Result<f64, EstimatorError> {
        Ok(self.0)
    }
}

pub(super) struct OfflineEstimator;

impl PdEstimator for OfflineEstimator {
    fn estimate(&self, _applicant: &ApplicantRecord) -> Result<f64, EstimatorError> {
        Err(EstimatorError::ModelUnavailable(
            "models/scorecard.json: not found".to_string(),
        ))
    }
}

pub(super) fn fixed_service(pd: f64) -> LoanDecisionService<FixedEstimator> {
    LoanDecisionService::new(Arc::new(FixedEstimator(pd)), PolicyParameters::default())
}

pub(super) fn offline_service() -> LoanDecisionService<OfflineEstimator> {
    LoanDecisionService::new(Arc::new(OfflineEstimator), PolicyParameters::default())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
