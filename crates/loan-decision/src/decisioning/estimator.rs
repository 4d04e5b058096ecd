use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{ApplicantField, ApplicantRecord, FieldLookup, FieldValue};

/// Source of the probability of default for an applicant.
///
/// Implementations may block on I/O. Failures must be reported rather than replaced by a
/// placeholder probability.
pub trait PdEstimator: Send + Sync {
    fn estimate(&self, applicant: &ApplicantRecord) -> Result<f64, EstimatorError>;
}

/// Reasons an estimator cannot produce a probability.
#[derive(Debug, thiserror::Error)]
pub enum EstimatorError {
    #[error("pd model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("applicant field `{field}` cannot be scored: {detail}")]
    MalformedInput {
        field: ApplicantField,
        detail: String,
    },
    #[error("estimated probability {0} outside [0, 1]")]
    OutOfRange(f64),
}

/// Standardised numeric term: `weight * (value - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericTerm {
    pub field: ApplicantField,
    pub mean: f64,
    pub scale: f64,
    pub weight: f64,
}

/// One-hot categorical term. Codes without a weight contribute nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalTerm {
    pub field: ApplicantField,
    pub weights: BTreeMap<String, f64>,
}

/// Logistic-regression scorecard over the applicant features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticScorecard {
    pub intercept: f64,
    pub numeric: Vec<NumericTerm>,
    #[serde(default)]
    pub categorical: Vec<CategoricalTerm>,
}

impl LogisticScorecard {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EstimatorError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            EstimatorError::ModelUnavailable(format!("{}: {err}", path.display()))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, EstimatorError> {
        let scorecard: Self = serde_json::from_reader(reader).map_err(|err| {
            EstimatorError::ModelUnavailable(format!("unreadable scorecard: {err}"))
        })?;
        scorecard.validate()?;
        Ok(scorecard)
    }

    fn validate(&self) -> Result<(), EstimatorError> {
        if !self.intercept.is_finite() {
            return Err(EstimatorError::ModelUnavailable(
                "scorecard intercept must be finite".to_string(),
            ));
        }
        for term in &self.numeric {
            if !(term.scale.is_finite() && term.scale > 0.0)
                || !term.mean.is_finite()
                || !term.weight.is_finite()
            {
                return Err(EstimatorError::ModelUnavailable(format!(
                    "scorecard term for `{}` needs finite coefficients and a positive scale",
                    term.field
                )));
            }
        }
        Ok(())
    }

    /// Built-in coefficients used when no scorecard file is configured.
    pub fn reference() -> Self {
        let numeric = [
            (ApplicantField::Age, 40.0, 12.0, -0.10),
            (ApplicantField::AnnualIncome, 45_000.0, 20_000.0, -0.35),
            (ApplicantField::EmploymentLength, 5.0, 4.0, -0.20),
            (ApplicantField::CreditScore, 680.0, 60.0, -0.85),
            (ApplicantField::DebtToIncome, 0.30, 0.12, 0.55),
            (ApplicantField::NumOpenAccounts, 7.0, 4.0, 0.05),
            (ApplicantField::Delinquencies2y, 0.4, 0.8, 0.45),
            (ApplicantField::Inquiries6m, 1.5, 1.5, 0.25),
            (ApplicantField::LoanAmount, 15_000.0, 10_000.0, 0.10),
            (ApplicantField::InterestRate, 0.10, 0.04, 0.40),
        ]
        .into_iter()
        .map(|(field, mean, scale, weight)| NumericTerm {
            field,
            mean,
            scale,
            weight,
        })
        .collect();

        let categorical = [
            (
                ApplicantField::Purpose,
                &[
                    ("debt_consolidation", 0.10),
                    ("car", -0.10),
                    ("home_improvement", -0.05),
                    ("personal", 0.05),
                ][..],
            ),
            (
                ApplicantField::HomeOwnership,
                &[
                    ("rent", 0.10),
                    ("own", -0.15),
                    ("mortgage", -0.05),
                    ("other", 0.15),
                ][..],
            ),
            (
                ApplicantField::Channel,
                &[("online", 0.05), ("branch", -0.05)][..],
            ),
            (
                ApplicantField::Region,
                &[("north", 0.0), ("east", 0.05), ("south", 0.0), ("west", -0.05)][..],
            ),
            (
                ApplicantField::LoanTermMonths,
                &[
                    ("12", -0.15),
                    ("24", -0.05),
                    ("36", 0.0),
                    ("48", 0.10),
                    ("60", 0.20),
                ][..],
            ),
        ]
        .into_iter()
        .map(|(field, weights)| CategoricalTerm {
            field,
            weights: weights
                .iter()
                .map(|(code, weight)| (code.to_string(), *weight))
                .collect(),
        })
        .collect();

        Self {
            intercept: -2.6,
            numeric,
            categorical,
        }
    }

    fn log_odds(&self, applicant: &ApplicantRecord) -> Result<f64, EstimatorError> {
        let mut log_odds = self.intercept;

        for term in &self.numeric {
            let value = match applicant.lookup(term.field) {
                FieldLookup::Present(FieldValue::Number(value)) => *value,
                FieldLookup::Present(other) => {
                    return Err(EstimatorError::MalformedInput {
                        field: term.field,
                        detail: format!("expected a number, found `{other}`"),
                    })
                }
                FieldLookup::Absent => {
                    return Err(EstimatorError::MalformedInput {
                        field: term.field,
                        detail: "field is missing".to_string(),
                    })
                }
            };
            log_odds += term.weight * (value - term.mean) / term.scale;
        }

        for term in &self.categorical {
            if let FieldLookup::Present(value) = applicant.lookup(term.field) {
                log_odds += term.weights.get(&value.as_code()).copied().unwrap_or(0.0);
            }
        }

        Ok(log_odds)
    }
}

impl Default for LogisticScorecard {
    fn default() -> Self {
        Self::reference()
    }
}

impl PdEstimator for LogisticScorecard {
    fn estimate(&self, applicant: &ApplicantRecord) -> Result<f64, EstimatorError> {
        let log_odds = self.log_odds(applicant)?;
        let probability = 1.0 / (1.0 + (-log_odds).exp());

        if probability.is_finite() && (0.0..=1.0).contains(&probability) {
            Ok(probability)
        } else {
            Err(EstimatorError::OutOfRange(probability))
        }
    }
}
