use serde::{Deserialize, Serialize};

use super::super::domain::{ApplicantField, ApplicantRecord, FieldLookup, FieldValue};
use super::config::PolicyParameters;
use super::EngineError;

/// Eligibility criteria in their fixed evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityRule {
    DefaultProbability,
    AnnualIncome,
    AgeRange,
    EmploymentLength,
    CreditScore,
    DebtToIncome,
    RecentDelinquencies,
}

impl EligibilityRule {
    pub const ORDERED: [EligibilityRule; 7] = [
        EligibilityRule::DefaultProbability,
        EligibilityRule::AnnualIncome,
        EligibilityRule::AgeRange,
        EligibilityRule::EmploymentLength,
        EligibilityRule::CreditScore,
        EligibilityRule::DebtToIncome,
        EligibilityRule::RecentDelinquencies,
    ];

    /// Reason reported when the rule fails on a present value.
    pub const fn reason(self) -> &'static str {
        match self {
            EligibilityRule::DefaultProbability => "High Probability of Default",
            EligibilityRule::AnnualIncome => "Annual Income Too Low",
            EligibilityRule::AgeRange => "Age Out of Range",
            EligibilityRule::EmploymentLength => "Insufficient Employment Length",
            EligibilityRule::CreditScore => "Low Credit Score",
            EligibilityRule::DebtToIncome => "High Debt-to-Income Ratio",
            EligibilityRule::RecentDelinquencies => "Excessive Recent Delinquencies",
        }
    }

    /// Applicant field the rule reads. The PD rule reads the estimate instead.
    pub const fn field(self) -> Option<ApplicantField> {
        match self {
            EligibilityRule::DefaultProbability => None,
            EligibilityRule::AnnualIncome => Some(ApplicantField::AnnualIncome),
            EligibilityRule::AgeRange => Some(ApplicantField::Age),
            EligibilityRule::EmploymentLength => Some(ApplicantField::EmploymentLength),
            EligibilityRule::CreditScore => Some(ApplicantField::CreditScore),
            EligibilityRule::DebtToIncome => Some(ApplicantField::DebtToIncome),
            EligibilityRule::RecentDelinquencies => Some(ApplicantField::Delinquencies2y),
        }
    }
}

/// Reason reported in place of a rule's own reason when its field is absent.
pub fn missing_field_reason(field: ApplicantField) -> String {
    format!("Missing Required Field: {}", field.name())
}

/// Outcome of a single rule against one applicant.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RuleCheck {
    Pass,
    Fail(String),
}

pub(crate) fn check_rule(
    rule: EligibilityRule,
    applicant: &ApplicantRecord,
    predicted_pd: f64,
    params: &PolicyParameters,
) -> Result<RuleCheck, EngineError> {
    let value = match rule.field() {
        None => predicted_pd,
        Some(field) => match numeric_field(applicant, field)? {
            Some(value) => value,
            None => return Ok(RuleCheck::Fail(missing_field_reason(field))),
        },
    };

    let failed = match rule {
        EligibilityRule::DefaultProbability => value >= params.pd_threshold,
        EligibilityRule::AnnualIncome => value < params.min_income,
        EligibilityRule::AgeRange => {
            value < f64::from(params.min_age) || value > f64::from(params.max_age)
        }
        EligibilityRule::EmploymentLength => value < f64::from(params.min_employment_length),
        EligibilityRule::CreditScore => value < f64::from(params.min_credit_score),
        EligibilityRule::DebtToIncome => value > params.debt_to_income_ratio,
        EligibilityRule::RecentDelinquencies => value > f64::from(params.max_delinquencies_2y),
    };

    if failed {
        Ok(RuleCheck::Fail(rule.reason().to_string()))
    } else {
        Ok(RuleCheck::Pass)
    }
}

fn numeric_field(
    applicant: &ApplicantRecord,
    field: ApplicantField,
) -> Result<Option<f64>, EngineError> {
    match applicant.lookup(field) {
        FieldLookup::Absent => Ok(None),
        FieldLookup::Present(FieldValue::Number(value)) if !value.is_nan() => Ok(Some(*value)),
        FieldLookup::Present(value) => Err(EngineError::NonNumericField {
            field,
            value: value.to_string(),
        }),
    }
}
