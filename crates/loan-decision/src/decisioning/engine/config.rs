use serde::{Deserialize, Serialize};

/// Thresholds governing the eligibility rules. Owned by exactly one [`super::RuleEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyParameters {
    /// Predicted PD at or above this value rejects.
    pub pd_threshold: f64,
    pub min_age: u32,
    pub max_age: u32,
    pub min_income: f64,
    /// Compared against the employment length bucket code.
    pub min_employment_length: u32,
    pub min_credit_score: u32,
    /// Largest debt-to-income fraction still accepted.
    pub debt_to_income_ratio: f64,
    pub max_delinquencies_2y: u32,
}

impl Default for PolicyParameters {
    fn default() -> Self {
        Self {
            pd_threshold: 0.10,
            min_age: 18,
            max_age: 75,
            min_income: 15_000.0,
            min_employment_length: 1,
            min_credit_score: 650,
            debt_to_income_ratio: 0.35,
            max_delinquencies_2y: 1,
        }
    }
}

impl PolicyParameters {
    pub fn with_overrides(mut self, overrides: &PolicyOverrides) -> Self {
        self.apply(overrides);
        self
    }

    /// Overwrite every parameter named in `overrides`. Values are not validated, so an inverted
    /// age window is accepted as given.
    pub fn apply(&mut self, overrides: &PolicyOverrides) {
        if let Some(value) = overrides.pd_threshold {
            self.pd_threshold = value;
        }
        if let Some(value) = overrides.min_age {
            self.min_age = value;
        }
        if let Some(value) = overrides.max_age {
            self.max_age = value;
        }
        if let Some(value) = overrides.min_income {
            self.min_income = value;
        }
        if let Some(value) = overrides.min_employment_length {
            self.min_employment_length = value;
        }
        if let Some(value) = overrides.min_credit_score {
            self.min_credit_score = value;
        }
        if let Some(value) = overrides.debt_to_income_ratio {
            self.debt_to_income_ratio = value;
        }
        if let Some(value) = overrides.max_delinquencies_2y {
            self.max_delinquencies_2y = value;
        }
    }
}

/// Partial update of [`PolicyParameters`]; `None` leaves the current value untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pd_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_income: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_employment_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_credit_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_to_income_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_delinquencies_2y: Option<u32>,
}

impl PolicyOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn pd_threshold(mut self, value: f64) -> Self {
        self.pd_threshold = Some(value);
        self
    }

    pub fn min_credit_score(mut self, value: u32) -> Self {
        self.min_credit_score = Some(value);
        self
    }

    pub fn age_window(mut self, min_age: u32, max_age: u32) -> Self {
        self.min_age = Some(min_age);
        self.max_age = Some(max_age);
        self
    }

    /// Names of the parameters this update touches, in declaration order.
    pub fn touched(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.pd_threshold.is_some() {
            names.push("pd_threshold");
        }
        if self.min_age.is_some() {
            names.push("min_age");
        }
        if self.max_age.is_some() {
            names.push("max_age");
        }
        if self.min_income.is_some() {
            names.push("min_income");
        }
        if self.min_employment_length.is_some() {
            names.push("min_employment_length");
        }
        if self.min_credit_score.is_some() {
            names.push("min_credit_score");
        }
        if self.debt_to_income_ratio.is_some() {
            names.push("debt_to_income_ratio");
        }
        if self.max_delinquencies_2y.is_some() {
            names.push("max_delinquencies_2y");
        }
        names
    }
}
