use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for a completed assessment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named applicant features understood by the eligibility rules and the scorecard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicantField {
    Age,
    AnnualIncome,
    EmploymentLength,
    CreditScore,
    DebtToIncome,
    NumOpenAccounts,
    Delinquencies2y,
    Inquiries6m,
    LoanAmount,
    InterestRate,
    Purpose,
    HomeOwnership,
    Channel,
    Region,
    LoanTermMonths,
}

impl ApplicantField {
    pub const ALL: [ApplicantField; 15] = [
        ApplicantField::Age,
        ApplicantField::AnnualIncome,
        ApplicantField::EmploymentLength,
        ApplicantField::CreditScore,
        ApplicantField::DebtToIncome,
        ApplicantField::NumOpenAccounts,
        ApplicantField::Delinquencies2y,
        ApplicantField::Inquiries6m,
        ApplicantField::LoanAmount,
        ApplicantField::InterestRate,
        ApplicantField::Purpose,
        ApplicantField::HomeOwnership,
        ApplicantField::Channel,
        ApplicantField::Region,
        ApplicantField::LoanTermMonths,
    ];

    /// Key used for this field in applicant records, JSON payloads, and CSV headers.
    pub const fn name(self) -> &'static str {
        match self {
            ApplicantField::Age => "age",
            ApplicantField::AnnualIncome => "annual_income",
            ApplicantField::EmploymentLength => "employment_length",
            ApplicantField::CreditScore => "credit_score",
            ApplicantField::DebtToIncome => "debt_to_income",
            ApplicantField::NumOpenAccounts => "num_open_accounts",
            ApplicantField::Delinquencies2y => "delinquencies_2y",
            ApplicantField::Inquiries6m => "inquiries_6m",
            ApplicantField::LoanAmount => "loan_amount",
            ApplicantField::InterestRate => "interest_rate",
            ApplicantField::Purpose => "purpose",
            ApplicantField::HomeOwnership => "home_ownership",
            ApplicantField::Channel => "channel",
            ApplicantField::Region => "region",
            ApplicantField::LoanTermMonths => "loan_term_months",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl fmt::Display for ApplicantField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw value held by an applicant record entry.
///
/// Booleans, arrays, and objects are carried as `Other`; no rule or scorecard term reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl FieldValue {
    /// Categorical code for this value; integral numbers render without a fraction (`36`, not `36.0`).
    pub fn as_code(&self) -> String {
        match self {
            FieldValue::Text(code) => code.clone(),
            FieldValue::Number(value) if value.fract() == 0.0 && value.is_finite() => {
                format!("{}", *value as i64)
            }
            FieldValue::Number(value) => value.to_string(),
            FieldValue::Other(value) => value.to_string(),
        }
    }

    /// Parse a textual cell, preferring a numeric reading.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => FieldValue::Number(value),
            _ => FieldValue::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(value) => write!(f, "{value}"),
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Other(value) => write!(f, "{value}"),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Result of looking a field up on an applicant record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldLookup<'a> {
    Present(&'a FieldValue),
    Absent,
}

/// Open mapping of applicant features. No field is structurally required; rules decide what an
/// absent field means. JSON `null` entries are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Option<FieldValue>>",
    into = "BTreeMap<String, FieldValue>"
)]
pub struct ApplicantRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl ApplicantRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: ApplicantField, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: ApplicantField, value: impl Into<FieldValue>) {
        self.fields.insert(field.name().to_string(), value.into());
    }

    /// Insert an entry under an arbitrary key. Unknown keys are carried as opaque data.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    pub fn remove(&mut self, field: ApplicantField) -> Option<FieldValue> {
        self.fields.remove(field.name())
    }

    pub fn lookup(&self, field: ApplicantField) -> FieldLookup<'_> {
        match self.fields.get(field.name()) {
            Some(value) => FieldLookup::Present(value),
            None => FieldLookup::Absent,
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl From<BTreeMap<String, Option<FieldValue>>> for ApplicantRecord {
    fn from(raw: BTreeMap<String, Option<FieldValue>>) -> Self {
        let fields = raw
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .collect();
        Self { fields }
    }
}

impl From<ApplicantRecord> for BTreeMap<String, FieldValue> {
    fn from(record: ApplicantRecord) -> Self {
        record.fields
    }
}

impl FromIterator<(ApplicantField, FieldValue)> for ApplicantRecord {
    fn from_iter<I: IntoIterator<Item = (ApplicantField, FieldValue)>>(iter: I) -> Self {
        let fields = iter
            .into_iter()
            .map(|(field, value)| (field.name().to_string(), value))
            .collect();
        Self { fields }
    }
}

/// Error raised when a vocabulary code cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {vocabulary} code `{code}`")]
pub struct UnknownCode {
    pub vocabulary: &'static str,
    pub code: String,
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $($variant:ident => $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownCode;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let normalized = raw.trim().to_ascii_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.code() == normalized)
                    .ok_or_else(|| UnknownCode {
                        vocabulary: $label,
                        code: raw.to_string(),
                    })
            }
        }

        impl From<$name> for FieldValue {
            fn from(value: $name) -> Self {
                FieldValue::Text(value.code().to_string())
            }
        }
    };
}

vocabulary! {
    /// Stated reason for borrowing.
    LoanPurpose ("purpose") {
        DebtConsolidation => "debt_consolidation",
        Car => "car",
        HomeImprovement => "home_improvement",
        Personal => "personal",
    }
}

vocabulary! {
    HomeOwnership ("home_ownership") {
        Rent => "rent",
        Own => "own",
        Mortgage => "mortgage",
        Other => "other",
    }
}

vocabulary! {
    /// Where the application was taken.
    ApplicationChannel ("channel") {
        Online => "online",
        Branch => "branch",
    }
}

vocabulary! {
    Region ("region") {
        North => "north",
        East => "east",
        South => "south",
        West => "west",
    }
}

/// Offered repayment terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum LoanTerm {
    Months12,
    Months24,
    Months36,
    Months48,
    Months60,
}

impl LoanTerm {
    pub const ALL: [LoanTerm; 5] = [
        LoanTerm::Months12,
        LoanTerm::Months24,
        LoanTerm::Months36,
        LoanTerm::Months48,
        LoanTerm::Months60,
    ];

    pub const fn months(self) -> u32 {
        match self {
            LoanTerm::Months12 => 12,
            LoanTerm::Months24 => 24,
            LoanTerm::Months36 => 36,
            LoanTerm::Months48 => 48,
            LoanTerm::Months60 => 60,
        }
    }
}

impl TryFrom<u32> for LoanTerm {
    type Error = UnknownCode;

    fn try_from(months: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|term| term.months() == months)
            .ok_or_else(|| UnknownCode {
                vocabulary: "loan_term_months",
                code: months.to_string(),
            })
    }
}

impl From<LoanTerm> for u32 {
    fn from(term: LoanTerm) -> Self {
        term.months()
    }
}

impl FromStr for LoanTerm {
    type Err = UnknownCode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let months = raw.trim().parse::<u32>().map_err(|_| UnknownCode {
            vocabulary: "loan_term_months",
            code: raw.to_string(),
        })?;
        Self::try_from(months)
    }
}

/// Coarse employment tenure encoding; the code is what the rules compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum EmploymentLengthBucket {
    UnderOneYear,
    OneToTwoYears,
    ThreeToFiveYears,
    SixToTenYears,
    ElevenPlusYears,
}

impl EmploymentLengthBucket {
    pub const ALL: [EmploymentLengthBucket; 5] = [
        EmploymentLengthBucket::UnderOneYear,
        EmploymentLengthBucket::OneToTwoYears,
        EmploymentLengthBucket::ThreeToFiveYears,
        EmploymentLengthBucket::SixToTenYears,
        EmploymentLengthBucket::ElevenPlusYears,
    ];

    pub const fn code(self) -> u32 {
        match self {
            EmploymentLengthBucket::UnderOneYear => 0,
            EmploymentLengthBucket::OneToTwoYears => 2,
            EmploymentLengthBucket::ThreeToFiveYears => 5,
            EmploymentLengthBucket::SixToTenYears => 10,
            EmploymentLengthBucket::ElevenPlusYears => 11,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            EmploymentLengthBucket::UnderOneYear => "< 1 year",
            EmploymentLengthBucket::OneToTwoYears => "1-2 years",
            EmploymentLengthBucket::ThreeToFiveYears => "3-5 years",
            EmploymentLengthBucket::SixToTenYears => "6-10 years",
            EmploymentLengthBucket::ElevenPlusYears => "11+ years",
        }
    }
}

impl TryFrom<u32> for EmploymentLengthBucket {
    type Error = UnknownCode;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.code() == code)
            .ok_or_else(|| UnknownCode {
                vocabulary: "employment_length",
                code: code.to_string(),
            })
    }
}

impl From<EmploymentLengthBucket> for u32 {
    fn from(bucket: EmploymentLengthBucket) -> Self {
        bucket.code()
    }
}

impl FromStr for EmploymentLengthBucket {
    type Err = UnknownCode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let code = raw.trim().parse::<u32>().map_err(|_| UnknownCode {
            vocabulary: "employment_length",
            code: raw.to_string(),
        })?;
        Self::try_from(code)
    }
}

/// Typed application as collected by a form or CLI, before it is flattened into a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub age: u32,
    pub annual_income: f64,
    pub employment_length: EmploymentLengthBucket,
    pub credit_score: u32,
    pub debt_to_income: f64,
    pub num_open_accounts: u32,
    pub delinquencies_2y: u32,
    pub inquiries_6m: u32,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub purpose: LoanPurpose,
    pub home_ownership: HomeOwnership,
    pub channel: ApplicationChannel,
    pub region: Region,
    pub loan_term_months: LoanTerm,
}

impl LoanApplication {
    pub fn to_record(&self) -> ApplicantRecord {
        ApplicantRecord::new()
            .with(ApplicantField::Age, self.age)
            .with(ApplicantField::AnnualIncome, self.annual_income)
            .with(
                ApplicantField::EmploymentLength,
                self.employment_length.code(),
            )
            .with(ApplicantField::CreditScore, self.credit_score)
            .with(ApplicantField::DebtToIncome, self.debt_to_income)
            .with(ApplicantField::NumOpenAccounts, self.num_open_accounts)
            .with(ApplicantField::Delinquencies2y, self.delinquencies_2y)
            .with(ApplicantField::Inquiries6m, self.inquiries_6m)
            .with(ApplicantField::LoanAmount, self.loan_amount)
            .with(ApplicantField::InterestRate, self.interest_rate)
            .with(ApplicantField::Purpose, self.purpose)
            .with(ApplicantField::HomeOwnership, self.home_ownership)
            .with(ApplicantField::Channel, self.channel)
            .with(ApplicantField::Region, self.region)
            .with(ApplicantField::LoanTermMonths, self.loan_term_months.months())
    }
}

impl From<&LoanApplication> for ApplicantRecord {
    fn from(application: &LoanApplication) -> Self {
        application.to_record()
    }
}
