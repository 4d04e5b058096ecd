use std::io::Read;

use serde::Serialize;

use super::domain::{ApplicantField, ApplicantRecord, FieldValue};
use super::estimator::PdEstimator;
use super::service::{Assessment, LoanDecisionService};

/// Failure to read an applicant export.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read applicant csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("applicant csv has no columns matching applicant fields")]
    NoApplicantColumns,
}

/// Read applicant rows from a loan applications export.
///
/// Only columns named after applicant fields are kept (label columns such as `default_12m` are
/// dropped). Empty cells become absent fields, numeric cells numbers, anything else a text code.
pub fn parse_applicants<R: Read>(reader: R) -> Result<Vec<ApplicantRecord>, BatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<(usize, ApplicantField)> = csv_reader
        .headers()?
        .iter()
        .enumerate()
        .filter_map(|(index, header)| ApplicantField::from_name(header).map(|field| (index, field)))
        .collect();

    if columns.is_empty() {
        return Err(BatchError::NoApplicantColumns);
    }

    let mut applicants = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let record: ApplicantRecord = columns
            .iter()
            .filter_map(|(index, field)| {
                row.get(*index)
                    .filter(|cell| !cell.is_empty())
                    .map(|cell| (*field, FieldValue::parse(cell)))
            })
            .collect();
        applicants.push(record);
    }

    Ok(applicants)
}

/// Per-row result of a batch run. Rows are numbered from 1 in file order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub row: usize,
    pub result: BatchRowResult,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchRowResult {
    Assessed(Assessment),
    Failed { error: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub approved: usize,
    pub rejected: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
    pub summary: BatchSummary,
}

/// Assess every applicant; a failing row is reported and does not stop the run.
pub fn assess_batch<E>(
    service: &LoanDecisionService<E>,
    applicants: &[ApplicantRecord],
) -> BatchReport
where
    E: PdEstimator + 'static,
{
    let mut summary = BatchSummary::default();
    let outcomes = applicants
        .iter()
        .enumerate()
        .map(|(index, applicant)| {
            let result = match service.assess(applicant) {
                Ok(assessment) => {
                    if assessment.verdict.is_approved() {
                        summary.approved += 1;
                    } else {
                        summary.rejected += 1;
                    }
                    BatchRowResult::Assessed(assessment)
                }
                Err(err) => {
                    summary.failed += 1;
                    BatchRowResult::Failed {
                        error: err.to_string(),
                    }
                }
            };
            BatchOutcome {
                row: index + 1,
                result,
            }
        })
        .collect();

    BatchReport { outcomes, summary }
}
