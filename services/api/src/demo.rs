use crate::cli::{AssessArgs, BatchArgs, DemoArgs};
use crate::infra::build_service;
use chrono::SecondsFormat;
use loan_decision::config::AppConfig;
use loan_decision::decisioning::{
    assess_batch, parse_applicants, ApplicantRecord, ApplicationChannel, Assessment,
    BatchReport, BatchRowResult, EmploymentLengthBucket, HomeOwnership, LoanApplication,
    LoanDecisionService, LoanPurpose, LoanTerm, LogisticScorecard, PolicyChange,
    PolicyOverrides, PolicyParameters, Region,
};
use loan_decision::error::AppError;
use std::fs::File;
use std::io::BufReader;

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_service(&config.decisioning, &args.policy.overrides())?;
    let applicant = args.application().to_record();

    let assessment = match args.pd {
        Some(pd) => service.evaluate_with_pd(&applicant, pd)?,
        None => service.assess(&applicant)?,
    };

    if args.json {
        print_json(&assessment)?;
    } else {
        print_policy(&service.policy()?);
        print_assessment("Applicant", &applicant, &assessment);
    }
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_service(&config.decisioning, &args.policy.overrides())?;
    let file = File::open(&args.csv)?;
    let applicants = parse_applicants(BufReader::new(file))?;

    let report = assess_batch(&service, &applicants);

    if args.json {
        print_json(&report)?;
    } else {
        println!(
            "Assessed {} application(s) from {}",
            applicants.len(),
            args.csv.display()
        );
        print_batch_report(&report);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_service(&config.decisioning, &PolicyOverrides::default())?;
    let applicants = [
        ("Applicant 1", established_applicant().to_record()),
        ("Applicant 2", stretched_applicant().to_record()),
    ];

    println!("Loan Decision Demo");
    println!("==================");
    print_policy(&service.policy()?);
    assess_all(&service, &applicants)?;

    let overrides = PolicyOverrides::default().pd_threshold(args.updated_pd_threshold);
    service.update_policy(&overrides, "demo")?;

    println!();
    println!(
        "Policy update: PD threshold set to {:.2}%",
        args.updated_pd_threshold * 100.0
    );
    print_policy(&service.policy()?);
    assess_all(&service, &applicants)?;

    println!();
    print_history(&service.policy_history()?);
    Ok(())
}

fn assess_all(
    service: &LoanDecisionService<LogisticScorecard>,
    applicants: &[(&str, ApplicantRecord)],
) -> Result<(), AppError> {
    for (label, applicant) in applicants {
        let assessment = service.assess(applicant)?;
        print_assessment(label, applicant, &assessment);
    }
    Ok(())
}

fn established_applicant() -> LoanApplication {
    LoanApplication {
        age: 32,
        annual_income: 60_000.0,
        employment_length: EmploymentLengthBucket::SixToTenYears,
        credit_score: 690,
        debt_to_income: 0.30,
        num_open_accounts: 9,
        delinquencies_2y: 0,
        inquiries_6m: 1,
        loan_amount: 12_000.0,
        interest_rate: 0.09,
        purpose: LoanPurpose::DebtConsolidation,
        home_ownership: HomeOwnership::Rent,
        channel: ApplicationChannel::Online,
        region: Region::North,
        loan_term_months: LoanTerm::Months36,
    }
}

fn stretched_applicant() -> LoanApplication {
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

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
    println!("{rendered}");
    Ok(())
}

fn print_policy(policy: &PolicyParameters) {
    println!(
        "Policy: PD < {:.2}% | age {}-{} | income >= {:.0} | employment >= {} | credit >= {} | DTI <= {:.2} | delinquencies <= {}",
        policy.pd_threshold * 100.0,
        policy.min_age,
        policy.max_age,
        policy.min_income,
        policy.min_employment_length,
        policy.min_credit_score,
        policy.debt_to_income_ratio,
        policy.max_delinquencies_2y,
    );
}

fn print_assessment(label: &str, applicant: &ApplicantRecord, assessment: &Assessment) {
    println!();
    println!("{label} [{}]", assessment.assessment_id);
    for (field, value) in applicant.iter() {
        println!("  {field:<20} {value}");
    }
    println!("  => {}", assessment.verdict.summary());
}

fn print_batch_report(report: &BatchReport) {
    for outcome in &report.outcomes {
        match &outcome.result {
            BatchRowResult::Assessed(assessment) => println!(
                "  row {:>4}  {}",
                outcome.row,
                assessment.verdict.summary()
            ),
            BatchRowResult::Failed { error } => {
                println!("  row {:>4}  failed: {error}", outcome.row)
            }
        }
    }
    println!(
        "Approved: {}  Rejected: {}  Failed: {}",
        report.summary.approved, report.summary.rejected, report.summary.failed
    );
}

fn print_history(history: &[PolicyChange]) {
    println!("Policy history ({} change(s))", history.len());
    for change in history {
        println!("  {}", history_line(change));
    }
}

fn history_line(change: &PolicyChange) -> String {
    format!(
        "#{} {} by {}: {}",
        change.sequence,
        change.changed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        change.actor,
        change.overrides.touched().join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use loan_decision::decisioning::Decision;
    use std::sync::Arc;

    #[test]
    fn history_line_shows_timestamp_actor_and_touched_parameters() {
        let previous = PolicyParameters::default();
        let overrides = PolicyOverrides::default().pd_threshold(0.15);
        let change = PolicyChange {
            sequence: 1,
            changed_at: Utc
                .with_ymd_and_hms(2026, 10, 19, 9, 30, 0)
                .single()
                .expect("valid timestamp"),
            actor: "demo".to_string(),
            overrides,
            previous,
            resulting: previous.with_overrides(&overrides),
        };

        assert_eq!(
            history_line(&change),
            "#1 2026-10-19T09:30:00Z by demo: pd_threshold"
        );
    }

    #[test]
    fn demo_applicants_split_on_the_reference_scorecard() {
        let service = LoanDecisionService::new(
            Arc::new(LogisticScorecard::reference()),
            PolicyParameters::default(),
        );

        let established = service
            .assess(&established_applicant().to_record())
            .expect("assessed");
        let stretched = service
            .assess(&stretched_applicant().to_record())
            .expect("assessed");

        assert_eq!(established.verdict.decision, Decision::Approved);
        assert_eq!(stretched.verdict.decision, Decision::Rejected);
        for reason in [
            "High Probability of Default",
            "Insufficient Employment Length",
            "Low Credit Score",
            "High Debt-to-Income Ratio",
            "Excessive Recent Delinquencies",
        ] {
            assert!(
                stretched.verdict.reasons.iter().any(|r| r == reason),
                "missing {reason}"
            );
        }
    }
}
