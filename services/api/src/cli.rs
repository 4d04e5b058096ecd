use crate::demo::{run_assess, run_batch, run_demo};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_decision::decisioning::{
    ApplicationChannel, EmploymentLengthBucket, HomeOwnership, LoanApplication, LoanPurpose,
    LoanTerm, PolicyOverrides, Region,
};
use loan_decision::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Decision Engine",
    about = "Assess loan applications from the command line or serve the decision API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Assess a single applicant described by flags
    Assess(AssessArgs),
    /// Assess every applicant in a loan applications CSV export
    Batch(BatchArgs),
    /// Walk through two reference applicants and a live threshold change
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

/// Threshold overrides applied on top of the configured policy.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct PolicyArgs {
    /// Reject when predicted PD is at or above this value
    #[arg(long)]
    pub(crate) pd_threshold: Option<f64>,
    #[arg(long)]
    pub(crate) min_age: Option<u32>,
    #[arg(long)]
    pub(crate) max_age: Option<u32>,
    #[arg(long)]
    pub(crate) min_income: Option<f64>,
    /// Minimum employment length bucket code
    #[arg(long)]
    pub(crate) min_employment_length: Option<u32>,
    #[arg(long)]
    pub(crate) min_credit_score: Option<u32>,
    /// Largest accepted debt-to-income fraction
    #[arg(long)]
    pub(crate) max_debt_to_income: Option<f64>,
    #[arg(long)]
    pub(crate) max_delinquencies_2y: Option<u32>,
}

impl PolicyArgs {
    pub(crate) fn overrides(&self) -> PolicyOverrides {
        PolicyOverrides {
            pd_threshold: self.pd_threshold,
            min_age: self.min_age,
            max_age: self.max_age,
            min_income: self.min_income,
            min_employment_length: self.min_employment_length,
            min_credit_score: self.min_credit_score,
            debt_to_income_ratio: self.max_debt_to_income,
            max_delinquencies_2y: self.max_delinquencies_2y,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    #[arg(long, default_value_t = 32)]
    pub(crate) age: u32,
    #[arg(long, default_value_t = 30_000.0)]
    pub(crate) annual_income: f64,
    /// Employment length bucket code: 0 (<1y), 2 (1-2y), 5 (3-5y), 10 (6-10y), 11 (11+y)
    #[arg(long, default_value = "0")]
    pub(crate) employment_length: EmploymentLengthBucket,
    #[arg(long, default_value_t = 700)]
    pub(crate) credit_score: u32,
    /// Debt-to-income as a fraction (0.20 = 20%)
    #[arg(long, default_value_t = 0.20)]
    pub(crate) debt_to_income: f64,
    #[arg(long, default_value_t = 5)]
    pub(crate) num_open_accounts: u32,
    #[arg(long, default_value_t = 0)]
    pub(crate) delinquencies_2y: u32,
    #[arg(long, default_value_t = 1)]
    pub(crate) inquiries_6m: u32,
    #[arg(long, default_value_t = 10_000.0)]
    pub(crate) loan_amount: f64,
    /// Interest rate as a fraction (0.05 = 5%)
    #[arg(long, default_value_t = 0.05)]
    pub(crate) interest_rate: f64,
    /// debt_consolidation, car, home_improvement, or personal
    #[arg(long, default_value = "debt_consolidation")]
    pub(crate) purpose: LoanPurpose,
    /// rent, own, mortgage, or other
    #[arg(long, default_value = "rent")]
    pub(crate) home_ownership: HomeOwnership,
    /// online or branch
    #[arg(long, default_value = "online")]
    pub(crate) channel: ApplicationChannel,
    /// north, east, south, or west
    #[arg(long, default_value = "north")]
    pub(crate) region: Region,
    /// 12, 24, 36, 48, or 60
    #[arg(long, default_value = "12")]
    pub(crate) loan_term_months: LoanTerm,
    /// Use this PD instead of the scorecard estimate
    #[arg(long, value_parser = crate::infra::parse_probability)]
    pub(crate) pd: Option<f64>,
    /// Print the verdict as JSON
    #[arg(long)]
    pub(crate) json: bool,
    #[command(flatten)]
    pub(crate) policy: PolicyArgs,
}

impl AssessArgs {
    pub(crate) fn application(&self) -> LoanApplication {
        LoanApplication {
            age: self.age,
            annual_income: self.annual_income,
            employment_length: self.employment_length,
            credit_score: self.credit_score,
            debt_to_income: self.debt_to_income,
            num_open_accounts: self.num_open_accounts,
            delinquencies_2y: self.delinquencies_2y,
            inquiries_6m: self.inquiries_6m,
            loan_amount: self.loan_amount,
            interest_rate: self.interest_rate,
            purpose: self.purpose,
            home_ownership: self.home_ownership,
            channel: self.channel,
            region: self.region,
            loan_term_months: self.loan_term_months,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// Loan applications CSV export with a header row
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Print the full report as JSON
    #[arg(long)]
    pub(crate) json: bool,
    #[command(flatten)]
    pub(crate) policy: PolicyArgs,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// PD threshold applied halfway through the demo
    #[arg(long, default_value_t = 0.15, value_parser = crate::infra::parse_probability)]
    pub(crate) updated_pd_threshold: f64,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args),
        Command::Batch(args) => run_batch(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn assess_flags_build_typed_application() {
        let cli = Cli::try_parse_from([
            "loan-decision",
            "assess",
            "--credit-score",
            "640",
            "--employment-length",
            "5",
            "--purpose",
            "car",
            "--loan-term-months",
            "36",
            "--min-credit-score",
            "600",
            "--pd",
            "0.08",
        ])
        .expect("arguments parse");

        let Some(Command::Assess(args)) = cli.command else {
            panic!("expected assess command");
        };
        let application = args.application();
        assert_eq!(application.credit_score, 640);
        assert_eq!(
            application.employment_length,
            EmploymentLengthBucket::ThreeToFiveYears
        );
        assert_eq!(application.purpose, LoanPurpose::Car);
        assert_eq!(application.loan_term_months, LoanTerm::Months36);
        assert_eq!(args.pd, Some(0.08));
        assert_eq!(args.policy.overrides().touched(), vec!["min_credit_score"]);
    }

    #[test]
    fn assess_rejects_unknown_vocabulary_codes() {
        let result = Cli::try_parse_from(["loan-decision", "assess", "--region", "central"]);

        assert!(result.is_err());
    }
}
