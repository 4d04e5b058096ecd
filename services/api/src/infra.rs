use loan_decision::config::DecisioningConfig;
use loan_decision::decisioning::{
    LoanDecisionService, LogisticScorecard, PolicyOverrides, PolicyParameters,
};
use loan_decision::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn load_scorecard(config: &DecisioningConfig) -> Result<LogisticScorecard, AppError> {
    match &config.scorecard_path {
        Some(path) => {
            let scorecard = LogisticScorecard::from_path(path)?;
            info!(path = %path.display(), "loaded scorecard coefficients");
            Ok(scorecard)
        }
        None => Ok(LogisticScorecard::reference()),
    }
}

/// Builds the decision service from configuration, layering `extra` over the configured policy.
pub(crate) fn build_service(
    config: &DecisioningConfig,
    extra: &PolicyOverrides,
) -> Result<LoanDecisionService<LogisticScorecard>, AppError> {
    let scorecard = load_scorecard(config)?;
    let parameters = PolicyParameters::default()
        .with_overrides(&config.policy)
        .with_overrides(extra);
    Ok(LoanDecisionService::new(Arc::new(scorecard), parameters))
}

pub(crate) fn parse_probability(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|err| format!("failed to parse '{raw}' as a probability ({err})"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("'{raw}' is outside the range 0.0 to 1.0"))
    }
}
