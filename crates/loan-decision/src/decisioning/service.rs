use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{ApplicantRecord, AssessmentId};
use super::engine::{
    DecisionVerdict, EngineError, PolicyOverrides, PolicyParameters, RuleEngine,
};
use super::estimator::{EstimatorError, PdEstimator};
use super::history::{PolicyChange, PolicyHistory};

/// Service composing the PD estimator with a shared, updatable rule engine.
///
/// Evaluations hold a read lock for their whole duration so each verdict is computed against a
/// single consistent parameter set; policy updates take the write lock.
pub struct LoanDecisionService<E> {
    estimator: Arc<E>,
    policy: RwLock<PolicyState>,
}

struct PolicyState {
    engine: RuleEngine,
    history: PolicyHistory,
}

/// Verdict tagged with the identifier of the assessment that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub assessment_id: AssessmentId,
    #[serde(flatten)]
    pub verdict: DecisionVerdict,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("asm-{id:06}"))
}

impl<E> LoanDecisionService<E>
where
    E: PdEstimator + 'static,
{
    pub fn new(estimator: Arc<E>, parameters: PolicyParameters) -> Self {
        Self {
            estimator,
            policy: RwLock::new(PolicyState {
                engine: RuleEngine::new(parameters),
                history: PolicyHistory::default(),
            }),
        }
    }

    /// Estimate the applicant's PD and evaluate the rules against it.
    ///
    /// Estimator failures abort the request before the engine runs.
    pub fn assess(&self, applicant: &ApplicantRecord) -> Result<Assessment, DecisionServiceError> {
        let predicted_pd = self.estimator.estimate(applicant).map_err(|err| {
            warn!(error = %err, "pd estimate unavailable");
            DecisionServiceError::Upstream(err)
        })?;

        self.evaluate_with_pd(applicant, predicted_pd)
    }

    /// Evaluate the rules against a PD the caller already holds.
    pub fn evaluate_with_pd(
        &self,
        applicant: &ApplicantRecord,
        predicted_pd: f64,
    ) -> Result<Assessment, DecisionServiceError> {
        let verdict = {
            let state = self
                .policy
                .read()
                .map_err(|_| DecisionServiceError::PolicyUnavailable)?;
            state.engine.evaluate(applicant, predicted_pd)?
        };

        let assessment_id = next_assessment_id();
        info!(
            assessment_id = %assessment_id,
            decision = verdict.decision.label(),
            predicted_pd,
            reasons = verdict.reasons.len(),
            "applicant assessed"
        );

        Ok(Assessment {
            assessment_id,
            verdict,
        })
    }

    /// Apply a partial policy update and return the resulting parameters.
    ///
    /// Updates that name no parameter leave both the policy and the history untouched.
    pub fn update_policy(
        &self,
        overrides: &PolicyOverrides,
        actor: &str,
    ) -> Result<PolicyParameters, DecisionServiceError> {
        let mut state = self
            .policy
            .write()
            .map_err(|_| DecisionServiceError::PolicyUnavailable)?;

        if overrides.is_empty() {
            return Ok(*state.engine.parameters());
        }

        let previous = *state.engine.parameters();
        state.engine.update_parameters(overrides);
        let resulting = *state.engine.parameters();
        let change = state
            .history
            .record(actor.to_string(), *overrides, previous, resulting);

        info!(
            sequence = change.sequence,
            actor = %change.actor,
            touched = ?overrides.touched(),
            "policy parameters updated"
        );

        Ok(resulting)
    }

    pub fn policy(&self) -> Result<PolicyParameters, DecisionServiceError> {
        let state = self
            .policy
            .read()
            .map_err(|_| DecisionServiceError::PolicyUnavailable)?;
        Ok(*state.engine.parameters())
    }

    pub fn policy_history(&self) -> Result<Vec<PolicyChange>, DecisionServiceError> {
        let state = self
            .policy
            .read()
            .map_err(|_| DecisionServiceError::PolicyUnavailable)?;
        Ok(state.history.entries().to_vec())
    }
}

/// Errors surfaced by [`LoanDecisionService`]. Rule-driven rejections are verdicts, not errors.
#[derive(Debug, thiserror::Error)]
pub enum DecisionServiceError {
    #[error("probability of default unavailable: {0}")]
    Upstream(#[from] EstimatorError),
    #[error("invalid input: {0}")]
    InvalidInput(#[from] EngineError),
    #[error("policy state unavailable")]
    PolicyUnavailable,
}
