use serde::{Deserialize, Serialize};

/// Sole reason reported when every rule passes.
pub const ALL_CRITERIA_MET: &str = "All criteria met";

/// Final outcome for an assessed applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub const fn label(self) -> &'static str {
        match self {
            Decision::Approved => "Approved",
            Decision::Rejected => "Rejected",
        }
    }
}

/// Engine output: the decision, every violated criterion in rule order, and the PD it was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionVerdict {
    pub decision: Decision,
    pub reasons: Vec<String>,
    pub predicted_pd: f64,
}

impl DecisionVerdict {
    pub(crate) fn from_failures(failures: Vec<String>, predicted_pd: f64) -> Self {
        if failures.is_empty() {
            Self {
                decision: Decision::Approved,
                reasons: vec![ALL_CRITERIA_MET.to_string()],
                predicted_pd,
            }
        } else {
            Self {
                decision: Decision::Rejected,
                reasons: failures,
                predicted_pd,
            }
        }
    }

    pub fn is_approved(&self) -> bool {
        self.decision == Decision::Approved
    }

    pub fn summary(&self) -> String {
        format!(
            "{} (PD {:.2}%): {}",
            self.decision.label(),
            self.predicted_pd * 100.0,
            self.reasons.join("; ")
        )
    }
}
