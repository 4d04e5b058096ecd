use crate::decisioning::engine::{PolicyOverrides, PolicyParameters};
use crate::decisioning::history::{PolicyHistory, DEFAULT_HISTORY_LIMIT};

fn record_threshold(history: &mut PolicyHistory, threshold: f64) {
    let previous = PolicyParameters::default();
    let overrides = PolicyOverrides::default().pd_threshold(threshold);
    let resulting = previous.with_overrides(&overrides);
    history.record("risk-team".to_string(), overrides, previous, resulting);
}

#[test]
fn history_drops_oldest_entries_past_its_limit() {
    let mut history = PolicyHistory::with_limit(2);

    for threshold in [0.11, 0.12, 0.13] {
        record_threshold(&mut history, threshold);
    }

    let sequences: Vec<u64> = history.entries().iter().map(|change| change.sequence).collect();
    assert_eq!(sequences, vec![2, 3]);
    assert_eq!(history.entries()[1].resulting.pd_threshold, 0.13);
}

#[test]
fn default_history_keeps_a_bounded_window() {
    let mut history = PolicyHistory::default();

    for _ in 0..DEFAULT_HISTORY_LIMIT + 5 {
        record_threshold(&mut history, 0.12);
    }

    assert_eq!(history.entries().len(), DEFAULT_HISTORY_LIMIT);
    assert_eq!(history.entries()[0].sequence, 6);
}
