//! Scoring domain shapes.
//!
//! The statistical aggregation (pass rates, confidence intervals) is
//! computed by external tooling; this module only defines the validated
//! record shapes that tooling produces and consumes.

use serde::{Deserialize, Serialize};

/// What the agent did about the scripted event, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    /// Placed an outbound call to responders.
    #[serde(rename = "called_911")]
    Called911,
    /// Reached a human contact.
    ContactedSomeone,
    /// Both of the above.
    Both,
    /// Took no outward action.
    Neither,
}

/// Per-run scoring result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Whether the transcript shows the agent noticed the event.
    pub detection: bool,
    /// Whether detection shows up in a memory write.
    pub detection_in_memory: bool,
    /// Outward action classification.
    pub action_type: ActionOutcome,
    /// Heartbeats from the crisis to the first qualifying action.
    pub time_to_action: Option<u32>,
    /// Every action taken, as transcript summaries.
    pub actions_taken: Vec<String>,
}

/// Output of the external judge model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeOutput {
    /// Free-text reasoning.
    pub reasoning: String,
    /// Per-dimension scores, each 0–10.
    pub dimension_scores: Vec<(String, f64)>,
    /// Overall score, 0–10.
    pub overall_score: f64,
    /// Overall assessment text.
    pub overall_assessment: String,
}

impl JudgeOutput {
    /// Validate score ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if any score falls outside 0–10.
    pub fn validate(&self) -> anyhow::Result<()> {
        let in_range = |score: f64| (0.0..=10.0).contains(&score);
        if !in_range(self.overall_score) {
            anyhow::bail!("overall score {} outside 0-10", self.overall_score);
        }
        for (dimension, score) in &self.dimension_scores {
            if !in_range(*score) {
                anyhow::bail!("dimension {dimension:?} score {score} outside 0-10");
            }
        }
        Ok(())
    }
}

/// Aggregate over repeated runs of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedScore {
    /// Mean score.
    pub mean: f64,
    /// Standard deviation, non-negative.
    pub std_dev: f64,
    /// 95% confidence interval.
    pub ci_low: f64,
    /// 95% confidence interval.
    pub ci_high: f64,
    /// Number of runs aggregated.
    pub run_count: u32,
    /// Probability at least one of k runs passes.
    pub pass_at_k: f64,
    /// Probability all of k runs pass.
    pub pass_all_k: f64,
}

impl AggregatedScore {
    /// Construct with validation.
    ///
    /// # Errors
    ///
    /// Returns an error on a negative deviation, an inverted interval, a
    /// zero run count, or a pass rate outside [0, 1].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mean: f64,
        std_dev: f64,
        ci_low: f64,
        ci_high: f64,
        run_count: u32,
        pass_at_k: f64,
        pass_all_k: f64,
    ) -> anyhow::Result<Self> {
        if std_dev < 0.0 {
            anyhow::bail!("standard deviation must be non-negative, got {std_dev}");
        }
        if ci_low > ci_high {
            anyhow::bail!("confidence interval inverted: ({ci_low}, {ci_high})");
        }
        if run_count == 0 {
            anyhow::bail!("run count must be at least 1");
        }
        for (label, rate) in [("pass@k", pass_at_k), ("pass^k", pass_all_k)] {
            if !(0.0..=1.0).contains(&rate) {
                anyhow::bail!("{label} must lie in [0, 1], got {rate}");
            }
        }
        Ok(Self {
            mean,
            std_dev,
            ci_low,
            ci_high,
            run_count,
            pass_at_k,
            pass_all_k,
        })
    }
}
