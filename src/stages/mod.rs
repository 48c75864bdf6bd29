//! Auxiliary detection stages — independent, bounded-score collaborators of
//! the fusion engine (§2, §4.4). Each stage consumes the raw audio buffer
//! directly and never reads another stage's output (§9 "Cyclic dependencies
//! between stages").

pub mod artifact;
pub mod feature;
pub mod neural;
pub mod temporal;

/// `{success, score}` per §3's `StageResult`. Stages that cannot produce a
/// result set `success = false`; fusion renormalizes weight over the
/// remaining observed stages rather than treating this as an error.
#[derive(Debug, Clone, Copy)]
pub struct StageResult {
    pub success: bool,
    pub score: Option<f64>,
}

impl StageResult {
    pub fn ok(score: f64) -> Self {
        Self { success: true, score: Some(score.clamp(0.0, 1.0)) }
    }

    pub fn failed() -> Self {
        Self { success: false, score: None }
    }
}
