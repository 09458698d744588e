//! Common types for simulated inference

use serde::{Deserialize, Serialize};

use crate::profiles::ModelClass;

/// Characters per estimated token. Display heuristic only - nothing here is
/// a billing-accurate cost model.
pub const CHARS_PER_TOKEN: usize = 4;

/// Phases one dispatch moves through. Per invocation, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPhase {
    Idle,
    Dispatching,
    Generating,
    Done,
}

impl std::fmt::Display for DispatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Dispatching => write!(f, "dispatching"),
            Self::Generating => write!(f, "generating"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Result of one simulated completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedCompletion {
    /// The model id the caller asked for, echoed back for aggregation
    pub model_id: String,
    /// Resolved parameter-count class
    pub class: ModelClass,
    /// Generated response text, always non-empty
    pub content: String,
    /// Simulated inference latency that was applied
    pub latency_ms: u64,
    /// Estimated token count, derived from the content length
    pub token_estimate: u32,
    /// Terminal phase; always `Done` for returned completions
    pub phase: DispatchPhase,
    /// Unique id for this dispatch
    pub trace_id: String,
}

impl SimulatedCompletion {
    /// `tokens ≈ length / CHARS_PER_TOKEN`, floored at one.
    pub fn estimate_tokens(content: &str) -> u32 {
        (content.len() / CHARS_PER_TOKEN).max(1) as u32
    }
}
