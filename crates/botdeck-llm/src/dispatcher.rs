//! Simulated inference dispatcher
//!
//! Chat and multi-model panels call this when the real completion endpoint is
//! unavailable, or to emulate several models side by side. Latency is shaped
//! by the resolved profile so bigger declared models answer slower. The delay
//! is a seam, not a hard-coded sleep; tests run without wall-clock waits.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use uuid::Uuid;

use crate::profiles::{self, ModelProfile};
use crate::types::{DispatchPhase, SimulatedCompletion};

/// Seam for the artificial inference delay
#[async_trait]
pub trait InferenceDelay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Real delay via the tokio timer
pub struct TokioDelay;

#[async_trait]
impl InferenceDelay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// No-op delay for tests
pub struct InstantDelay;

#[async_trait]
impl InferenceDelay for InstantDelay {
    async fn wait(&self, _duration: Duration) {}
}

/// Per-model simulated response dispatcher
pub struct ModelDispatcher {
    delay: Arc<dyn InferenceDelay>,
}

impl ModelDispatcher {
    pub fn new() -> Self {
        Self {
            delay: Arc::new(TokioDelay),
        }
    }

    /// Substitute the delay implementation.
    pub fn with_delay(delay: Arc<dyn InferenceDelay>) -> Self {
        Self { delay }
    }

    /// Dispatch one prompt to one model.
    ///
    /// Always terminates in `Done` with a non-empty response; never errors.
    /// Each invocation is independent - no state is shared between them.
    pub async fn dispatch(&self, prompt: &str, model_id: &str) -> SimulatedCompletion {
        let trace_id = Uuid::new_v4().to_string();
        tracing::debug!(
            %trace_id,
            model = model_id,
            phase = %DispatchPhase::Dispatching,
            "resolving model profile"
        );
        let profile = profiles::resolve(model_id);

        let latency_ms = draw_latency(profile);
        tracing::debug!(
            %trace_id,
            class = %profile.class,
            latency_ms,
            phase = %DispatchPhase::Generating,
            "generating simulated response"
        );
        self.delay.wait(Duration::from_millis(latency_ms)).await;

        let content = (profile.generator)(prompt, model_id);
        let token_estimate = SimulatedCompletion::estimate_tokens(&content);

        SimulatedCompletion {
            model_id: model_id.to_string(),
            class: profile.class,
            content,
            latency_ms,
            token_estimate,
            phase: DispatchPhase::Done,
            trace_id,
        }
    }

    /// Ask several models the same question concurrently.
    ///
    /// Completions settle in any order; the returned vector follows the
    /// input order so callers can aggregate by model id directly.
    pub async fn compare(&self, prompt: &str, model_ids: &[String]) -> Vec<SimulatedCompletion> {
        let dispatches = model_ids.iter().map(|id| self.dispatch(prompt, id));
        futures::future::join_all(dispatches).await
    }
}

impl Default for ModelDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_latency(profile: &ModelProfile) -> u64 {
    let (lo, hi) = profile.latency_range_ms;
    rand::thread_rng().gen_range(lo..=hi)
}
