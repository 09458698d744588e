//! BotDeck Simulated Inference
//!
//! This crate produces the plausible, latency-shaped model responses the
//! chat and multi-model comparison panels render when no real completion
//! endpoint is reachable:
//!
//! - **Profile resolution**: size tokens (`13B`/`7B`/`3B`) before family
//!   names, first match wins, total over every id string
//! - **Latency shaping**: each profile draws uniformly from its own band,
//!   so bigger declared models answer slower
//! - **Templated generation**: domain keywords in the prompt (strategy,
//!   risk, market) select specialized answers
//! - **Injectable delay**: tests swap the timer for a no-op and never wait
//!
//! Token counts are `length / 4` display estimates, not a cost model.

pub mod dispatcher;
pub mod profiles;
pub mod types;

pub use dispatcher::{InferenceDelay, InstantDelay, ModelDispatcher, TokioDelay};
pub use profiles::{profile_for, resolve, ModelClass, ModelProfile};
pub use types::{DispatchPhase, SimulatedCompletion, CHARS_PER_TOKEN};
