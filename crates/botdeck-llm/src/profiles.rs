//! Model profiles and id resolution
//!
//! A free-form model id resolves to exactly one profile. Parameter-count
//! tokens (`13B`, `7B`, `3B`) are checked before family-name tokens, in
//! declaration order, first match wins; anything unrecognized lands on the
//! generic profile. Resolution is total - it never fails and never panics.

use serde::{Deserialize, Serialize};

/// Parameter-count class a model id resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelClass {
    /// 13B-parameter family - slowest, most elaborate output
    B13,
    /// 7B-parameter family
    B7,
    /// 3B-parameter family
    B3,
    /// No recognizable family keyword
    Generic,
}

impl std::fmt::Display for ModelClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::B13 => write!(f, "13B"),
            Self::B7 => write!(f, "7B"),
            Self::B3 => write!(f, "3B"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// Latency and generation behavior for one model family
pub struct ModelProfile {
    pub class: ModelClass,
    /// Inclusive bounds for the uniform latency draw, in milliseconds
    pub latency_range_ms: (u64, u64),
    /// Produces the response text from `(prompt, model_id)`
    pub generator: fn(&str, &str) -> String,
}

struct FamilyRule {
    keyword: &'static str,
    class: ModelClass,
}

/// Ordered keyword table. Size tokens come first so `code-3b` is a 3B model,
/// not a Code one. First match wins; extensions must preserve the ordering.
static FAMILY_RULES: &[FamilyRule] = &[
    // Parameter-count tokens
    FamilyRule { keyword: "13b", class: ModelClass::B13 },
    FamilyRule { keyword: "7b", class: ModelClass::B7 },
    FamilyRule { keyword: "3b", class: ModelClass::B3 },
    // Family names, for ids that carry no size token
    FamilyRule { keyword: "code", class: ModelClass::B13 },
    FamilyRule { keyword: "hermes", class: ModelClass::B7 },
    FamilyRule { keyword: "falcon", class: ModelClass::B7 },
    FamilyRule { keyword: "llama", class: ModelClass::B7 },
    FamilyRule { keyword: "mistral", class: ModelClass::B7 },
    FamilyRule { keyword: "phi", class: ModelClass::B3 },
    FamilyRule { keyword: "tiny", class: ModelClass::B3 },
];

static PROFILE_B13: ModelProfile = ModelProfile {
    class: ModelClass::B13,
    latency_range_ms: (2500, 4000),
    generator: generate_large,
};

static PROFILE_B7: ModelProfile = ModelProfile {
    class: ModelClass::B7,
    latency_range_ms: (1200, 2500),
    generator: generate_medium,
};

static PROFILE_B3: ModelProfile = ModelProfile {
    class: ModelClass::B3,
    latency_range_ms: (600, 1200),
    generator: generate_small,
};

static PROFILE_GENERIC: ModelProfile = ModelProfile {
    class: ModelClass::Generic,
    latency_range_ms: (300, 600),
    generator: generate_generic,
};

/// Resolve a model id to its profile. Total over all strings.
pub fn resolve(model_id: &str) -> &'static ModelProfile {
    let id = model_id.to_lowercase();
    for rule in FAMILY_RULES {
        if id.contains(rule.keyword) {
            return profile_for(rule.class);
        }
    }
    profile_for(ModelClass::Generic)
}

/// Profile for a known class.
pub fn profile_for(class: ModelClass) -> &'static ModelProfile {
    match class {
        ModelClass::B13 => &PROFILE_B13,
        ModelClass::B7 => &PROFILE_B7,
        ModelClass::B3 => &PROFILE_B3,
        ModelClass::Generic => &PROFILE_GENERIC,
    }
}

// ============================================================================
// Response Generators
// ============================================================================

enum Topic {
    Strategy,
    Risk,
    Market,
    General,
}

impl Topic {
    fn of(prompt: &str) -> Self {
        let prompt = prompt.to_lowercase();
        if prompt.contains("strategy") || prompt.contains("strategies") {
            Self::Strategy
        } else if prompt.contains("risk") || prompt.contains("drawdown") {
            Self::Risk
        } else if prompt.contains("market") || prompt.contains("price") || prompt.contains("position") {
            Self::Market
        } else {
            Self::General
        }
    }
}

fn generate_large(prompt: &str, model_id: &str) -> String {
    let body = match Topic::of(prompt) {
        Topic::Strategy => {
            "Strategy assessment:\n\
             1. Regime check - current volatility favors mean-reversion over momentum; a grid configuration with tighter spacing would capture more of the chop.\n\
             2. Entry discipline - stagger entries across three levels rather than committing the full allocation at the signal price.\n\
             3. Exit plan - pair every entry with a target and a time stop; grids without time stops bleed in trending regimes.\n\
             4. Validation - walk the configuration through the last 30 sessions of replay data before promoting it to live."
        }
        Topic::Risk => {
            "Risk review:\n\
             1. Position sizing - cap any single market at 10% of equity; correlated pairs share one cap.\n\
             2. Stop placement - anchor stops to realized volatility (2x ATR), not to round numbers.\n\
             3. Drawdown policy - halve size after a 5% peak-to-trough move and pause entries entirely at 10%.\n\
             4. Tail scenario - model an overnight gap against the book; the bot must survive it without margin intervention."
        }
        Topic::Market => {
            "Market read:\n\
             1. Structure - price is ranging between well-tested bands; breakout conviction is low on current volume.\n\
             2. Flow - order-book imbalance leans slightly bid, but the signal decays quickly at this depth.\n\
             3. Positioning - keep exposure light until the range resolves; the asymmetric trade is fading failed breakouts.\n\
             4. Watch items - funding drift and the next session open are the likeliest catalysts."
        }
        Topic::General => {
            "Here is a structured take:\n\
             1. Restating the question to confirm scope.\n\
             2. The dominant consideration, with the evidence for it.\n\
             3. The main counterpoint worth weighing.\n\
             4. A concrete next step you can act on from the dashboard."
        }
    };
    format!("[{model_id}] {body}")
}

fn generate_medium(prompt: &str, model_id: &str) -> String {
    let body = match Topic::of(prompt) {
        Topic::Strategy => {
            "On strategy: favor configurations you can explain in one sentence. \
             A narrow grid with volatility-scaled spacing beats a clever signal you cannot audit. \
             Backtest over at least one full regime change before going live."
        }
        Topic::Risk => {
            "On risk: size positions so that a full stop-out costs under 1% of equity, \
             keep correlated exposure under one shared cap, and treat a 5% drawdown \
             as a signal to cut size, not to average down."
        }
        Topic::Market => {
            "On the market: conditions look range-bound with modest bid-side pressure. \
             Respect the range until it breaks on real volume; fading the extremes \
             offers better expectancy than chasing the middle."
        }
        Topic::General => {
            "Short answer: focus on the one variable that moves the outcome, \
             decide what evidence would change your mind, and set a review point \
             so the decision does not drift."
        }
    };
    format!("[{model_id}] {body}")
}

fn generate_small(prompt: &str, model_id: &str) -> String {
    let body = match Topic::of(prompt) {
        Topic::Strategy => "Keep the strategy simple: fixed grid, volatility-scaled spacing, hard time stop.",
        Topic::Risk => "Risk first: 1% per trade, one cap for correlated pairs, cut size on drawdown.",
        Topic::Market => "Range-bound. Fade extremes, skip the middle, wait for volume on breaks.",
        Topic::General => "Pick the single most important factor, act on it, review tomorrow.",
    };
    format!("[{model_id}] {body}")
}

fn generate_generic(prompt: &str, model_id: &str) -> String {
    let body = match Topic::of(prompt) {
        Topic::Strategy => {
            "General guidance on strategy: define entries, exits, and sizing before \
             touching parameters, then change one variable at a time."
        }
        Topic::Risk => {
            "General guidance on risk: know the maximum loss per trade and per day \
             before the session starts, and enforce both mechanically."
        }
        Topic::Market => {
            "General guidance on the market: current data is limited in simulation; \
             treat any directional read as low-confidence."
        }
        Topic::General => {
            "Acknowledged. This is a locally generated response; connect the trading \
             service for model-grade answers."
        }
    };
    format!("[{model_id}] {body}")
}
