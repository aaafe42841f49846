//! Approximate usage accounting.
//!
//! Token counts are whitespace-separated word counts, not tokenizer
//! output. Costs use fixed per-1000-token prices.

/// Price per 1000 input tokens, in USD.
pub const INPUT_PRICE_PER_1K: f64 = 0.00025;
/// Price per 1000 output tokens, in USD.
pub const OUTPUT_PRICE_PER_1K: f64 = 0.0005;

/// Estimated usage of one exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageEstimate {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: f64,
}

impl UsageEstimate {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Word count used as a token estimate.
pub fn count_tokens(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

pub fn estimate_cost(input_tokens: u64, output_tokens: u64) -> f64 {
    (input_tokens as f64 / 1000.0) * INPUT_PRICE_PER_1K
        + (output_tokens as f64 / 1000.0) * OUTPUT_PRICE_PER_1K
}

/// Estimate tokens and cost for an input/output pair.
pub fn estimate_usage(input_text: &str, output_text: &str) -> UsageEstimate {
    let input_tokens = count_tokens(input_text);
    let output_tokens = count_tokens(output_text);
    UsageEstimate {
        input_tokens,
        output_tokens,
        cost: estimate_cost(input_tokens, output_tokens),
    }
}

/// Cumulative usage for one session manager.
#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    total: UsageEstimate,
    exchanges: u64,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, estimate: &UsageEstimate) {
        self.total.input_tokens += estimate.input_tokens;
        self.total.output_tokens += estimate.output_tokens;
        self.total.cost += estimate.cost;
        self.exchanges += 1;
    }

    pub fn total(&self) -> &UsageEstimate {
        &self.total
    }

    /// Number of completed exchanges.
    pub fn exchanges(&self) -> u64 {
        self.exchanges
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
