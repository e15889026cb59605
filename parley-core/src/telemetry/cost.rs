//! Model pricing used for cost attribution.

/// US cents per 1K tokens (blended input/output).
const PRICING: &[(&str, f64)] = &[
    ("gpt-4o-mini", 0.015),
    ("gpt-4o", 0.25),
    ("gpt-4-turbo", 1.0),
    ("claude-3-haiku", 0.025),
    ("claude-3-5-sonnet", 0.3),
];

pub fn price_per_1k(model: &str) -> Option<f64> {
    PRICING
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, cents)| *cents)
}

/// Cost of `tokens` on `model`, in cents. Unknown models cost nothing.
pub fn cost_cents(model: &str, tokens: u32) -> f64 {
    price_per_1k(model)
        .map(|per_1k| f64::from(tokens) / 1000.0 * per_1k)
        .unwrap_or(0.0)
}
