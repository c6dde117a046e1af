//! Per-model token prices.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// (input, output) USD per token for a known model, matched by prefix.
///
/// More specific prefixes are checked first so `gpt-4.1-mini` doesn't
/// resolve to `gpt-4.1`.
pub fn model_cost(model: &str) -> Option<(Decimal, Decimal)> {
    let model = model.to_ascii_lowercase();
    let cost = if model.starts_with("gpt-4.1-nano") {
        (dec!(0.0000001), dec!(0.0000004))
    } else if model.starts_with("gpt-4.1-mini") {
        (dec!(0.0000004), dec!(0.0000016))
    } else if model.starts_with("gpt-4.1") {
        (dec!(0.000002), dec!(0.000008))
    } else if model.starts_with("gpt-4o-mini") {
        (dec!(0.00000015), dec!(0.0000006))
    } else if model.starts_with("gpt-4o") {
        (dec!(0.0000025), dec!(0.00001))
    } else {
        return None;
    };
    Some(cost)
}

/// Estimated USD cost of one call.
pub fn estimate_cost(
    per_token: (Decimal, Decimal),
    input_tokens: u32,
    output_tokens: u32,
) -> Decimal {
    per_token.0 * Decimal::from(input_tokens) + per_token.1 * Decimal::from(output_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_models_have_costs() {
        assert_eq!(model_cost("gpt-4.1"), Some((dec!(0.000002), dec!(0.000008))));
        assert_eq!(model_cost("GPT-4.1-2025-04-14"), model_cost("gpt-4.1"));
    }

    #[test]
    fn specific_prefix_wins() {
        assert_ne!(model_cost("gpt-4.1-mini"), model_cost("gpt-4.1"));
        assert_ne!(model_cost("gpt-4o-mini"), model_cost("gpt-4o"));
    }

    #[test]
    fn unknown_model_has_no_cost() {
        assert!(model_cost("local-llama").is_none());
    }

    #[test]
    fn estimate_multiplies_tokens() {
        let cost = estimate_cost((dec!(0.000002), dec!(0.000008)), 1000, 500);
        assert_eq!(cost, dec!(0.006));
    }
}
