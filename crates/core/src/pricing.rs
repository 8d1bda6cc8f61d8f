// Example per-token rates, matching what downstream dashboards expect for
// simulated traffic. Not real provider pricing.
const GPT4_PROMPT_RATE: f64 = 0.000_03;
const GPT4_COMPLETION_RATE: f64 = 0.000_06;
const BASE_PROMPT_RATE: f64 = 0.000_001;
const BASE_COMPLETION_RATE: f64 = 0.000_002;

pub fn estimate_cost(model_name: &str, prompt_tokens: u32, completion_tokens: u32) -> f64 {
    let (prompt_rate, completion_rate) = if model_name.contains("gpt-4") {
        (GPT4_PROMPT_RATE, GPT4_COMPLETION_RATE)
    } else {
        (BASE_PROMPT_RATE, BASE_COMPLETION_RATE)
    };
    f64::from(prompt_tokens) * prompt_rate + f64::from(completion_tokens) * completion_rate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpt4_family_uses_premium_rates() {
        let cost = estimate_cost("gpt-4", 100, 200);
        assert!((cost - 0.015).abs() < 1e-12);
    }

    #[test]
    fn gpt4_variants_match_family() {
        assert_eq!(
            estimate_cost("gpt-4-turbo", 100, 200),
            estimate_cost("gpt-4", 100, 200)
        );
    }

    #[test]
    fn other_models_use_base_rates() {
        let cost = estimate_cost("claude-3-opus", 1000, 1000);
        assert!((cost - 0.003).abs() < 1e-12);
    }
}
