use std::collections::BTreeMap;

use rand::Rng;
use serde_json::json;
use telgen_core::pricing;
use telgen_core::record::{RecordDraft, TelemetryRecord};

use crate::shape::AnomalyShape;

pub const MODELS: [&str; 4] = ["gpt-4", "gpt-3.5-turbo", "claude-3-opus", "claude-3-sonnet"];
pub const SERVICES: [&str; 3] = ["chat-api", "completion-api", "assistant-api"];
pub const REGIONS: [&str; 3] = ["us-east-1", "us-west-2", "eu-west-1"];

/// Ordinary traffic: moderate latency and token counts, cost derived from the
/// sampled model's rate family.
pub fn normal_record(rng: &mut impl Rng) -> TelemetryRecord {
    let latency_ms = rng.gen_range(500.0..3000.0);
    let prompt_tokens = rng.gen_range(50..=500);
    let completion_tokens = rng.gen_range(100..=800);

    let model = MODELS[rng.gen_range(0..MODELS.len())];
    let service = SERVICES[rng.gen_range(0..SERVICES.len())];
    let cost_usd = pricing::estimate_cost(model, prompt_tokens, completion_tokens);

    let mut metadata = BTreeMap::new();
    metadata.insert(
        "region".to_string(),
        json!(REGIONS[rng.gen_range(0..REGIONS.len())]),
    );
    metadata.insert("api_version".to_string(), json!("v1"));

    RecordDraft::new(
        service,
        model,
        latency_ms,
        prompt_tokens,
        completion_tokens,
        cost_usd,
    )
    .with_user_id(format!("user-{}", rng.gen_range(1..=100)))
    .with_session_id(format!("session-{}", rng.gen_range(1..=50)))
    .with_metadata(metadata)
    .build()
}

/// Anomalous traffic: one fixed user hammering chat-api with gpt-4, with
/// latency or token counts pushed outside the normal ranges per shape.
pub fn anomalous_record(rng: &mut impl Rng, shape: AnomalyShape, index: usize) -> TelemetryRecord {
    let (latency_ms, prompt_tokens, completion_tokens) = match shape {
        AnomalyShape::HighLatency => (
            rng.gen_range(20_000.0..60_000.0),
            rng.gen_range(100..=500),
            rng.gen_range(200..=800),
        ),
        AnomalyShape::HighTokens => (
            rng.gen_range(5_000.0..15_000.0),
            rng.gen_range(5_000..=15_000),
            rng.gen_range(8_000..=20_000),
        ),
        AnomalyShape::HighCost => (
            rng.gen_range(8_000.0..20_000.0),
            rng.gen_range(8_000..=15_000),
            rng.gen_range(10_000..=25_000),
        ),
        AnomalyShape::SuspiciousPattern => (
            rng.gen_range(1_000.0..3_000.0),
            rng.gen_range(50..=200),
            rng.gen_range(50..=200),
        ),
    };

    let cost_usd = pricing::estimate_cost("gpt-4", prompt_tokens, completion_tokens);

    let mut metadata = BTreeMap::new();
    metadata.insert("anomaly_type".to_string(), json!(shape.tag()));
    metadata.insert("description".to_string(), json!(shape.description()));
    metadata.insert("simulated".to_string(), json!(true));

    RecordDraft::new(
        "chat-api",
        "gpt-4",
        latency_ms,
        prompt_tokens,
        completion_tokens,
        cost_usd,
    )
    .with_user_id("user-suspicious")
    .with_session_id(format!("session-anomaly-{index}"))
    .with_metadata(metadata)
    .build()
}
