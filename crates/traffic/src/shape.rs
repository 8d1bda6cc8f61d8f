use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// The four anomalous traffic sub-shapes. Each record produced under a shape
/// carries its tag in metadata so downstream consumers can label it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyShape {
    HighLatency,
    HighTokens,
    HighCost,
    SuspiciousPattern,
}

impl AnomalyShape {
    pub const ALL: [AnomalyShape; 4] = [
        AnomalyShape::HighLatency,
        AnomalyShape::HighTokens,
        AnomalyShape::HighCost,
        AnomalyShape::SuspiciousPattern,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            AnomalyShape::HighLatency => "high_latency",
            AnomalyShape::HighTokens => "high_tokens",
            AnomalyShape::HighCost => "high_cost",
            AnomalyShape::SuspiciousPattern => "suspicious_pattern",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AnomalyShape::HighLatency => "Extremely high latency",
            AnomalyShape::HighTokens => "Unusually high token count",
            AnomalyShape::HighCost => "Abnormally high cost",
            AnomalyShape::SuspiciousPattern => "Suspicious usage pattern",
        }
    }

    pub fn sample(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for AnomalyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
