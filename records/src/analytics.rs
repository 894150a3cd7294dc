//! Analytics page data: fixed dashboard series and seeded embedding plots.
//!
//! Both the server and the CLI's mock source build their analytics from
//! here, so a given seed lays out the same plot on either side.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::embedding::{self, Plot, View};

pub const DEFAULT_WIDTH: f64 = 800.0;
pub const DEFAULT_HEIGHT: f64 = 500.0;
pub const MAX_SAMPLE_SIZE: usize = 5_000;
const MAX_CANVAS: f64 = 4_096.0;

// =============================================================================
// SUMMARY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub label: String,
    pub labels: Vec<String>,
    pub values: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub api_requests: Series,
    pub embedding_types: Series,
    pub response_times: Series,
}

const DAILY_API_REQUESTS: [u32; 30] = [
    28500, 29200, 27800, 28100, 29500, 30200, 31000, 29800, 28700, 27500, 26800, 27200, 28500, 29800, 30500, 31200,
    32000, 33500, 34200, 35000, 34500, 33800, 32500, 31800, 32200, 33500, 34800, 35500, 36200, 37000,
];

const EMBEDDING_TYPES: [(&str, u32); 5] = [
    ("Financial Profile", 35),
    ("Trading Pattern", 25),
    ("Compliance Pattern", 20),
    ("Client Effort", 15),
    ("Other", 5),
];

const RESPONSE_TIME_BUCKETS: [(&str, u32); 5] =
    [("<10ms", 15), ("10-25ms", 30), ("25-50ms", 40), ("50-100ms", 10), (">100ms", 5)];

#[must_use]
pub fn summary() -> AnalyticsSummary {
    AnalyticsSummary {
        api_requests: Series {
            label: "API Requests".into(),
            labels: (1..=DAILY_API_REQUESTS.len()).map(|day| format!("Mar {day}")).collect(),
            values: DAILY_API_REQUESTS.to_vec(),
            unit: None,
        },
        embedding_types: pairs_series("Embedding Types", &EMBEDDING_TYPES, Some("%")),
        response_times: pairs_series("Response Time Distribution", &RESPONSE_TIME_BUCKETS, Some("%")),
    }
}

fn pairs_series(label: &str, pairs: &[(&str, u32)], unit: Option<&str>) -> Series {
    Series {
        label: label.into(),
        labels: pairs.iter().map(|(name, _)| (*name).to_owned()).collect(),
        values: pairs.iter().map(|(_, value)| *value).collect(),
        unit: unit.map(str::to_owned),
    }
}

// =============================================================================
// EMBEDDING
// =============================================================================

/// Validated embedding request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbeddingRequest {
    pub view: View,
    pub count: usize,
    pub seed: u64,
    pub width: f64,
    pub height: f64,
}

impl EmbeddingRequest {
    /// Clamp count and canvas size to sane bounds. Non-finite or
    /// non-positive dimensions fall back to the defaults.
    #[must_use]
    pub fn new(view: View, count: Option<usize>, seed: Option<u64>, width: Option<f64>, height: Option<f64>) -> Self {
        Self {
            view,
            count: count.unwrap_or(embedding::DEFAULT_SAMPLE_SIZE).min(MAX_SAMPLE_SIZE),
            seed: seed.unwrap_or_else(rand::random),
            width: dimension(width, DEFAULT_WIDTH),
            height: dimension(height, DEFAULT_HEIGHT),
        }
    }
}

fn dimension(raw: Option<f64>, default: f64) -> f64 {
    raw.filter(|v| v.is_finite() && *v > 0.0).map_or(default, |v| v.min(MAX_CANVAS))
}

/// Generate a sample and lay it out. The same seed always yields the same plot.
#[must_use]
pub fn embedding_plot(request: &EmbeddingRequest) -> Plot {
    let mut rng = StdRng::seed_from_u64(request.seed);
    let points = embedding::generate_sample(request.count, &mut rng);
    embedding::layout(&points, request.view, request.width, request.height, &mut rng)
}

#[cfg(test)]
#[path = "analytics_test.rs"]
mod tests;
