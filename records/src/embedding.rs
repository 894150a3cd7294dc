//! Sample "client embedding" data and its 2D layout for the analytics page.
//!
//! DESIGN
//! ======
//! This is not dimensionality reduction. Each sample point draws a client
//! type and a risk level, looks up a fixed band on each axis, and adds a
//! little jitter. Layout turns normalized points into canvas-space marks
//! for either a plain scatter or a per-type cluster view. Randomness comes
//! from the caller's RNG so seeded layouts are reproducible.

use std::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SAMPLE_SIZE: usize = 100;
const JITTER: f64 = 0.1;
const MIN_INVESTMENT: u32 = 10_000;
const INVESTMENT_SPAN: u32 = 990_000;
const CLUSTER_SPREAD: f64 = 80.0;
const CLUSTER_LABEL_OFFSET: f64 = 100.0;
const GRID_DIVISIONS: u32 = 10;
const FALLBACK_COLOR: &str = "#999999";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientType {
    Conservative,
    Moderate,
    Aggressive,
    #[serde(rename = "Income-focused")]
    IncomeFocused,
    #[serde(rename = "Growth-focused")]
    GrowthFocused,
}

impl ClientType {
    pub const ALL: [Self; 5] =
        [Self::Conservative, Self::Moderate, Self::Aggressive, Self::IncomeFocused, Self::GrowthFocused];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Conservative => "Conservative",
            Self::Moderate => "Moderate",
            Self::Aggressive => "Aggressive",
            Self::IncomeFocused => "Income-focused",
            Self::GrowthFocused => "Growth-focused",
        }
    }

    /// Horizontal band as `(start, width)`.
    #[must_use]
    pub fn x_band(self) -> (f64, f64) {
        match self {
            Self::Conservative => (0.0, 0.3),
            Self::Moderate => (0.3, 0.4),
            Self::Aggressive => (0.7, 0.3),
            Self::IncomeFocused => (0.0, 0.5),
            Self::GrowthFocused => (0.5, 0.5),
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Conservative => "#0066CC",
            Self::Moderate => "#00AA55",
            Self::Aggressive => "#FF5555",
            Self::IncomeFocused => "#FFAA00",
            Self::GrowthFocused => "#9966CC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    #[serde(rename = "Medium-Low")]
    MediumLow,
    Medium,
    #[serde(rename = "Medium-High")]
    MediumHigh,
    High,
}

impl RiskLevel {
    pub const ALL: [Self; 5] = [Self::Low, Self::MediumLow, Self::Medium, Self::MediumHigh, Self::High];

    /// Vertical band as `(start, height)`.
    #[must_use]
    pub fn y_band(self) -> (f64, f64) {
        match self {
            Self::Low => (0.0, 0.3),
            Self::MediumLow => (0.3, 0.2),
            Self::Medium => (0.5, 0.2),
            Self::MediumHigh => (0.7, 0.15),
            Self::High => (0.85, 0.15),
        }
    }
}

/// One synthetic client, normalized to the unit square.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingPoint {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub client_type: ClientType,
    pub risk_level: RiskLevel,
    pub investment_size: u32,
}

impl EmbeddingPoint {
    /// Marker radius grows with the log of the investment size.
    #[must_use]
    pub fn radius(&self) -> f64 {
        (f64::from(self.investment_size) / f64::from(MIN_INVESTMENT)).ln() * 2.0 + 3.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum View {
    #[default]
    #[serde(rename = "2d")]
    Scatter,
    #[serde(rename = "cluster")]
    Cluster,
}

impl View {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "2d" | "scatter" => Some(Self::Scatter),
            "cluster" => Some(Self::Cluster),
            _ => None,
        }
    }
}

/// A positioned marker in canvas space (origin top-left).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Everything needed to draw one frame of the visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    pub view: View,
    pub width: f64,
    pub height: f64,
    pub vertical_grid: Vec<f64>,
    pub horizontal_grid: Vec<f64>,
    pub marks: Vec<Mark>,
    pub labels: Vec<Label>,
    /// Axis captions; only the scatter view has axes.
    pub axes: Option<Axes>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    pub x_label: String,
    pub y_label: String,
}

// =============================================================================
// SAMPLE GENERATION
// =============================================================================

/// Generate `count` synthetic clients.
pub fn generate_sample<R: Rng>(count: usize, rng: &mut R) -> Vec<EmbeddingPoint> {
    (0..count)
        .map(|i| {
            let client_type = ClientType::ALL[rng.random_range(0..ClientType::ALL.len())];
            let risk_level = RiskLevel::ALL[rng.random_range(0..RiskLevel::ALL.len())];

            let (x0, xw) = client_type.x_band();
            let (y0, yh) = risk_level.y_band();
            let x = x0 + rng.random::<f64>() * xw;
            let y = y0 + rng.random::<f64>() * yh;

            let x = (x + (rng.random::<f64>() - 0.5) * JITTER).clamp(0.0, 1.0);
            let y = (y + (rng.random::<f64>() - 0.5) * JITTER).clamp(0.0, 1.0);

            EmbeddingPoint {
                id: format!("client-{}", i + 1),
                name: format!("Client {}", i + 1),
                x,
                y,
                client_type,
                risk_level,
                investment_size: MIN_INVESTMENT + rng.random_range(0..INVESTMENT_SPAN),
            }
        })
        .collect()
}

// =============================================================================
// LAYOUT
// =============================================================================

/// Lay points out on a `width` x `height` canvas.
pub fn layout<R: Rng>(points: &[EmbeddingPoint], view: View, width: f64, height: f64, rng: &mut R) -> Plot {
    let (marks, labels, axes) = match view {
        View::Scatter => (scatter_marks(points, width, height), Vec::new(), Some(scatter_axes())),
        View::Cluster => {
            let (marks, labels) = cluster_marks(points, width, height, rng);
            (marks, labels, None)
        }
    };

    Plot {
        view,
        width,
        height,
        vertical_grid: grid_positions(width),
        horizontal_grid: grid_positions(height),
        marks,
        labels,
        axes,
    }
}

fn scatter_marks(points: &[EmbeddingPoint], width: f64, height: f64) -> Vec<Mark> {
    points
        .iter()
        .map(|p| Mark {
            id: p.id.clone(),
            x: p.x * width,
            // Canvas y grows downward; risk grows upward.
            y: (1.0 - p.y) * height,
            radius: p.radius(),
            color: p.client_type.color().to_owned(),
        })
        .collect()
}

fn scatter_axes() -> Axes {
    Axes {
        x_label: "Investment Style (Conservative → Aggressive)".to_owned(),
        y_label: "Risk Tolerance (Low → High)".to_owned(),
    }
}

fn cluster_marks<R: Rng>(
    points: &[EmbeddingPoint],
    width: f64,
    height: f64,
    rng: &mut R,
) -> (Vec<Mark>, Vec<Label>) {
    // Clusters are ordered by first appearance.
    let mut clusters: Vec<(ClientType, Vec<&EmbeddingPoint>)> = Vec::new();
    for point in points {
        match clusters.iter_mut().find(|(kind, _)| *kind == point.client_type) {
            Some((_, members)) => members.push(point),
            None => clusters.push((point.client_type, vec![point])),
        }
    }

    let count = clusters.len();
    let mut marks = Vec::with_capacity(points.len());
    let mut labels = Vec::with_capacity(count);

    for (index, (kind, members)) in clusters.into_iter().enumerate() {
        let center_x = width * cluster_fraction(index, count);
        let center_y = height / 2.0;
        labels.push(Label { text: kind.label().to_owned(), x: center_x, y: center_y - CLUSTER_LABEL_OFFSET });

        for point in members {
            let angle = rng.random::<f64>() * TAU;
            let distance = rng.random::<f64>() * CLUSTER_SPREAD;
            marks.push(Mark {
                id: point.id.clone(),
                x: center_x + angle.cos() * distance,
                y: center_y + angle.sin() * distance,
                radius: point.radius(),
                color: kind.color().to_owned(),
            });
        }
    }

    (marks, labels)
}

/// Horizontal position of cluster `index` out of `count`, as a fraction of the width.
fn cluster_fraction(index: usize, count: usize) -> f64 {
    if count <= 1 {
        return 0.2;
    }
    #[allow(clippy::cast_precision_loss)]
    let t = index as f64 / (count - 1) as f64;
    0.2 + t * 0.6
}

fn grid_positions(extent: f64) -> Vec<f64> {
    (0..=GRID_DIVISIONS)
        .map(|i| extent * f64::from(i) / f64::from(GRID_DIVISIONS))
        .collect()
}

/// Colour for a client-type label, falling back to grey for unknown labels.
#[must_use]
pub fn color_for_label(label: &str) -> &'static str {
    ClientType::ALL
        .iter()
        .find(|t| t.label() == label)
        .map_or(FALLBACK_COLOR, |t| t.color())
}

#[cfg(test)]
#[path = "embedding_test.rs"]
mod tests;
