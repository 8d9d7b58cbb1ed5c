//! Table of Specifications expansion.
//!
//! A TOS weights topics (usually by instructional hours) and spreads each topic's
//! share of the test over Bloom levels. Cells become [`SelectionRequirement`]s
//! whose difficulty follows the Bloom level's band.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assembly::question::{BloomLevel, SelectionRequirement};

const PERCENT_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TosTopic {
    pub name: String,
    #[serde(alias = "hours")]
    pub weight: f64,
}

/// Percent of a topic's items per Bloom level, in `BloomLevel::ALL` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloomDistribution {
    pub remembering: f64,
    pub understanding: f64,
    pub applying: f64,
    pub analyzing: f64,
    pub evaluating: f64,
    pub creating: f64,
}

impl Default for BloomDistribution {
    /// 60% easy, 30% average, 10% difficult.
    fn default() -> Self {
        Self {
            remembering: 30.0,
            understanding: 30.0,
            applying: 15.0,
            analyzing: 15.0,
            evaluating: 5.0,
            creating: 5.0,
        }
    }
}

impl BloomDistribution {
    fn percents(&self) -> [(BloomLevel, f64); 6] {
        [
            (BloomLevel::Remembering, self.remembering),
            (BloomLevel::Understanding, self.understanding),
            (BloomLevel::Applying, self.applying),
            (BloomLevel::Analyzing, self.analyzing),
            (BloomLevel::Evaluating, self.evaluating),
            (BloomLevel::Creating, self.creating),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TosPlan {
    #[serde(alias = "totalItems")]
    pub total_items: usize,
    pub topics: Vec<TosTopic>,
    #[serde(default, alias = "bloomDistribution")]
    pub bloom_distribution: BloomDistribution,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TosError {
    #[error("table of specifications has no topics")]
    NoTopics,
    #[error("topic '{0}' has a negative or non-finite weight")]
    InvalidWeight(String),
    #[error("topic weights must add up to more than zero")]
    ZeroTotalWeight,
    #[error("bloom distribution must be non-negative and sum to 100, got {0}")]
    InvalidDistribution(f64),
}

/// Expands `plan` into requirements: topics in input order, Bloom levels from
/// Remembering to Creating, empty cells dropped. Counts add up to
/// `plan.total_items` exactly.
pub fn build_requirements(plan: &TosPlan) -> Result<Vec<SelectionRequirement>, TosError> {
    if plan.topics.is_empty() {
        return Err(TosError::NoTopics);
    }
    if let Some(topic) =
        plan.topics.iter().find(|topic| !topic.weight.is_finite() || topic.weight < 0.0)
    {
        return Err(TosError::InvalidWeight(topic.name.clone()));
    }
    let total_weight: f64 = plan.topics.iter().map(|topic| topic.weight).sum();
    if total_weight <= 0.0 {
        return Err(TosError::ZeroTotalWeight);
    }

    let percents = plan.bloom_distribution.percents();
    let percent_sum: f64 = percents.iter().map(|(_, percent)| percent).sum();
    if percents.iter().any(|(_, percent)| !percent.is_finite() || *percent < 0.0)
        || (percent_sum - 100.0).abs() > PERCENT_TOLERANCE
    {
        return Err(TosError::InvalidDistribution(percent_sum));
    }

    let topic_weights: Vec<f64> = plan.topics.iter().map(|topic| topic.weight).collect();
    let topic_counts = largest_remainder(plan.total_items, &topic_weights);
    let level_weights: Vec<f64> = percents.iter().map(|(_, percent)| *percent).collect();

    let mut requirements = Vec::new();
    for (topic, topic_count) in plan.topics.iter().zip(topic_counts) {
        let level_counts = largest_remainder(topic_count, &level_weights);
        for ((level, _), count) in percents.iter().zip(level_counts) {
            if count == 0 {
                continue;
            }
            requirements.push(SelectionRequirement {
                topic: topic.name.clone(),
                bloom_level: *level,
                difficulty: level.default_difficulty(),
                count,
            });
        }
    }

    tracing::debug!(
        topics = plan.topics.len(),
        total_items = plan.total_items,
        cells = requirements.len(),
        "expanded table of specifications"
    );

    Ok(requirements)
}

/// Splits `total` proportionally to `weights`; leftovers go to the largest
/// fractional parts, earlier entries first on ties.
fn largest_remainder(total: usize, weights: &[f64]) -> Vec<usize> {
    let weight_sum: f64 = weights.iter().sum();
    if total == 0 || weight_sum <= 0.0 {
        return vec![0; weights.len()];
    }

    let quotas: Vec<f64> =
        weights.iter().map(|weight| total as f64 * weight / weight_sum).collect();
    let mut counts: Vec<usize> = quotas.iter().map(|quota| quota.floor() as usize).collect();

    let assigned: usize = counts.iter().sum();
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| {
        let frac_a = quotas[a] - quotas[a].floor();
        let frac_b = quotas[b] - quotas[b].floor();
        frac_b.total_cmp(&frac_a).then(a.cmp(&b))
    });
    for &index in order.iter().take(total.saturating_sub(assigned)) {
        counts[index] += 1;
    }

    counts
}
