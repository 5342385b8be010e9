use std::collections::BTreeMap;

use super::types::{ChartPoint, TimeSeries};

/// How the values sharing one timestamp are folded into a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationRule {
    Single,
    Sum,
    Mean,
}

impl AggregationRule {
    /// Pick the rule from the values alone.
    ///
    /// Several series usually describe disjoint parts of one whole (memory
    /// pools, per-instance counters) and are summed. When every value is
    /// below 1 and at least one is positive the group is read as a set of
    /// ratios and averaged instead. This is a magnitude heuristic, not a
    /// per-metric contract; an explicit aggregation field on
    /// `MetricConfiguration` would replace it.
    #[must_use]
    pub fn for_values(values: &[f64]) -> Option<Self> {
        match values {
            [] => None,
            [_] => Some(AggregationRule::Single),
            _ => {
                let all_sub_unit = values.iter().all(|value| *value < 1.0);
                let any_positive = values.iter().any(|value| *value > 0.0);
                if all_sub_unit && any_positive {
                    Some(AggregationRule::Mean)
                } else {
                    Some(AggregationRule::Sum)
                }
            }
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AggregationRule::Single => "single",
            AggregationRule::Sum => "sum",
            AggregationRule::Mean => "mean",
        }
    }
}

/// Fold one timestamp group. Values are sorted before summation so the
/// result is identical for every permutation of the same multiset.
#[must_use]
pub fn combine(mut values: Vec<f64>) -> Option<f64> {
    let rule = AggregationRule::for_values(&values)?;
    values.sort_by(f64::total_cmp);
    let sum: f64 = values.iter().sum();
    match rule {
        AggregationRule::Single | AggregationRule::Sum => Some(sum),
        AggregationRule::Mean => Some(sum / values.len() as f64),
    }
}

/// Merge every series recorded under `metric_key` into one ascending
/// sequence with a single sample per timestamp.
#[must_use]
pub fn aggregate_series(metric_key: &str, series: &[TimeSeries]) -> Vec<ChartPoint> {
    let mut groups: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    let mut dropped = 0usize;

    for point in series.iter().flat_map(|entry| entry.data_points.iter()) {
        match (point.timestamp, point.value) {
            (Some(timestamp), Some(value)) => groups.entry(timestamp).or_default().push(value),
            _ => dropped = dropped.saturating_add(1),
        }
    }

    if dropped > 0 {
        tracing::debug!(
            "Dropped {} unusable samples while aggregating '{}'",
            dropped,
            metric_key
        );
    }

    groups
        .into_iter()
        .filter_map(|(timestamp, values)| {
            combine(values).map(|value| ChartPoint { timestamp, value })
        })
        .collect()
}
