use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce a JSON value into a finite number. Numeric strings count; anything
/// else (null, objects, booleans, non-finite) does not.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }?;
    number.is_finite().then_some(number)
}

/// Zero counts as missing, like an absent timestamp.
fn coerce_timestamp(value: &Value) -> Option<i64> {
    let timestamp = match value {
        // Float-encoded epoch millis are rounded; the cast saturates.
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.is_finite())
                .map(|float| float.round() as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }?;
    (timestamp != 0).then_some(timestamp)
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(coerce_number(&Value::deserialize(deserializer)?))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(coerce_timestamp(&Value::deserialize(deserializer)?))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// A metric key normally maps to a list of series; a bare series object or
/// `null` is accepted as well.
fn series_list<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<TimeSeries>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<OneOrMany<TimeSeries>>>> =
        Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, series)| {
            let list = match series {
                Some(OneOrMany::Many(list)) => list,
                Some(OneOrMany::One(single)) => vec![single],
                None => Vec::new(),
            };
            (key, list)
        })
        .collect())
}

/// Raw sample as sent by the backend. Unusable fields decode as `None` and
/// are dropped during aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DataPoint {
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: Option<f64>,
}

impl DataPoint {
    #[must_use]
    pub const fn new(timestamp: i64, value: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            value: Some(value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    #[serde(default)]
    pub metric_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data_points: Vec<DataPoint>,
}

impl TimeSeries {
    #[must_use]
    pub fn new(metric_name: &str, data_points: Vec<DataPoint>) -> Self {
        Self {
            metric_name: Some(metric_name.to_owned()),
            data_points,
        }
    }
}

/// Descriptive metadata for one metric key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricConfiguration {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// `GET /metrics/{service}?minutes=N`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MetricsPayload {
    #[serde(default, deserialize_with = "series_list")]
    pub metrics: BTreeMap<String, Vec<TimeSeries>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub configurations: BTreeMap<String, MetricConfiguration>,
}

/// A live reading: either a bare number or an object carrying `value`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LiveValue {
    Number(f64),
    Reading {
        #[serde(default, deserialize_with = "lenient_number")]
        value: Option<f64>,
    },
    Other(Value),
}

impl LiveValue {
    #[must_use]
    pub const fn current(&self) -> Option<f64> {
        match self {
            LiveValue::Number(value) => Some(*value),
            LiveValue::Reading { value } => *value,
            LiveValue::Other(_) => None,
        }
    }
}

/// `GET /metrics/{service}/live`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LiveSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: BTreeMap<String, LiveValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub configurations: BTreeMap<String, MetricConfiguration>,
}

impl LiveSnapshot {
    #[must_use]
    pub fn current_value(&self, metric_key: &str) -> Option<f64> {
        self.metrics.get(metric_key).and_then(LiveValue::current)
    }
}

/// One aggregated, chart-ready sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub timestamp: i64,
    pub value: f64,
}
