use super::types::MetricConfiguration;

/// Rough family a metric key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricCategory {
    Memory,
    Throughput,
    Latency,
    Errors,
    Cpu,
    Rate,
    Generic,
}

/// How a value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Number,
    Bytes,
    Milliseconds,
    Seconds,
    Percentage,
}

/// Accent used when a value is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Good,
    Bad,
    Warning,
    Capacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayProfile {
    pub category: MetricCategory,
    pub format: ValueFormat,
    pub tone: Tone,
}

impl DisplayProfile {
    const fn new(category: MetricCategory, format: ValueFormat, tone: Tone) -> Self {
        Self {
            category,
            format,
            tone,
        }
    }
}

const ERROR_TONE_THRESHOLD: f64 = 0.01;

/// Classify a metric from its key, declared unit, and current value.
///
/// Key fragments are checked in a fixed order, so `http_request_duration`
/// counts as throughput before it counts as latency. Keys that match no
/// fragment fall back to the unit.
#[must_use]
pub fn display_profile(metric_key: &str, unit: &str, current: Option<f64>) -> DisplayProfile {
    let key = metric_key.to_lowercase();
    let has = |fragment: &str| key.contains(fragment);

    if has("memory") {
        return DisplayProfile::new(MetricCategory::Memory, ValueFormat::Bytes, Tone::Capacity);
    }
    if has("request") || has("http") {
        return DisplayProfile::new(MetricCategory::Throughput, ValueFormat::Number, Tone::Good);
    }
    if has("response") || has("duration") || has("time") {
        let format = if unit.contains('s') {
            ValueFormat::Seconds
        } else {
            ValueFormat::Milliseconds
        };
        return DisplayProfile::new(MetricCategory::Latency, format, Tone::Neutral);
    }
    if has("error") {
        let tone = match current {
            Some(value) if value > ERROR_TONE_THRESHOLD => Tone::Bad,
            Some(_) | None => Tone::Good,
        };
        let format = if unit.contains('%') {
            ValueFormat::Percentage
        } else {
            ValueFormat::Number
        };
        return DisplayProfile::new(MetricCategory::Errors, format, tone);
    }
    if has("cpu") {
        // A `%` unit with a sub-unit reading is still a ratio.
        let format = match current {
            Some(value) if unit.contains('%') && value >= 1.0 => ValueFormat::Number,
            None if unit.contains('%') => ValueFormat::Number,
            Some(_) | None => ValueFormat::Percentage,
        };
        return DisplayProfile::new(MetricCategory::Cpu, format, Tone::Warning);
    }
    if has("rate") {
        return DisplayProfile::new(MetricCategory::Rate, ValueFormat::Number, Tone::Good);
    }

    if unit.contains('%') {
        DisplayProfile::new(MetricCategory::Generic, ValueFormat::Percentage, Tone::Warning)
    } else if unit.contains("bytes") {
        DisplayProfile::new(MetricCategory::Generic, ValueFormat::Bytes, Tone::Capacity)
    } else if unit.contains('s') {
        DisplayProfile::new(MetricCategory::Latency, ValueFormat::Seconds, Tone::Neutral)
    } else {
        DisplayProfile::new(MetricCategory::Generic, ValueFormat::Number, Tone::Neutral)
    }
}

/// Configured display name, or the key with underscores turned into spaces
/// and every word capitalised.
#[must_use]
pub fn display_name(metric_key: &str, configuration: Option<&MetricConfiguration>) -> String {
    if let Some(name) = configuration
        .and_then(|config| config.display_name.as_deref())
        .filter(|name| !name.is_empty())
    {
        return name.to_owned();
    }

    let mut name = String::with_capacity(metric_key.len());
    let mut at_word_start = true;
    for ch in metric_key.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphanumeric() {
            if at_word_start {
                name.extend(ch.to_uppercase());
            } else {
                name.push(ch);
            }
            at_word_start = false;
        } else {
            name.push(ch);
            at_word_start = true;
        }
    }
    name
}

/// Configured unit, or an empty string.
#[must_use]
pub fn display_unit(configuration: Option<&MetricConfiguration>) -> &str {
    configuration
        .and_then(|config| config.unit.as_deref())
        .unwrap_or_default()
}
