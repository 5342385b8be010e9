use super::display::ValueFormat;

pub const NOT_AVAILABLE: &str = "N/A";

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const KIBI: f64 = 1024.0;

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite())
}

#[must_use]
pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    usable(value).map_or_else(
        || NOT_AVAILABLE.to_owned(),
        |value| format!("{:.*}", decimals, value),
    )
}

/// Ratio in `[0, 1]` rendered as a percentage.
#[must_use]
pub fn format_percentage(value: Option<f64>) -> String {
    usable(value).map_or_else(
        || NOT_AVAILABLE.to_owned(),
        |value| format!("{:.1}%", value * 100.0),
    )
}

#[must_use]
pub fn format_bytes(value: Option<f64>) -> String {
    let Some(bytes) = usable(value) else {
        return NOT_AVAILABLE.to_owned();
    };
    if bytes == 0.0 {
        return "0 B".to_owned();
    }

    let mut scaled = bytes;
    let mut unit_index = 0usize;
    while scaled.abs() >= KIBI && unit_index.saturating_add(1) < BYTE_UNITS.len() {
        scaled /= KIBI;
        unit_index = unit_index.saturating_add(1);
    }
    let unit = BYTE_UNITS.get(unit_index).copied().unwrap_or("B");
    format!("{:.1} {}", scaled, unit)
}

#[must_use]
pub fn format_milliseconds(value: Option<f64>) -> String {
    let Some(ms) = usable(value) else {
        return NOT_AVAILABLE.to_owned();
    };
    if ms < 1.0 {
        format!("{:.0}μs", ms * 1000.0)
    } else if ms < 1000.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{:.2}s", ms / 1000.0)
    }
}

/// Render a value according to its display format. `unit` is only appended
/// to plain numbers.
#[must_use]
pub fn format_value(format: ValueFormat, value: Option<f64>, unit: &str) -> String {
    match format {
        ValueFormat::Percentage => format_percentage(value),
        ValueFormat::Bytes => format_bytes(value),
        ValueFormat::Milliseconds => format_milliseconds(value),
        ValueFormat::Seconds => format_milliseconds(usable(value).map(|secs| secs * 1000.0)),
        ValueFormat::Number => match usable(value) {
            Some(_) => format!("{}{}", format_number(value, 2), unit),
            None => NOT_AVAILABLE.to_owned(),
        },
    }
}
