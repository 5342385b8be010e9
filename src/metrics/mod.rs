//! Metric payloads, per-timestamp aggregation, and display helpers.
mod aggregate;
mod display;
mod format;
mod panel;
mod types;


pub use aggregate::{AggregationRule, aggregate_series, combine};
pub use display::{
    DisplayProfile, MetricCategory, Tone, ValueFormat, display_name, display_profile,
    display_unit,
};
pub use format::{
    NOT_AVAILABLE, format_bytes, format_milliseconds, format_number, format_percentage,
    format_value,
};
pub use panel::{
    DEFAULT_METRIC_WINDOW, METRIC_WINDOWS, MetricView, MetricsPanel, PanelSnapshot,
    SeriesSummary, validate_window,
};
pub use types::{
    ChartPoint, DataPoint, LiveSnapshot, LiveValue, MetricConfiguration, MetricsPayload,
    TimeSeries,
};
