use crate::domain::{ConfigTree, MethodConfig, ServiceConfig};
use crate::metrics::{MetricCategory, MetricView, Tone, format_value};
use crate::orchestrator::{OrchestratorStatus, describe_duration};

const MODIFIED_MARKER: &str = "*";

pub(crate) fn services_lines(tree: &ConfigTree) -> Vec<String> {
    if tree.is_empty() {
        return vec!["No services found.".to_owned()];
    }
    tree.overviews()
        .into_iter()
        .map(|overview| {
            format!(
                "{}  classes: {}  methods: {}  modified: {}",
                overview.service_name,
                overview.class_count,
                overview.method_count,
                overview.modified_count
            )
        })
        .collect()
}

fn method_line(method: &MethodConfig) -> String {
    let marker = if method.is_modified() {
        MODIFIED_MARKER
    } else {
        " "
    };
    format!(
        "  {} {}: {} (default: {}; available: {})",
        marker,
        method.method_name,
        method.current_behaviour_id,
        method.default_behaviour_id,
        method.available_behaviour_ids.join(", ")
    )
}

pub(crate) fn service_lines(service: &ServiceConfig) -> Vec<String> {
    let mut lines = vec![format!("Service: {}", service.service_name)];
    if service.class_configs.is_empty() {
        lines.push("  (no classes)".to_owned());
    }
    for class in &service.class_configs {
        lines.push(class.class_name.clone());
        lines.extend(class.method_configs.iter().map(method_line));
    }
    lines
}

const fn category_label(category: MetricCategory) -> &'static str {
    match category {
        MetricCategory::Memory => "memory",
        MetricCategory::Throughput => "throughput",
        MetricCategory::Latency => "latency",
        MetricCategory::Errors => "errors",
        MetricCategory::Cpu => "cpu",
        MetricCategory::Rate => "rate",
        MetricCategory::Generic => "generic",
    }
}

const fn tone_suffix(tone: Tone) -> &'static str {
    match tone {
        Tone::Bad => " (!)",
        Tone::Neutral | Tone::Good | Tone::Warning | Tone::Capacity => "",
    }
}

pub(crate) fn metrics_lines(service: &str, minutes: u32, views: &[MetricView]) -> Vec<String> {
    let mut lines = vec![format!("Metrics for {} (last {} minutes)", service, minutes)];
    if views.is_empty() {
        lines.push("No metrics available.".to_owned());
        return lines;
    }
    for view in views {
        lines.push(format!(
            "{} [{}]: {}{}",
            view.display_name,
            category_label(view.profile.category),
            view.current_display(),
            tone_suffix(view.profile.tone)
        ));
        let render = |value: f64| format_value(view.profile.format, Some(value), &view.unit);
        match view.summary() {
            Some(summary) => lines.push(format!(
                "  {} points  first: {}  last: {}  min: {}  max: {}",
                summary.points,
                render(summary.first.value),
                render(summary.last.value),
                render(summary.min),
                render(summary.max)
            )),
            None => lines.push("  no history".to_owned()),
        }
    }
    lines
}

pub(crate) fn live_lines(views: &[MetricView]) -> Vec<String> {
    views
        .iter()
        .map(|view| format!("{}: {}", view.display_name, view.current_display()))
        .collect()
}

pub(crate) fn status_lines(status: &OrchestratorStatus) -> Vec<String> {
    let mut lines = vec![
        format!("Phase: {}", status.phase.as_str()),
        format!(
            "Results available: {}",
            if status.results_available { "yes" } else { "no" }
        ),
    ];
    if let Some(session) = &status.session {
        lines.push(format!(
            "Last test: {} started {}",
            describe_duration(session.duration_seconds),
            session.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    lines
}

pub(crate) fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
