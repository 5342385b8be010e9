use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::{Value, json};
use tempfile::tempdir;

use super::*;
use crate::backend::fake::FakeControlPlane;
use crate::error::{AppError, AppResult, ExportError, ValidationError};
use crate::notify::RecordingNotifier;

#[derive(Default)]
struct RecordingExporter {
    payloads: Mutex<Vec<Value>>,
    fail: bool,
}

impl RecordingExporter {
    fn payloads(&self) -> Vec<Value> {
        self.payloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ResultsExporter for RecordingExporter {
    fn export(&self, payload: &Value) -> Result<PathBuf, ExportError> {
        if self.fail {
            return Err(ExportError::Write {
                path: PathBuf::from("results.json"),
                source: std::io::Error::other("disk full"),
            });
        }
        self.payloads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(payload.clone());
        Ok(PathBuf::from("results.json"))
    }
}

struct Harness {
    fake: Arc<FakeControlPlane>,
    notifier: Arc<RecordingNotifier>,
    exporter: Arc<RecordingExporter>,
    orchestrator: Arc<TestOrchestrator>,
}

fn harness_with(exporter: RecordingExporter) -> Harness {
    let fake = Arc::new(FakeControlPlane::default());
    let notifier = Arc::new(RecordingNotifier::new());
    let exporter = Arc::new(exporter);
    let orchestrator = TestOrchestrator::new(
        fake.clone(),
        notifier.clone(),
        exporter.clone(),
        OrchestratorSettings::default(),
    );
    Harness {
        fake,
        notifier,
        exporter,
        orchestrator,
    }
}

fn harness() -> Harness {
    harness_with(RecordingExporter::default())
}

fn expect_phase(orchestrator: &TestOrchestrator, expected: TestPhase) -> AppResult<()> {
    let phase = orchestrator.status().phase;
    if phase == expected {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "expected phase {:?}, got {:?}",
            expected, phase
        )))
    }
}

#[tokio::test(flavor = "current_thread")]
async fn short_test_is_rejected_before_any_request() -> AppResult<()> {
    let h = harness();
    match h.orchestrator.start_test(TestDuration::new(0, 0, 29)).await {
        Err(AppError::Validation(ValidationError::TestDurationTooShort { total: 29, min: 30 })) => {}
        other => {
            return Err(AppError::validation(format!("expected too-short error, got {:?}", other)));
        }
    }
    if !h.fake.calls().is_empty() {
        return Err(AppError::validation("no request may be sent"));
    }
    if h.notifier.errors().len() != 1 {
        return Err(AppError::validation("operator must be told"));
    }
    expect_phase(&h.orchestrator, TestPhase::Idle)
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn availability_check_fires_ten_seconds_after_the_test() -> AppResult<()> {
    let h = harness();
    h.orchestrator
        .start_test(TestDuration::new(0, 0, 30))
        .await?;
    if h.fake.calls() != ["start_ab_test:30"] {
        return Err(AppError::validation(format!("unexpected calls {:?}", h.fake.calls())));
    }
    expect_phase(&h.orchestrator, TestPhase::AwaitingResults)?;
    let check_after = h.orchestrator.status().session.map(|session| session.check_after);
    if check_after != Some(Duration::from_secs(40)) {
        return Err(AppError::validation(format!("unexpected check delay {:?}", check_after)));
    }

    FakeControlPlane::set_flag(&h.fake.available, true);
    tokio::time::sleep(Duration::from_secs(39)).await;
    if h.fake.count("results_available") != 0 {
        return Err(AppError::validation("check fired early"));
    }
    tokio::time::sleep(Duration::from_secs(2)).await;
    if h.fake.count("results_available") != 1 {
        return Err(AppError::validation("check did not fire at 40 s"));
    }
    expect_phase(&h.orchestrator, TestPhase::ResultsReady)
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn restarting_replaces_the_pending_check() -> AppResult<()> {
    let h = harness();
    h.orchestrator.start_test(TestDuration::new(0, 0, 30)).await?;
    tokio::time::sleep(Duration::from_secs(5)).await;
    h.orchestrator.start_test(TestDuration::new(0, 1, 0)).await?;

    tokio::time::sleep(Duration::from_secs(40)).await;
    if h.fake.count("results_available") != 0 {
        return Err(AppError::validation("the first check should have been cancelled"));
    }
    tokio::time::sleep(Duration::from_secs(31)).await;
    if h.fake.count("results_available") != 1 {
        return Err(AppError::validation("the second check should have fired"));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn rejected_restart_keeps_the_running_test() -> AppResult<()> {
    let h = harness();
    h.orchestrator.start_test(TestDuration::new(0, 0, 30)).await?;
    if h.orchestrator.start_test(TestDuration::new(0, 0, 29)).await.is_ok() {
        return Err(AppError::validation("29 s start must be rejected"));
    }
    expect_phase(&h.orchestrator, TestPhase::AwaitingResults)?;

    FakeControlPlane::set_flag(&h.fake.available, true);
    tokio::time::sleep(Duration::from_secs(41)).await;
    if h.fake.count("results_available") != 1 {
        return Err(AppError::validation("the first test's check must still fire"));
    }
    expect_phase(&h.orchestrator, TestPhase::ResultsReady)
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn results_from_an_earlier_run_wait_for_the_scheduled_check() -> AppResult<()> {
    let h = harness();
    FakeControlPlane::set_flag(&h.fake.available, true);
    h.orchestrator.check_results_availability().await;
    expect_phase(&h.orchestrator, TestPhase::ResultsReady)?;

    h.orchestrator.start_test(TestDuration::new(0, 5, 0)).await?;
    if h.orchestrator.status().results_available {
        return Err(AppError::validation("a new test must clear availability"));
    }
    tokio::time::sleep(Duration::from_secs(11)).await;
    if h.orchestrator.check_results_availability().await {
        return Err(AppError::validation("stale results must read as unavailable"));
    }
    expect_phase(&h.orchestrator, TestPhase::AwaitingResults)?;

    tokio::time::sleep(Duration::from_secs(300)).await;
    let status = h.orchestrator.status();
    if status.phase != TestPhase::ResultsReady || !status.results_available {
        return Err(AppError::validation(format!(
            "scheduled check should accept results, got {:?}",
            status
        )));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn backend_refusal_is_reported_verbatim() -> AppResult<()> {
    let h = harness();
    *h.fake
        .start_rejection
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = Some("A test is already running".to_owned());

    match h.orchestrator.start_test(TestDuration::new(0, 5, 0)).await {
        Err(AppError::Backend(_)) => {}
        other => return Err(AppError::validation(format!("expected backend error, got {:?}", other))),
    }
    if h.notifier.errors() != ["Failed to start A/B test: A test is already running"] {
        return Err(AppError::validation(format!(
            "unexpected notices {:?}",
            h.notifier.notices()
        )));
    }
    if h.orchestrator.status().session.is_some() {
        return Err(AppError::validation("failed start must not record a session"));
    }
    expect_phase(&h.orchestrator, TestPhase::Idle)
}

#[tokio::test(flavor = "current_thread")]
async fn repeated_downloads_leave_status_alone() -> AppResult<()> {
    let h = harness();
    *h.fake.results.lock().unwrap_or_else(PoisonError::into_inner) = json!({ "winner": "B" });
    FakeControlPlane::set_flag(&h.fake.available, true);
    if !h.orchestrator.check_results_availability().await {
        return Err(AppError::validation("results should be available"));
    }
    let before = h.orchestrator.status();
    if before.phase != TestPhase::ResultsReady {
        return Err(AppError::validation("expected results ready"));
    }

    h.orchestrator.download_results().await?;
    h.orchestrator.download_results().await?;

    let payloads = h.exporter.payloads();
    if h.fake.count("download_results") != 2
        || payloads.len() != 2
        || payloads.first() != payloads.get(1)
    {
        return Err(AppError::validation(format!("unexpected exports {:?}", payloads)));
    }
    if h.orchestrator.status() != before {
        return Err(AppError::validation("download must not change status"));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn failed_export_is_reported_and_status_kept() -> AppResult<()> {
    let h = harness_with(RecordingExporter {
        fail: true,
        ..RecordingExporter::default()
    });
    let before = h.orchestrator.status();
    match h.orchestrator.download_results().await {
        Err(AppError::Export(_)) => {}
        other => return Err(AppError::validation(format!("expected export error, got {:?}", other))),
    }
    if h.orchestrator.status() != before || h.notifier.errors().len() != 1 {
        return Err(AppError::validation("export failure must notify without state change"));
    }
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn poll_failures_read_as_unavailable() -> AppResult<()> {
    let h = harness();
    FakeControlPlane::set_flag(&h.fake.available, true);
    h.orchestrator.check_results_availability().await;

    FakeControlPlane::set_flag(&h.fake.fail_available, true);
    if h.orchestrator.check_results_availability().await {
        return Err(AppError::validation("failed poll must read as unavailable"));
    }
    if !h.notifier.notices().is_empty() {
        return Err(AppError::validation("poll failures are never surfaced"));
    }
    expect_phase(&h.orchestrator, TestPhase::Idle)
}

#[test]
fn phase_transitions_after_polls() -> AppResult<()> {
    let cases = [
        (TestPhase::Idle, true, TestPhase::ResultsReady),
        (TestPhase::Idle, false, TestPhase::Idle),
        (TestPhase::AwaitingResults, false, TestPhase::AwaitingResults),
        (TestPhase::AwaitingResults, true, TestPhase::ResultsReady),
        (TestPhase::ResultsReady, false, TestPhase::Idle),
        (TestPhase::Running, true, TestPhase::Running),
        (TestPhase::Validating, false, TestPhase::Validating),
    ];
    for (from, available, expected) in cases {
        let next = from.after_poll(available);
        if next != expected {
            return Err(AppError::validation(format!(
                "{:?} + {} -> {:?}, expected {:?}",
                from, available, next, expected
            )));
        }
    }
    Ok(())
}

#[test]
fn durations_total_and_describe() -> AppResult<()> {
    if TestDuration::new(1, 2, 5).total_seconds()? != 3725 {
        return Err(AppError::validation("unexpected total"));
    }
    if TestDuration::new(u64::MAX, 0, 0).total_seconds().is_ok() {
        return Err(AppError::validation("overflow must be rejected"));
    }
    let cases = [
        (300, "5 minutes"),
        (3725, "1 hour, 2 minutes, 5 seconds"),
        (45, "45 seconds"),
        (61, "1 minute, 1 second"),
        (7200, "2 hours"),
        (0, "0 seconds"),
    ];
    for (seconds, expected) in cases {
        let described = describe_duration(seconds);
        if described != expected {
            return Err(AppError::validation(format!(
                "{}: expected '{}', got '{}'",
                seconds, expected, described
            )));
        }
    }
    Ok(())
}

#[test]
fn json_exporter_writes_dated_file() -> AppResult<()> {
    let dir = tempdir()?;
    let exporter = JsonFileExporter::new(dir.path().join("exports"));
    let date = NaiveDate::from_ymd_opt(2024, 3, 7)
        .ok_or_else(|| AppError::validation("invalid date"))?;
    let path = exporter.export_on(&json!({ "runs": 3 }), date)?;

    if path.file_name().and_then(|name| name.to_str())
        != Some("marionette-test-results-2024-03-07.json")
    {
        return Err(AppError::validation(format!("unexpected path {}", path.display())));
    }
    let written: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    if written != json!({ "runs": 3 }) {
        return Err(AppError::validation("file content mismatch"));
    }
    Ok(())
}
