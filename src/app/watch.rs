use std::time::Duration;

use crate::error::AppResult;
use crate::metrics::MetricsPanel;
use crate::orchestrator::TestPhase;
use crate::session::ControlSession;
use crate::system::shutdown::ShutdownReceiver;

use super::render::{live_lines, print_lines, services_lines};

/// Keep the session alive until results are ready. Returns `false` when
/// shutdown was requested first.
pub(crate) async fn wait_for_results(
    session: &mut ControlSession,
    mut shutdown_rx: ShutdownReceiver,
) -> bool {
    session.start_background();
    let mut status_rx = session.orchestrator().subscribe();
    loop {
        let phase = status_rx.borrow_and_update().phase;
        if phase == TestPhase::ResultsReady {
            return true;
        }
        tracing::debug!("Waiting for results ({})", phase.as_str());
        tokio::select! {
            changed = status_rx.changed() => {
                if changed.is_err() {
                    return false;
                }
            }
            _ = shutdown_rx.recv() => return false,
        }
    }
}

/// Print live values every `period` until shutdown. Returns how many
/// refreshes arrived.
pub(crate) async fn follow_metrics(
    panel: &mut MetricsPanel,
    period: Duration,
    mut shutdown_rx: ShutdownReceiver,
) -> usize {
    panel.start_live_refresh(period);
    let mut updates_rx = panel.subscribe();
    updates_rx.mark_unchanged();
    let mut updates = 0usize;
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            changed = updates_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let views = updates_rx.borrow_and_update().views();
                updates = updates.saturating_add(1);
                print_lines(&live_lines(&views));
            }
        }
    }
    panel.stop_live_refresh();
    updates
}

/// Load the tree, start the background poll, and log every change until
/// shutdown.
pub(crate) async fn run_watch(
    session: &mut ControlSession,
    mut shutdown_rx: ShutdownReceiver,
) -> AppResult<()> {
    if let Err(err) = session.load().await {
        tracing::warn!("Initial load failed: {}", err);
    }
    session.start_background();

    let mut tree_rx = session.store().subscribe();
    let mut discovering_rx = session.store().subscribe_discovering();
    let mut status_rx = session.orchestrator().subscribe();
    tree_rx.mark_unchanged();
    discovering_rx.mark_unchanged();
    status_rx.mark_unchanged();

    let initial = services_lines(&tree_rx.borrow());
    for line in initial {
        tracing::info!("{}", line);
    }
    tracing::info!(
        "Watching (results poll every {}s); press Ctrl+C to stop",
        session.settings().results_poll_interval.as_secs()
    );

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            changed = tree_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let services = tree_rx.borrow_and_update().len();
                tracing::info!("Service tree updated: {} services", services);
            }
            changed = discovering_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                if *discovering_rx.borrow_and_update() {
                    tracing::info!("Discovery in progress");
                } else {
                    tracing::info!("Discovery finished");
                }
            }
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = status_rx.borrow_and_update().clone();
                tracing::info!(
                    "Test phase: {} (results available: {})",
                    status.phase.as_str(),
                    status.results_available
                );
            }
        }
    }

    session.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeControlPlane;
    use crate::config::ClientSettings;
    use crate::domain::fixtures::service;
    use crate::error::AppError;
    use crate::notify::RecordingNotifier;
    use crate::orchestrator::JsonFileExporter;
    use crate::system::shutdown::shutdown_channel;
    use std::sync::Arc;

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn watch_polls_until_shutdown() -> AppResult<()> {
        let fake = Arc::new(FakeControlPlane::with_services(vec![service("orders")]));
        let mut session = ControlSession::with_backend(
            ClientSettings::default(),
            fake.clone(),
            Arc::new(RecordingNotifier::new()),
            Arc::new(JsonFileExporter::new(std::env::temp_dir())),
        );
        let (shutdown_tx, _shutdown_rx) = shutdown_channel();
        let stopper = shutdown_tx.clone();
        let stop = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(25)).await;
            drop(stopper.send(()));
        });

        run_watch(&mut session, shutdown_tx.subscribe()).await?;
        stop.await?;

        if fake.count("results_available") != 3 {
            return Err(AppError::validation(format!(
                "Expected load plus two polls, got {:?}",
                fake.calls()
            )));
        }
        if session.active_tasks() != 0 {
            return Err(AppError::validation("Watch must stop its timers"));
        }
        tokio::time::sleep(Duration::from_secs(60)).await;
        if fake.count("results_available") != 3 {
            return Err(AppError::validation("Polling continued after shutdown"));
        }
        Ok(())
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn follow_prints_each_live_refresh() -> AppResult<()> {
        let fake = Arc::new(FakeControlPlane::default());
        let mut panel = MetricsPanel::new(fake.clone(), "orders", 15)?;
        let (shutdown_tx, _shutdown_rx) = shutdown_channel();
        let stopper = shutdown_tx.clone();
        let stop = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(65)).await;
            drop(stopper.send(()));
        });

        let updates =
            follow_metrics(&mut panel, Duration::from_secs(30), shutdown_tx.subscribe()).await;
        stop.await?;

        if updates != 2 || fake.count("fetch_live_metrics:orders") != 2 {
            return Err(AppError::validation(format!(
                "Expected two refreshes, got {} ({:?})",
                updates,
                fake.calls()
            )));
        }
        if panel.is_refreshing() {
            return Err(AppError::validation("Live refresh must stop on shutdown"));
        }
        Ok(())
    }
}
