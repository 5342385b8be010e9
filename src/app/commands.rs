use std::sync::Arc;

use crate::args::{Command, MetricsArgs, SetArgs, StartArgs, TestCommand};
use crate::config::ClientSettings;
use crate::error::{AppError, AppResult, ValidationError};
use crate::notify::LogNotifier;
use crate::orchestrator::describe_duration;
use crate::session::ControlSession;
use crate::system::shutdown::{ShutdownSender, setup_signal_shutdown_handler, shutdown_channel};

use super::render::{metrics_lines, print_lines, service_lines, services_lines, status_lines};
use super::watch::{follow_metrics, run_watch, wait_for_results};

const fn needs_signals(command: &Command) -> bool {
    matches!(
        command,
        Command::Watch
            | Command::Metrics(MetricsArgs { follow: true, .. })
            | Command::Test(TestCommand::Start(StartArgs { wait: true, .. }))
    )
}

/// Run one CLI command against the configured control plane and print its
/// output.
pub(crate) async fn execute(command: Command, mut settings: ClientSettings) -> AppResult<()> {
    if let Command::Test(TestCommand::Download { out: Some(dir) }) = &command {
        settings.export_dir.clone_from(dir);
    }
    tracing::debug!("Using control plane at {}", settings.base_url);
    let mut session = ControlSession::connect(settings, Arc::new(LogNotifier))?;

    let (shutdown_tx, _shutdown_rx) = shutdown_channel();
    let signal_handle = needs_signals(&command).then(|| setup_signal_shutdown_handler(&shutdown_tx));

    let result = run_command(&mut session, command, &shutdown_tx).await;
    session.shutdown();

    drop(shutdown_tx.send(()));
    if let Some(handle) = signal_handle
        && let Err(err) = handle.await
    {
        tracing::debug!("Signal handler ended abnormally: {}", err);
    }

    print_lines(&result?);
    Ok(())
}

/// Execute `command` on an existing session and return the lines to print.
pub(crate) async fn run_command(
    session: &mut ControlSession,
    command: Command,
    shutdown_tx: &ShutdownSender,
) -> AppResult<Vec<String>> {
    match command {
        Command::Services => {
            session.discovery().quick_refresh().await?;
            Ok(services_lines(&session.store().snapshot()))
        }
        Command::Show { service } => {
            session.discovery().quick_refresh().await?;
            let tree = session.store().snapshot();
            let found = tree.service(&service).ok_or_else(|| {
                AppError::validation(ValidationError::UnknownService {
                    service: service.clone(),
                })
            })?;
            Ok(service_lines(found))
        }
        Command::Discover { full } => {
            let services = if full {
                session.discovery().full_discovery().await?
            } else {
                session.discovery().quick_refresh().await?
            };
            let mut lines = vec![format!("{} services", services)];
            lines.extend(services_lines(&session.store().snapshot()));
            Ok(lines)
        }
        Command::Set(SetArgs {
            service,
            class,
            method,
            behaviour,
        }) => {
            session.discovery().quick_refresh().await?;
            session
                .sync()
                .change_behaviour(&service, &class, &method, &behaviour)
                .await?;
            Ok(vec![format!(
                "{}/{}.{} -> {}",
                service, class, method, behaviour
            )])
        }
        Command::Reset { service } => {
            session.sync().reset_service(&service).await?;
            let tree = session.store().snapshot();
            Ok(tree.service(&service).map_or_else(
                || vec![format!("Reset {}", service)],
                service_lines,
            ))
        }
        Command::Metrics(MetricsArgs {
            service,
            minutes,
            follow,
        }) => {
            let mut panel = session.load_metrics(&service, minutes).await?;
            let lines = metrics_lines(
                panel.service(),
                panel.minutes(),
                &panel.snapshot().views(),
            );
            if !follow {
                return Ok(lines);
            }
            print_lines(&lines);
            let period = session.settings().live_poll_interval;
            let updates = follow_metrics(&mut panel, period, shutdown_tx.subscribe()).await;
            tracing::debug!("Received {} live updates", updates);
            Ok(Vec::new())
        }
        Command::Test(test) => run_test_command(session, test, shutdown_tx).await,
        Command::Watch => {
            run_watch(session, shutdown_tx.subscribe()).await?;
            Ok(status_lines(&session.orchestrator().status()))
        }
    }
}

async fn run_test_command(
    session: &mut ControlSession,
    command: TestCommand,
    shutdown_tx: &ShutdownSender,
) -> AppResult<Vec<String>> {
    match command {
        TestCommand::Start(start) => {
            let duration = start.duration();
            let ack = session.orchestrator().start_test(duration).await?;
            let total = duration.total_seconds()?;
            let mut lines = vec![format!(
                "A/B test started for {}: {}",
                describe_duration(total),
                ack.trim()
            )];
            if start.wait {
                if !wait_for_results(session, shutdown_tx.subscribe()).await {
                    lines.push("Stopped before results were ready.".to_owned());
                    return Ok(lines);
                }
                let path = session.orchestrator().download_results().await?;
                lines.push(format!("Results saved to {}", path.display()));
            }
            Ok(lines)
        }
        TestCommand::Status => {
            session.orchestrator().check_results_availability().await;
            Ok(status_lines(&session.orchestrator().status()))
        }
        TestCommand::Download { .. } => {
            let path = session.orchestrator().download_results().await?;
            Ok(vec![format!("Results saved to {}", path.display())])
        }
    }
}
