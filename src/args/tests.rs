use super::*;
use crate::error::{AppError, AppResult};
use clap::Parser;
use std::path::Path;
use std::time::Duration;

#[test]
fn parse_args_set_subcommand() -> AppResult<()> {
    let args = CtlArgs::try_parse_from([
        "marionette-ctl",
        "set",
        "orders",
        "OrderService",
        "placeOrder",
        "slow",
    ])?;
    match args.command {
        Command::Set(set) => {
            if set.service != "orders"
                || set.class != "OrderService"
                || set.method != "placeOrder"
                || set.behaviour != "slow"
            {
                return Err(AppError::validation(format!("Unexpected set args {:?}", set)));
            }
            Ok(())
        }
        _ => Err(AppError::validation("Expected set subcommand")),
    }
}

#[test]
fn parse_args_global_flags_after_subcommand() -> AppResult<()> {
    let args = CtlArgs::try_parse_from([
        "marionette-ctl",
        "services",
        "--base-url",
        "http://ctl.local/api",
        "--timeout",
        "2s",
        "--connect-timeout",
        "500ms",
        "--config",
        "ctl.toml",
        "-v",
    ])?;
    let overrides = args.to_overrides();
    if overrides.base_url.as_deref() != Some("http://ctl.local/api") {
        return Err(AppError::validation("Unexpected base url"));
    }
    if overrides.request_timeout != Some(Duration::from_secs(2)) {
        return Err(AppError::validation("Unexpected request timeout"));
    }
    if overrides.connect_timeout != Some(Duration::from_millis(500)) {
        return Err(AppError::validation("Unexpected connect timeout"));
    }
    if args.config.as_deref() != Some(Path::new("ctl.toml")) || !args.verbose {
        return Err(AppError::validation("Unexpected config or verbose flag"));
    }
    Ok(())
}

#[test]
fn parse_args_rejects_zero_timeout() -> AppResult<()> {
    if CtlArgs::try_parse_from(["marionette-ctl", "services", "--timeout", "0s"]).is_ok() {
        return Err(AppError::validation("Zero timeout must be rejected"));
    }
    if CtlArgs::try_parse_from(["marionette-ctl", "services", "--timeout", "soon"]).is_ok() {
        return Err(AppError::validation("Unparseable timeout must be rejected"));
    }
    Ok(())
}

#[test]
fn parse_args_test_start_defaults_to_five_minutes() -> AppResult<()> {
    let args = CtlArgs::try_parse_from(["marionette-ctl", "test", "start"])?;
    match args.command {
        Command::Test(TestCommand::Start(start)) => {
            if start.duration().total_seconds()? != 300 || start.wait {
                return Err(AppError::validation("Expected a 5 minute test without wait"));
            }
            Ok(())
        }
        _ => Err(AppError::validation("Expected test start subcommand")),
    }
}

#[test]
fn parse_args_test_start_with_partial_duration() -> AppResult<()> {
    let args = CtlArgs::try_parse_from([
        "marionette-ctl",
        "test",
        "start",
        "--seconds",
        "45",
        "--wait",
    ])?;
    match args.command {
        Command::Test(TestCommand::Start(start)) => {
            if start.duration().total_seconds()? != 45 || !start.wait {
                return Err(AppError::validation("Expected a 45 second test with wait"));
            }
            Ok(())
        }
        _ => Err(AppError::validation("Expected test start subcommand")),
    }
}

#[test]
fn parse_args_test_download_out_dir() -> AppResult<()> {
    let args = CtlArgs::try_parse_from(["marionette-ctl", "test", "download", "--out", "results"])?;
    match args.command {
        Command::Test(TestCommand::Download { out }) => {
            if out.as_deref() != Some(Path::new("results")) {
                return Err(AppError::validation("Unexpected output dir"));
            }
            Ok(())
        }
        _ => Err(AppError::validation("Expected test download subcommand")),
    }
}

#[test]
fn parse_args_metrics_window_is_validated() -> AppResult<()> {
    let args = CtlArgs::try_parse_from(["marionette-ctl", "metrics", "orders", "--minutes", "30"])?;
    match args.command {
        Command::Metrics(metrics) => {
            if metrics.minutes != Some(30) || metrics.service != "orders" {
                return Err(AppError::validation("Unexpected metrics args"));
            }
        }
        _ => return Err(AppError::validation("Expected metrics subcommand")),
    }
    for rejected in ["7", "zero", "-5"] {
        if CtlArgs::try_parse_from(["marionette-ctl", "metrics", "orders", "--minutes", rejected])
            .is_ok()
        {
            return Err(AppError::validation(format!(
                "Window {} must be rejected",
                rejected
            )));
        }
    }
    Ok(())
}

#[test]
fn parse_args_discover_full_flag() -> AppResult<()> {
    let args = CtlArgs::try_parse_from(["marionette-ctl", "discover", "--full"])?;
    match args.command {
        Command::Discover { full: true } => Ok(()),
        _ => Err(AppError::validation("Expected full discovery")),
    }
}

#[test]
fn parse_args_requires_subcommand() -> AppResult<()> {
    if CtlArgs::try_parse_from(["marionette-ctl"]).is_ok() {
        return Err(AppError::validation("A subcommand is required"));
    }
    Ok(())
}
