use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::SettingsOverrides;
use crate::orchestrator::TestDuration;

use super::parsers::{parse_duration_arg, parse_metrics_window};

/// Test length used when `test start` is given no duration flags.
pub const DEFAULT_TEST_MINUTES: u64 = 5;

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "marionette-ctl",
    version,
    about = "Control-plane client for Marionette chaos testing: inspect and change method behaviours, trigger discovery, view service metrics, and run A/B tests."
)]
pub struct CtlArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config file (TOML or JSON); defaults to ./marionette.toml or ./marionette.json
    #[arg(long, env = "MARIONETTE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Control-plane API base URL
    #[arg(long = "base-url", env = "MARIONETTE_API_URL", global = true)]
    pub base_url: Option<String>,

    /// Request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", value_parser = parse_duration_arg, global = true)]
    pub request_timeout: Option<Duration>,

    /// Connect timeout (supports ms/s/m/h)
    #[arg(long = "connect-timeout", value_parser = parse_duration_arg, global = true)]
    pub connect_timeout: Option<Duration>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

impl CtlArgs {
    #[must_use]
    pub fn to_overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            base_url: self.base_url.clone(),
            request_timeout: self.request_timeout,
            connect_timeout: self.connect_timeout,
        }
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List services with class, method and modified-method counts
    Services,
    /// Show the classes, methods and behaviours of one service
    Show {
        service: String,
    },
    /// Refresh the service list, or ask the backend to rediscover services
    Discover {
        /// Trigger backend discovery and wait for it to settle
        #[arg(long)]
        full: bool,
    },
    /// Change the behaviour of one method
    Set(SetArgs),
    /// Reset every method of a service to its default behaviour
    Reset {
        service: String,
    },
    /// Summarise the metrics of one service
    Metrics(MetricsArgs),
    /// Start A/B tests and download their results
    #[command(subcommand)]
    Test(TestCommand),
    /// Keep a session open, polling for results until interrupted
    Watch,
}

#[derive(Debug, Args, Clone)]
pub struct SetArgs {
    pub service: String,
    pub class: String,
    pub method: String,
    pub behaviour: String,
}

#[derive(Debug, Args, Clone)]
pub struct MetricsArgs {
    pub service: String,

    /// Historical window in minutes (5, 15, 30, or 60)
    #[arg(long, value_parser = parse_metrics_window)]
    pub minutes: Option<u32>,

    /// Keep refreshing live values until interrupted
    #[arg(long)]
    pub follow: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum TestCommand {
    /// Start an A/B test (at least 30 seconds; 5 minutes when no length is given)
    Start(StartArgs),
    /// Ask once whether results are available
    Status,
    /// Download the latest results as JSON
    Download {
        /// Directory to write the results file into
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Args, Clone)]
pub struct StartArgs {
    #[arg(long)]
    pub hours: Option<u64>,

    #[arg(long)]
    pub minutes: Option<u64>,

    #[arg(long)]
    pub seconds: Option<u64>,

    /// Stay connected until results are ready, then download them
    #[arg(long)]
    pub wait: bool,
}

impl StartArgs {
    #[must_use]
    pub fn duration(&self) -> TestDuration {
        if self.hours.is_none() && self.minutes.is_none() && self.seconds.is_none() {
            return TestDuration::new(0, DEFAULT_TEST_MINUTES, 0);
        }
        TestDuration::new(
            self.hours.unwrap_or(0),
            self.minutes.unwrap_or(0),
            self.seconds.unwrap_or(0),
        )
    }
}
