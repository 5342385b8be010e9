use clap::Parser;

use crate::app;
use crate::args::CtlArgs;
use crate::config::{ClientSettings, load_config};
use crate::error::{AppError, AppResult, ValidationError};

pub(crate) fn run() -> AppResult<()> {
    let args = CtlArgs::parse();

    crate::system::logger::init_logging(args.verbose, args.no_color);

    let search_dir = std::env::current_dir()?;
    let file = load_config(args.config.as_deref(), &search_dir)?;
    let settings = ClientSettings::resolve(args.to_overrides(), file.as_ref())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| AppError::validation(ValidationError::RuntimeBuildFailed { source }))?;

    runtime.block_on(app::execute(args.command, settings))
}
