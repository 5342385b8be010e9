mod commands;
mod render;
mod watch;

pub(crate) use commands::execute;
