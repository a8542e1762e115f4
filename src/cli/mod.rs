/// CLI argument parsing and command handling - Gateway
mod args;
mod commands;

pub use args::{Cli, Commands, HostArgs, RenderArgs};
pub use commands::{handle_command, list_models, show_model, show_version};
