use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::render::RenderMode;

#[derive(Parser, Debug)]
#[command(name = "termchat")]
#[command(version)]
#[command(about = "Chat with local Ollama models from your terminal", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,
    /// Send a single prompt (greets you when no prompt is given)
    Chat {
        /// Prompt to send to the model
        prompt: Option<String>,

        /// Model to use, defaults to the configured or first installed model
        #[arg(short, long)]
        model: Option<String>,

        #[command(flatten)]
        host: HostArgs,

        #[command(flatten)]
        render: RenderArgs,
    },
    /// List models installed on the host
    ListModels {
        #[command(flatten)]
        host: HostArgs,
    },
    /// Start an interactive chat session, `/quit` to leave
    Ichat {
        /// Model to use, asks interactively when omitted
        #[arg(short, long)]
        model: Option<String>,

        #[command(flatten)]
        host: HostArgs,

        #[command(flatten)]
        render: RenderArgs,
    },
    /// Show details of an installed model
    ShowModel {
        /// Model to inspect, defaults to the first installed model
        model: Option<String>,

        #[command(flatten)]
        host: HostArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct HostArgs {
    /// Model host URL, e.g. http://localhost:11434
    #[arg(long, env = "OLLAMA_HOST")]
    pub host: Option<String>,
}

/// Output mode flags; markdown is opt-in
#[derive(Args, Debug, Clone, Default)]
pub struct RenderArgs {
    /// Wait for the full reply and render it as Markdown
    #[arg(long, conflicts_with = "flash")]
    pub md_mode: bool,

    /// Stream the reply as plain text while it is generated
    #[arg(long)]
    pub flash: bool,
}

impl RenderArgs {
    /// Flags win, otherwise the configured mode applies
    pub fn resolve(&self, configured: RenderMode) -> RenderMode {
        if self.md_mode {
            RenderMode::Markdown
        } else if self.flash {
            RenderMode::Plain
        } else {
            configured
        }
    }
}

impl Commands {
    /// The host override carried by the subcommand, if any
    pub fn host_override(&self) -> Option<&str> {
        match self {
            Commands::Version => None,
            Commands::Chat { host, .. }
            | Commands::ListModels { host }
            | Commands::Ichat { host, .. }
            | Commands::ShowModel { host, .. } => host.host.as_deref(),
        }
    }
}
