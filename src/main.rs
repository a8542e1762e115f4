use clap::Parser;
use colored::Colorize;

use termchat::{
    app::load_config,
    cli::{handle_command, Cli},
    ollama::report_error,
    utils::{init_logger, TermchatError},
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(err) = run(cli).await {
        match err.downcast_ref::<TermchatError>() {
            Some(termchat_err) => report_error(termchat_err),
            None => eprintln!("{} {:#}", "ERROR:".red().bold(), err),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(host) = cli.command.host_override() {
        config.host.url = host.to_string();
    }
    tracing::debug!("Using model host {}", config.host.url);

    handle_command(&cli.command, &config).await
}
