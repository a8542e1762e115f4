use anyhow::Result;
use colored::Colorize;
use serde_json::Value;
use std::io::{self, Write};

use crate::{
    app::Config,
    models::ModelHost,
    ollama::{first_model_hint, OllamaClient},
    render::{RenderMode, TerminalRenderer},
    runtime::{pick_model, run_oneshot, OneShotRequest},
    session::{select_model, ChatSession, LineEditor, SessionSettings},
};

use super::Commands;

/// Handle CLI subcommands
///
/// `config` already carries any `--host` override.
pub async fn handle_command(command: &Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Version => {
            show_version();
            Ok(())
        }
        Commands::ListModels { .. } => {
            let client = OllamaClient::new(config)?;
            list_models(&client, &mut io::stdout()).await
        }
        Commands::ShowModel { model, .. } => {
            let client = OllamaClient::new(config)?;
            show_model(&client, model.as_deref(), &mut io::stdout()).await
        }
        Commands::Chat {
            prompt,
            model,
            render,
            ..
        } => {
            let client = OllamaClient::new(config)?;
            let request = OneShotRequest {
                prompt: prompt.clone(),
                model: model.clone().or_else(|| config.model.default.clone()),
                mode: render.resolve(config.ui.render_mode),
                user_name: config.session.user_name.clone(),
            };
            let mut renderer = TerminalRenderer::stdout();
            let result = run_oneshot(&client, &request, &mut renderer).await?;
            if result.auto_selected {
                eprintln!("{}", first_model_hint(&result.model));
            }
            Ok(())
        }
        Commands::Ichat { model, render, .. } => {
            let client = OllamaClient::new(config)?;
            let mode = render.resolve(config.ui.render_mode);
            interactive_chat(&client, config, model.as_deref(), mode).await
        }
    }
}

/// Show version information
pub fn show_version() {
    println!("termchat v{}", env!("CARGO_PKG_VERSION"));
}

/// List installed models
pub async fn list_models<H, W>(host: &H, out: &mut W) -> Result<()>
where
    H: ModelHost + ?Sized,
    W: Write,
{
    let models = host.list().await?;
    if models.is_empty() {
        writeln!(out, "{}", "No models installed. Try `ollama pull llama3`.".yellow())?;
        return Ok(());
    }
    writeln!(out, "{}", "Installed models:".cyan())?;
    for model in models {
        writeln!(out, "  • {}", model.green())?;
    }
    Ok(())
}

/// Print what the host knows about a model
pub async fn show_model<H, W>(host: &H, requested: Option<&str>, out: &mut W) -> Result<()>
where
    H: ModelHost + ?Sized,
    W: Write,
{
    let installed = host.list().await?;
    let (model, _) = pick_model(&installed, requested)?;
    let details = host.show(&model).await?;

    writeln!(out, "{} {}", "Model:".cyan(), model.green())?;
    for (key, value) in details.entries() {
        match value {
            Value::Object(map) => {
                writeln!(out, "{}", key.bold())?;
                for (inner_key, inner_value) in map {
                    writeln!(out, "  {}: {}", inner_key, display_value(inner_value))?;
                }
            }
            other => {
                let text = display_value(other);
                if text.contains('\n') {
                    writeln!(out, "{}", key.bold())?;
                    for line in text.lines() {
                        writeln!(out, "  {}", line)?;
                    }
                } else {
                    writeln!(out, "{}: {}", key.bold(), text)?;
                }
            }
        }
    }
    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn interactive_chat(
    client: &OllamaClient,
    config: &Config,
    requested: Option<&str>,
    mode: RenderMode,
) -> Result<()> {
    let mut input = LineEditor::new()?;

    let model = match requested.map(str::to_string).or_else(|| config.model.default.clone()) {
        Some(model) => model,
        None => {
            let installed = client.list().await?;
            select_model(&installed, &mut input, &mut io::stdout())?
        }
    };

    let settings = SessionSettings::from_config(config, mode);
    let mut session =
        ChatSession::start(client, &model, settings, TerminalRenderer::stdout()).await?;

    println!(
        "{} {} {}",
        "Chatting with".cyan(),
        session.model().green(),
        "(type /quit to leave)".dimmed()
    );
    session.run(&mut input).await?;
    println!("{}", "Bye!".cyan());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MockModelHost, ModelDetails};
    use crate::utils::TermchatError;
    use serde_json::json;

    fn host_with(models: &'static [&'static str]) -> MockModelHost {
        let mut host = MockModelHost::new();
        host.expect_list()
            .returning(move || Ok(models.iter().map(|m| m.to_string()).collect()));
        host
    }

    #[tokio::test]
    async fn test_list_models_output() {
        let host = host_with(&["llama3:latest", "mistral:latest"]);
        let mut out = Vec::new();
        list_models(&host, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Installed models:"));
        let listed: Vec<&str> = text.lines().filter(|l| l.contains("• ")).collect();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].contains("llama3:latest"));
        assert!(listed[1].contains("mistral:latest"));
    }

    #[tokio::test]
    async fn test_list_models_when_empty() {
        let host = host_with(&[]);
        let mut out = Vec::new();
        list_models(&host, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("No models installed"));
        assert!(!text.contains("• "));
    }

    #[tokio::test]
    async fn test_show_model_formats_nested_and_multiline_values() {
        let mut host = host_with(&["llama3", "mistral"]);
        host.expect_show()
            .withf(|model| model == "llama3")
            .times(1)
            .returning(|_| {
                let raw = json!({
                    "modelfile": "FROM llama3",
                    "parameters": "stop \"<|eot_id|>\"\nnum_ctx 8192",
                    "details": {"family": "llama", "parameter_size": "8.0B"},
                    "modified_at": "2024-05-01T10:00:00Z"
                });
                Ok(ModelDetails::from_raw(raw.as_object().unwrap().clone()))
            });

        let mut out = Vec::new();
        show_model(&host, None, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].contains("Model:"));
        assert!(lines[0].contains("llama3"));
        assert!(!text.contains("FROM llama3"));
        // Objects and multi-line strings are indented under their key
        assert!(lines.contains(&"  family: llama"));
        assert!(lines.contains(&"  parameter_size: 8.0B"));
        assert!(lines.contains(&"  stop \"<|eot_id|>\""));
        assert!(lines.contains(&"  num_ctx 8192"));
        // Scalars stay on one line
        assert!(lines
            .iter()
            .any(|l| l.contains("modified_at") && l.ends_with(": 2024-05-01T10:00:00Z")));
    }

    #[tokio::test]
    async fn test_show_model_unknown() {
        let mut host = host_with(&["llama3"]);
        host.expect_show().times(0);

        let err = show_model(&host, Some("gemma"), &mut Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TermchatError>(),
            Some(TermchatError::ModelNotFound { .. })
        ));
    }
}
