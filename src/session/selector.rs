use colored::Colorize;
use std::io::Write;

use super::input::InputSource;
use crate::utils::{Result, TermchatError};

/// Match a requested model against the installed ones
///
/// Exact identifiers win; `mistral` also matches `mistral:latest`.
pub fn resolve_model<'a>(installed: &'a [String], requested: &str) -> Option<&'a String> {
    installed
        .iter()
        .find(|m| m.as_str() == requested)
        .or_else(|| {
            installed
                .iter()
                .find(|m| m.strip_suffix(":latest") == Some(requested))
        })
}

/// Let the user pick one of the installed models, by index or by name
pub fn select_model<I, W>(installed: &[String], input: &mut I, out: &mut W) -> Result<String>
where
    I: InputSource + ?Sized,
    W: Write,
{
    if installed.is_empty() {
        return Err(TermchatError::NoModelsInstalled);
    }

    writeln!(out, "{}", "Installed models:".cyan())?;
    for (i, model) in installed.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, model.green())?;
    }
    out.flush()?;

    let Some(choice) = input.read_line("model> ")? else {
        return Err(TermchatError::Input("no model selected".to_string()));
    };
    let choice = choice.trim();

    if let Ok(index) = choice.parse::<usize>() {
        if (1..=installed.len()).contains(&index) {
            return Ok(installed[index - 1].clone());
        }
    }

    resolve_model(installed, choice)
        .cloned()
        .ok_or_else(|| TermchatError::ModelNotFound {
            model: choice.to_string(),
        })
}
