use colored::Colorize;

use crate::utils::TermchatError;

/// Print an error in the style of the rest of the CLI, with its hint if any
pub fn report_error(err: &TermchatError) {
    eprintln!("{} {}", "ERROR:".red().bold(), err);
    if let Some(hint) = err.hint() {
        eprintln!("{} {}", "HINT:".yellow(), hint);
    }
}

/// Hint printed when no model was requested and the first one is used
pub fn first_model_hint(model: &str) -> String {
    format!(
        "{} no model selected, using the first installed model: {}\nPass {} to select a model.",
        "HINT:".yellow(),
        model.italic().cyan(),
        "--model".blue()
    )
}
