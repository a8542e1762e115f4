use tracing::info;

use crate::models::ModelHost;
use crate::render::{RenderMode, Renderer};
use crate::session::{drain_reply, greeting_prompt, present_reply, resolve_model};
use crate::utils::{Result, TermchatError};

/// A single context-free prompt
#[derive(Debug, Clone)]
pub struct OneShotRequest {
    /// `None` sends a greeting instead
    pub prompt: Option<String>,
    /// `None` falls back on the first installed model
    pub model: Option<String>,
    pub mode: RenderMode,
    pub user_name: Option<String>,
}

/// What was sent where, and what came back
#[derive(Debug, Clone, PartialEq)]
pub struct OneShotResult {
    pub model: String,
    pub prompt: String,
    pub reply: String,
    /// No model was requested, so the first installed one was used
    pub auto_selected: bool,
}

/// Pick the model for a one-shot request
///
/// Returns the installed identifier and whether it was chosen automatically.
pub fn pick_model(installed: &[String], requested: Option<&str>) -> Result<(String, bool)> {
    match requested {
        Some(requested) => resolve_model(installed, requested)
            .map(|m| (m.clone(), false))
            .ok_or_else(|| TermchatError::ModelNotFound {
                model: requested.to_string(),
            }),
        None => installed
            .first()
            .map(|m| (m.clone(), true))
            .ok_or(TermchatError::NoModelsInstalled),
    }
}

/// Send one prompt through `generate` and render the reply
pub async fn run_oneshot<H, R>(
    host: &H,
    request: &OneShotRequest,
    renderer: &mut R,
) -> Result<OneShotResult>
where
    H: ModelHost + ?Sized,
    R: Renderer + ?Sized,
{
    let installed = host.list().await?;
    let (model, auto_selected) = pick_model(&installed, request.model.as_deref())?;

    let prompt = request
        .prompt
        .clone()
        .unwrap_or_else(|| greeting_prompt(request.user_name.as_deref()));
    info!("One-shot prompt to {}", model);

    let stream = host.generate(&model, &prompt).await?;
    let reply = drain_reply(stream, request.mode, renderer).await?;
    present_reply(&reply, request.mode, renderer)?;

    Ok(OneShotResult {
        model,
        prompt,
        reply,
        auto_selected,
    })
}
