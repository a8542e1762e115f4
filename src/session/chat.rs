use tracing::{debug, info};

use super::history::ConversationHistory;
use super::input::InputSource;
use super::reply::{drain_reply, present_reply};
use super::selector::resolve_model;
use crate::app::Config;
use crate::constants::{MARKDOWN_SYSTEM_PROMPT, PLAIN_SYSTEM_PROMPT, QUIT_COMMAND, USER_PROMPT};
use crate::models::ModelHost;
use crate::render::{RenderMode, Renderer};
use crate::utils::{Result, TermchatError};

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Greeting,
    AwaitingInput,
    Generating,
    Terminated,
}

/// Everything a session needs to know up front
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub mode: RenderMode,
    pub system_prompt: String,
    /// Prompt for the opening turn, `None` skips it
    pub greeting: Option<String>,
}

impl SessionSettings {
    pub fn from_config(config: &Config, mode: RenderMode) -> Self {
        let system_prompt = match mode {
            RenderMode::Plain => config
                .session
                .plain_system_prompt
                .clone()
                .unwrap_or_else(|| PLAIN_SYSTEM_PROMPT.to_string()),
            RenderMode::Markdown => config
                .session
                .markdown_system_prompt
                .clone()
                .unwrap_or_else(|| MARKDOWN_SYSTEM_PROMPT.to_string()),
        };
        let greeting = config
            .session
            .greeting
            .then(|| greeting_prompt(config.session.user_name.as_deref()));

        Self {
            mode,
            system_prompt,
            greeting,
        }
    }
}

/// Prompt asking the model to say hello to whoever is at the terminal
pub fn greeting_prompt(user_name: Option<&str>) -> String {
    let name = user_name
        .map(str::to_string)
        .or_else(|| std::env::var("USER").ok())
        .or_else(|| std::env::var("USERNAME").ok())
        .unwrap_or_else(|| "a friend".to_string());
    format!("Greet the user. The user is {}.", name)
}

/// One interactive multi-turn conversation with a single model
pub struct ChatSession<'h, H: ModelHost + ?Sized, R: Renderer> {
    host: &'h H,
    model: String,
    settings: SessionSettings,
    history: ConversationHistory,
    renderer: R,
    state: SessionState,
}

impl<'h, H: ModelHost + ?Sized, R: Renderer> ChatSession<'h, H, R> {
    /// Open a session, refusing models the host does not have installed
    pub async fn start(
        host: &'h H,
        model: &str,
        settings: SessionSettings,
        renderer: R,
    ) -> Result<Self> {
        let installed = host.list().await?;
        let model = resolve_model(&installed, model)
            .cloned()
            .ok_or_else(|| TermchatError::ModelNotFound {
                model: model.to_string(),
            })?;
        info!("Starting chat session with {} ({:?} mode)", model, settings.mode);

        let history = ConversationHistory::new(Some(settings.system_prompt.clone()));
        Ok(Self {
            host,
            model,
            settings,
            history,
            renderer,
            state: SessionState::Idle,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Opening turn, if one is configured
    pub async fn greet(&mut self) -> Result<()> {
        let Some(prompt) = self.settings.greeting.clone() else {
            return Ok(());
        };
        self.state = SessionState::Greeting;
        self.turn(&prompt).await?;
        Ok(())
    }

    /// Send one user message and wait for the whole reply
    pub async fn send(&mut self, input: &str) -> Result<String> {
        self.turn(input).await
    }

    /// Greet, then keep taking turns until `/quit` or end of input
    ///
    /// The first failed turn ends the session.
    pub async fn run<I: InputSource + ?Sized>(&mut self, input: &mut I) -> Result<()> {
        self.greet().await?;
        self.state = SessionState::AwaitingInput;

        loop {
            let line = match input.read_line(USER_PROMPT) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    self.state = SessionState::Terminated;
                    return Err(e);
                }
            };
            let line = line.trim();
            if line == QUIT_COMMAND {
                break;
            }
            if line.is_empty() {
                continue;
            }
            self.turn(line).await?;
        }

        debug!("Session ended after {} messages", self.history.len());
        self.state = SessionState::Terminated;
        Ok(())
    }

    async fn turn(&mut self, input: &str) -> Result<String> {
        self.history.push_user(input);
        if self.state != SessionState::Greeting {
            self.state = SessionState::Generating;
        }

        match self.generate().await {
            Ok(reply) => {
                self.history.push_assistant(reply.clone());
                present_reply(&reply, self.settings.mode, &mut self.renderer)?;
                self.state = SessionState::AwaitingInput;
                Ok(reply)
            }
            Err(e) => {
                self.history.rollback_user();
                self.state = SessionState::Terminated;
                Err(e)
            }
        }
    }

    async fn generate(&mut self) -> Result<String> {
        let stream = self.host.chat(&self.model, self.history.messages()).await?;
        drain_reply(stream, self.settings.mode, &mut self.renderer).await
    }
}
