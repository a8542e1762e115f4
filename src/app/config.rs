use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_OLLAMA_URL, HTTP_READ_TIMEOUT_SECS, HTTP_REQUEST_TIMEOUT_SECS,
};
use crate::render::RenderMode;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model host connection
    #[serde(default)]
    pub host: HostConfig,

    /// Model selection and generation options
    #[serde(default)]
    pub model: ModelSettings,

    /// UI configuration
    #[serde(default)]
    pub ui: UIConfig,

    /// Interactive session configuration
    #[serde(default)]
    pub session: SessionConfig,
}

/// Model host connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Base URL of the Ollama host
    pub url: String,
    pub connect_timeout_secs: u64,
    /// Longest pause allowed between reads, streamed replies included
    pub read_timeout_secs: u64,
    /// Upper bound for whole non-streaming requests
    pub request_timeout_secs: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OLLAMA_URL.to_string(),
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: HTTP_READ_TIMEOUT_SECS,
            request_timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Default model settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Model used when none is passed on the command line
    pub default: Option<String>,
    /// Sampling temperature forwarded to the host
    pub temperature: Option<f32>,
}

/// UI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UIConfig {
    /// Render mode used when neither --md-mode nor --flash is given
    #[serde(default)]
    pub render_mode: RenderMode,
}

/// Interactive session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Open each session with a greeting turn
    pub greeting: bool,
    /// Name used in the greeting, defaults to the login name
    pub user_name: Option<String>,
    pub plain_system_prompt: Option<String>,
    pub markdown_system_prompt: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: true,
            user_name: None,
            plain_system_prompt: None,
            markdown_system_prompt: None,
        }
    }
}

/// Load configuration from multiple sources
///
/// Defaults, then the global file, the project-local file, an explicit
/// `--config` file and finally `TERMCHAT_` environment variables.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let global_config = get_config_dir().map(|dir| dir.join("config.toml"));
    let local_config = PathBuf::from(".termchat/config.toml");

    let mut files = Vec::new();
    if let Some(global) = global_config {
        files.push(global);
    }
    files.push(local_config);

    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Configuration file {} does not exist", path.display());
        }
        files.push(path.to_path_buf());
    }

    build_figment(&files)
        .merge(Env::prefixed("TERMCHAT_").split("__"))
        .extract()
        .context("Failed to load configuration")
}

/// Defaults merged with every existing file, later files winning
fn build_figment(files: &[PathBuf]) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    for file in files.iter().filter(|f| f.exists()) {
        figment = figment.merge(Toml::file(file));
    }
    figment
}

/// Get the configuration directory, if the platform has one
pub fn get_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "termchat").map(|dirs| dirs.config_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.host.url, "http://localhost:11434");
        assert_eq!(config.ui.render_mode, RenderMode::Plain);
        assert!(config.session.greeting);
        assert!(config.model.default.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = write_toml(
            r#"
[host]
url = "http://gpu-box:11434"

[model]
default = "mistral"

[ui]
render_mode = "markdown"

[session]
greeting = false
"#,
        );

        let config: Config = build_figment(&[file.path().to_path_buf()])
            .extract()
            .unwrap();
        assert_eq!(config.host.url, "http://gpu-box:11434");
        // Untouched keys keep their defaults
        assert_eq!(config.host.request_timeout_secs, HTTP_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.model.default.as_deref(), Some("mistral"));
        assert_eq!(config.ui.render_mode, RenderMode::Markdown);
        assert!(!config.session.greeting);
    }

    #[test]
    fn test_later_files_win() {
        let first = write_toml("[model]\ndefault = \"llama3\"\ntemperature = 0.1\n");
        let second = write_toml("[model]\ndefault = \"mistral\"\n");

        let config: Config =
            build_figment(&[first.path().to_path_buf(), second.path().to_path_buf()])
                .extract()
                .unwrap();
        assert_eq!(config.model.default.as_deref(), Some("mistral"));
        assert_eq!(config.model.temperature, Some(0.1));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
