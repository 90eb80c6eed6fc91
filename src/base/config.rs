//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use config::{ConfigBuilder, builder::DefaultState};
use serde::Deserialize;

use crate::base::prompts;

use super::types::{Res, Void};

/// Default OpenAI model to use.
fn default_openai_model() -> String {
    "gpt-5-mini".to_string()
}

/// Default reasoning effort for the OpenAI model.
fn default_openai_reasoning_effort() -> String {
    "medium".to_string()
}

/// Default slash command for canvas management.
fn default_canvas_command() -> String {
    "/canvas".to_string()
}

/// Default display name of the bot.
fn default_bot_name() -> String {
    "Trail Bites AI Assistant".to_string()
}

/// Default system directive for the assistant.
fn default_system_directive() -> String {
    prompts::ASSISTANT_SYSTEM_DIRECTIVE.to_string()
}

/// Configuration for the trail-bot application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    #[serde(default)]
    pub slack_bot_token: String,
    /// Slack app-level token used for socket mode (`SLACK_APP_TOKEN`).
    #[serde(default)]
    pub slack_app_token: String,
    /// Slack signing secret (`SLACK_SIGNING_SECRET`).
    #[serde(default)]
    pub slack_signing_secret: String,
    /// OpenAI API key (`OPENAI_API_KEY`).
    #[serde(default)]
    pub openai_api_key: String,
    /// OpenAI model to use (`OPENAI_MODEL`).
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Reasoning effort sent with every completion (`OPENAI_REASONING_EFFORT`).
    /// One of `low`, `medium`, `high`.
    #[serde(default = "default_openai_reasoning_effort")]
    pub openai_reasoning_effort: String,
    /// Default channel name (`DEFAULT_CHANNEL`).
    #[serde(default)]
    pub default_channel: String,
    /// Slash command that manages canvases (`CANVAS_COMMAND`).
    #[serde(default = "default_canvas_command")]
    pub canvas_command: String,
    /// Display name of the bot (`BOT_NAME`).
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
    /// Optional custom system directive to override the default (`SYSTEM_DIRECTIVE`).
    #[serde(default = "default_system_directive")]
    pub system_directive: String,
}

impl ConfigInner {
    /// Names of the required settings that are absent or empty.
    pub fn missing_required(&self) -> Vec<&'static str> {
        [
            ("SLACK_BOT_TOKEN", &self.slack_bot_token),
            ("SLACK_APP_TOKEN", &self.slack_app_token),
            ("SLACK_SIGNING_SECRET", &self.slack_signing_secret),
            ("OPENAI_API_KEY", &self.openai_api_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Validate the loaded settings.
    pub fn validate(&self) -> Void {
        let missing = self.missing_required();

        if !missing.is_empty() {
            return Err(anyhow::anyhow!("Missing required environment variables: {}", missing.join(", ")));
        }

        if !matches!(self.openai_reasoning_effort.to_lowercase().as_str(), "low" | "medium" | "high") {
            return Err(anyhow::anyhow!(
                "Invalid reasoning effort: {}. Must be one of: low, medium, high",
                self.openai_reasoning_effort
            ));
        }

        if !self.canvas_command.starts_with('/') {
            return Err(anyhow::anyhow!("Canvas command must start with `/`."));
        }

        Ok(())
    }
}

impl Config {
    /// Load from the environment and an optional TOML file, then validate.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default());

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        Self::build(cfg)
    }

    /// Build and validate from an already assembled set of sources.
    pub fn build(builder: ConfigBuilder<DefaultState>) -> Res<Self> {
        let inner: ConfigInner = builder.build()?.try_deserialize()?;

        inner.validate()?;

        Ok(Self { inner: Arc::new(inner) })
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn builder_with(values: &[(&str, &str)]) -> ConfigBuilder<DefaultState> {
        values
            .iter()
            .fold(config::Config::builder(), |builder, (key, value)| builder.set_override(*key, *value).unwrap())
    }

    fn complete() -> Vec<(&'static str, &'static str)> {
        vec![
            ("slack_bot_token", "xoxb-test"),
            ("slack_app_token", "xapp-test"),
            ("slack_signing_secret", "secret"),
            ("openai_api_key", "sk-test"),
        ]
    }

    #[test]
    fn test_build_applies_defaults() {
        let config = Config::build(builder_with(&complete())).unwrap();

        assert_eq!(config.openai_model, "gpt-5-mini");
        assert_eq!(config.openai_reasoning_effort, "medium");
        assert_eq!(config.canvas_command, "/canvas");
        assert_eq!(config.default_channel, "");
        assert_eq!(config.system_directive, prompts::ASSISTANT_SYSTEM_DIRECTIVE);
    }

    #[test]
    fn test_build_fails_for_each_missing_secret() {
        for (skipped, _) in complete() {
            let values = complete().into_iter().filter(|(key, _)| *key != skipped).collect::<Vec<_>>();
            let err = Config::build(builder_with(&values)).unwrap_err().to_string();

            assert!(err.contains(&skipped.to_uppercase()), "{err}");
        }
    }

    #[test]
    fn test_empty_secret_counts_as_missing() {
        let inner = ConfigInner {
            slack_bot_token: "xoxb".to_string(),
            slack_app_token: "  ".to_string(),
            slack_signing_secret: "secret".to_string(),
            openai_api_key: String::new(),
            openai_reasoning_effort: "medium".to_string(),
            canvas_command: "/canvas".to_string(),
            ..Default::default()
        };

        assert_eq!(inner.missing_required(), vec!["SLACK_APP_TOKEN", "OPENAI_API_KEY"]);

        let err = inner.validate().unwrap_err().to_string();
        assert_eq!(err, "Missing required environment variables: SLACK_APP_TOKEN, OPENAI_API_KEY");
    }

    #[test]
    fn test_invalid_reasoning_effort_is_rejected() {
        let mut values = complete();
        values.push(("openai_reasoning_effort", "extreme"));

        assert!(Config::build(builder_with(&values)).is_err());
    }

    #[test]
    fn test_overrides_are_respected() {
        let mut values = complete();
        values.push(("openai_model", "gpt-4.1-mini"));
        values.push(("canvas_command", "/doc"));

        let config = Config::build(builder_with(&values)).unwrap();

        assert_eq!(config.openai_model, "gpt-4.1-mini");
        assert_eq!(config.canvas_command, "/doc");
    }
}
