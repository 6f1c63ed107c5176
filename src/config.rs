//! Runtime configuration - flags with environment fallbacks (`.env` is honoured)

use std::env;
use std::sync::Arc;

use clap::Args;

use crate::ai::gemini::{API_KEY_ENV, DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::ai::{GeminiClient, PlanGenerator};

/// Older deployments only set this one
const FALLBACK_API_KEY_ENV: &str = "API_KEY";

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// SQLite file holding the cached plan and completion flags
    #[arg(long, global = true, env = "WEEKFIT_DB", default_value = "weekfit.db")]
    pub db: String,

    /// Gemini API key
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model used for plans and replacements
    #[arg(long, global = true, env = "WEEKFIT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, global = true, env = "WEEKFIT_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Log file used while the TUI owns the terminal
    #[arg(long, global = true, default_value = "weekfit.log")]
    pub log_file: String,
}

impl Config {
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env::var(FALLBACK_API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn generator(&self) -> Arc<dyn PlanGenerator> {
        Arc::new(
            GeminiClient::new(self.api_key())
                .with_model(&self.model)
                .with_api_base(&self.api_base),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: Config,
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = TestCli::parse_from([
            "weekfit",
            "--db",
            "/tmp/w.db",
            "--model",
            "gemini-2.0-flash",
            "--api-key",
            "abc",
        ]);
        assert_eq!(cli.config.db, "/tmp/w.db");
        assert_eq!(cli.config.model, "gemini-2.0-flash");
        assert_eq!(cli.config.api_key().as_deref(), Some("abc"));
    }

    #[test]
    fn test_blank_key_is_none() {
        let cli = TestCli::parse_from(["weekfit", "--api-key", " "]);
        assert!(cli.config.api_key.is_some());
        // only true when API_KEY is unset in the test environment
        if env::var(FALLBACK_API_KEY_ENV).is_err() {
            assert_eq!(cli.config.api_key(), None);
        }
    }
}
