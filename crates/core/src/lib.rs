pub mod api;
pub mod chart;
pub mod chat;
pub mod dashboard;
pub mod domain;
pub mod settings;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;

    const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
    const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_base_url: String,
        pub api_timeout_secs: u64,
        pub settings_path: Option<PathBuf>,
        pub prefers_color_scheme: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let api_timeout_secs = match std::env::var("API_TIMEOUT_SECS") {
                Ok(s) => s
                    .parse::<u64>()
                    .with_context(|| format!("API_TIMEOUT_SECS must be an integer (got {s})"))?,
                Err(_) => DEFAULT_API_TIMEOUT_SECS,
            };

            let settings_path = std::env::var("FINAGENT_SETTINGS_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|home| PathBuf::from(home).join(".finagent").join("settings.json"))
                });

            Ok(Self {
                api_base_url: std::env::var("API_BASE_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                api_timeout_secs,
                settings_path,
                prefers_color_scheme: std::env::var("PREFERS_COLOR_SCHEME").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_settings_path(&self) -> anyhow::Result<&std::path::Path> {
            self.settings_path
                .as_deref()
                .context("FINAGENT_SETTINGS_PATH (or HOME) is required")
        }

        /// System colour preference used when no theme has been saved yet.
        pub fn prefers_dark(&self) -> bool {
            self.prefers_color_scheme
                .as_deref()
                .is_some_and(|s| s.trim().eq_ignore_ascii_case("dark"))
        }
    }
}
