use anyhow::Result;
use std::env;
use std::path::PathBuf;

/// Model every question is sent to.
pub const MODEL_ID: &str = "claude-3-5-sonnet-20240620";
/// Upper bound on generated tokens per answer.
pub const MAX_OUTPUT_TOKENS: u32 = 4096;
/// An uploaded document is discarded once it is older than this.
pub const UPLOAD_TTL_SECS: i64 = 600;

const DEFAULT_API_BASE: &str = "https://api.anthropic.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LLMConfig,
    pub session: SessionConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct LLMConfig {
    pub provider: String,
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub upload_ttl_secs: i64,
    /// Drop the conversation together with an expired document.
    pub clear_history_on_expiry: bool,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LLMConfig {
                provider: "anthropic".to_string(),
                api_base: DEFAULT_API_BASE.to_string(),
                model: MODEL_ID.to_string(),
                max_tokens: MAX_OUTPUT_TOKENS,
            },
            session: SessionConfig {
                upload_ttl_secs: UPLOAD_TTL_SECS,
                clear_history_on_expiry: false,
            },
            log: LogConfig {
                dir: default_log_dir(),
            },
        }
    }
}

impl Config {
    /// Build the configuration from the process environment (and `.env`).
    ///
    /// The API key is never read here; it is only typed into the UI.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            llm: LLMConfig {
                provider: env::var("FILECHAT_PROVIDER").unwrap_or(defaults.llm.provider),
                api_base: env::var("FILECHAT_API_BASE")
                    .map(|s| s.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.llm.api_base),
                ..defaults.llm
            },
            session: SessionConfig {
                clear_history_on_expiry: env::var("FILECHAT_CLEAR_HISTORY_ON_EXPIRY")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()?,
                ..defaults.session
            },
            log: LogConfig {
                dir: env::var("FILECHAT_LOG_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.log.dir),
            },
        })
    }
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("filechat")
        .join("logs")
}
