use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::ConfigError;

pub const DEFAULT_PROMPT_MAX_CHARS: usize = 10_000;
pub const DEFAULT_EXTRACT_MIN_CHARS: usize = 50;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(60);
/// Last-resort bound on a whole request, above the two boundary timeouts combined.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_FENCES: &str = "```,~~~";
const DEFAULT_LANGUAGE_TAGS: &str = "json";

/// Text-generation backend selected by `LLM_PROVIDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Gemini,
    OpenRouter,
}

impl LlmProvider {
    fn api_key_var(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::OpenRouter => "OPENROUTER_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini-1.5-flash",
            LlmProvider::OpenRouter => "deepseek/deepseek-chat-v3-0324",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com",
            LlmProvider::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(LlmProvider::Gemini),
            "openrouter" => Ok(LlmProvider::OpenRouter),
            other => Err(ConfigError::Invalid {
                key: "LLM_PROVIDER",
                reason: format!("unknown provider '{}'", other),
            }),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub provider: LlmProvider,
    pub api_key: String,
    pub model: String,
    pub llm_base_url: String,
    pub prompt_max_chars: usize,
    pub extract_min_chars: usize,
    pub response_fences: Vec<String>,
    pub response_language_tags: Vec<String>,
    pub fetch_timeout: Duration,
    pub model_timeout: Duration,
    pub request_timeout: Duration,
    pub fetch_user_agent: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_addr", &self.server_addr)
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("llm_base_url", &self.llm_base_url)
            .field("prompt_max_chars", &self.prompt_max_chars)
            .field("extract_min_chars", &self.extract_min_chars)
            .field("response_fences", &self.response_fences)
            .field("response_language_tags", &self.response_language_tags)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("model_timeout", &self.model_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("fetch_user_agent", &self.fetch_user_agent)
            .finish()
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let ip = IpAddr::from_str(host.trim()).map_err(|e| ConfigError::Invalid {
            key: "HOST",
            reason: e.to_string(),
        })?;
        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;
        let server_addr = SocketAddr::new(ip, port);

        let provider = match get("LLM_PROVIDER") {
            Some(value) => value.parse()?,
            None => LlmProvider::Gemini,
        };

        let api_key = get(provider.api_key_var())
            .ok_or(ConfigError::Missing(provider.api_key_var()))?;
        let model = get("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string());
        let llm_base_url = get("LLM_BASE_URL")
            .unwrap_or_else(|| provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        let prompt_max_chars =
            parse_or("PROMPT_MAX_CHARS", get("PROMPT_MAX_CHARS"), DEFAULT_PROMPT_MAX_CHARS)?;
        if prompt_max_chars == 0 {
            return Err(ConfigError::Invalid {
                key: "PROMPT_MAX_CHARS",
                reason: "must be greater than zero".to_string(),
            });
        }
        let extract_min_chars =
            parse_or("EXTRACT_MIN_CHARS", get("EXTRACT_MIN_CHARS"), DEFAULT_EXTRACT_MIN_CHARS)?;

        let response_fences = split_list(&get("RESPONSE_FENCES").unwrap_or_else(|| DEFAULT_FENCES.to_string()));
        let response_language_tags = split_list(
            &get("RESPONSE_LANGUAGE_TAGS").unwrap_or_else(|| DEFAULT_LANGUAGE_TAGS.to_string()),
        );

        let fetch_timeout = parse_secs("FETCH_TIMEOUT_SECS", get("FETCH_TIMEOUT_SECS"))?
            .unwrap_or(DEFAULT_FETCH_TIMEOUT);
        let model_timeout = parse_secs("MODEL_TIMEOUT_SECS", get("MODEL_TIMEOUT_SECS"))?
            .unwrap_or(DEFAULT_MODEL_TIMEOUT);
        let request_timeout = parse_secs("REQUEST_TIMEOUT_SECS", get("REQUEST_TIMEOUT_SECS"))?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let fetch_user_agent = get("FETCH_USER_AGENT")
            .unwrap_or_else(|| concat!("article-digest/", env!("CARGO_PKG_VERSION")).to_string());

        Ok(Config {
            server_addr,
            provider,
            api_key,
            model,
            llm_base_url,
            prompt_max_chars,
            extract_min_chars,
            response_fences,
            response_language_tags,
            fetch_timeout,
            model_timeout,
            request_timeout,
            fetch_user_agent,
        })
    }
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_secs(key: &'static str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    match value {
        Some(raw) => {
            let secs = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                key,
                reason: e.to_string(),
            })?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "must be greater than zero".to_string(),
                });
            }
            Ok(Some(Duration::from_secs(secs)))
        }
        None => Ok(None),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
