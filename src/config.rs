use crate::error::FitError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_DATA_FILE: &str = "fitbuilder.json";

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self { temperature: 0.7, top_k: 1, top_p: 1.0, max_output_tokens: 8192 }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub generation: GenerationSettings,
    /// Extra attempts after a transient failure. Zero keeps the call single-shot.
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub timeout: Option<Duration>,
    /// When set, every raw model response is written here.
    pub dump_dir: Option<PathBuf>,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            generation: GenerationSettings::default(),
            max_retries: 0,
            retry_backoff: Duration::from_secs(2),
            timeout: None,
            dump_dir: None,
        }
    }

    pub fn from_env() -> Result<Self, FitError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, FitError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| FitError::Config("GEMINI_API_KEY must be set".into()))?;
        let mut config = Self::new(api_key);

        if let Some(model) = lookup("GEMINI_MODEL") {
            config.model = model;
        }
        if let Some(url) = lookup("GEMINI_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(dir) = lookup("FITBUILDER_DUMP_DIR") {
            config.dump_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup("FITBUILDER_MAX_RETRIES") {
            config.max_retries = parse_var("FITBUILDER_MAX_RETRIES", &raw)?;
        }
        if let Some(raw) = lookup("FITBUILDER_TIMEOUT_SECS") {
            config.timeout = Some(Duration::from_secs(parse_var("FITBUILDER_TIMEOUT_SECS", &raw)?));
        }
        if let Some(raw) = lookup("FITBUILDER_TEMPERATURE") {
            config.generation.temperature = parse_var("FITBUILDER_TEMPERATURE", &raw)?;
        }
        if let Some(raw) = lookup("FITBUILDER_MAX_OUTPUT_TOKENS") {
            config.generation.max_output_tokens = parse_var("FITBUILDER_MAX_OUTPUT_TOKENS", &raw)?;
        }

        Ok(config)
    }
}

/// Account file location. Needed even by commands that never reach the API,
/// so it is read apart from `Config`.
pub fn data_file_from_env() -> PathBuf {
    std::env::var("FITBUILDER_DATA_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_FILE))
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, FitError> {
    raw.trim()
        .parse()
        .map_err(|_| FitError::Config(format!("{name} has an invalid value: '{raw}'")))
}
