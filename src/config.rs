use std::{
    env, fs,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, anyhow};
use jsonschema::{JSONSchema, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const BUNDLED_SCHEMA: &str = include_str!("../portal.schema.json");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub nocobase: NocoBaseConfig,
    #[serde(default)]
    pub fider: FiderConfig,
    #[serde(default)]
    pub bookstack: BookStackConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_body_limit_bytes() -> usize {
    1024 * 1024
}

fn default_logging_filter() -> String {
    "info".to_string()
}

fn default_logging_rotation() -> LoggingRotation {
    LoggingRotation::Daily
}

fn default_logging_retention_days() -> usize {
    14
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_inference_timeout_ms() -> u64 {
    8_000
}

fn default_provisioning_timeout_ms() -> u64 {
    8_000
}

fn default_nocobase_url() -> String {
    "http://nocobase:13000".to_string()
}

fn default_fider_url() -> String {
    "http://fider:3000".to_string()
}

fn default_bookstack_url() -> String {
    "http://bookstack:80".to_string()
}

fn default_ollama_url() -> String {
    "http://ollama:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.1".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared secret expected in `x-api-key`. Empty leaves the gate open.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: String::new(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("invalid server.host '{}'", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LoggingRotation {
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_filter")]
    pub filter: String,
    /// JSON log files are written only when a directory is configured.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_logging_rotation")]
    pub rotation: LoggingRotation,
    #[serde(default = "default_logging_retention_days")]
    pub retention_days: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_logging_filter(),
            dir: None,
            rotation: default_logging_rotation(),
            retention_days: default_logging_retention_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_timeout_ms")]
    pub default_ms: u64,
    #[serde(default = "default_inference_timeout_ms")]
    pub inference_ms: u64,
    #[serde(default = "default_provisioning_timeout_ms")]
    pub provisioning_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default_ms: default_timeout_ms(),
            inference_ms: default_inference_timeout_ms(),
            provisioning_ms: default_provisioning_timeout_ms(),
        }
    }
}

impl TimeoutConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_ms.max(1))
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_millis(self.inference_ms.max(1))
    }

    pub fn provisioning_timeout(&self) -> Duration {
        Duration::from_millis(self.provisioning_ms.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NocoBaseConfig {
    #[serde(default = "default_nocobase_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_token: String,
}

impl Default for NocoBaseConfig {
    fn default() -> Self {
        Self {
            base_url: default_nocobase_url(),
            api_token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiderConfig {
    #[serde(default = "default_fider_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for FiderConfig {
    fn default() -> Self {
        Self {
            base_url: default_fider_url(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookStackConfig {
    #[serde(default = "default_bookstack_url")]
    pub base_url: String,
    #[serde(default)]
    pub token_id: String,
    #[serde(default)]
    pub token_secret: String,
}

impl Default for BookStackConfig {
    fn default() -> Self {
        Self {
            base_url: default_bookstack_url(),
            token_id: String::new(),
            token_secret: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_ollama_model(),
        }
    }
}

impl Config {
    /// Defaults, then the optional config file, then process environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| env::var(key).ok())?;
        config.normalize();
        Ok(config)
    }

    pub fn from_file(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config_value: Value = json5::from_str(&config_content)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        let config_base = config_path.parent().unwrap_or_else(|| Path::new("."));
        let schema = load_schema(config_base, &config_value)?;
        validate_against_schema(&config_value, &schema)?;

        let mut config: Config =
            serde_json::from_value(config_value).context("failed to deserialize config")?;

        if let Some(dir) = &config.logging.dir
            && !dir.is_absolute()
        {
            config.logging.dir = Some(config_base.join(dir));
        }

        Ok(config)
    }

    /// Overlays the environment variables that form the deployment contract.
    /// Empty values count as unset, except for credentials, where a set but
    /// empty variable clears the value and leaves the credential unconfigured.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let credential = |key: &str| lookup(key).map(|value| value.trim().to_string());

        if let Some(port) = get("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got '{port}'"))?;
        }
        if let Some(host) = get("BIND_ADDRESS") {
            self.server.host = host;
        }
        if let Some(api_key) = credential("API_KEY") {
            self.server.api_key = api_key;
        }
        if let Some(filter) = get("LOG_LEVEL") {
            self.logging.filter = filter;
        }
        if let Some(dir) = get("LOG_DIR") {
            self.logging.dir = Some(PathBuf::from(dir));
        }
        if let Some(url) = get("NOCOBASE_URL") {
            self.nocobase.base_url = url;
        }
        if let Some(token) = credential("NOCOBASE_API_TOKEN") {
            self.nocobase.api_token = token;
        }
        if let Some(url) = get("FIDER_URL") {
            self.fider.base_url = url;
        }
        if let Some(api_key) = credential("FIDER_API_KEY") {
            self.fider.api_key = api_key;
        }
        if let Some(url) = get("BOOKSTACK_URL") {
            self.bookstack.base_url = url;
        }
        if let Some(token_id) = credential("BOOKSTACK_TOKEN_ID") {
            self.bookstack.token_id = token_id;
        }
        if let Some(token_secret) = credential("BOOKSTACK_TOKEN_SECRET") {
            self.bookstack.token_secret = token_secret;
        }
        if let Some(url) = get("OLLAMA_URL") {
            self.ollama.base_url = url;
        }
        if let Some(model) = get("OLLAMA_MODEL") {
            self.ollama.model = model;
        }

        Ok(())
    }

    fn normalize(&mut self) {
        for base_url in [
            &mut self.nocobase.base_url,
            &mut self.fider.base_url,
            &mut self.bookstack.base_url,
            &mut self.ollama.base_url,
        ] {
            let trimmed = base_url.trim().trim_end_matches('/').to_string();
            *base_url = trimmed;
        }
    }
}

fn load_schema(config_base: &Path, config_value: &Value) -> Result<Value> {
    let Some(path_text) = config_value.get("$schema").and_then(|value| value.as_str()) else {
        return serde_json::from_str(BUNDLED_SCHEMA).context("failed to parse bundled schema");
    };

    let configured = PathBuf::from(path_text);
    let schema_path = if configured.is_absolute() {
        configured
    } else {
        config_base.join(&configured)
    };
    let schema_content = fs::read_to_string(&schema_path)
        .with_context(|| format!("failed to read schema {}", schema_path.display()))?;
    serde_json::from_str(&schema_content)
        .with_context(|| format!("failed to parse schema {}", schema_path.display()))
}

fn validate_against_schema(config_value: &Value, schema: &Value) -> Result<()> {
    let compiled =
        JSONSchema::compile(schema).map_err(|e| anyhow!("failed to compile schema: {e}"))?;

    match compiled.validate(config_value) {
        Ok(()) => Ok(()),
        Err(errors_iter) => {
            let validation_errors: Vec<ValidationError> = errors_iter.collect();
            let messages: Vec<String> = validation_errors
                .into_iter()
                .map(|error| error.to_string())
                .collect();
            Err(anyhow!("config validation failed: {}", messages.join("; ")))
        }
    }
}
