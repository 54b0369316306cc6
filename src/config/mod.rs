use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";
pub const DEFAULT_PAGES_CONVERTER_ARGS: &str = "--headless --cat {input}";

#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub access_id: String,
    pub cors_allowed_origins: Vec<String>,
    pub max_file_size_mb: usize,
    pub conversion_timeout_seconds: u64,
    pub pages_converter_command: String,
    pub pages_converter_args: Vec<String>,
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub run_migrations: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 6432,
            access_id: String::new(),
            cors_allowed_origins: split_list(DEFAULT_CORS_ORIGINS, ','),
            max_file_size_mb: 10,
            conversion_timeout_seconds: 30,
            pages_converter_command: "soffice".to_string(),
            pages_converter_args: split_list(DEFAULT_PAGES_CONVERTER_ARGS, ' '),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            database_url: String::new(),
            database_max_connections: 5,
            run_migrations: true,
        }
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("access_id", &"<redacted>")
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("max_file_size_mb", &self.max_file_size_mb)
            .field("conversion_timeout_seconds", &self.conversion_timeout_seconds)
            .field("pages_converter_command", &self.pages_converter_command)
            .field("pages_converter_args", &self.pages_converter_args)
            .field("llm_api_key", &"<redacted>")
            .field("llm_api_base_url", &self.llm_api_base_url)
            .field("llm_model_name", &self.llm_model_name)
            .field("database_url", &"<redacted>")
            .field("database_max_connections", &self.database_max_connections)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        let defaults = Config::default();

        let config = Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| {
                info!("SERVER_HOST not set, using default: {}", defaults.server_host);
                defaults.server_host.clone()
            }),
            server_port: Self::parse_env_var("SERVER_PORT", defaults.server_port)
                .context("Failed to parse SERVER_PORT")?,
            access_id: env::var("ACCESS_ID").context("ACCESS_ID must be set")?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| split_list(&v, ','))
                .unwrap_or(defaults.cors_allowed_origins),
            max_file_size_mb: Self::parse_env_var("MAX_FILE_SIZE_MB", defaults.max_file_size_mb)
                .context("Failed to parse MAX_FILE_SIZE_MB")?,
            conversion_timeout_seconds: Self::parse_env_var(
                "CONVERSION_TIMEOUT_SECONDS",
                defaults.conversion_timeout_seconds,
            )
            .context("Failed to parse CONVERSION_TIMEOUT_SECONDS")?,
            pages_converter_command: env::var("PAGES_CONVERTER_COMMAND")
                .unwrap_or(defaults.pages_converter_command),
            pages_converter_args: env::var("PAGES_CONVERTER_ARGS")
                .map(|v| split_list(&v, ' '))
                .unwrap_or(defaults.pages_converter_args),
            llm_api_key: env::var("LLM_API_KEY").unwrap_or_else(|_| {
                warn!("LLM_API_KEY not set, question parsing requests will be unauthenticated");
                String::new()
            }),
            llm_api_base_url: env::var("LLM_API_BASE_URL").unwrap_or(defaults.llm_api_base_url),
            llm_model_name: env::var("LLM_MODEL_NAME").unwrap_or(defaults.llm_model_name),
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: Self::parse_env_var(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )
            .context("Failed to parse DATABASE_MAX_CONNECTIONS")?,
            run_migrations: Self::parse_env_var("RUN_MIGRATIONS", defaults.run_migrations)
                .context("Failed to parse RUN_MIGRATIONS")?,
        };

        config.validate()?;

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(val) => match val.parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            Err(_) => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.access_id.is_empty() {
            return Err(anyhow::anyhow!("ACCESS_ID must not be empty"));
        }
        if self.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.conversion_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("CONVERSION_TIMEOUT_SECONDS must be greater than 0"));
        }
        if self.pages_converter_command.trim().is_empty() {
            return Err(anyhow::anyhow!("PAGES_CONVERTER_COMMAND must not be empty"));
        }
        if self.database_max_connections == 0 {
            return Err(anyhow::anyhow!("DATABASE_MAX_CONNECTIONS must be greater than 0"));
        }
        Ok(())
    }

    pub fn conversion_timeout(&self) -> Duration {
        Duration::from_secs(self.conversion_timeout_seconds)
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }
}

fn split_list(raw: &str, separator: char) -> Vec<String> {
    raw.split(separator)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
