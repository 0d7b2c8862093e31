// src/config.rs
use crate::domain::errors::{AppError, AppResult};
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Forecast service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Language model endpoint used for scenario parsing and explanations
    pub llm: LlmConfig,

    /// Model fitting configuration
    pub forecast: ForecastConfig,

    /// Per-user request limits
    pub rate_limit: RateLimitConfig,

    /// Result cache configuration
    pub cache: CacheConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Chat-completion endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key; the keyword parser and templated explanations are used without one
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Model name
    pub model: String,

    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,

    /// Attempts per call, including the first
    pub max_retries: u32,

    /// Delay before the first retry; doubled for each further retry
    pub retry_base_delay_ms: u64,

    /// Ask the model for the narrative explanation
    pub explanations: bool,
}

/// Forecast model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Allow the augurs seasonal model
    pub seasonal_enabled: bool,

    /// Timeout for a single seasonal fit/predict in milliseconds
    pub model_timeout_ms: u64,

    /// IQR multiplier for outlier detection
    pub iqr_multiplier: f64,

    /// Z-score threshold for outlier detection
    pub z_threshold: f64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Forecast requests allowed per user per window
    pub requests_per_window: u32,

    /// Window length in seconds
    pub window_secs: u64,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Serve and store cached responses
    pub enabled: bool,

    /// Entry lifetime in seconds
    pub ttl_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ForecastConfig {
    pub fn model_timeout(&self) -> Duration {
        Duration::from_millis(self.model_timeout_ms)
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let defaults = Config::default();

        let llm_config = LlmConfig {
            api_key: env::var("LLM_API_KEY").ok().filter(|key| !key.trim().is_empty()),
            base_url: env::var("LLM_BASE_URL").unwrap_or(defaults.llm.base_url),
            model: env::var("LLM_MODEL").unwrap_or(defaults.llm.model),
            timeout_ms: env_or("LLM_TIMEOUT_MS", defaults.llm.timeout_ms),
            max_retries: env_or("LLM_MAX_RETRIES", defaults.llm.max_retries),
            retry_base_delay_ms: env_or("LLM_RETRY_BASE_DELAY_MS", defaults.llm.retry_base_delay_ms),
            explanations: env_or("LLM_EXPLANATIONS", defaults.llm.explanations),
        };

        let forecast_config = ForecastConfig {
            seasonal_enabled: env_or("SEASONAL_ENABLED", defaults.forecast.seasonal_enabled),
            model_timeout_ms: env_or("MODEL_TIMEOUT_MS", defaults.forecast.model_timeout_ms),
            iqr_multiplier: env_or("IQR_MULTIPLIER", defaults.forecast.iqr_multiplier),
            z_threshold: env_or("Z_THRESHOLD", defaults.forecast.z_threshold),
        };

        let rate_limit_config = RateLimitConfig {
            requests_per_window: env_or("RATE_LIMIT_PER_HOUR", defaults.rate_limit.requests_per_window),
            window_secs: env_or("RATE_LIMIT_WINDOW_SECS", defaults.rate_limit.window_secs),
        };

        let cache_config = CacheConfig {
            enabled: env_or("CACHE_ENABLED", defaults.cache.enabled),
            ttl_secs: env_or("CACHE_TTL_SECS", defaults.cache.ttl_secs),
        };

        let logging_config = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            to_file: env_or("LOG_TO_FILE", false),
            file_path: env::var("LOG_FILE_PATH").ok(),
        };

        let config = Config {
            llm: llm_config,
            forecast: forecast_config,
            rate_limit: rate_limit_config,
            cache: cache_config,
            logging: logging_config,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> AppResult<()> {
        if self.rate_limit.requests_per_window == 0 {
            return Err(AppError::Config(
                "RATE_LIMIT_PER_HOUR must be at least 1".to_string(),
            ));
        }
        if self.forecast.model_timeout_ms == 0 || self.llm.timeout_ms == 0 {
            return Err(AppError::Config("timeouts must be positive".to_string()));
        }
        if !(self.forecast.iqr_multiplier > 0.0 && self.forecast.z_threshold > 0.0) {
            return Err(AppError::Config(
                "outlier thresholds must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let mut file = File::open(path).map_err(|e| {
            AppError::Config(format!("Failed to open config file: {}", e))
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(|e| {
            AppError::Config(format!("Failed to read config file: {}", e))
        })?;

        let config: Config = serde_json::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> AppResult<()> {
        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            AppError::Config(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, contents).map_err(|e| {
            AppError::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> AppResult<()> {
        let mut builder = env_logger::Builder::new();

        let log_level = match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        builder.filter_level(log_level);

        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path).map_err(|e| {
                    AppError::Config(format!("Failed to create log file: {}", e))
                })?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        } else {
            // stdout carries the JSON response
            builder.target(env_logger::Target::Stderr);
        }

        builder.try_init().map_err(|e| {
            AppError::Config(format!("Failed to initialize logger: {}", e))
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o-mini".to_string(),
                timeout_ms: 15_000,
                max_retries: 3,
                retry_base_delay_ms: 500,
                explanations: true,
            },
            forecast: ForecastConfig {
                seasonal_enabled: true,
                model_timeout_ms: 10_000,
                iqr_multiplier: 1.5,
                z_threshold: 3.0,
            },
            rate_limit: RateLimitConfig {
                requests_per_window: 100,
                window_secs: 3600,
            },
            cache: CacheConfig {
                enabled: true,
                ttl_secs: 1800,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                to_file: false,
                file_path: None,
            },
        }
    }
}
