//! Configuration management

use serde::{Deserialize, Serialize};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/ceplote.db";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

/// Default directory where uploaded sheets are retained.
pub const DEFAULT_UPLOAD_DIR: &str = "data/uploads";

/// Default BrasilAPI base URL.
pub const DEFAULT_BRASILAPI_BASE_URL: &str = "https://brasilapi.com.br";

/// Default ViaCEP base URL.
pub const DEFAULT_VIACEP_BASE_URL: &str = "https://viacep.com.br";

/// Default AwesomeAPI base URL.
pub const DEFAULT_AWESOMEAPI_BASE_URL: &str = "https://cep.awesomeapi.com.br";

/// Default per-request provider timeout in seconds.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 15;

/// Default attempts per provider per CEP.
pub const DEFAULT_PROVIDER_MAX_ATTEMPTS: u32 = 3;

/// Default base delay between retry attempts in milliseconds.
pub const DEFAULT_PROVIDER_RETRY_DELAY_MS: u64 = 500;

/// Default bound on simultaneously in-flight resolutions.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 20;

/// Default number of input rows per processing batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Default pause between batches in milliseconds (0 = none).
pub const DEFAULT_BATCH_PAUSE_MS: u64 = 0;

/// Default queue polling interval for the job runner in seconds.
pub const DEFAULT_RUNNER_POLL_SECS: u64 = 5;

/// Default CORS allowed origin.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "*";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub upload: UploadConfig,
    pub providers: ProviderConfig,
    pub batch: BatchConfig,
    pub runner: RunnerConfig,
    pub cors: CorsConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Upload retention configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: String,
}

/// External CEP provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub brasilapi_base_url: String,
    pub viacep_base_url: String,
    pub awesomeapi_base_url: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

/// Batch engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Bound on simultaneously in-flight resolutions
    pub concurrency: usize,
    /// Input rows per processing batch
    pub batch_size: usize,
    /// Pause between batches (politeness toward provider rate limits)
    pub pause_ms: u64,
}

/// Background job runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub enabled: bool,
    pub poll_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_string(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: env_string("CEPLOTE_HOST", DEFAULT_SERVER_HOST),
                port: env_parse("CEPLOTE_PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_parse(
                    "CEPLOTE_SHUTDOWN_TIMEOUT",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                ),
            },
            database: DatabaseConfig {
                url: env_string("DATABASE_URL", DEFAULT_DATABASE_URL),
                max_connections: env_parse(
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_DATABASE_MAX_CONNECTIONS,
                ),
            },
            upload: UploadConfig {
                dir: env_string("CEPLOTE_UPLOAD_DIR", DEFAULT_UPLOAD_DIR),
            },
            providers: ProviderConfig {
                brasilapi_base_url: env_string("BRASILAPI_BASE_URL", DEFAULT_BRASILAPI_BASE_URL),
                viacep_base_url: env_string("VIACEP_BASE_URL", DEFAULT_VIACEP_BASE_URL),
                awesomeapi_base_url: env_string(
                    "AWESOMEAPI_BASE_URL",
                    DEFAULT_AWESOMEAPI_BASE_URL,
                ),
                timeout_secs: env_parse(
                    "CEPLOTE_PROVIDER_TIMEOUT_SECS",
                    DEFAULT_PROVIDER_TIMEOUT_SECS,
                ),
                max_attempts: env_parse(
                    "CEPLOTE_PROVIDER_MAX_ATTEMPTS",
                    DEFAULT_PROVIDER_MAX_ATTEMPTS,
                ),
                retry_delay_ms: env_parse(
                    "CEPLOTE_PROVIDER_RETRY_DELAY_MS",
                    DEFAULT_PROVIDER_RETRY_DELAY_MS,
                ),
            },
            batch: BatchConfig {
                concurrency: env_parse("CEPLOTE_BATCH_CONCURRENCY", DEFAULT_BATCH_CONCURRENCY),
                batch_size: env_parse("CEPLOTE_BATCH_SIZE", DEFAULT_BATCH_SIZE),
                pause_ms: env_parse("CEPLOTE_BATCH_PAUSE_MS", DEFAULT_BATCH_PAUSE_MS),
            },
            runner: RunnerConfig {
                enabled: env_parse("CEPLOTE_RUNNER_ENABLED", true),
                poll_secs: env_parse("CEPLOTE_RUNNER_POLL_SECS", DEFAULT_RUNNER_POLL_SECS),
            },
            cors: CorsConfig {
                allowed_origins: env_string("CEPLOTE_CORS_ORIGINS", DEFAULT_CORS_ALLOWED_ORIGIN)
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        for (name, url) in [
            ("BRASILAPI_BASE_URL", &self.providers.brasilapi_base_url),
            ("VIACEP_BASE_URL", &self.providers.viacep_base_url),
            ("AWESOMEAPI_BASE_URL", &self.providers.awesomeapi_base_url),
        ] {
            if url.is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }
        }

        if self.providers.max_attempts == 0 {
            anyhow::bail!("Provider max_attempts must be at least 1");
        }

        if self.providers.timeout_secs == 0 {
            anyhow::bail!("Provider timeout must be greater than 0");
        }

        if self.batch.concurrency == 0 {
            anyhow::bail!("Batch concurrency must be greater than 0");
        }

        if self.batch.batch_size == 0 {
            anyhow::bail!("Batch size must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            },
            upload: UploadConfig {
                dir: DEFAULT_UPLOAD_DIR.to_string(),
            },
            providers: ProviderConfig {
                brasilapi_base_url: DEFAULT_BRASILAPI_BASE_URL.to_string(),
                viacep_base_url: DEFAULT_VIACEP_BASE_URL.to_string(),
                awesomeapi_base_url: DEFAULT_AWESOMEAPI_BASE_URL.to_string(),
                timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
                max_attempts: DEFAULT_PROVIDER_MAX_ATTEMPTS,
                retry_delay_ms: DEFAULT_PROVIDER_RETRY_DELAY_MS,
            },
            batch: BatchConfig {
                concurrency: DEFAULT_BATCH_CONCURRENCY,
                batch_size: DEFAULT_BATCH_SIZE,
                pause_ms: DEFAULT_BATCH_PAUSE_MS,
            },
            runner: RunnerConfig {
                enabled: true,
                poll_secs: DEFAULT_RUNNER_POLL_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
            },
        }
    }
}
