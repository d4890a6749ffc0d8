use std::time::Duration;

use dyemark_processor::api::ProcessorConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the database URL (read separately in `main`) have
/// defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on post-shutdown cleanup in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Base URL of the external processor (default: `http://localhost:8600`).
    pub processor_url: String,
    /// Bearer token for the processor, if it requires one.
    pub processor_api_key: Option<String>,
    /// Timeout for each processor call in seconds (default: `15`).
    pub processor_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                       |
    /// | `PROCESSOR_URL`          | `http://localhost:8600`    |
    /// | `PROCESSOR_API_KEY`      | unset                      |
    /// | `PROCESSOR_TIMEOUT_SECS` | `15`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let processor_url =
            std::env::var("PROCESSOR_URL").unwrap_or_else(|_| "http://localhost:8600".into());

        let processor_api_key = std::env::var("PROCESSOR_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let processor_timeout_secs: u64 = std::env::var("PROCESSOR_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".into())
            .parse()
            .expect("PROCESSOR_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            processor_url,
            processor_api_key,
            processor_timeout_secs,
        }
    }

    /// Connection settings for the processor client.
    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig {
            base_url: self.processor_url.clone(),
            api_key: self.processor_api_key.clone(),
            timeout: Duration::from_secs(self.processor_timeout_secs),
        }
    }
}
