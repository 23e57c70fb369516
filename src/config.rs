//! Command-line and environment configuration.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("server address must start with http:// (got '{0}')")]
    UnsupportedScheme(String),
    #[error("api prefix must start with '/' (got '{0}')")]
    InvalidPrefix(String),
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
}

/// How reference ids (idempotency keys) are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReferenceScheme {
    /// `TX-<unix millis>-<0..999>`
    #[default]
    Timestamp,
    /// `TX-<uuid v4>`
    Uuid,
}

#[derive(Parser, Debug)]
#[command(name = "finscale")]
#[command(about = "TUI CLI for the FinScale general ledger", long_about = None)]
pub struct Args {
    /// Ledger backend address
    #[arg(short, long, env = "FINSCALE_SERVER", default_value = "http://localhost:8080")]
    pub server: String,

    /// Path prefix of the versioned API
    #[arg(long, env = "FINSCALE_API_PREFIX", default_value = "/api/v1")]
    pub api_prefix: String,

    /// Request timeout in seconds
    #[arg(long, env = "FINSCALE_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Automatic retries for failed account queries
    #[arg(long, env = "FINSCALE_QUERY_RETRIES", default_value_t = 1)]
    pub query_retries: u32,

    /// Log file used while the TUI owns the terminal
    #[arg(long, env = "FINSCALE_LOG_FILE", default_value = "finscale.log")]
    pub log_file: PathBuf,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, env = "FINSCALE_LOG", default_value = "info")]
    pub log_level: String,

    /// Reference id generation scheme
    #[arg(long, value_enum, default_value_t = ReferenceScheme::Timestamp)]
    pub reference_scheme: ReferenceScheme,

    /// Check the API and list accounts without starting the TUI
    #[arg(long)]
    pub check: bool,
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Absolute base URL every API path is appended to, without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
    pub query_retries: u32,
    pub retry_delay: Duration,
    pub log_file: PathBuf,
    pub log_level: String,
    pub reference_scheme: ReferenceScheme,
    pub check: bool,
}

impl Settings {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let server = args.server.trim().trim_end_matches('/');
        if !server.starts_with("http://") {
            return Err(ConfigError::UnsupportedScheme(args.server));
        }

        let prefix = args.api_prefix.trim().trim_end_matches('/');
        if !prefix.is_empty() && !prefix.starts_with('/') {
            return Err(ConfigError::InvalidPrefix(args.api_prefix));
        }

        if args.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            base_url: format!("{}{}", server, prefix),
            timeout: Duration::from_secs(args.timeout_secs),
            query_retries: args.query_retries,
            retry_delay: Duration::from_secs(1),
            log_file: args.log_file,
            log_level: args.log_level,
            reference_scheme: args.reference_scheme,
            check: args.check,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const ENV_FALLBACKS: [&str; 6] = [
        "FINSCALE_SERVER",
        "FINSCALE_API_PREFIX",
        "FINSCALE_TIMEOUT_SECS",
        "FINSCALE_QUERY_RETRIES",
        "FINSCALE_LOG_FILE",
        "FINSCALE_LOG",
    ];

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // Exported FINSCALE_* variables would otherwise replace the defaults.
    fn parse(extra: &[&str]) -> Args {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for name in ENV_FALLBACKS {
            std::env::remove_var(name);
        }
        let mut argv = vec!["finscale"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults_point_at_local_backend() {
        let settings = Settings::from_args(parse(&[])).unwrap();
        assert_eq!(settings.base_url, "http://localhost:8080/api/v1");
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert_eq!(settings.query_retries, 1);
        assert_eq!(settings.reference_scheme, ReferenceScheme::Timestamp);
        assert!(!settings.check);
    }

    #[test]
    fn test_trailing_slashes_are_normalized() {
        let settings =
            Settings::from_args(parse(&["--server", "http://ledger:9000/", "--api-prefix", "/api/v2/"]))
                .unwrap();
        assert_eq!(settings.base_url, "http://ledger:9000/api/v2");
    }

    #[test]
    fn test_rejects_https_and_zero_timeout() {
        let err = Settings::from_args(parse(&["--server", "https://ledger"])).unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedScheme("https://ledger".to_string()));

        let err = Settings::from_args(parse(&["--timeout-secs", "0"])).unwrap_err();
        assert_eq!(err, ConfigError::ZeroTimeout);

        let err = Settings::from_args(parse(&["--api-prefix", "api"])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidPrefix("api".to_string()));
    }

    #[test]
    fn test_every_env_fallback_is_cleared_before_parsing() {
        {
            let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
            std::env::set_var("FINSCALE_SERVER", "http://elsewhere:1");
            std::env::set_var("FINSCALE_TIMEOUT_SECS", "3");
        }
        let settings = Settings::from_args(parse(&[])).unwrap();
        assert_eq!(settings.base_url, "http://localhost:8080/api/v1");
        assert_eq!(settings.timeout, Duration::from_secs(10));

        let declared: Vec<String> = <Args as clap::CommandFactory>::command()
            .get_arguments()
            .filter_map(|arg| arg.get_env())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        for name in &declared {
            assert!(ENV_FALLBACKS.contains(&name.as_str()), "{} is not cleared", name);
        }
    }

    #[test]
    fn test_uuid_reference_scheme_is_selectable() {
        let settings = Settings::from_args(parse(&["--reference-scheme", "uuid", "--check"])).unwrap();
        assert_eq!(settings.reference_scheme, ReferenceScheme::Uuid);
        assert!(settings.check);
    }
}
