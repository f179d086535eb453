//! Runtime configuration read from the environment (and an optional `.env`).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub db_path: PathBuf,
    pub export_dir: PathBuf,
    pub request_timeout: Duration,
    pub demo_fallback: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("ICEQ_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),
            db_path: env::var("ICEQ_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("iceq.sqlite3")),
            export_dir: env::var("ICEQ_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            request_timeout: Duration::from_secs(
                env::var("ICEQ_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            demo_fallback: env::var("ICEQ_DEMO_FALLBACK")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            api_url: "http://127.0.0.1:5000".to_string(),
            db_path: PathBuf::from(":memory:"),
            export_dir: env::temp_dir(),
            request_timeout: Duration::from_secs(5),
            demo_fallback: true,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_with_defaults() {
        let config = Config::from_env();

        assert!(!config.api_url.is_empty());
        assert!(!config.api_url.ends_with('/'));
        assert!(config.request_timeout.as_secs() > 0);
    }

    #[test]
    fn test_test_config() {
        let config = Config::test_config();

        assert_eq!(config.api_url, "http://127.0.0.1:5000");
        assert!(config.demo_fallback);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(" OFF "));
    }
}
