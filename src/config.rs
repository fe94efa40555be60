//! Process settings.
//!
//! Settings are read once at startup from the environment, optionally seeded
//! from a dotenv file, and then passed by reference to whatever needs them.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::PipelineError;
use crate::nats::NatsConfig;

/// Log verbosity accepted in `APP_LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Critical,
    Error,
    Warning,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Critical | LogLevel::Error => "error",
            LogLevel::Warning => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => Ok(LogLevel::Critical),
            "ERROR" => Ok(LogLevel::Error),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "TRACE" => Ok(LogLevel::Trace),
            _ => Err(PipelineError::Config(format!("unknown APP_LOG_LEVEL '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub log_level: LogLevel,
    pub nats_url: String,
    /// JetStream stream the completion event is stored in
    pub nats_stream: String,
    /// Durable consumer bound to `nats_subject`
    pub nats_consumer: String,
    /// Subject the completion event is published on, also used as its type
    pub nats_subject: String,
    pub games_raw_dir: PathBuf,
    pub games_flatten_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            nats_url: "nats://localhost:4222".to_string(),
            nats_stream: "CS2_EVENTS".to_string(),
            nats_consumer: "cs2_events_queue".to_string(),
            nats_subject: "all_games_parsed".to_string(),
            games_raw_dir: PathBuf::from("../bil-cs2-data/games_raw"),
            games_flatten_dir: PathBuf::from("../bil-cs2-data/games_flatten"),
        }
    }
}

impl Settings {
    /// Load settings from `env_file` (when it exists) and the environment.
    ///
    /// Variables already set in the environment take precedence over the file.
    pub fn load(env_file: &Path) -> Result<Self, PipelineError> {
        if env_file.exists() {
            dotenv::from_path(env_file).map_err(|e| {
                PipelineError::Config(format!("failed to read {}: {}", env_file.display(), e))
            })?;
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);
        let path = |key: &str, default: PathBuf| lookup(key).map(PathBuf::from).unwrap_or(default);

        let log_level = match lookup("APP_LOG_LEVEL") {
            Some(level) => level.parse()?,
            None => defaults.log_level,
        };

        Ok(Self {
            log_level,
            nats_url: string("NATS_URL", defaults.nats_url),
            nats_stream: string("NATS_STREAM", defaults.nats_stream),
            nats_consumer: string("NATS_CONSUMER", defaults.nats_consumer),
            nats_subject: string("NATS_SUBJECT", defaults.nats_subject),
            games_raw_dir: path("GAMES_RAW_DIR", defaults.games_raw_dir),
            games_flatten_dir: path("GAMES_FLATTEN_DIR", defaults.games_flatten_dir),
        })
    }

    pub fn nats_config(&self) -> NatsConfig {
        NatsConfig {
            url: self.nats_url.clone(),
            stream_name: self.nats_stream.clone(),
            consumer_name: self.nats_consumer.clone(),
            subject: self.nats_subject.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.nats_subject, "all_games_parsed");
        assert_eq!(settings.log_level, LogLevel::Info);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("APP_LOG_LEVEL", "debug"),
            ("NATS_URL", "nats://broker:4222"),
            ("NATS_SUBJECT", "games_ready"),
            ("GAMES_RAW_DIR", "/data/raw"),
        ]))
        .unwrap();

        assert_eq!(settings.log_level, LogLevel::Debug);
        assert_eq!(settings.nats_url, "nats://broker:4222");
        assert_eq!(settings.nats_subject, "games_ready");
        assert_eq!(settings.games_raw_dir, PathBuf::from("/data/raw"));
        assert_eq!(settings.games_flatten_dir, Settings::default().games_flatten_dir);
    }

    #[test]
    fn test_invalid_log_level() {
        let err = Settings::from_lookup(lookup_from(&[("APP_LOG_LEVEL", "LOUD")])).unwrap_err();

        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_log_level_filters() {
        assert_eq!("CRITICAL".parse::<LogLevel>().unwrap().as_filter(), "error");
        assert_eq!("WARNING".parse::<LogLevel>().unwrap().as_filter(), "warn");
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warning);
    }

    #[test]
    fn test_nats_config_from_settings() {
        let config = Settings::default().nats_config();

        assert_eq!(config.stream_name, "CS2_EVENTS");
        assert_eq!(config.consumer_name, "cs2_events_queue");
        assert_eq!(config.subject, "all_games_parsed");
    }

    #[test]
    fn test_load_reads_env_file() {
        let tmp = tempfile::tempdir().unwrap();
        let env_file = tmp.path().join(".env");
        std::fs::write(&env_file, "GAMES_RAW_DIR=/from/env/file\n").unwrap();
        // A variable already exported wins over the file
        let expected = std::env::var("GAMES_RAW_DIR").unwrap_or_else(|_| "/from/env/file".to_string());

        let settings = Settings::load(&env_file).unwrap();

        assert_eq!(settings.games_raw_dir, PathBuf::from(expected));
    }

    #[test]
    fn test_load_missing_env_file_uses_environment() {
        let tmp = tempfile::tempdir().unwrap();

        let settings = Settings::load(&tmp.path().join(".env"));

        assert!(settings.is_ok());
    }
}
