//! Runtime configuration.
//!
//! Values come from CLI flags or `GRIDWATCH_*` environment variables
//! first, then from the JSON config file, then from defaults:
//!
//! ```json
//! { "BOT_TOKEN": "123:abc", "PROBE_URL": "http://localhost:8080", "SUBSCRIBERS_FILE": "chat_ids.json" }
//! ```

use std::path::PathBuf;

use serde::Deserialize;

use crate::cli::ConfigArgs;
use crate::error::ConfigError;
use crate::ports::FileSystem;

/// Probe base address used when none is configured.
pub const DEFAULT_PROBE_URL: &str = "http://localhost:8080";

/// Subscriber file used when none is configured.
pub const DEFAULT_SUBSCRIBERS_FILE: &str = "chat_ids.json";

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Bot access token; only `run` needs it.
    pub token: Option<String>,
    /// Base address of the power endpoint.
    pub probe_url: String,
    /// Where subscribers are persisted.
    pub subscribers_path: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(rename = "BOT_TOKEN")]
    bot_token: Option<String>,
    #[serde(rename = "PROBE_URL")]
    probe_url: Option<String>,
    #[serde(rename = "SUBSCRIBERS_FILE")]
    subscribers_file: Option<PathBuf>,
}

impl Config {
    /// Merges CLI/env arguments over the config file and defaults.
    ///
    /// A missing config file is fine; an unreadable or malformed one is not.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be parsed or the probe
    /// URL is not http(s).
    pub fn resolve(args: &ConfigArgs, fs: &dyn FileSystem) -> Result<Self, ConfigError> {
        let file = if fs.exists(&args.config_file) {
            let raw = fs
                .read_to_string(&args.config_file)
                .map_err(|source| ConfigError::Read { path: args.config_file.clone(), source })?;
            serde_json::from_str(&raw)
                .map_err(|source| ConfigError::Parse { path: args.config_file.clone(), source })?
        } else {
            FileConfig::default()
        };

        let probe_url = args
            .probe_url
            .clone()
            .or(file.probe_url)
            .unwrap_or_else(|| DEFAULT_PROBE_URL.to_string());
        if !(probe_url.starts_with("http://") || probe_url.starts_with("https://")) {
            return Err(ConfigError::InvalidProbeUrl(probe_url));
        }

        Ok(Self {
            token: args.token.clone().or(file.bot_token).filter(|t| !t.trim().is_empty()),
            probe_url,
            subscribers_path: args
                .subscribers
                .clone()
                .or(file.subscribers_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SUBSCRIBERS_FILE)),
        })
    }

    /// The bot token.
    ///
    /// # Errors
    ///
    /// Returns an error if no source supplied one.
    pub fn token(&self) -> Result<&str, ConfigError> {
        self.token.as_deref().ok_or(ConfigError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::scripted::MemoryFileSystem;
    use std::path::Path;

    fn args() -> ConfigArgs {
        ConfigArgs {
            config_file: PathBuf::from("/etc/gridwatch/config.json"),
            token: None,
            probe_url: None,
            subscribers: None,
        }
    }

    #[test]
    fn defaults_without_file() {
        let config = Config::resolve(&args(), &MemoryFileSystem::new()).unwrap();
        assert_eq!(config.probe_url, DEFAULT_PROBE_URL);
        assert_eq!(config.subscribers_path, Path::new(DEFAULT_SUBSCRIBERS_FILE));
        assert!(matches!(config.token(), Err(ConfigError::MissingToken)));
    }

    #[test]
    fn file_values_fill_gaps() {
        let fs = MemoryFileSystem::new().with_file(
            "/etc/gridwatch/config.json",
            r#"{"BOT_TOKEN": "123:abc", "PROBE_URL": "http://phone:8080"}"#,
        );
        let config = Config::resolve(&args(), &fs).unwrap();
        assert_eq!(config.token().unwrap(), "123:abc");
        assert_eq!(config.probe_url, "http://phone:8080");
    }

    #[test]
    fn flags_override_file() {
        let fs = MemoryFileSystem::new().with_file(
            "/etc/gridwatch/config.json",
            r#"{"BOT_TOKEN": "from-file", "SUBSCRIBERS_FILE": "/var/lib/ids.json"}"#,
        );
        let mut args = args();
        args.token = Some("from-flag".into());
        args.subscribers = Some(PathBuf::from("/tmp/ids.json"));
        let config = Config::resolve(&args, &fs).unwrap();
        assert_eq!(config.token().unwrap(), "from-flag");
        assert_eq!(config.subscribers_path, Path::new("/tmp/ids.json"));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let mut args = args();
        args.token = Some("  ".into());
        let config = Config::resolve(&args, &MemoryFileSystem::new()).unwrap();
        assert!(config.token.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let fs = MemoryFileSystem::new().with_file("/etc/gridwatch/config.json", "BOT_TOKEN=1");
        assert!(matches!(Config::resolve(&args(), &fs), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn non_http_probe_url_is_rejected() {
        let mut args = args();
        args.probe_url = Some("localhost:8080".into());
        assert!(matches!(
            Config::resolve(&args, &MemoryFileSystem::new()),
            Err(ConfigError::InvalidProbeUrl(_))
        ));
    }
}
