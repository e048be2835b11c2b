use std::path::{Path, PathBuf};
use std::time::Duration;

use board_common::store::ContentSource;

use crate::error::AppError;

const DEFAULT_SOURCE: &str = "data";
const DEFAULT_ANNOUNCEMENTS_FILE: &str = "announcements.json";
const DEFAULT_CONTENT_FILE: &str = "content.json";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Application configuration loaded explicitly from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory or `http(s)://` base URL holding the JSON documents.
    pub content_source: String,
    pub announcements_file: String,
    pub content_file: String,
    pub fetch_timeout: Duration,
    /// Where `export_content` writes bundles. `None` returns them inline only.
    pub export_dir: Option<PathBuf>,
}

impl Config {
    /// Optional:
    /// - `NERO_CONTENT_SOURCE` (default: "data")
    /// - `NERO_ANNOUNCEMENTS_FILE` (default: "announcements.json")
    /// - `NERO_CONTENT_FILE` (default: "content.json")
    /// - `NERO_FETCH_TIMEOUT_SECS` (default: 10)
    /// - `NERO_EXPORT_DIR`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let content_source = lookup("NERO_CONTENT_SOURCE")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

        let fetch_timeout = match lookup("NERO_FETCH_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|&n| n > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "NERO_FETCH_TIMEOUT_SECS must be a positive integer, got '{raw}'"
                    ))
                })?,
            None => Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        };

        let config = Self {
            content_source,
            announcements_file: lookup("NERO_ANNOUNCEMENTS_FILE")
                .unwrap_or_else(|| DEFAULT_ANNOUNCEMENTS_FILE.to_string()),
            content_file: lookup("NERO_CONTENT_FILE")
                .unwrap_or_else(|| DEFAULT_CONTENT_FILE.to_string()),
            fetch_timeout,
            export_dir: lookup("NERO_EXPORT_DIR").map(PathBuf::from),
        };

        if let ContentSource::Directory(dir) = config.source() {
            if !dir.is_dir() {
                return Err(AppError::Config(format!(
                    "content directory not found: {}",
                    dir.display()
                )));
            }
        }

        Ok(config)
    }

    pub fn source(&self) -> ContentSource {
        ContentSource::parse(&self.content_source, self.fetch_timeout)
    }

    pub fn export_path(&self, file_name: &str) -> Option<PathBuf> {
        self.export_dir
            .as_deref()
            .map(|dir| Path::new(dir).join(file_name))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_to_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().display().to_string();
        let config = Config::from_lookup(lookup(&[("NERO_CONTENT_SOURCE", &path)])).unwrap();
        assert_eq!(config.announcements_file, "announcements.json");
        assert_eq!(config.content_file, "content.json");
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert!(config.export_path("x.json").is_none());
    }

    #[test]
    fn http_sources_skip_directory_check() {
        let config = Config::from_lookup(lookup(&[
            ("NERO_CONTENT_SOURCE", "https://example.com/data"),
            ("NERO_FETCH_TIMEOUT_SECS", "3"),
            ("NERO_EXPORT_DIR", "/tmp/exports"),
        ]))
        .unwrap();
        assert!(matches!(config.source(), ContentSource::Http { .. }));
        assert_eq!(config.fetch_timeout, Duration::from_secs(3));
        assert_eq!(
            config.export_path("b.json"),
            Some(PathBuf::from("/tmp/exports/b.json"))
        );
    }

    #[test]
    fn rejects_missing_directory_and_bad_timeout() {
        let err = Config::from_lookup(lookup(&[(
            "NERO_CONTENT_SOURCE",
            "/definitely/not/here",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("content directory not found"));

        let err = Config::from_lookup(lookup(&[
            ("NERO_CONTENT_SOURCE", "https://example.com"),
            ("NERO_FETCH_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("NERO_FETCH_TIMEOUT_SECS"));
    }
}
