//! Runtime settings and the configured list of news sources.
//!
//! Settings come from an optional YAML file. Every key has a built-in
//! default, so an empty file (or no file at all) yields the stock setup: the
//! eight registered providers, all enabled.
//!
//! ```yaml
//! http:
//!   timeout_secs: 15
//! dates:
//!   fallback_days: 7      # null leaves unreadable dates undated
//! session:
//!   concurrency: 4
//! sources:
//!   - name: NPR
//!     search_url: "https://www.npr.org/search?query={query}"
//!   - name: Example Wire
//!     search_url: "https://wire.example.com/find?q={query}"
//!     generic_cap: 20
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::error::ConfigError;
use crate::models::SourceDescriptor;
use crate::scrapers::GenericLimits;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/98.0.4758.102 Safari/537.36";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub http: HttpSettings,
    pub extraction: ExtractionSettings,
    pub dates: DateSettings,
    pub session: SessionSettings,
    pub content: ContentSettings,
    pub sources: Vec<SourceDescriptor>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http: HttpSettings::default(),
            extraction: ExtractionSettings::default(),
            dates: DateSettings::default(),
            session: SessionSettings::default(),
            content: ContentSettings::default(),
            sources: default_sources(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Timeout for each search page request.
    pub timeout_secs: u64,
    /// Timeout for article content requests.
    pub content_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            content_timeout_secs: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn content_timeout(&self) -> Duration {
        Duration::from_secs(self.content_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub generic_scan_limit: usize,
    pub generic_cap: usize,
    pub generic_staleness_days: i64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        let limits = GenericLimits::default();
        Self {
            generic_scan_limit: limits.scan_limit,
            generic_cap: limits.max_candidates,
            generic_staleness_days: limits.staleness_days,
        }
    }
}

impl ExtractionSettings {
    /// Generic limits for `source`, honoring its own cap when it has one.
    pub fn limits_for(&self, source: &SourceDescriptor) -> GenericLimits {
        GenericLimits {
            scan_limit: self.generic_scan_limit,
            max_candidates: source.generic_cap.unwrap_or(self.generic_cap),
            staleness_days: self.generic_staleness_days,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DateSettings {
    /// Age assumed for date text that cannot be read. `None` leaves the
    /// candidate undated.
    pub fallback_days: Option<i64>,
}

impl Default for DateSettings {
    fn default() -> Self {
        Self {
            fallback_days: Some(1),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Sources fetched at the same time. 1 fetches them one after another.
    pub concurrency: usize,
    /// Stop waiting on sources after this many seconds.
    pub deadline_secs: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            concurrency: 1,
            deadline_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    pub max_chars: usize,
    pub wrap_width: usize,
    pub min_paragraph_len: usize,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            max_chars: 1000,
            wrap_width: 80,
            min_paragraph_len: 20,
        }
    }
}

/// The stock provider list.
pub fn default_sources() -> Vec<SourceDescriptor> {
    [
        ("AP News", "https://apnews.com/search?q={query}"),
        ("Reuters", "https://www.reuters.com/search/news?blob={query}"),
        ("BBC", "https://www.bbc.co.uk/search?q={query}"),
        ("NPR", "https://www.npr.org/search?query={query}"),
        ("The Guardian", "https://www.theguardian.com/search?q={query}"),
        ("Al Jazeera", "https://www.aljazeera.com/search/{query}"),
        ("CNN", "https://www.cnn.com/search?q={query}"),
        ("The New York Times", "https://www.nytimes.com/search?query={query}"),
    ]
    .into_iter()
    .map(|(name, url)| SourceDescriptor::new(name, url))
    .collect()
}

impl Settings {
    /// Parse settings from YAML text and validate the source list.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not a map.
        let settings: Settings = if text.trim().is_empty() {
            Settings::default()
        } else {
            serde_yaml::from_str(text)?
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Load from `path`, or return the defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            debug!("No config file given; using defaults");
            return Ok(Settings::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        let settings = Self::from_yaml(&text)?;
        info!(
            sources = settings.sources.len(),
            enabled = settings.enabled_sources().len(),
            "Loaded configuration"
        );
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(ConfigError::EmptySourceName);
            }
            if !names.insert(source.name.as_str()) {
                return Err(ConfigError::DuplicateSource(source.name.clone()));
            }
        }
        Ok(())
    }

    pub fn enabled_sources(&self) -> Vec<SourceDescriptor> {
        self.sources.iter().filter(|s| s.enabled).cloned().collect()
    }

    /// Enabled sources restricted to `names` (case-insensitive). An empty
    /// `names` means all enabled sources.
    pub fn select_sources(&self, names: &[String]) -> Vec<SourceDescriptor> {
        self.enabled_sources()
            .into_iter()
            .filter(|s| names.is_empty() || names.iter().any(|n| n.eq_ignore_ascii_case(&s.name)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_yaml("").unwrap();
        assert_eq!(settings.sources.len(), 8);
        assert_eq!(settings.http.timeout_secs, 15);
        assert_eq!(settings.dates.fallback_days, Some(1));
        assert_eq!(settings.session.concurrency, 1);
        assert_eq!(settings.content.max_chars, 1000);
        for source in &settings.sources {
            assert!(crate::scrapers::adapter_for(&source.name).is_some(), "{}", source.name);
        }
    }

    #[test]
    fn test_partial_file_keeps_default_sources() {
        let settings = Settings::from_yaml("http:\n  timeout_secs: 10\n").unwrap();
        assert_eq!(settings.http.timeout_secs, 10);
        assert_eq!(settings.http.content_timeout_secs, 15);
        assert_eq!(settings.sources.len(), 8);
    }

    #[test]
    fn test_null_fallback_days() {
        let settings = Settings::from_yaml("dates:\n  fallback_days: null\n").unwrap();
        assert_eq!(settings.dates.fallback_days, None);
    }

    #[test]
    fn test_custom_sources() {
        let yaml = r#"
sources:
  - name: NPR
    search_url: "https://www.npr.org/search?query={query}"
  - name: Example Wire
    search_url: "https://wire.example.com/find?q={query}"
    enabled: false
    generic_cap: 20
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.sources.len(), 2);
        assert_eq!(settings.enabled_sources().len(), 1);

        let wire = &settings.sources[1];
        assert_eq!(settings.extraction.limits_for(wire).max_candidates, 20);
        assert_eq!(settings.extraction.limits_for(&settings.sources[0]).max_candidates, 5);
    }

    #[test]
    fn test_duplicate_sources_rejected() {
        let yaml = r#"
sources:
  - name: NPR
    search_url: "a"
  - name: NPR
    search_url: "b"
"#;
        assert!(matches!(
            Settings::from_yaml(yaml),
            Err(ConfigError::DuplicateSource(name)) if name == "NPR"
        ));
    }

    #[test]
    fn test_select_sources() {
        let settings = Settings::from_yaml("").unwrap();
        assert_eq!(settings.select_sources(&[]).len(), 8);
        let picked = settings.select_sources(&["bbc".to_string(), "npr".to_string()]);
        let names: Vec<_> = picked.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["BBC", "NPR"]);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Settings::load(Some("/nonexistent/news_search.yaml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
