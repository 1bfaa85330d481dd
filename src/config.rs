//! Corpus configuration loaded from YAML.
//!
//! Every field has a default, so a `corpus.yaml` only needs the values it
//! wants to change:
//!
//! ```yaml
//! corpus_name: "Example Corpus"
//! blog_delay_ms: 5000
//! ```

use crate::error::{CorpusError, CorpusResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Name of the configuration file looked up at the corpus root.
pub const DEFAULT_CONFIG_FILE: &str = "corpus.yaml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub corpus_name: String,
    pub description: String,
    pub source_bibliography: String,
    /// Number of entries in the bibliography the corpus is built from.
    pub bibliography_size: usize,
    pub manifest_file: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub download_timeout_secs: u64,
    pub book_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub eric_delay_ms: u64,
    pub archive_delay_ms: u64,
    pub blog_delay_ms: u64,
    pub probe_delay_ms: u64,
    pub eric_base_url: String,
    pub archive_base_url: String,
    pub blog_base_url: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            corpus_name: "Dr. Carlos Cortés Academic Corpus".into(),
            description: "Corpus for RAG - Multicultural education, diversity, ethnic studies"
                .into(),
            source_bibliography: "https://github.com/alexandriasworld1234-source/carlosecortes/blob/main/Dr_Carlos_Cortes_Annotated_Bibliography_APA7.txt".into(),
            bibliography_size: 63,
            manifest_file: "manifest.json".into(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".into(),
            request_timeout_secs: 30,
            download_timeout_secs: 60,
            book_timeout_secs: 120,
            probe_timeout_secs: 10,
            eric_delay_ms: 1000,
            archive_delay_ms: 1000,
            blog_delay_ms: 2000,
            probe_delay_ms: 1000,
            eric_base_url: "https://files.eric.ed.gov/fulltext/".into(),
            archive_base_url: "https://archive.org/".into(),
            blog_base_url: "https://americandiversityreport.com/".into(),
        }
    }
}

impl CorpusConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn book_timeout(&self) -> Duration {
        Duration::from_secs(self.book_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Parse a configuration document.
    pub fn from_yaml(yaml: &str) -> CorpusResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Resolve the configuration for a run.
    ///
    /// An explicit path must exist. Without one, `<root>/corpus.yaml` is used
    /// when present, otherwise the built-in defaults.
    #[instrument(level = "info", skip_all)]
    pub fn load(explicit: Option<&Path>, root: &Path) -> CorpusResult<Self> {
        let path = match explicit {
            Some(p) => {
                if !p.is_file() {
                    return Err(CorpusError::Config(format!(
                        "config file {} does not exist",
                        p.display()
                    )));
                }
                p.to_path_buf()
            }
            None => {
                let implicit = root.join(DEFAULT_CONFIG_FILE);
                if !implicit.is_file() {
                    debug!(path = %implicit.display(), "No config file; using defaults");
                    return Ok(Self::default());
                }
                implicit
            }
        };

        let yaml = std::fs::read_to_string(&path)?;
        let config = Self::from_yaml(&yaml)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = CorpusConfig::from_yaml("corpus_name: Test Corpus\nblog_delay_ms: 10\n").unwrap();
        assert_eq!(config.corpus_name, "Test Corpus");
        assert_eq!(config.blog_delay_ms, 10);
        assert_eq!(config.bibliography_size, 63);
        assert_eq!(config.manifest_file, "manifest.json");
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let temp = tempdir().unwrap();
        let config = CorpusConfig::load(None, temp.path()).unwrap();
        assert_eq!(config, CorpusConfig::default());
    }

    #[test]
    fn test_load_picks_up_root_config() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join(DEFAULT_CONFIG_FILE), "manifest_file: corpus.json\n")
            .unwrap();
        let config = CorpusConfig::load(None, temp.path()).unwrap();
        assert_eq!(config.manifest_file, "corpus.json");
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("nope.yaml");
        assert!(matches!(
            CorpusConfig::load(Some(&missing), temp.path()),
            Err(CorpusError::Config(_))
        ));
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        assert!(CorpusConfig::from_yaml("request_timeout_secs: [1, 2").is_err());
    }
}
