//! Configuration loading for collection and combination passes.

use serde::Deserialize;
use std::path::Path;

use crate::error::{AnalyzerError, Result};

/// File layout of a run directory and the analysis parameters.
///
/// Every field has a default matching the simulator's standard layout, so an
/// empty TOML file (or no file at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Two-sided confidence level for interval estimates.
    pub confidence_level: f64,
    /// Substring that marks a directory as holding simulator output.
    pub run_dir_marker: String,
    /// Per-run configuration document.
    pub run_config_file: String,
    /// perf counter output.
    pub perf_log: String,
    /// Simulator execution trace.
    pub trace_log: String,
    /// `date`/`free` samples.
    pub memory_log: String,
    /// Directory holding the micro-benchmark peer's logs, relative to the run directory.
    pub peer_log_dir: String,
    /// Tokens that must all appear in the peer log's file name.
    pub peer_log_tokens: Vec<String>,
    /// Configuration fields that differ between trials of the same experiment.
    pub trial_fields: Vec<String>,
    /// Key of the nested executable configuration object.
    pub exe_key: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.99,
            run_dir_marker: "shadow_".to_string(),
            run_config_file: "shadow.json".to_string(),
            perf_log: "stderr".to_string(),
            trace_log: "stdout".to_string(),
            memory_log: "free.log".to_string(),
            peer_log_dir: "shadow.data/hosts/peer".to_string(),
            peer_log_tokens: vec!["peer".to_string(), "stdout".to_string(), "benchmark".to_string()],
            trial_fields: ["args", "cmd", "label", "seed"].iter().map(|s| s.to_string()).collect(),
            exe_key: "exe".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(AnalysisConfig)` if the file was read, parsed and validated
    /// * `Err(AnalyzerError)` describing the first problem otherwise
    pub fn load(config_path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(config_path).map_err(|e| AnalyzerError::missing_input(config_path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(AnalyzerError::InvalidConfig(format!(
                "confidence-level must be strictly between 0 and 1, got {}",
                self.confidence_level
            )));
        }
        if self.run_dir_marker.is_empty() {
            return Err(AnalyzerError::InvalidConfig("run-dir-marker must not be empty".to_string()));
        }
        if self.exe_key.is_empty() {
            return Err(AnalyzerError::InvalidConfig("exe-key must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        assert_eq!(AnalysisConfig::from_toml("").unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn overrides_are_kebab_case() {
        let config = AnalysisConfig::from_toml(
            r#"
            confidence-level = 0.95
            trace-log = "shadow.log"
            trial-fields = ["seed"]
            "#,
        )
        .unwrap();
        assert_eq!(config.confidence_level, 0.95);
        assert_eq!(config.trace_log, "shadow.log");
        assert_eq!(config.trial_fields, vec!["seed"]);
        assert_eq!(config.perf_log, "stderr");
    }

    #[test]
    fn rejects_out_of_range_level() {
        assert!(matches!(
            AnalysisConfig::from_toml("confidence-level = 1.5"),
            Err(AnalyzerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(AnalysisConfig::from_toml("confidence = 0.9"), Err(AnalyzerError::Toml(_))));
    }
}
