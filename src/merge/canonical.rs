//! Canonical experiment shapes: run configurations with the trial-variant fields removed.

use std::fmt;

use crate::config::AnalysisConfig;
use crate::record::{RESULTS_KEY, RunConfig};

/// Which configuration fields vary between trials of the same experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRules {
    /// Removed at the top level and inside the executable sub-object.
    pub trial_fields: Vec<String>,
    /// Key of the nested executable configuration object.
    pub exe_key: String,
}

impl Default for ShapeRules {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}

impl From<&AnalysisConfig> for ShapeRules {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            trial_fields: config.trial_fields.clone(),
            exe_key: config.exe_key.clone(),
        }
    }
}

/// A run configuration reduced to the fields that identify the experiment.
///
/// Two runs belong to the same experiment exactly when their shapes are equal.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalShape {
    config: RunConfig,
}

impl CanonicalShape {
    pub fn of(config: &RunConfig, rules: &ShapeRules) -> Self {
        let mut config = config.clone();
        config.remove(RESULTS_KEY);
        for field in &rules.trial_fields {
            config.remove(field);
        }
        if let Some(serde_json::Value::Object(exe)) = config.get_mut(&rules.exe_key) {
            for field in &rules.trial_fields {
                exe.remove(field);
            }
        }
        Self { config }
    }

    /// Whether `config` describes this experiment.
    pub fn matches(&self, config: &RunConfig, rules: &ShapeRules) -> bool {
        Self::of(config, rules) == *self
    }

    pub fn into_config(self) -> RunConfig {
        self.config
    }
}

impl fmt::Display for CanonicalShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", serde_json::Value::Object(self.config.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: serde_json::Value) -> RunConfig {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn removes_trial_fields_at_both_levels() {
        let run = config(json!({
            "seed": 3,
            "label": "trial-3",
            "num_workers": 14,
            "exe": {"args": ["-n", "4"], "cmd": "tgen", "quantity": 1000, "seed": 3},
        }));
        let shape = CanonicalShape::of(&run, &ShapeRules::default());
        assert_eq!(
            serde_json::Value::Object(shape.into_config()),
            json!({"num_workers": 14, "exe": {"quantity": 1000}})
        );
    }

    #[test]
    fn trials_of_one_experiment_match() {
        let rules = ShapeRules::default();
        let first = config(json!({"seed": 1, "num_workers": 14, "exe": {"quantity": 1000, "seed": 1}}));
        let second = config(json!({"seed": 2, "num_workers": 14, "exe": {"quantity": 1000, "seed": 2}}));
        let other = config(json!({"seed": 1, "num_workers": 28, "exe": {"quantity": 1000, "seed": 1}}));

        let shape = CanonicalShape::of(&first, &rules);
        assert!(shape.matches(&second, &rules));
        assert!(!shape.matches(&other, &rules));
    }

    #[test]
    fn missing_keys_and_non_object_exe_are_tolerated() {
        let rules = ShapeRules::default();
        let shape = CanonicalShape::of(&config(json!({"exe": "tgen", "mode": "ptrace"})), &rules);
        assert!(shape.matches(&config(json!({"exe": "tgen", "mode": "ptrace", "seed": 9})), &rules));
        assert!(!shape.matches(&config(json!({"mode": "ptrace"})), &rules));
    }

    #[test]
    fn display_renders_sorted_json() {
        let shape = CanonicalShape::of(&config(json!({"b": 1, "a": "x"})), &ShapeRules::default());
        assert_eq!(shape.to_string(), r#"{"a":"x","b":1}"#);
    }
}
