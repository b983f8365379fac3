//! Configuration for an evaluation run.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! command-line flags. Only the first two live here; the CLI applies its
//! overrides on top of a loaded [`EvaluationConfig`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::errors::{EvalError, Result};
use crate::core::filter::EvaluationFilter;
use crate::core::model::{FunctionalityId, SimilarityType};

/// Matcher used when none is configured
pub const DEFAULT_MATCHER: &str = "CoverageMatcher 0.7";

/// Width of the fixed similarity regions printed in reports
pub const REGION_WIDTH: u32 = 5;

/// Settings for evaluating one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Clone selection bounds
    #[serde(default)]
    pub filter: EvaluationFilter,

    /// Similarity measure used by Type-3 band queries
    #[serde(default)]
    pub similarity_type: SimilarityType,

    /// Lowest Type-3 similarity printed in reports
    #[serde(default)]
    pub min_similarity: u32,

    /// Matcher specification, `<strategy> <config...>`
    #[serde(default = "default_matcher")]
    pub matcher: String,

    /// Count clones outside the benchmark's tagged set
    #[serde(default)]
    pub include_internal: bool,

    /// Functionalities to break down; every functionality when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functionalities: Option<Vec<FunctionalityId>>,
}

fn default_matcher() -> String {
    DEFAULT_MATCHER.to_string()
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            filter: EvaluationFilter::default(),
            similarity_type: SimilarityType::default(),
            min_similarity: 0,
            matcher: default_matcher(),
            include_internal: false,
            functionalities: None,
        }
    }
}

impl EvaluationConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            EvalError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            EvalError::io(
                format!("Failed to write config file: {}", path.display()),
                e,
            )
        })
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        self.filter.validate()?;

        if self.min_similarity > 100 - REGION_WIDTH || self.min_similarity % REGION_WIDTH != 0 {
            return Err(EvalError::validation_field(
                format!(
                    "min_similarity must be a multiple of {REGION_WIDTH} in [0, {}], got {}",
                    100 - REGION_WIDTH,
                    self.min_similarity
                ),
                "min_similarity",
            ));
        }

        if self.matcher.trim().is_empty() {
            return Err(EvalError::validation_field(
                "matcher specification is empty",
                "matcher",
            ));
        }

        Ok(())
    }
}
