//! Reference clone store.
//!
//! The evaluation engine reads the benchmark through [`CloneStore`]. The
//! crate ships [`InMemoryStore`], which serves a validated
//! [`BenchmarkSnapshot`] loaded from a JSON or YAML file or built in code.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::errors::{EvalError, Result};
use crate::core::filter::EvaluationFilter;
use crate::core::model::{
    CloneType, DetectedReport, Functionality, FunctionalityId, ReferenceClone, Tool, ToolId,
};

/// Read access to the benchmark and the tools' reported clones
pub trait CloneStore: Send + Sync {
    /// Reference clones admitted by `filter`; internal clones only when `include_internal`
    fn reference_clones(
        &self,
        tool_id: ToolId,
        filter: &EvaluationFilter,
        include_internal: bool,
    ) -> Result<Vec<ReferenceClone>>;

    /// Every clone pair reported by the tool
    fn detected_reports(&self, tool_id: ToolId) -> Result<Vec<DetectedReport>>;

    /// Look up a tool
    fn tool(&self, id: ToolId) -> Result<Option<Tool>>;

    /// Look up a functionality
    fn functionality(&self, id: FunctionalityId) -> Result<Option<Functionality>>;

    /// Identifiers of every functionality, ascending
    fn functionality_ids(&self) -> Result<Vec<FunctionalityId>>;

    /// Number of clone pairs reported by the tool
    fn detected_count(&self, tool_id: ToolId) -> Result<usize> {
        Ok(self.detected_reports(tool_id)?.len())
    }

    /// Version string of the benchmark
    fn benchmark_version(&self) -> Result<String>;
}

/// Reported clones of one tool inside a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDetections {
    /// Tool the reports belong to
    pub tool_id: ToolId,
    /// Reported clone pairs
    #[serde(default)]
    pub reports: Vec<DetectedReport>,
}

/// Serializable content of a benchmark and its tool results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSnapshot {
    /// Benchmark version
    #[serde(default)]
    pub version: String,
    /// Registered tools
    #[serde(default)]
    pub tools: Vec<Tool>,
    /// Functionalities
    #[serde(default)]
    pub functionalities: Vec<Functionality>,
    /// Reference clones
    #[serde(default)]
    pub clones: Vec<ReferenceClone>,
    /// Reported clones per tool
    #[serde(default)]
    pub detections: Vec<ToolDetections>,
}

impl BenchmarkSnapshot {
    /// Check identifiers and the Type-3 similarity invariant
    pub fn validate(&self) -> Result<()> {
        let mut tool_ids = HashSet::new();
        for tool in &self.tools {
            if !tool_ids.insert(tool.id) {
                return Err(EvalError::store(format!("duplicate tool id {}", tool.id)));
            }
        }

        let mut functionality_ids = HashSet::new();
        for functionality in &self.functionalities {
            if !functionality_ids.insert(functionality.id) {
                return Err(EvalError::store(format!(
                    "duplicate functionality id {}",
                    functionality.id
                )));
            }
        }

        let mut clone_ids = HashSet::new();
        for clone in &self.clones {
            if !clone_ids.insert(clone.id) {
                return Err(EvalError::store(format!("duplicate reference clone id {}", clone.id)));
            }
            if clone.clone_type == CloneType::Type3 {
                let valid = clone.similarity.is_some_and(|s| {
                    (0.0..=100.0).contains(&s.line) && (0.0..=100.0).contains(&s.token)
                });
                if !valid {
                    return Err(EvalError::store(format!(
                        "Type-3 clone {} needs line and token similarity in [0, 100]",
                        clone.id
                    )));
                }
            }
        }

        for detections in &self.detections {
            if !tool_ids.contains(&detections.tool_id) {
                return Err(EvalError::store(format!(
                    "detections reference unknown tool {}",
                    detections.tool_id
                )));
            }
        }

        Ok(())
    }
}

/// Store serving an immutable snapshot from memory
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    version: String,
    tools: BTreeMap<ToolId, Tool>,
    functionalities: BTreeMap<FunctionalityId, Functionality>,
    clones: Vec<ReferenceClone>,
    detections: AHashMap<ToolId, Vec<DetectedReport>>,
}

impl InMemoryStore {
    /// Build a store from a validated snapshot
    pub fn from_snapshot(snapshot: BenchmarkSnapshot) -> Result<Self> {
        snapshot.validate()?;

        let mut detections: AHashMap<ToolId, Vec<DetectedReport>> = AHashMap::new();
        for entry in snapshot.detections {
            detections.entry(entry.tool_id).or_default().extend(entry.reports);
        }

        Ok(Self {
            version: snapshot.version,
            tools: snapshot.tools.into_iter().map(|t| (t.id, t)).collect(),
            functionalities: snapshot
                .functionalities
                .into_iter()
                .map(|f| (f.id, f))
                .collect(),
            clones: snapshot.clones,
            detections,
        })
    }

    /// Load a snapshot from a `.json`, `.yaml` or `.yml` file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EvalError::store_with_source(format!("Failed to read benchmark {}", path.display()), e)
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml" | "yml")
        );
        let snapshot: BenchmarkSnapshot = if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| {
                EvalError::store_with_source(format!("Failed to parse benchmark {}", path.display()), e)
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| {
                EvalError::store_with_source(format!("Failed to parse benchmark {}", path.display()), e)
            })?
        };

        let store = Self::from_snapshot(snapshot)
            .map_err(|e| e.with_context(format!("Invalid benchmark {}", path.display())))?;
        info!(
            "Loaded benchmark {} ({} reference clones, {} tools)",
            path.display(),
            store.clones.len(),
            store.tools.len()
        );
        Ok(store)
    }
}

impl CloneStore for InMemoryStore {
    fn reference_clones(
        &self,
        tool_id: ToolId,
        filter: &EvaluationFilter,
        include_internal: bool,
    ) -> Result<Vec<ReferenceClone>> {
        let selected: Vec<ReferenceClone> = self
            .clones
            .iter()
            .filter(|clone| include_internal || !clone.internal)
            .filter(|clone| filter.admits(clone))
            .cloned()
            .collect();
        debug!(
            "Selected {} of {} reference clones for tool {}",
            selected.len(),
            self.clones.len(),
            tool_id
        );
        Ok(selected)
    }

    fn detected_reports(&self, tool_id: ToolId) -> Result<Vec<DetectedReport>> {
        Ok(self.detections.get(&tool_id).cloned().unwrap_or_default())
    }

    fn tool(&self, id: ToolId) -> Result<Option<Tool>> {
        Ok(self.tools.get(&id).cloned())
    }

    fn functionality(&self, id: FunctionalityId) -> Result<Option<Functionality>> {
        Ok(self.functionalities.get(&id).cloned())
    }

    fn functionality_ids(&self) -> Result<Vec<FunctionalityId>> {
        Ok(self.functionalities.keys().copied().collect())
    }

    fn detected_count(&self, tool_id: ToolId) -> Result<usize> {
        Ok(self.detections.get(&tool_id).map_or(0, Vec::len))
    }

    fn benchmark_version(&self) -> Result<String> {
        Ok(self.version.clone())
    }
}
