//! Recall evaluation engine.
//!
//! [`RecallEvaluator`] takes one consistent snapshot of the in-scope reference
//! clones and the tool's reports at construction, then answers any number of
//! [`Dimension`] queries against it. Matcher decisions do not depend on the
//! dimension, so each clone is decided at most once per evaluator and the
//! result is shared by every query that touches it.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::core::config::EvaluationConfig;
use crate::core::errors::{EvalError, Result, ResultExt};
use crate::core::filter::EvaluationFilter;
use crate::core::model::{CloneId, MatchResult, ReferenceClone, SimilarityType, Tool, ToolId};
use crate::io::store::CloneStore;
use crate::matchers::{CloneMatcher, ToolReports};

pub mod dimension;
pub mod tally;

pub use dimension::{Dimension, SimilarityBand};
pub use tally::{Recall, Tally};

/// Clone selection settings of an evaluator
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSettings {
    /// Tool under evaluation
    pub tool_id: ToolId,
    /// Similarity measure used by band queries
    pub similarity_type: SimilarityType,
    /// Clone selection bounds
    pub filter: EvaluationFilter,
    /// Count clones outside the benchmark's tagged set
    pub include_internal: bool,
}

impl EvaluationSettings {
    /// Settings for `tool_id` with default selection
    pub fn new(tool_id: ToolId) -> Self {
        Self {
            tool_id,
            similarity_type: SimilarityType::default(),
            filter: EvaluationFilter::default(),
            include_internal: false,
        }
    }

    /// Settings for `tool_id` taken from a run configuration
    pub fn from_config(tool_id: ToolId, config: &EvaluationConfig) -> Self {
        Self {
            tool_id,
            similarity_type: config.similarity_type,
            filter: config.filter.clone(),
            include_internal: config.include_internal,
        }
    }

    /// Use a different similarity measure
    pub fn with_similarity_type(mut self, similarity_type: SimilarityType) -> Self {
        self.similarity_type = similarity_type;
        self
    }

    /// Use different selection bounds
    pub fn with_filter(mut self, filter: EvaluationFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Include or exclude internal clones
    pub fn with_internal(mut self, include_internal: bool) -> Self {
        self.include_internal = include_internal;
        self
    }
}

/// Computes detected/total counts and recall for dimension queries
pub struct RecallEvaluator {
    settings: EvaluationSettings,
    tool: Tool,
    matcher: Arc<dyn CloneMatcher>,
    clones: Vec<ReferenceClone>,
    reports: ToolReports,
    decisions: DashMap<CloneId, Arc<OnceCell<MatchResult>>>,
}

impl RecallEvaluator {
    /// Load the tool's snapshot from `store`.
    ///
    /// Fails with [`EvalError::UnknownTool`] if the tool is not registered, with
    /// [`EvalError::Configuration`] if the matcher is bound to another tool, and
    /// propagates any store error; no partially loaded evaluator is returned.
    pub fn new(
        store: &dyn CloneStore,
        settings: EvaluationSettings,
        matcher: Arc<dyn CloneMatcher>,
    ) -> Result<Self> {
        settings.filter.validate()?;

        let tool_id = settings.tool_id;
        let tool = store
            .tool(tool_id)
            .context("Looking up tool")?
            .ok_or(EvalError::UnknownTool { id: tool_id })?;

        if let Some(bound) = matcher.tool_id().filter(|&bound| bound != tool_id) {
            return Err(EvalError::configuration(
                matcher.name(),
                format!("matcher was loaded for tool {bound}, not for evaluated tool {tool_id}"),
                matcher.describe(),
            ));
        }

        let loaded = store
            .reference_clones(tool_id, &settings.filter, settings.include_internal)
            .context("Loading reference clones")?;
        let loaded_count = loaded.len();
        let clones: Vec<ReferenceClone> = loaded
            .into_iter()
            .filter(|clone| settings.include_internal || !clone.internal)
            .filter(|clone| settings.filter.admits(clone))
            .collect();
        if clones.len() != loaded_count {
            debug!(
                "Dropped {} clones returned by the store outside the evaluation filter",
                loaded_count - clones.len()
            );
        }

        let reports = store
            .detected_reports(tool_id)
            .context("Loading detected clones")?;
        let reports = ToolReports::new(tool_id, reports);

        info!(
            "Evaluating tool {} ({}): {} reference clones in scope, {} reported clones, matcher {}",
            tool.id,
            tool.name,
            clones.len(),
            reports.len(),
            matcher.name()
        );

        Ok(Self {
            settings,
            tool,
            matcher,
            clones,
            reports,
            decisions: DashMap::new(),
        })
    }

    /// Tool under evaluation
    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    /// Selection settings
    pub fn settings(&self) -> &EvaluationSettings {
        &self.settings
    }

    /// Clone selection bounds
    pub fn filter(&self) -> &EvaluationFilter {
        &self.settings.filter
    }

    /// Similarity measure used by band queries
    pub fn similarity_type(&self) -> SimilarityType {
        self.settings.similarity_type
    }

    /// Matcher deciding detections
    pub fn matcher(&self) -> &dyn CloneMatcher {
        self.matcher.as_ref()
    }

    /// In-scope reference clones
    pub fn clones(&self) -> &[ReferenceClone] {
        &self.clones
    }

    /// Detected and total counts of the clones selected by `dimension`
    pub fn count(&self, dimension: &Dimension) -> Tally {
        let similarity_type = self.settings.similarity_type;
        self.clones
            .iter()
            .filter(|clone| dimension.matches(clone, similarity_type))
            .fold(Tally::default(), |mut tally, clone| {
                tally.total += 1;
                if self.decide(clone).detected {
                    tally.detected += 1;
                }
                tally
            })
    }

    /// Recall of the clones selected by `dimension`
    pub fn recall(&self, dimension: &Dimension) -> Recall {
        self.count(dimension).recall()
    }

    /// Count several dimensions in parallel, preserving order
    pub fn count_all(&self, dimensions: &[Dimension]) -> Vec<Tally> {
        dimensions.par_iter().map(|d| self.count(d)).collect()
    }

    /// Memoized decision for an in-scope clone
    pub fn decision(&self, clone_id: CloneId) -> Option<MatchResult> {
        self.clones
            .iter()
            .find(|clone| clone.id == clone_id)
            .map(|clone| self.decide(clone))
    }

    /// Decide every in-scope clone up front, in parallel
    pub fn warm(&self) {
        self.clones.par_iter().for_each(|clone| {
            self.decide(clone);
        });
        debug!("Decided {} reference clones", self.decisions.len());
    }

    fn decide(&self, clone: &ReferenceClone) -> MatchResult {
        let cell = self
            .decisions
            .entry(clone.id)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .value()
            .clone();

        *cell.get_or_init(|| {
            let result = self.matcher.decide(&self.reports, clone);
            trace!("Clone {} detected: {}", clone.id, result.detected);
            result
        })
    }
}

impl std::fmt::Debug for RecallEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecallEvaluator")
            .field("settings", &self.settings)
            .field("tool", &self.tool)
            .field("matcher", &self.matcher)
            .field("clones", &self.clones.len())
            .field("reports", &self.reports.len())
            .field("decided", &self.decisions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{CloneType, DetectedReport, Fragment, FragmentSize, Locality};
    use crate::io::store::{BenchmarkSnapshot, InMemoryStore, ToolDetections};
    use crate::matchers::CoverageMatcher;

    fn type1(id: i64, file: &str) -> ReferenceClone {
        ReferenceClone {
            id,
            clone_type: CloneType::Type1,
            similarity: None,
            first: Fragment::new(format!("{file}_a.java"), 1, 10),
            second: Fragment::new(format!("{file}_b.java"), 1, 10),
            first_size: FragmentSize::default(),
            second_size: FragmentSize::default(),
            judges: 1,
            confidence: 1,
            locality: Locality::Intra,
            functionality: Some(2),
            internal: false,
        }
    }

    fn store(clones: Vec<ReferenceClone>, reports: Vec<DetectedReport>) -> InMemoryStore {
        InMemoryStore::from_snapshot(BenchmarkSnapshot {
            version: "t".to_string(),
            tools: vec![Tool {
                id: 1,
                name: "tool".to_string(),
                description: String::new(),
            }],
            functionalities: Vec::new(),
            clones,
            detections: vec![ToolDetections { tool_id: 1, reports }],
        })
        .unwrap()
    }

    fn coverage() -> Arc<dyn CloneMatcher> {
        Arc::new(CoverageMatcher::from_config(1, "0.7").unwrap())
    }

    #[test]
    fn test_unknown_tool() {
        let store = store(Vec::new(), Vec::new());
        let err = RecallEvaluator::new(&store, EvaluationSettings::new(9), coverage()).unwrap_err();
        assert!(matches!(err, EvalError::UnknownTool { id: 9 }));
    }

    #[test]
    fn test_matcher_bound_to_other_tool_is_rejected() {
        let store = store(vec![type1(1, "x")], Vec::new());
        let other = Arc::new(CoverageMatcher::from_config(2, "0.7").unwrap());
        let err = RecallEvaluator::new(&store, EvaluationSettings::new(1), other).unwrap_err();
        assert!(matches!(err, EvalError::Configuration { ref strategy, .. } if strategy == "CoverageMatcher"));
    }

    #[test]
    fn test_coverage_end_to_end() {
        let store = store(
            vec![type1(1, "x"), type1(2, "y")],
            vec![DetectedReport::new(
                Fragment::new("x_a.java", 1, 10),
                Fragment::new("x_b.java", 1, 10),
            )],
        );
        let evaluator = RecallEvaluator::new(&store, EvaluationSettings::new(1), coverage()).unwrap();

        let tally = evaluator.count(&Dimension::of_type(CloneType::Type1));
        assert_eq!(tally, Tally::new(1, 2));
        assert_eq!(evaluator.recall(&Dimension::all()), Recall::Defined(0.5));
        assert!(evaluator.decision(1).unwrap().detected);
        assert!(!evaluator.decision(2).unwrap().detected);
        assert!(evaluator.decision(3).is_none());
    }

    #[test]
    fn test_internal_clones_excluded_by_default() {
        let mut internal = type1(2, "y");
        internal.internal = true;
        let store = store(vec![type1(1, "x"), internal], Vec::new());

        let default = RecallEvaluator::new(&store, EvaluationSettings::new(1), coverage()).unwrap();
        assert_eq!(default.count(&Dimension::all()).total, 1);

        let including = RecallEvaluator::new(
            &store,
            EvaluationSettings::new(1).with_internal(true),
            coverage(),
        )
        .unwrap();
        assert_eq!(including.count(&Dimension::all()).total, 2);
    }

    #[test]
    fn test_count_all_preserves_order() {
        let store = store(vec![type1(1, "x")], Vec::new());
        let evaluator = RecallEvaluator::new(&store, EvaluationSettings::new(1), coverage()).unwrap();

        let tallies = evaluator.count_all(&[
            Dimension::of_type(CloneType::Type1),
            Dimension::of_type(CloneType::Type2),
        ]);
        assert_eq!(tallies, vec![Tally::new(0, 1), Tally::new(0, 0)]);
    }
}
