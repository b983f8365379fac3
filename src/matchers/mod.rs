//! Clone matching strategies.
//!
//! A [`CloneMatcher`] decides whether a tool's reported clones count as a
//! detection of one reference clone. Strategies are resolved by name through a
//! [`MatcherRegistry`] and parse their own free-text configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use tracing::{debug, info};

use crate::core::errors::{EvalError, Result};
use crate::core::model::{DetectedReport, MatchResult, ReferenceClone, ToolId};

pub mod coverage;

pub use coverage::{CoverageMatcher, CoverageMode};

/// Decides whether a reference clone was detected by a tool.
///
/// `decide` must be a pure function of its arguments so the evaluation engine
/// can memoize it and call it from several threads.
pub trait CloneMatcher: Send + Sync + fmt::Debug {
    /// Registered strategy name
    fn name(&self) -> &str;

    /// Tool the matcher was loaded for, if it is bound to one
    fn tool_id(&self) -> Option<ToolId> {
        None
    }

    /// Human-readable description for report headers
    fn describe(&self) -> String;

    /// Match one reference clone against the tool's reports
    fn decide(&self, reports: &ToolReports, clone: &ReferenceClone) -> MatchResult;
}

/// Constructor registered for a strategy name
pub type MatcherConstructor = fn(ToolId, &str) -> Result<Arc<dyn CloneMatcher>>;

/// Name to constructor lookup for clone matchers
#[derive(Clone, Default)]
pub struct MatcherRegistry {
    constructors: BTreeMap<String, MatcherConstructor>,
}

impl MatcherRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every strategy shipped with the crate
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(CoverageMatcher::NAME, build_coverage_matcher);
        registry
    }

    /// Register a strategy, replacing any previous one of the same name
    pub fn register(&mut self, name: impl Into<String>, constructor: MatcherConstructor) -> &mut Self {
        self.constructors.insert(name.into(), constructor);
        self
    }

    /// Registered strategy names, sorted
    pub fn names(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }

    /// Construct the named strategy for `tool_id` from its configuration text
    pub fn load(&self, tool_id: ToolId, strategy: &str, config: &str) -> Result<Arc<dyn CloneMatcher>> {
        let constructor =
            self.constructors
                .get(strategy)
                .ok_or_else(|| EvalError::UnknownStrategy {
                    name: strategy.to_string(),
                    known: self.names(),
                })?;

        let matcher = constructor(tool_id, config)?;
        info!("Loaded clone matcher: {}", matcher.describe());
        Ok(matcher)
    }
}

fn build_coverage_matcher(tool_id: ToolId, config: &str) -> Result<Arc<dyn CloneMatcher>> {
    let matcher = CoverageMatcher::from_config(tool_id, config)?;
    Ok(Arc::new(matcher))
}

impl fmt::Debug for MatcherRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatcherRegistry")
            .field("strategies", &self.names())
            .finish()
    }
}

/// Load a strategy from the builtin registry
pub fn load(tool_id: ToolId, strategy: &str, config: &str) -> Result<Arc<dyn CloneMatcher>> {
    MatcherRegistry::builtin().load(tool_id, strategy, config)
}

/// A matcher specification as written on the command line: `<strategy> <config...>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherSpec {
    /// Strategy name
    pub strategy: String,
    /// Strategy configuration, possibly empty
    pub config: String,
}

impl MatcherSpec {
    /// Split a specification on its first run of whitespace
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(EvalError::validation_field(
                "matcher specification is empty",
                "matcher",
            ));
        }

        let (strategy, config) = match spec.split_once(char::is_whitespace) {
            Some((strategy, rest)) => (strategy, rest.trim()),
            None => (spec, ""),
        };

        Ok(Self {
            strategy: strategy.to_string(),
            config: config.to_string(),
        })
    }

    /// Resolve this specification against `registry`
    pub fn load(&self, registry: &MatcherRegistry, tool_id: ToolId) -> Result<Arc<dyn CloneMatcher>> {
        registry.load(tool_id, &self.strategy, &self.config)
    }
}

/// A tool's reported clones, indexed by file for overlap lookups
#[derive(Debug, Clone)]
pub struct ToolReports {
    tool_id: ToolId,
    reports: Vec<DetectedReport>,
    by_file: AHashMap<String, Vec<usize>>,
}

impl ToolReports {
    /// Index the reports of one tool
    pub fn new(tool_id: ToolId, reports: Vec<DetectedReport>) -> Self {
        let mut by_file: AHashMap<String, Vec<usize>> = AHashMap::new();
        for (idx, report) in reports.iter().enumerate() {
            by_file.entry(report.first.file.clone()).or_default().push(idx);
            if report.second.file != report.first.file {
                by_file.entry(report.second.file.clone()).or_default().push(idx);
            }
        }
        debug!(
            "Indexed {} reports of tool {} across {} files",
            reports.len(),
            tool_id,
            by_file.len()
        );

        Self {
            tool_id,
            reports,
            by_file,
        }
    }

    /// Tool the reports belong to
    pub fn tool_id(&self) -> ToolId {
        self.tool_id
    }

    /// All reports
    pub fn reports(&self) -> &[DetectedReport] {
        &self.reports
    }

    /// Number of reports
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// True if the tool reported nothing
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Reports with at least one fragment in `file`
    pub fn touching<'a>(&'a self, file: &str) -> impl Iterator<Item = &'a DetectedReport> + 'a {
        self.by_file
            .get(file)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(move |&idx| &self.reports[idx])
    }
}
