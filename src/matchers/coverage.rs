//! Coverage-threshold clone matching.
//!
//! A reference clone is detected when the tool's reported fragments cover at
//! least `threshold` of the lines of each of its two fragments. Coverage
//! exactly at the threshold counts as detected; a fragment spanning no lines
//! has coverage 0 and is never detected.
//!
//! Configuration text: `[threshold] [union|pairwise]`, e.g. `0.7` or
//! `0.8 pairwise`. An empty configuration means `0.7 union`.

use serde::{Deserialize, Serialize};

use super::{CloneMatcher, ToolReports};
use crate::core::errors::{EvalError, Result};
use crate::core::model::{span_len, DetectedReport, Fragment, MatchResult, ReferenceClone, ToolId};

/// How reported fragments are combined when measuring coverage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageMode {
    /// Every reported fragment in the same file contributes to each reference fragment
    #[default]
    Union,
    /// One reported pair must cover both reference fragments, in either orientation
    Pairwise,
}

impl CoverageMode {
    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "union" => Some(CoverageMode::Union),
            "pairwise" | "pair" => Some(CoverageMode::Pairwise),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            CoverageMode::Union => "union",
            CoverageMode::Pairwise => "pairwise",
        }
    }
}

/// Line-coverage matcher
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageMatcher {
    tool_id: ToolId,
    threshold: f64,
    mode: CoverageMode,
}

impl CoverageMatcher {
    /// Registry name of this strategy
    pub const NAME: &'static str = "CoverageMatcher";

    /// Threshold used when the configuration gives none
    pub const DEFAULT_THRESHOLD: f64 = 0.70;

    /// Create a matcher; the threshold must lie in `(0, 1]`
    pub fn new(tool_id: ToolId, threshold: f64, mode: CoverageMode) -> Result<Self> {
        if !threshold.is_finite() || threshold <= 0.0 || threshold > 1.0 {
            return Err(EvalError::configuration(
                Self::NAME,
                "coverage threshold must be in (0, 1]",
                threshold.to_string(),
            ));
        }

        Ok(Self {
            tool_id,
            threshold,
            mode,
        })
    }

    /// Parse the strategy's configuration text
    pub fn from_config(tool_id: ToolId, config: &str) -> Result<Self> {
        let tokens: Vec<&str> = config.split_whitespace().collect();

        let threshold = match tokens.first() {
            None => Self::DEFAULT_THRESHOLD,
            Some(raw) => raw.parse::<f64>().map_err(|e| {
                EvalError::configuration(Self::NAME, format!("invalid coverage threshold: {e}"), config)
            })?,
        };

        let mode = match tokens.get(1) {
            None => CoverageMode::default(),
            Some(raw) => CoverageMode::parse(raw).ok_or_else(|| {
                EvalError::configuration(
                    Self::NAME,
                    format!("unknown coverage mode '{raw}', expected 'union' or 'pairwise'"),
                    config,
                )
            })?,
        };

        if tokens.len() > 2 {
            return Err(EvalError::configuration(
                Self::NAME,
                "expected at most a threshold and a mode",
                config,
            ));
        }

        Self::new(tool_id, threshold, mode).map_err(|err| match err {
            EvalError::Configuration { strategy, message, .. } => EvalError::Configuration {
                strategy,
                message,
                input: config.to_string(),
            },
            other => other,
        })
    }

    /// Coverage threshold in `(0, 1]`
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Coverage mode
    pub fn mode(&self) -> CoverageMode {
        self.mode
    }

    fn meets(&self, coverage: f64) -> bool {
        coverage >= self.threshold
    }

    fn decide_union(&self, reports: &ToolReports, clone: &ReferenceClone) -> MatchResult {
        let first = union_coverage(reports, &clone.first);
        let second = union_coverage(reports, &clone.second);
        let score = first.min(second);

        if self.meets(first) && self.meets(second) {
            MatchResult::detected(Some(score))
        } else {
            MatchResult::missed(Some(score))
        }
    }

    fn decide_pairwise(&self, reports: &ToolReports, clone: &ReferenceClone) -> MatchResult {
        let best = reports
            .touching(&clone.first.file)
            .map(|report| pair_coverage(report, clone))
            .fold(0.0_f64, f64::max);

        if self.meets(best) {
            MatchResult::detected(Some(best))
        } else {
            MatchResult::missed(Some(best))
        }
    }
}

impl CloneMatcher for CoverageMatcher {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn tool_id(&self) -> Option<ToolId> {
        Some(self.tool_id)
    }

    fn describe(&self) -> String {
        format!(
            "{} (tool {}): a clone is detected when at least {:.0}% of the lines of both of its \
             fragments are covered by reported clones ({} coverage)",
            Self::NAME,
            self.tool_id,
            self.threshold * 100.0,
            self.mode.as_str()
        )
    }

    fn decide(&self, reports: &ToolReports, clone: &ReferenceClone) -> MatchResult {
        match self.mode {
            CoverageMode::Union => self.decide_union(reports, clone),
            CoverageMode::Pairwise => self.decide_pairwise(reports, clone),
        }
    }
}

/// Fraction of `target` covered by one reported fragment
fn fragment_coverage(reported: &Fragment, target: &Fragment) -> f64 {
    let extent = target.line_count();
    if extent == 0 {
        return 0.0;
    }
    match reported.intersection(target) {
        Some((start, end)) => span_len(start, end) as f64 / extent as f64,
        None => 0.0,
    }
}

/// Best coverage a single report achieves over both fragments of `clone`
fn pair_coverage(report: &DetectedReport, clone: &ReferenceClone) -> f64 {
    let straight = fragment_coverage(&report.first, &clone.first)
        .min(fragment_coverage(&report.second, &clone.second));
    let swapped = fragment_coverage(&report.second, &clone.first)
        .min(fragment_coverage(&report.first, &clone.second));
    straight.max(swapped)
}

/// Fraction of `target` covered by the union of every reported fragment in its file
fn union_coverage(reports: &ToolReports, target: &Fragment) -> f64 {
    let extent = target.line_count();
    if extent == 0 {
        return 0.0;
    }

    let mut spans: Vec<(u32, u32)> = reports
        .touching(&target.file)
        .flat_map(|report| [&report.first, &report.second])
        .filter_map(|reported| reported.intersection(target))
        .collect();
    if spans.is_empty() {
        return 0.0;
    }
    spans.sort_unstable();

    let mut covered = 0u64;
    let (mut start, mut end) = spans[0];
    for &(next_start, next_end) in &spans[1..] {
        if next_start <= end.saturating_add(1) {
            end = end.max(next_end);
        } else {
            covered += span_len(start, end);
            start = next_start;
            end = next_end;
        }
    }
    covered += span_len(start, end);

    covered as f64 / extent as f64
}
