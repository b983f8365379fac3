//! Benchmark entities: reference clones, detector reports, tools and functionalities.
//!
//! All of these are owned by the clone store and are immutable once loaded.
//! The evaluation engine only ever reads them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::EvalError;

/// Identifier of a reference clone in the benchmark
pub type CloneId = i64;

/// Identifier of a clone detection tool
pub type ToolId = i64;

/// Identifier of a benchmark functionality
pub type FunctionalityId = i64;

/// Clone type tag of a reference clone.
///
/// The tags are mutually exclusive: a Type-2 clone is exactly one of
/// `Type2`, `Type2Blind` or `Type2Consistent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloneType {
    /// Identical after whitespace, layout and comment normalization
    Type1,
    /// Identical after identifier/literal normalization
    Type2,
    /// Type-2 under blind identifier renaming
    Type2Blind,
    /// Type-2 under consistent identifier renaming
    Type2Consistent,
    /// Syntactically similar with added, removed or modified statements
    Type3,
}

impl CloneType {
    /// Every clone type, in report order
    pub const ALL: [CloneType; 5] = [
        CloneType::Type1,
        CloneType::Type2,
        CloneType::Type2Blind,
        CloneType::Type2Consistent,
        CloneType::Type3,
    ];

    /// Human-readable label used in reports
    pub fn label(self) -> &'static str {
        match self {
            CloneType::Type1 => "Type-1",
            CloneType::Type2 => "Type-2",
            CloneType::Type2Blind => "Type-2 (blind)",
            CloneType::Type2Consistent => "Type-2 (consistent)",
            CloneType::Type3 => "Type-3",
        }
    }
}

/// Whether the two fragments of a clone come from the same project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locality {
    /// Both fragments belong to one project
    Intra,
    /// The fragments belong to different projects
    Inter,
}

/// A contiguous line range of a source file, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fragment {
    /// Path of the file, relative to the benchmark source root
    pub file: String,
    /// First line of the fragment
    pub start_line: u32,
    /// Last line of the fragment
    pub end_line: u32,
}

impl Fragment {
    /// Create a new fragment
    pub fn new(file: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        Self {
            file: file.into(),
            start_line,
            end_line,
        }
    }

    /// Number of lines spanned; zero when `end_line < start_line`
    pub fn line_count(&self) -> u64 {
        if self.end_line < self.start_line {
            0
        } else {
            span_len(self.start_line, self.end_line)
        }
    }

    /// True when the fragment spans no lines
    pub fn is_empty(&self) -> bool {
        self.line_count() == 0
    }

    /// Inclusive line range shared with `other`, if both are in the same file
    pub fn intersection(&self, other: &Fragment) -> Option<(u32, u32)> {
        if self.file != other.file || self.is_empty() || other.is_empty() {
            return None;
        }
        let start = self.start_line.max(other.start_line);
        let end = self.end_line.min(other.end_line);
        (start <= end).then_some((start, end))
    }
}

/// Number of lines in the inclusive range `start..=end`, with `start <= end`
pub fn span_len(start: u32, end: u32) -> u64 {
    u64::from(end - start) + 1
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.file, self.start_line, self.end_line)
    }
}

/// Size metrics of one fragment beyond its raw line extent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentSize {
    /// Lines after pretty-printing
    pub pretty_lines: u32,
    /// Token count
    pub tokens: u32,
}

/// Syntactic similarity of a Type-3 clone, as percentages in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    /// Line-based similarity
    pub line: f64,
    /// Token-based similarity
    pub token: f64,
}

/// Selects which similarity measure band queries look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityType {
    /// Line-based similarity
    Line,
    /// Token-based similarity
    Token,
    /// Mean of line and token similarity
    Average,
    /// Both measures must reach the band, so the lower one is used
    #[default]
    Both,
}

impl SimilarityType {
    /// Effective similarity of `similarity` under this selector
    pub fn select(self, similarity: &Similarity) -> f64 {
        match self {
            SimilarityType::Line => similarity.line,
            SimilarityType::Token => similarity.token,
            SimilarityType::Average => (similarity.line + similarity.token) / 2.0,
            SimilarityType::Both => similarity.line.min(similarity.token),
        }
    }

    /// Name as used in configuration files and reports
    pub fn as_str(self) -> &'static str {
        match self {
            SimilarityType::Line => "line",
            SimilarityType::Token => "token",
            SimilarityType::Average => "average",
            SimilarityType::Both => "both",
        }
    }
}

impl fmt::Display for SimilarityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityType {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "line" => Ok(SimilarityType::Line),
            "token" => Ok(SimilarityType::Token),
            "average" | "avg" => Ok(SimilarityType::Average),
            "both" => Ok(SimilarityType::Both),
            other => Err(EvalError::validation_field(
                format!("Unknown similarity type '{other}'"),
                "similarity_type",
            )),
        }
    }
}

/// One ground-truth clone pair of the benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceClone {
    /// Benchmark identifier
    pub id: CloneId,
    /// Clone type tag
    pub clone_type: CloneType,
    /// Similarity; only meaningful for [`CloneType::Type3`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<Similarity>,
    /// First fragment of the pair
    pub first: Fragment,
    /// Second fragment of the pair
    pub second: Fragment,
    /// Size metrics of the first fragment
    #[serde(default)]
    pub first_size: FragmentSize,
    /// Size metrics of the second fragment
    #[serde(default)]
    pub second_size: FragmentSize,
    /// Number of judges that validated the clone
    #[serde(default)]
    pub judges: u32,
    /// Judge confidence score
    #[serde(default)]
    pub confidence: i32,
    /// Intra- or inter-project clone
    pub locality: Locality,
    /// Functionality the clone was found in, if assigned
    #[serde(default)]
    pub functionality: Option<FunctionalityId>,
    /// Clone found outside the benchmark's tagged set
    #[serde(default)]
    pub internal: bool,
}

impl ReferenceClone {
    /// Effective similarity for band queries; `None` unless this is a Type-3 clone
    pub fn band_similarity(&self, selector: SimilarityType) -> Option<f64> {
        match self.clone_type {
            CloneType::Type3 => self.similarity.as_ref().map(|s| selector.select(s)),
            _ => None,
        }
    }
}

/// A clone pair reported by the tool under evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedReport {
    /// First reported fragment
    pub first: Fragment,
    /// Second reported fragment
    pub second: Fragment,
}

impl DetectedReport {
    /// Create a new detected report
    pub fn new(first: Fragment, second: Fragment) -> Self {
        Self { first, second }
    }
}

/// A clone detection tool registered with the benchmark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool identifier
    pub id: ToolId,
    /// Tool name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
}

/// An application feature that groups reference clones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Functionality {
    /// Functionality identifier
    pub id: FunctionalityId,
    /// Functionality name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
}

/// Outcome of matching one reference clone against a tool's reports
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Whether the clone counts as detected
    pub detected: bool,
    /// Strategy-specific strength of the match
    pub score: Option<f64>,
}

impl MatchResult {
    /// A positive decision
    pub fn detected(score: Option<f64>) -> Self {
        Self {
            detected: true,
            score,
        }
    }

    /// A negative decision
    pub fn missed(score: Option<f64>) -> Self {
        Self {
            detected: false,
            score,
        }
    }
}
