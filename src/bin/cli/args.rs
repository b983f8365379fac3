//! CLI Arguments and Configuration Structures
//!
//! Command-line argument definitions for the clone-recall binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use clone_recall::core::model::SimilarityType;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Recall evaluation of code clone detectors
#[derive(Parser)]
#[command(name = "clone-recall")]
#[command(version = VERSION)]
#[command(about = "Measure how many benchmark clones a clone detector finds")]
#[command(long_about = "
Evaluate a clone detection tool against a benchmark of known clone pairs.
Recall is reported per clone type, Type-3 similarity band, project locality
and functionality.

Examples:
  clone-recall evaluate 3 --store benchmark.json -o nicad.report
  clone-recall evaluate 3 --store benchmark.json -o nicad.report --matcher 'CoverageMatcher 0.6 pairwise'
  clone-recall print-default-config > eval.yml")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate one tool and write its recall report
    Evaluate(Box<EvaluateArgs>),

    /// Print default configuration in YAML format
    PrintDefaultConfig,

    /// List available clone matchers
    ListMatchers,
}

#[derive(Args)]
pub struct EvaluateArgs {
    /// Identifier of the tool to evaluate
    pub tool: i64,

    /// Benchmark snapshot (.json, .yaml or .yml)
    #[arg(short, long, env = "CLONE_RECALL_STORE")]
    pub store: PathBuf,

    /// Report output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Configuration file (YAML); command-line flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Clone matcher as '<strategy> <config...>'
    #[arg(short, long)]
    pub matcher: Option<String>,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Similarity measure used for Type-3 bands
    #[arg(long, value_enum)]
    pub similarity_type: Option<SimilarityTypeArg>,

    /// Lowest Type-3 similarity reported (multiple of 5)
    #[arg(long)]
    pub min_similarity: Option<u32>,

    /// Also count clones outside the benchmark's tagged set
    #[arg(long)]
    pub include_internal: bool,

    /// Functionality to break down (repeatable); all when omitted
    #[arg(short = 'f', long = "functionality")]
    pub functionalities: Vec<i64>,
}

/// Clone selection bounds
#[derive(Args, Default)]
pub struct FilterArgs {
    /// Minimum clone size in original lines
    #[arg(long)]
    pub min_lines: Option<u32>,

    /// Maximum clone size in original lines
    #[arg(long)]
    pub max_lines: Option<u32>,

    /// Minimum clone size in pretty-printed lines
    #[arg(long)]
    pub min_pretty: Option<u32>,

    /// Maximum clone size in pretty-printed lines
    #[arg(long)]
    pub max_pretty: Option<u32>,

    /// Minimum clone size in tokens
    #[arg(long)]
    pub min_tokens: Option<u32>,

    /// Maximum clone size in tokens
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Minimum number of judges who validated the clone
    #[arg(long)]
    pub min_judges: Option<u32>,

    /// Minimum judge confidence
    #[arg(long, allow_negative_numbers = true)]
    pub min_confidence: Option<i32>,
}

/// Similarity measure selector
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SimilarityTypeArg {
    /// Line-based similarity
    Line,
    /// Token-based similarity
    Token,
    /// Mean of line and token similarity
    Avg,
    /// Lower of line and token similarity
    Both,
}

impl From<SimilarityTypeArg> for SimilarityType {
    fn from(arg: SimilarityTypeArg) -> Self {
        match arg {
            SimilarityTypeArg::Line => SimilarityType::Line,
            SimilarityTypeArg::Token => SimilarityType::Token,
            SimilarityTypeArg::Avg => SimilarityType::Average,
            SimilarityTypeArg::Both => SimilarityType::Both,
        }
    }
}
