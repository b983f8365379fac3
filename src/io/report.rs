//! Plain-text recall report.
//!
//! The writer only composes [`Dimension`] queries and formats their tallies;
//! all counting happens in the [`RecallEvaluator`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::core::config::REGION_WIDTH;
use crate::core::errors::{EvalError, Result, ResultExt};
use crate::core::filter::SizeBounds;
use crate::core::model::{CloneType, FunctionalityId, Locality};
use crate::engine::{Dimension, RecallEvaluator, SimilarityBand, Tally};
use crate::io::store::CloneStore;

const RULE: &str =
    "================================================================================";

/// Named Type-3 similarity ranges, strongest first
const NAMED_BANDS: [(&str, u32, u32); 4] = [
    ("Very-Strongly Type-3", 90, 100),
    ("Strongly Type-3", 70, 90),
    ("Moderately Type-3", 50, 70),
    ("Weakly Type-3/Type-4", 0, 50),
];

/// Clone types reported individually before the Type-3 bands
const FIXED_TYPES: [CloneType; 4] = [
    CloneType::Type1,
    CloneType::Type2,
    CloneType::Type2Blind,
    CloneType::Type2Consistent,
];

/// Writes the recall report of one evaluated tool
pub struct ReportWriter<'a> {
    store: &'a dyn CloneStore,
    min_similarity: u32,
    functionalities: Vec<FunctionalityId>,
}

impl<'a> ReportWriter<'a> {
    /// Create a writer printing Type-3 results from `min_similarity` up
    pub fn new(store: &'a dyn CloneStore, min_similarity: u32) -> Result<Self> {
        SimilarityBand::regions(min_similarity)?;
        Ok(Self {
            store,
            min_similarity,
            functionalities: Vec::new(),
        })
    }

    /// Functionalities broken down after the overall results
    pub fn with_functionalities(mut self, functionalities: Vec<FunctionalityId>) -> Self {
        self.functionalities = functionalities;
        self
    }

    /// Write the report to a file, creating or truncating it
    pub fn write_to_path(&self, path: impl AsRef<Path>, evaluator: &RecallEvaluator) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            EvalError::io(format!("Cannot write report to {}", path.display()), e)
        })?;
        let mut out = BufWriter::new(file);

        info!("Writing report to {}", path.display());
        self.write(&mut out, evaluator)?;
        out.flush()
            .with_context(|| format!("Flushing report {}", path.display()))
    }

    /// Write the full report
    pub fn write<W: Write>(&self, out: &mut W, evaluator: &RecallEvaluator) -> Result<()> {
        self.write_header(out, evaluator)?;

        writeln!(out, "{RULE}")?;
        writeln!(out, "\tAll Functionalities")?;
        writeln!(out, "{RULE}")?;
        self.write_section(out, evaluator, None)?;

        for &id in &self.functionalities {
            info!("Evaluating functionality {id}");
            let functionality = self.store.functionality(id)?;
            let (name, description) = match &functionality {
                Some(f) => (f.name.as_str(), f.description.as_str()),
                None => ("(unknown)", ""),
            };

            writeln!(out, "{RULE}")?;
            writeln!(out, "Functionality")?;
            writeln!(out, "  id: {id}")?;
            writeln!(out, "name: {name}")?;
            writeln!(out, "desc: {description}")?;
            writeln!(out, "{RULE}")?;
            self.write_section(out, evaluator, Some(id))?;
        }

        Ok(())
    }

    fn write_header<W: Write>(&self, out: &mut W, evaluator: &RecallEvaluator) -> Result<()> {
        let tool = evaluator.tool();
        let filter = evaluator.filter();

        writeln!(out, "-- Tool --")?;
        writeln!(out, "       Tool: {} - {}", tool.id, tool.name)?;
        writeln!(out, "Description: {}", tool.description)?;
        writeln!(out, "    #Clones: {}", self.store.detected_count(tool.id)?)?;
        writeln!(out)?;

        writeln!(out, "-- Versioning --")?;
        writeln!(out, " clone-recall: {}", crate::VERSION)?;
        writeln!(out, "    Benchmark: {}", self.store.benchmark_version()?)?;
        writeln!(out)?;

        writeln!(out, "-- Selected Clones --")?;
        write_bounds(out, "Lines", &filter.lines)?;
        write_bounds(out, "Tokens", &filter.tokens)?;
        write_bounds(out, "Pretty Lines", &filter.pretty_lines)?;
        writeln!(out, "{:>18}: {}", "Min Judges", filter.min_judges)?;
        writeln!(out, "{:>18}: {}", "Min Confidence", filter.min_confidence)?;
        writeln!(out, "{:>18}: {}", "Sim Type", evaluator.similarity_type())?;
        writeln!(out, "{:>18}: {}", "Minimum Similarity", self.min_similarity)?;
        writeln!(
            out,
            "{:>18}: {}",
            "Internal Clones",
            if evaluator.settings().include_internal {
                "included"
            } else {
                "excluded"
            }
        )?;
        writeln!(out)?;

        writeln!(out, "-- Clone Matcher --")?;
        writeln!(out, "{}", evaluator.matcher().describe())?;
        writeln!(out)?;

        writeln!(out, "-- Clone Types --")?;
        writeln!(out, "Type-1")?;
        writeln!(out, "Type-2")?;
        for (label, lo, hi) in NAMED_BANDS {
            writeln!(
                out,
                "{label:>20}: Clone similarity in range [{lo:>2},{hi:>3}) after pretty-printing \
                 and identifier/literal normalization."
            )?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn write_section<W: Write>(
        &self,
        out: &mut W,
        evaluator: &RecallEvaluator,
        functionality: Option<FunctionalityId>,
    ) -> Result<()> {
        let scopes = [
            (None, "Recall Per Clone Type (type: numDetected / numClones = recall)", ""),
            (Some(Locality::Inter), "Inter-Project Recall Per Clone Type (type: numDetected / numClones = recall)", " Inter-Project"),
            (Some(Locality::Intra), "Intra-Project Recall Per Clone Type (type: numDetected / numClones = recall)", " Intra-Project"),
        ];

        let scoped = |dimension: Dimension, locality: Option<Locality>| {
            let dimension = match functionality {
                Some(id) => dimension.with_functionality(id),
                None => dimension,
            };
            match locality {
                Some(locality) => dimension.with_locality(locality),
                None => dimension,
            }
        };

        for (locality, title, _) in scopes {
            writeln!(out, "-- {title} --")?;
            for clone_type in FIXED_TYPES {
                let tally = evaluator.count(&scoped(Dimension::of_type(clone_type), locality));
                write_row(out, clone_type.label(), tally)?;
            }
            for (label, lo, hi) in NAMED_BANDS {
                if self.min_similarity <= lo {
                    let tally = evaluator.count(&scoped(Dimension::type3(lo, hi)?, locality));
                    write_row(out, label, tally)?;
                }
            }
            writeln!(out)?;
        }

        let regions = SimilarityBand::regions(self.min_similarity)?;

        for (locality, _, qualifier) in scopes {
            writeln!(
                out,
                "-- Type-3{qualifier} Recall per {REGION_WIDTH}% Region ([start,end]: numDetected / numClones = recall) --"
            )?;
            let dimensions: Vec<Dimension> = regions
                .iter()
                .map(|&band| scoped(Dimension::all().with_band(band), locality))
                .collect();
            for (band, tally) in regions.iter().zip(evaluator.count_all(&dimensions)) {
                writeln!(out, "{band}: {tally} = {}", tally.recall())?;
            }
            writeln!(out)?;
        }

        for (locality, _, qualifier) in scopes {
            writeln!(out, "-- Type-3{qualifier} Recall Per Minimum Similarity --")?;
            let cumulative = regions
                .iter()
                .map(|band| SimilarityBand::at_least(band.lo()))
                .collect::<Result<Vec<_>>>()?;
            let dimensions: Vec<Dimension> = cumulative
                .iter()
                .map(|&band| scoped(Dimension::all().with_band(band), locality))
                .collect();
            for (band, tally) in cumulative.iter().zip(evaluator.count_all(&dimensions)) {
                writeln!(out, "{band}: {tally} = {}", tally.recall())?;
            }
            writeln!(out)?;
        }

        Ok(())
    }
}

fn write_bounds<W: Write>(out: &mut W, name: &str, bounds: &SizeBounds) -> Result<()> {
    writeln!(out, "{:>18}: {}", format!("Min {name}"), bounds.min)?;
    match bounds.max {
        Some(max) => writeln!(out, "{:>18}: {max}", format!("Max {name}"))?,
        None => writeln!(out, "{:>18}: unbounded", format!("Max {name}"))?,
    }
    Ok(())
}

fn write_row<W: Write>(out: &mut W, label: &str, tally: Tally) -> Result<()> {
    writeln!(out, "{label:>20}: {tally} = {}", tally.recall())?;
    Ok(())
}
