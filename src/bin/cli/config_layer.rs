//! Configuration Layer Management
//!
//! Merges built-in defaults, an optional configuration file and command-line
//! overrides into the final [`EvaluationConfig`].

use clone_recall::core::config::EvaluationConfig;
use clone_recall::core::filter::SizeBounds;

use crate::cli::args::{EvaluateArgs, FilterArgs};

/// Trait for merging configuration layers
pub trait ConfigMerge<T> {
    /// Merge another configuration into this one, with the other taking priority
    fn merge_with(&mut self, other: T);
}

fn merge_bounds(bounds: &mut SizeBounds, min: Option<u32>, max: Option<u32>) {
    if let Some(min) = min {
        bounds.min = min;
    }
    if max.is_some() {
        bounds.max = max;
    }
}

impl ConfigMerge<&FilterArgs> for EvaluationConfig {
    fn merge_with(&mut self, args: &FilterArgs) {
        merge_bounds(&mut self.filter.lines, args.min_lines, args.max_lines);
        merge_bounds(&mut self.filter.pretty_lines, args.min_pretty, args.max_pretty);
        merge_bounds(&mut self.filter.tokens, args.min_tokens, args.max_tokens);
        if let Some(min_judges) = args.min_judges {
            self.filter.min_judges = min_judges;
        }
        if let Some(min_confidence) = args.min_confidence {
            self.filter.min_confidence = min_confidence;
        }
    }
}

impl ConfigMerge<&EvaluateArgs> for EvaluationConfig {
    fn merge_with(&mut self, args: &EvaluateArgs) {
        self.merge_with(&args.filter);

        if let Some(matcher) = &args.matcher {
            self.matcher = matcher.clone();
        }
        if let Some(similarity_type) = args.similarity_type {
            self.similarity_type = similarity_type.into();
        }
        if let Some(min_similarity) = args.min_similarity {
            self.min_similarity = min_similarity;
        }
        // A flag can only switch internal clones on
        if args.include_internal {
            self.include_internal = true;
        }
        if !args.functionalities.is_empty() {
            self.functionalities = Some(args.functionalities.clone());
        }
    }
}

/// Build the run configuration for `evaluate`: defaults, file, then flags.
pub fn layered_config(args: &EvaluateArgs) -> anyhow::Result<EvaluationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            EvaluationConfig::from_yaml_file(path)?
        }
        None => EvaluationConfig::default(),
    };

    config.merge_with(args);
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::SimilarityTypeArg;
    use clone_recall::core::model::SimilarityType;
    use std::path::PathBuf;

    fn args() -> EvaluateArgs {
        EvaluateArgs {
            tool: 1,
            store: PathBuf::from("bench.json"),
            output: PathBuf::from("out.report"),
            config: None,
            matcher: None,
            filter: FilterArgs::default(),
            similarity_type: None,
            min_similarity: None,
            include_internal: false,
            functionalities: Vec::new(),
        }
    }

    #[test]
    fn test_flags_override_file_values() {
        let mut config = EvaluationConfig::default();
        config.filter.lines = SizeBounds::new(6, Some(500));
        config.min_similarity = 50;

        let mut args = args();
        args.filter.min_lines = Some(10);
        args.similarity_type = Some(SimilarityTypeArg::Line);
        args.functionalities = vec![4, 7];
        config.merge_with(&args);

        assert_eq!(config.filter.lines, SizeBounds::new(10, Some(500)));
        assert_eq!(config.similarity_type, SimilarityType::Line);
        assert_eq!(config.min_similarity, 50);
        assert_eq!(config.functionalities, Some(vec![4, 7]));
    }

    #[test]
    fn test_invalid_min_similarity_is_rejected() {
        let mut args = args();
        args.min_similarity = Some(33);
        assert!(layered_config(&args).is_err());
    }
}
