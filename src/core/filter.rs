//! Inclusion predicate applied to reference clones before any counting.

use serde::{Deserialize, Serialize};

use crate::core::errors::{EvalError, Result};
use crate::core::model::{FragmentSize, ReferenceClone};

/// Inclusive size bounds; an absent maximum means unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBounds {
    /// Smallest admitted value
    #[serde(default)]
    pub min: u32,
    /// Largest admitted value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

impl SizeBounds {
    /// Bounds with the given limits
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Check whether `value` lies within the bounds
    pub fn contains(&self, value: u64) -> bool {
        value >= u64::from(self.min) && self.max.map_or(true, |max| value <= u64::from(max))
    }

    fn validate(&self, field: &str) -> Result<()> {
        match self.max {
            Some(max) if max < self.min => Err(EvalError::validation_field(
                format!("maximum {max} is below minimum {}", self.min),
                field,
            )),
            _ => Ok(()),
        }
    }
}

/// Clone selection bounds shared by every dimension query.
///
/// A clone is in scope only if both of its fragments satisfy each size bound
/// and the clone meets the judge and confidence thresholds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationFilter {
    /// Fragment size in raw lines
    #[serde(default)]
    pub lines: SizeBounds,
    /// Fragment size in pretty-printed lines
    #[serde(default)]
    pub pretty_lines: SizeBounds,
    /// Fragment size in tokens
    #[serde(default)]
    pub tokens: SizeBounds,
    /// Minimum number of judges
    #[serde(default)]
    pub min_judges: u32,
    /// Minimum judge confidence
    #[serde(default)]
    pub min_confidence: i32,
}

impl EvaluationFilter {
    /// Check whether a reference clone is in scope
    pub fn admits(&self, clone: &ReferenceClone) -> bool {
        clone.judges >= self.min_judges
            && clone.confidence >= self.min_confidence
            && self.lines.contains(clone.first.line_count())
            && self.lines.contains(clone.second.line_count())
            && self.size_admits(&clone.first_size)
            && self.size_admits(&clone.second_size)
    }

    fn size_admits(&self, size: &FragmentSize) -> bool {
        self.pretty_lines.contains(u64::from(size.pretty_lines))
            && self.tokens.contains(u64::from(size.tokens))
    }

    /// Validate that no bound is inverted
    pub fn validate(&self) -> Result<()> {
        self.lines.validate("filter.lines")?;
        self.pretty_lines.validate("filter.pretty_lines")?;
        self.tokens.validate("filter.tokens")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{CloneType, Fragment, Locality};

    fn clone_with_lines(first: u32, second: u32) -> ReferenceClone {
        ReferenceClone {
            id: 7,
            clone_type: CloneType::Type1,
            similarity: None,
            first: Fragment::new("a.java", 1, first),
            second: Fragment::new("b.java", 1, second),
            first_size: FragmentSize {
                pretty_lines: first,
                tokens: first * 10,
            },
            second_size: FragmentSize {
                pretty_lines: second,
                tokens: second * 10,
            },
            judges: 2,
            confidence: 1,
            locality: Locality::Inter,
            functionality: Some(4),
            internal: false,
        }
    }

    #[test]
    fn test_default_filter_admits_everything() {
        assert!(EvaluationFilter::default().admits(&clone_with_lines(1, 500)));
    }

    #[test]
    fn test_both_fragments_must_satisfy_bounds() {
        let filter = EvaluationFilter {
            lines: SizeBounds::new(6, Some(100)),
            ..EvaluationFilter::default()
        };
        assert!(filter.admits(&clone_with_lines(6, 100)));
        assert!(!filter.admits(&clone_with_lines(5, 50)));
        assert!(!filter.admits(&clone_with_lines(50, 101)));
    }

    #[test]
    fn test_token_and_judge_thresholds() {
        let clone = clone_with_lines(10, 10);
        let tokens = EvaluationFilter {
            tokens: SizeBounds::new(101, None),
            ..EvaluationFilter::default()
        };
        assert!(!tokens.admits(&clone));

        let judges = EvaluationFilter {
            min_judges: 3,
            ..EvaluationFilter::default()
        };
        assert!(!judges.admits(&clone));

        let confidence = EvaluationFilter {
            min_confidence: 1,
            ..EvaluationFilter::default()
        };
        assert!(confidence.admits(&clone));
    }

    #[test]
    fn test_inverted_bounds_fail_validation() {
        let filter = EvaluationFilter {
            tokens: SizeBounds::new(50, Some(10)),
            ..EvaluationFilter::default()
        };
        let err = filter.validate().unwrap_err();
        assert!(matches!(err, EvalError::Validation { field: Some(ref f), .. } if f == "filter.tokens"));
    }
}
