//! Detected/total counts and the recall derived from them.

use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Detected and total clone counts of one dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tally {
    /// Clones the matcher reported as detected
    pub detected: usize,
    /// In-scope clones in the dimension
    pub total: usize,
}

impl Tally {
    /// Create a tally
    pub fn new(detected: usize, total: usize) -> Self {
        debug_assert!(detected <= total);
        Self { detected, total }
    }

    /// Recall of this tally; undefined for an empty partition
    pub fn recall(&self) -> Recall {
        if self.total == 0 {
            Recall::Undefined
        } else {
            Recall::Defined(self.detected as f64 / self.total as f64)
        }
    }
}

impl Add for Tally {
    type Output = Tally;

    fn add(self, rhs: Tally) -> Tally {
        Tally {
            detected: self.detected + rhs.detected,
            total: self.total + rhs.total,
        }
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, rhs: Tally) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for Tally {
    fn sum<I: Iterator<Item = Tally>>(iter: I) -> Tally {
        iter.fold(Tally::default(), Add::add)
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.detected, self.total)
    }
}

/// Recall of a dimension.
///
/// `Undefined` marks a dimension without any in-scope clones and must be kept
/// apart from a genuine recall of zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Recall {
    /// `detected / total` for a non-empty dimension
    Defined(f64),
    /// The dimension holds no clones
    Undefined,
}

impl Recall {
    /// Numeric value, if defined
    pub fn value(&self) -> Option<f64> {
        match self {
            Recall::Defined(value) => Some(*value),
            Recall::Undefined => None,
        }
    }

    /// True unless the dimension was empty
    pub fn is_defined(&self) -> bool {
        matches!(self, Recall::Defined(_))
    }
}

impl fmt::Display for Recall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recall::Defined(value) => write!(f, "{value:.4}"),
            Recall::Undefined => f.write_str("n/a"),
        }
    }
}
