//! Dimension descriptors selecting a subset of in-scope reference clones.

use std::fmt;

use crate::core::config::REGION_WIDTH;
use crate::core::errors::{EvalError, Result};
use crate::core::model::{CloneType, FunctionalityId, Locality, ReferenceClone, SimilarityType};

/// Upper end of the similarity scale
pub const MAX_SIMILARITY: u32 = 100;

/// A half-open similarity band `[lo, hi)` over percentages.
///
/// A band ending at 100 also admits similarity exactly 100, so every Type-3
/// clone falls into exactly one band of any partition of `[0, 100)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimilarityBand {
    lo: u32,
    hi: u32,
}

impl SimilarityBand {
    /// Create a band; fails unless `lo < hi <= 100`
    pub fn new(lo: u32, hi: u32) -> Result<Self> {
        if hi > MAX_SIMILARITY {
            return Err(EvalError::range(lo, hi, "similarity band must lie within [0, 100]"));
        }
        if lo >= hi {
            return Err(EvalError::range(lo, hi, "similarity band is empty or inverted"));
        }
        Ok(Self { lo, hi })
    }

    /// The cumulative band `[lo, 100)`: similarity at least `lo`
    pub fn at_least(lo: u32) -> Result<Self> {
        Self::new(lo, MAX_SIMILARITY)
    }

    /// Lower bound, inclusive
    pub fn lo(&self) -> u32 {
        self.lo
    }

    /// Upper bound, exclusive unless it is 100
    pub fn hi(&self) -> u32 {
        self.hi
    }

    /// Check whether a similarity percentage falls in the band
    pub fn contains(&self, similarity: f64) -> bool {
        let lo = f64::from(self.lo);
        let hi = f64::from(self.hi);
        similarity >= lo
            && (similarity < hi || (self.hi == MAX_SIMILARITY && similarity <= hi))
    }

    /// Consecutive fixed-width regions starting at `from` and ending at 100
    pub fn regions(from: u32) -> Result<Vec<SimilarityBand>> {
        if from >= MAX_SIMILARITY || from % REGION_WIDTH != 0 {
            return Err(EvalError::range(
                from,
                MAX_SIMILARITY,
                format!("regions must start at a multiple of {REGION_WIDTH} below 100"),
            ));
        }
        (from..MAX_SIMILARITY)
            .step_by(REGION_WIDTH as usize)
            .map(|lo| Self::new(lo, lo + REGION_WIDTH))
            .collect()
    }
}

impl fmt::Display for SimilarityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.lo, self.hi)
    }
}

/// Selects clones by type, similarity band, locality and functionality.
///
/// Unset fields do not constrain the selection. Setting a band restricts the
/// selection to Type-3 clones.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dimension {
    clone_type: Option<CloneType>,
    band: Option<SimilarityBand>,
    locality: Option<Locality>,
    functionality: Option<FunctionalityId>,
}

impl Dimension {
    /// Every in-scope clone
    pub fn all() -> Self {
        Self::default()
    }

    /// Clones of one type
    pub fn of_type(clone_type: CloneType) -> Self {
        Self {
            clone_type: Some(clone_type),
            ..Self::default()
        }
    }

    /// Type-3 clones with similarity in `[lo, hi)`
    pub fn type3(lo: u32, hi: u32) -> Result<Self> {
        Ok(Self::all().with_band(SimilarityBand::new(lo, hi)?))
    }

    /// Restrict to Type-3 clones within `band`
    pub fn with_band(mut self, band: SimilarityBand) -> Self {
        self.clone_type = Some(CloneType::Type3);
        self.band = Some(band);
        self
    }

    /// Restrict to one locality
    pub fn with_locality(mut self, locality: Locality) -> Self {
        self.locality = Some(locality);
        self
    }

    /// Restrict to one functionality
    pub fn with_functionality(mut self, functionality: FunctionalityId) -> Self {
        self.functionality = Some(functionality);
        self
    }

    /// Selected clone type, if any
    pub fn clone_type(&self) -> Option<CloneType> {
        self.clone_type
    }

    /// Selected similarity band, if any
    pub fn band(&self) -> Option<SimilarityBand> {
        self.band
    }

    /// Selected locality, if any
    pub fn locality(&self) -> Option<Locality> {
        self.locality
    }

    /// Selected functionality, if any
    pub fn functionality(&self) -> Option<FunctionalityId> {
        self.functionality
    }

    /// Check whether `clone` falls into this dimension
    pub fn matches(&self, clone: &ReferenceClone, similarity_type: SimilarityType) -> bool {
        if self.clone_type.is_some_and(|t| t != clone.clone_type) {
            return false;
        }
        if self.locality.is_some_and(|l| l != clone.locality) {
            return false;
        }
        if let Some(functionality) = self.functionality {
            if clone.functionality != Some(functionality) {
                return false;
            }
        }
        match self.band {
            Some(band) => clone
                .band_similarity(similarity_type)
                .is_some_and(|s| band.contains(s)),
            None => true,
        }
    }
}
