//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - loaded from a JSON config file
//! - passed between the base layer, the assembler and the solver
//! - exported alongside a solution

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::SpookError;

/// How the observation data and design matrix are handed to the base layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// `B` is raw observations and `A` the raw design matrix; the base layer
    /// forms `AᵀA` and `AᵀB` (`AᵀBG` with a basis) itself.
    #[default]
    Raw,
    /// `A` is already `AᵀA` and `B` already the contracted right-hand side.
    Contracted,
}

/// Representation of the normal-equations system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemMode {
    /// Side `Na`; one right-hand side per observation column.
    Vectorized,
    /// Side `Na·Ng`; the coefficient matrix is flattened row-major.
    Flattened,
}

impl ProblemMode {
    /// Flattening is needed once the two domains are coupled: a basis is
    /// present, or spectral smoothing is requested.
    pub fn required(has_basis: bool, smoothness: Smoothness) -> Self {
        if has_basis || smoothness.spectral != 0.0 {
            Self::Flattened
        } else {
            Self::Vectorized
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Vectorized => "vectorized",
            Self::Flattened => "flattened",
        }
    }
}

/// Smoothness (Laplacian) penalty weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Smoothness {
    /// Weight on the spatial (design-column) smoother `Asm`.
    pub spatial: f64,
    /// Weight on the spectral (basis-column) smoother `Bsm`.
    pub spectral: f64,
}

impl Default for Smoothness {
    fn default() -> Self {
        Self {
            spatial: 0.1,
            spectral: 0.1,
        }
    }
}

impl From<(f64, f64)> for Smoothness {
    fn from((spatial, spectral): (f64, f64)) -> Self {
        Self { spatial, spectral }
    }
}

/// Sparsity weights as supplied by a caller: one scalar for every design
/// column, or one weight per segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SparsityWeights {
    Uniform(f64),
    PerSegment(Vec<f64>),
}

impl Default for SparsityWeights {
    fn default() -> Self {
        Self::Uniform(1.0)
    }
}

impl From<f64> for SparsityWeights {
    fn from(value: f64) -> Self {
        Self::Uniform(value)
    }
}

impl From<Vec<f64>> for SparsityWeights {
    fn from(values: Vec<f64>) -> Self {
        Self::PerSegment(values)
    }
}

/// A contiguous block of design columns sharing one diagonal weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub range: Range<usize>,
    pub weight: f64,
}

/// Validated sparsity penalty: weights matched against a column partition.
#[derive(Debug, Clone, PartialEq)]
pub enum Sparsity {
    Uniform { weight: f64, na: usize },
    Segmented { weights: Vec<f64>, sizes: Vec<usize> },
}

impl Sparsity {
    /// Match `weights` against an optional segmentation of `na` columns.
    ///
    /// Segment sizes must be non-zero, as many as there are weights, and sum to `na`.
    pub fn new(weights: SparsityWeights, sizes: Option<&[usize]>, na: usize) -> Result<Self, SpookError> {
        match (weights, sizes) {
            (SparsityWeights::Uniform(weight), None) => Ok(Self::Uniform { weight, na }),
            (SparsityWeights::Uniform(_), Some(_)) => Err(SpookError::config(
                "Sparsity index list requires one lsparse value per segment, got a scalar.",
            )),
            (SparsityWeights::PerSegment(weights), None) => Err(SpookError::config(format!(
                "{} per-segment lsparse values given without a sparsity index list.",
                weights.len()
            ))),
            (SparsityWeights::PerSegment(weights), Some(sizes)) => {
                if sizes.len() != weights.len() {
                    return Err(SpookError::config(format!(
                        "Sparsity index list must be same length as lsparse values ({} vs {}).",
                        sizes.len(),
                        weights.len()
                    )));
                }
                if let Some(pos) = sizes.iter().position(|&s| s == 0) {
                    return Err(SpookError::config(format!("Sparsity segment {pos} is empty.")));
                }
                let total: usize = sizes.iter().sum();
                if total != na {
                    return Err(SpookError::config(format!(
                        "Sparsity indices have incorrect dimension: segments cover {total} columns, design has {na}."
                    )));
                }
                Ok(Self::Segmented {
                    weights,
                    sizes: sizes.to_vec(),
                })
            }
        }
    }

    /// Same partition, new weights. The new weights must have the same shape.
    pub fn with_weights(&self, weights: &SparsityWeights) -> Result<Self, SpookError> {
        match (self, weights) {
            (Self::Uniform { na, .. }, SparsityWeights::Uniform(weight)) => Ok(Self::Uniform {
                weight: *weight,
                na: *na,
            }),
            (Self::Segmented { sizes, .. }, SparsityWeights::PerSegment(_)) => {
                let na = sizes.iter().sum();
                Self::new(weights.clone(), Some(sizes.as_slice()), na)
            }
            (Self::Uniform { .. }, SparsityWeights::PerSegment(w)) => Err(SpookError::config(format!(
                "Problem uses a single lsparse value; got {} per-segment values.",
                w.len()
            ))),
            (Self::Segmented { sizes, .. }, SparsityWeights::Uniform(_)) => Err(SpookError::config(format!(
                "Problem uses {} sparsity segments; got a single lsparse value.",
                sizes.len()
            ))),
        }
    }

    pub fn weights(&self) -> SparsityWeights {
        match self {
            Self::Uniform { weight, .. } => SparsityWeights::Uniform(*weight),
            Self::Segmented { weights, .. } => SparsityWeights::PerSegment(weights.clone()),
        }
    }

    /// Column ranges with their weights, in column order.
    pub fn segments(&self) -> Vec<Segment> {
        match self {
            Self::Uniform { weight, na } => vec![Segment {
                range: 0..*na,
                weight: *weight,
            }],
            Self::Segmented { weights, sizes } => segment_ranges(sizes)
                .into_iter()
                .zip(weights)
                .map(|(range, &weight)| Segment { range, weight })
                .collect(),
        }
    }

    /// Per-segment weight changes from `self` to `next` (same partition assumed).
    pub fn deltas_to(&self, next: &Sparsity) -> Vec<Segment> {
        self.segments()
            .into_iter()
            .zip(next.segments())
            .map(|(old, new)| Segment {
                range: old.range,
                weight: new.weight - old.weight,
            })
            .collect()
    }
}

/// Half-open column ranges `[offset_i, offset_i + sizes[i])`, where `offset_i`
/// is the cumulative size of the preceding segments.
pub fn segment_ranges(sizes: &[usize]) -> Vec<Range<usize>> {
    let mut offset = 0;
    sizes
        .iter()
        .map(|&size| {
            let range = offset..offset + size;
            offset += size;
            range
        })
        .collect()
}

/// Regularization configuration of a linear-solve problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinSolveConfig {
    /// Sparsity (ridge) weight(s).
    pub lsparse: SparsityWeights,
    /// Smoothness weights.
    pub lsmooth: Smoothness,
    /// Optional segment sizes partitioning the design columns.
    pub sp_idcs: Option<Vec<usize>>,
    /// Keep the cross term `AGtAG` between flattened rebuilds.
    ///
    /// The terminal solve usually dominates runtime, so this trades memory for
    /// little time and is off by default.
    pub cache_cross_term: bool,
    /// Build smoothers from interior second differences only.
    pub smoothness_drop_boundaries: bool,
}

impl Default for LinSolveConfig {
    fn default() -> Self {
        Self {
            lsparse: SparsityWeights::default(),
            lsmooth: Smoothness::default(),
            sp_idcs: None,
            cache_cross_term: false,
            smoothness_drop_boundaries: true,
        }
    }
}
