#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// -------------------------------------
// Scalar cone taxonomy
// -------------------------------------

/// Cone kinds for scalar constraint and variable blocks.
///
/// The exponential kinds are reserved for transformation output and have
/// no spelling in the CBF format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Cone {
    /// Whole space, no restriction
    Free,
    /// Nonnegative orthant
    Nonnegative,
    /// Nonpositive orthant
    Nonpositive,
    /// Zero cone, i.e. equality
    Zero,
    /// Second-order cone
    Quadratic,
    /// Rotated second-order cone
    RotatedQuadratic,
    /// Primal exponential cone
    PrimalExp,
    /// Dual exponential cone
    DualExp,
}

impl Cone {
    /// Parses a CBF cone keyword.
    pub fn from_cbf_name(name: &str) -> Option<Self> {
        match name {
            "F" => Some(Cone::Free),
            "L+" => Some(Cone::Nonnegative),
            "L-" => Some(Cone::Nonpositive),
            "L=" => Some(Cone::Zero),
            "Q" => Some(Cone::Quadratic),
            "QR" => Some(Cone::RotatedQuadratic),
            _ => None,
        }
    }

    /// The CBF keyword for this cone, if it has one.
    pub fn cbf_name(&self) -> Option<&'static str> {
        match self {
            Cone::Free => Some("F"),
            Cone::Nonnegative => Some("L+"),
            Cone::Nonpositive => Some("L-"),
            Cone::Zero => Some("L="),
            Cone::Quadratic => Some("Q"),
            Cone::RotatedQuadratic => Some("QR"),
            Cone::PrimalExp | Cone::DualExp => None,
        }
    }

    /// Linear kinds absorb adjacent blocks of the same kind when building
    /// incrementally.  Product cone kinds always stand alone.
    pub fn is_linear(&self) -> bool {
        matches!(
            self,
            Cone::Free | Cone::Nonnegative | Cone::Nonpositive | Cone::Zero
        )
    }
}

/// Objective sense of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObjSense {
    Minimize,
    Maximize,
}

impl Default for ObjSense {
    fn default() -> Self {
        ObjSense::Minimize
    }
}

// -------------------------------------
// Cone stacks
// -------------------------------------

/// An ordered sequence of cone blocks with parallel kind and dimension
/// entries.  The scalar rows (or variables) it describes are numbered
/// consecutively across blocks, so the total dimension is the row count.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConeStack {
    pub cones: Vec<Cone>,
    pub dims: Vec<usize>,
}

impl ConeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cone blocks.
    pub fn len(&self) -> usize {
        self.cones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cones.is_empty()
    }

    /// Total scalar dimension across all blocks.
    pub fn total_dim(&self) -> usize {
        self.dims.iter().sum()
    }

    /// Appends a block without merging.
    pub fn push(&mut self, cone: Cone, dim: usize) {
        self.cones.push(cone);
        self.dims.push(dim);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Cone, usize)> + '_ {
        std::iter::zip(self.cones.iter().copied(), self.dims.iter().copied())
    }

    pub fn clear(&mut self) {
        self.cones.clear();
        self.dims.clear();
    }
}

// -------------
// testing
// -------------
