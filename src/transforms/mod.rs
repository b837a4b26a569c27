//! Algebraic problem transformations and the parameters steering them.
//!
//! Transformations are registered by name so that callers can look them
//! up from configuration strings, and every transformation rewrites a
//! [`ProblemData`] in place.

mod dual;

pub use dual::DualTransform;

use crate::floats::FloatT;
use crate::problem::ProblemData;
use derive_builder::Builder;
use enum_dispatch::enum_dispatch;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cleanup level applied to the coefficient lists ahead of a
/// transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Pare {
    /// leave the lists untouched
    None,
    /// drop explicit zeros from the scalar map lists
    Fast,
    /// drop explicit zeros from the scalar and PSD map lists
    Full,
}

/// Options consulted by the file processing pipeline.

#[derive(Builder, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TransformParams {
    ///explicit zero elimination ahead of the transformation
    #[builder(default = "Pare::None")]
    pub pare: Pare,

    ///bring all coefficient lists into row-major order
    #[builder(default = "false")]
    pub presort: bool,
}

impl Default for TransformParams {
    fn default() -> TransformParams {
        TransformParamsBuilder::default().build().unwrap()
    }
}

impl TransformParams {
    /// Runs the cleanup passes these parameters ask for.
    pub fn prepare<T: FloatT>(&self, data: &mut ProblemData<T>) {
        match self.pare {
            Pare::None => {}
            Pare::Fast => data.compress_maps(None),
            Pare::Full => {
                data.compress_maps(None);
                data.compress_psdmaps(None);
            }
        }
        if self.presort {
            data.sort_rowmajor();
            data.sort_rowmajor_psd();
        }
    }
}

/// A named problem transformation.
#[enum_dispatch]
pub trait ProblemTransform {
    /// The name this transformation is registered under.
    fn name(&self) -> &'static str;

    /// Rewrites the model in place.
    fn apply(&self, data: &mut ProblemData<f64>, params: &TransformParams);
}

/// The identity transformation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTransform;

impl ProblemTransform for NoTransform {
    fn name(&self) -> &'static str {
        "none"
    }
    fn apply(&self, _data: &mut ProblemData<f64>, _params: &TransformParams) {}
}

/// Registry of the available transformations.
#[enum_dispatch(ProblemTransform)]
#[derive(Debug, Clone, Copy)]
pub enum Transform {
    None(NoTransform),
    Dual(DualTransform),
}

impl Transform {
    pub const NAMES: &'static [&'static str] = &["none", "dual"];

    /// Looks a transformation up by its registry name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(NoTransform.into()),
            "dual" => Some(DualTransform.into()),
            _ => None,
        }
    }
}

// -------------
// testing
// -------------
