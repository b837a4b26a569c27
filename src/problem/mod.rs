//! Sparse conic problem representation together with the in-memory
//! algorithms over it: stable coordinate sorting, incremental
//! construction and row compaction.

mod builder;
mod compact;
mod cones;
mod data;
mod sort;

pub use builder::*;
pub use cones::*;
pub use data::*;
pub use sort::{bucket_sort, coordinate_sort};
