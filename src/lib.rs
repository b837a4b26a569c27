//! __conicbench__ is a toolkit for reading, transforming and writing
//! linear, second order conic and semidefinite optimization problems
//! stored in the Conic Benchmark Format (CBF).  Problems take the form
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & \sum_j \langle F_j, X_j\rangle + a^T x + b\\\\\[2ex\]
//! \text{subject to} & \sum_j \langle F_{ij}, X_j\rangle + A_i x + b_i \in \mathcal{K} \\\\\[1ex\]
//! & \sum_j x_j H_{ij} + D_i \succeq 0 \\\\\[1ex\]
//! & x \in \mathcal{K}_x, \quad X_j \succeq 0
//! \end{array}
//! $$
//!
//! with scalar variables $x$, semidefinite matrix variables $X_j$, and
//! affine maps constrained to products of free, nonnegative,
//! nonpositive, zero, quadratic and rotated quadratic cones.  A subset
//! of the scalar variables may be marked as integer.
//!
//! ## Features
//!
//! * __File formats__: problems are read from CBF files and written back
//!   to CBF, to the MOSEK and CPLEX dialects of the MPS format, or to the
//!   sparse SDPA format, subject to what each format can express.
//!
//! * __Transformations__: problems can be replaced by their conic dual,
//!   compacted by dropping unused rows of the affine maps, and stripped
//!   of explicit zero coefficients.
//!
//! * __Model building__: [`problem::ProblemBuilder`] grows a problem
//!   incrementally, merging neighbouring cone blocks of the same kind
//!   and expanding variable bounds into rows of the affine map.
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

pub mod floats;
pub mod io;
pub mod problem;
pub mod transforms;
