use super::cones::{ConeStack, ObjSense};
use crate::floats::FloatT;
use itertools::izip;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Error type returned by problem data validation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DataError {
    /// Parallel columns of a coefficient list have different lengths
    #[error("columns of the {0} coefficient list have mismatched lengths")]
    RaggedList(&'static str),
    /// A coordinate refers past the end of its index space
    #[error("{list} entry {entry} is out of bounds")]
    IndexOutOfBounds { list: &'static str, entry: usize },
}

// -------------------------------------
// Coefficient lists
// -------------------------------------
//
// All coefficient data is held as parallel coordinate columns, one list
// per coefficient group.  The leading `subi` column always indexes the
// outer space of the list (scalar row, PSD block or variable depending
// on the group); `subk`/`subl` index a position within a symmetric block.
// Keeping the column layout identical across groups lets transformations
// exchange whole lists by swapping structs.

/// Entries of a sparse vector.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct VecCoords<T> {
    pub subi: Vec<usize>,
    pub val: Vec<T>,
}

/// Entries of a sparse matrix in (row, column) coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct MatCoords<T> {
    pub subi: Vec<usize>,
    pub subj: Vec<usize>,
    pub val: Vec<T>,
}

/// Entries addressing a position within one symmetric block.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct SymCoords<T> {
    pub subi: Vec<usize>,
    pub subk: Vec<usize>,
    pub subl: Vec<usize>,
    pub val: Vec<T>,
}

/// Entries pairing an outer row with a block or variable index and a
/// position within the associated symmetric block.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct PsdCoords<T> {
    pub subi: Vec<usize>,
    pub subj: Vec<usize>,
    pub subk: Vec<usize>,
    pub subl: Vec<usize>,
    pub val: Vec<T>,
}

impl<T> VecCoords<T> {
    pub fn len(&self) -> usize {
        self.subi.len()
    }
    pub fn is_empty(&self) -> bool {
        self.subi.is_empty()
    }
    pub fn push(&mut self, subi: usize, val: T) {
        self.subi.push(subi);
        self.val.push(val);
    }
    pub(crate) fn truncate(&mut self, len: usize) {
        self.subi.truncate(len);
        self.val.truncate(len);
    }
    fn check_columns(&self, name: &'static str) -> Result<(), DataError> {
        if self.val.len() != self.subi.len() {
            return Err(DataError::RaggedList(name));
        }
        Ok(())
    }
}

impl<T> MatCoords<T> {
    pub fn len(&self) -> usize {
        self.subi.len()
    }
    pub fn is_empty(&self) -> bool {
        self.subi.is_empty()
    }
    pub fn push(&mut self, subi: usize, subj: usize, val: T) {
        self.subi.push(subi);
        self.subj.push(subj);
        self.val.push(val);
    }
    pub(crate) fn truncate(&mut self, len: usize) {
        self.subi.truncate(len);
        self.subj.truncate(len);
        self.val.truncate(len);
    }
    fn check_columns(&self, name: &'static str) -> Result<(), DataError> {
        let n = self.subi.len();
        if self.subj.len() != n || self.val.len() != n {
            return Err(DataError::RaggedList(name));
        }
        Ok(())
    }
}

impl<T> SymCoords<T> {
    pub fn len(&self) -> usize {
        self.subi.len()
    }
    pub fn is_empty(&self) -> bool {
        self.subi.is_empty()
    }
    pub fn push(&mut self, subi: usize, subk: usize, subl: usize, val: T) {
        self.subi.push(subi);
        self.subk.push(subk);
        self.subl.push(subl);
        self.val.push(val);
    }
    pub(crate) fn truncate(&mut self, len: usize) {
        self.subi.truncate(len);
        self.subk.truncate(len);
        self.subl.truncate(len);
        self.val.truncate(len);
    }
    fn check_columns(&self, name: &'static str) -> Result<(), DataError> {
        let n = self.subi.len();
        if self.subk.len() != n || self.subl.len() != n || self.val.len() != n {
            return Err(DataError::RaggedList(name));
        }
        Ok(())
    }
}

impl<T> PsdCoords<T> {
    pub fn len(&self) -> usize {
        self.subi.len()
    }
    pub fn is_empty(&self) -> bool {
        self.subi.is_empty()
    }
    pub fn push(&mut self, subi: usize, subj: usize, subk: usize, subl: usize, val: T) {
        self.subi.push(subi);
        self.subj.push(subj);
        self.subk.push(subk);
        self.subl.push(subl);
        self.val.push(val);
    }
    pub(crate) fn truncate(&mut self, len: usize) {
        self.subi.truncate(len);
        self.subj.truncate(len);
        self.subk.truncate(len);
        self.subl.truncate(len);
        self.val.truncate(len);
    }
    fn check_columns(&self, name: &'static str) -> Result<(), DataError> {
        let n = self.subi.len();
        if self.subj.len() != n
            || self.subk.len() != n
            || self.subl.len() != n
            || self.val.len() != n
        {
            return Err(DataError::RaggedList(name));
        }
        Ok(())
    }
}

// -------------------------------------
// Problem data
// -------------------------------------

/// Sparse conic problem in the conic benchmark form
///
/// ```text
/// min/max   <OBJF, X̄> + obja'x + objb
/// s.t.      <F_i, X̄> + a_i'x + b_i  ∈ cone stack rows   (scalar maps)
///           Σ_j h_ij x_j + D_i      ⪰ 0                 (PSD maps)
///           X̄_j ⪰ 0,  x ∈ variable cone stack,  x_j integer for j ∈ int_vars
/// ```
///
/// All coefficient groups are coordinate lists over `T` values; scalar row
/// and variable counts are derived from the cone stacks rather than stored.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct ProblemData<T: FloatT = f64> {
    pub objsense: ObjSense,
    /// scalar constraint rows ("maps"), blockwise
    pub con: ConeStack,
    /// scalar variables, blockwise
    pub var: ConeStack,
    /// indices of integer variables
    pub int_vars: Vec<usize>,
    /// side lengths of the PSD constraint blocks
    pub psdcon_dims: Vec<usize>,
    /// side lengths of the PSD variable blocks
    pub psdvar_dims: Vec<usize>,
    /// objective coefficients on PSD variables: (block, row, col)
    pub objf: SymCoords<T>,
    /// objective coefficients on scalar variables: (var)
    pub obja: VecCoords<T>,
    /// objective constant
    pub objb: T,
    /// map coefficients on PSD variables: (map, block, row, col)
    pub f: PsdCoords<T>,
    /// map coefficients on scalar variables: (map, var)
    pub a: MatCoords<T>,
    /// map constants: (map)
    pub b: VecCoords<T>,
    /// PSD map coefficients on scalar variables: (psdmap, var, row, col)
    pub h: PsdCoords<T>,
    /// PSD map constants: (psdmap, row, col)
    pub d: SymCoords<T>,
}

impl<T: FloatT> ProblemData<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scalar constraint rows.
    pub fn mapnum(&self) -> usize {
        self.con.total_dim()
    }

    /// Number of scalar variables.
    pub fn varnum(&self) -> usize {
        self.var.total_dim()
    }

    /// Number of PSD constraint blocks.
    pub fn psdmapnum(&self) -> usize {
        self.psdcon_dims.len()
    }

    /// Number of PSD variable blocks.
    pub fn psdvarnum(&self) -> usize {
        self.psdvar_dims.len()
    }

    /// Checks the structural invariants: parallel columns of every
    /// coefficient list agree in length and every stored coordinate lies
    /// within the index space it refers to.  Symmetric block entries are
    /// not required to lie in one triangle.
    pub fn validate(&self) -> Result<(), DataError> {
        let mapnum = self.mapnum();
        let varnum = self.varnum();

        if let Some(entry) = self.int_vars.iter().position(|&j| j >= varnum) {
            return Err(DataError::IndexOutOfBounds {
                list: "int_vars",
                entry,
            });
        }

        self.objf.check_columns("objf")?;
        for (entry, (&j, &k, &l)) in
            izip!(&self.objf.subi, &self.objf.subk, &self.objf.subl).enumerate()
        {
            if !Self::block_entry_ok(&self.psdvar_dims, j, k, l) {
                return Err(DataError::IndexOutOfBounds {
                    list: "objf",
                    entry,
                });
            }
        }

        self.obja.check_columns("obja")?;
        if let Some(entry) = self.obja.subi.iter().position(|&j| j >= varnum) {
            return Err(DataError::IndexOutOfBounds {
                list: "obja",
                entry,
            });
        }

        self.f.check_columns("f")?;
        for (entry, (&i, &j, &k, &l)) in
            izip!(&self.f.subi, &self.f.subj, &self.f.subk, &self.f.subl).enumerate()
        {
            if i >= mapnum || !Self::block_entry_ok(&self.psdvar_dims, j, k, l) {
                return Err(DataError::IndexOutOfBounds { list: "f", entry });
            }
        }

        self.a.check_columns("a")?;
        for (entry, (&i, &j)) in izip!(&self.a.subi, &self.a.subj).enumerate() {
            if i >= mapnum || j >= varnum {
                return Err(DataError::IndexOutOfBounds { list: "a", entry });
            }
        }

        self.b.check_columns("b")?;
        if let Some(entry) = self.b.subi.iter().position(|&i| i >= mapnum) {
            return Err(DataError::IndexOutOfBounds { list: "b", entry });
        }

        self.h.check_columns("h")?;
        for (entry, (&i, &j, &k, &l)) in
            izip!(&self.h.subi, &self.h.subj, &self.h.subk, &self.h.subl).enumerate()
        {
            if j >= varnum || !Self::block_entry_ok(&self.psdcon_dims, i, k, l) {
                return Err(DataError::IndexOutOfBounds { list: "h", entry });
            }
        }

        self.d.check_columns("d")?;
        for (entry, (&i, &k, &l)) in
            izip!(&self.d.subi, &self.d.subk, &self.d.subl).enumerate()
        {
            if !Self::block_entry_ok(&self.psdcon_dims, i, k, l) {
                return Err(DataError::IndexOutOfBounds { list: "d", entry });
            }
        }

        Ok(())
    }

    fn block_entry_ok(dims: &[usize], block: usize, k: usize, l: usize) -> bool {
        block < dims.len() && k < dims[block] && l < dims[block]
    }
}

// -------------
// testing
// -------------
