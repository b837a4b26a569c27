use super::cones::ConeStack;
use super::data::ProblemData;
use crate::floats::FloatT;

// In-place row compaction over the coordinate lists.  The write cursor of
// every list trails its read cursor, so entries are rewritten before they
// are read again and the lists are truncated at the end.

impl<T: FloatT> ProblemData<T> {
    /// Deletes the flagged scalar constraint rows and renumbers the rest
    /// consecutively.  The coefficient lists are brought into row-major
    /// order, entries of deleted rows are dropped, explicit zeros are
    /// dropped from the surviving rows as well, and cone blocks whose
    /// rows are all deleted disappear from the stack.
    ///
    /// `delete.len()` must equal [`mapnum`](ProblemData::mapnum).
    pub fn compact_rows(&mut self, delete: &[bool]) {
        debug_assert_eq!(delete.len(), self.mapnum());
        self.compress_maps(Some(delete));
    }

    /// Deletes the flagged PSD constraint blocks, renumbering the rest
    /// and dropping explicit zeros from the surviving blocks.
    ///
    /// `delete.len()` must equal [`psdmapnum`](ProblemData::psdmapnum).
    pub fn compact_psd_rows(&mut self, delete: &[bool]) {
        debug_assert_eq!(delete.len(), self.psdmapnum());
        self.compress_psdmaps(Some(delete));
    }

    /// Drops every explicitly stored zero coefficient from the scalar and
    /// PSD map lists, leaving the row structure unchanged.  The lists end
    /// up in row-major order.
    pub fn eliminate_zeros(&mut self) {
        self.compress_maps(None);
        self.compress_psdmaps(None);
    }

    pub(crate) fn compress_maps(&mut self, delete: Option<&[bool]>) {
        self.sort_rowmajor();

        let old_stack = std::mem::take(&mut self.con);
        let mut stack = ConeStack::new();

        let (mut fbeg, mut abeg, mut bbeg) = (0, 0, 0);
        let (mut fnnz, mut annz, mut bnnz) = (0, 0, 0);
        let mut mapnum = 0;
        let mut rbeg = 0;

        for (cone, dim) in old_stack.iter() {
            let mut newdim = 0;

            for r in rbeg..rbeg + dim {
                if delete.is_some_and(|del| del[r]) {
                    // skip every entry of the deleted row
                    while fbeg < self.f.len() && self.f.subi[fbeg] <= r {
                        fbeg += 1;
                    }
                    while abeg < self.a.len() && self.a.subi[abeg] <= r {
                        abeg += 1;
                    }
                    while bbeg < self.b.len() && self.b.subi[bbeg] <= r {
                        bbeg += 1;
                    }
                    continue;
                }

                while fbeg < self.f.len() && self.f.subi[fbeg] == r {
                    if self.f.val[fbeg] != T::zero() {
                        self.f.subi[fnnz] = mapnum;
                        self.f.subj[fnnz] = self.f.subj[fbeg];
                        self.f.subk[fnnz] = self.f.subk[fbeg];
                        self.f.subl[fnnz] = self.f.subl[fbeg];
                        self.f.val[fnnz] = self.f.val[fbeg];
                        fnnz += 1;
                    }
                    fbeg += 1;
                }

                while abeg < self.a.len() && self.a.subi[abeg] == r {
                    if self.a.val[abeg] != T::zero() {
                        self.a.subi[annz] = mapnum;
                        self.a.subj[annz] = self.a.subj[abeg];
                        self.a.val[annz] = self.a.val[abeg];
                        annz += 1;
                    }
                    abeg += 1;
                }

                while bbeg < self.b.len() && self.b.subi[bbeg] == r {
                    if self.b.val[bbeg] != T::zero() {
                        self.b.subi[bnnz] = mapnum;
                        self.b.val[bnnz] = self.b.val[bbeg];
                        bnnz += 1;
                    }
                    bbeg += 1;
                }

                mapnum += 1;
                newdim += 1;
            }

            if newdim > 0 {
                stack.push(cone, newdim);
            }
            rbeg += dim;
        }

        self.con = stack;
        self.f.truncate(fnnz);
        self.a.truncate(annz);
        self.b.truncate(bnnz);
    }

    pub(crate) fn compress_psdmaps(&mut self, delete: Option<&[bool]>) {
        self.sort_rowmajor_psd();

        let psdmapnum = self.psdmapnum();
        let (mut hbeg, mut dbeg) = (0, 0);
        let (mut hnnz, mut dnnz) = (0, 0);
        let mut deleted = 0;

        for r in 0..psdmapnum {
            if delete.is_some_and(|del| del[r]) {
                deleted += 1;
                while hbeg < self.h.len() && self.h.subi[hbeg] <= r {
                    hbeg += 1;
                }
                while dbeg < self.d.len() && self.d.subi[dbeg] <= r {
                    dbeg += 1;
                }
                continue;
            }

            while hbeg < self.h.len() && self.h.subi[hbeg] == r {
                if self.h.val[hbeg] != T::zero() {
                    self.h.subi[hnnz] = r - deleted;
                    self.h.subj[hnnz] = self.h.subj[hbeg];
                    self.h.subk[hnnz] = self.h.subk[hbeg];
                    self.h.subl[hnnz] = self.h.subl[hbeg];
                    self.h.val[hnnz] = self.h.val[hbeg];
                    hnnz += 1;
                }
                hbeg += 1;
            }

            while dbeg < self.d.len() && self.d.subi[dbeg] == r {
                if self.d.val[dbeg] != T::zero() {
                    self.d.subi[dnnz] = r - deleted;
                    self.d.subk[dnnz] = self.d.subk[dbeg];
                    self.d.subl[dnnz] = self.d.subl[dbeg];
                    self.d.val[dnnz] = self.d.val[dbeg];
                    dnnz += 1;
                }
                dbeg += 1;
            }
        }

        self.h.truncate(hnnz);
        self.d.truncate(dnnz);

        if let Some(del) = delete {
            let mut flags = del.iter();
            self.psdcon_dims.retain(|_| !*flags.next().unwrap());
        }
    }
}

// -------------
// testing
// -------------
