use super::data::ProblemData;
use crate::floats::FloatT;
use std::iter::zip;

const NIL: usize = usize::MAX;

/// Stable bucket sort of the permutation `perm` by `keys[perm[i]]`.
///
/// `keys` is indexed by element id and `perm` must hold each id in
/// `0..keys.len()` exactly once.  Elements with equal keys keep their
/// relative order in `perm`.  Runs in O(max_key + n) time and space.
pub fn bucket_sort(max_key: usize, keys: &[usize], perm: &mut [usize]) {
    debug_assert_eq!(keys.len(), perm.len());

    let mut bucket = vec![NIL; max_key + 1];
    let mut chain = vec![NIL; keys.len()];

    // reverse scan with prepend leaves each bucket chained in the
    // original left to right order
    for &p in perm.iter().rev() {
        chain[p] = bucket[keys[p]];
        bucket[keys[p]] = p;
    }

    let mut pos = 0;
    for head in bucket {
        let mut p = head;
        while p != NIL {
            perm[pos] = p;
            pos += 1;
            p = chain[p];
        }
    }
}

/// Stable lexicographic sort of parallel coordinate columns by the given
/// key columns, most significant first.  The key columns are bucket
/// sorted least significant first against a permutation, and the
/// permutation is applied to every column once the order is final.
pub fn coordinate_sort<T: Copy, const K: usize>(keys: [&mut [usize]; K], vals: &mut [T]) {
    let n = vals.len();
    let mut perm: Vec<usize> = (0..n).collect();

    for key in keys.iter().rev() {
        debug_assert_eq!(key.len(), n);
        let max_key = key.iter().copied().max().unwrap_or(0);
        bucket_sort(max_key, key, &mut perm);
    }

    for key in keys {
        let tmp = key.to_vec();
        permute(key, &tmp, &perm);
    }
    let tmp = vals.to_vec();
    permute(vals, &tmp, &perm);
}

// x[i] = b[p[i]]
fn permute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    debug_assert_eq!(x.len(), b.len());
    debug_assert_eq!(x.len(), p.len());
    zip(p, x).for_each(|(p, x)| *x = b[*p]);
}

impl<T: FloatT> ProblemData<T> {
    /// Brings the scalar map coefficient lists into row-major order:
    /// `f` by (map, block, row, col), `a` by (map, var), `b` by (map).
    pub fn sort_rowmajor(&mut self) {
        let f = &mut self.f;
        coordinate_sort(
            [
                &mut f.subi[..],
                &mut f.subj[..],
                &mut f.subk[..],
                &mut f.subl[..],
            ],
            &mut f.val,
        );

        let a = &mut self.a;
        coordinate_sort([&mut a.subi[..], &mut a.subj[..]], &mut a.val);

        let b = &mut self.b;
        coordinate_sort([&mut b.subi[..]], &mut b.val);
    }

    /// Brings the PSD map coefficient lists into row-major order:
    /// `h` by (psdmap, var, row, col), `d` by (psdmap, row, col).
    pub fn sort_rowmajor_psd(&mut self) {
        let h = &mut self.h;
        coordinate_sort(
            [
                &mut h.subi[..],
                &mut h.subj[..],
                &mut h.subk[..],
                &mut h.subl[..],
            ],
            &mut h.val,
        );

        let d = &mut self.d;
        coordinate_sort(
            [&mut d.subi[..], &mut d.subk[..], &mut d.subl[..]],
            &mut d.val,
        );
    }
}

// -------------
// testing
// -------------
