use crate::graph::{Index, Vartype};
use smallvec::SmallVec;

/// Remove pairs of equal neighbors, so `[0, 0, 0, 1, 2, 2]` becomes `[0, 1]`.
/// Assumes the vector is sorted.
pub(crate) fn remove_doubles<A: smallvec::Array>(v: &mut SmallVec<A>)
where
    A::Item: Eq + Copy,
{
    let mut ii = 0;
    let mut jj = 0;
    while jj + 1 < v.len() {
        if v[jj] == v[jj + 1] {
            jj += 2;
        } else {
            v[ii] = v[jj];
            ii += 1;
            jj += 1;
        }
    }
    if jj < v.len() {
        v[ii] = v[jj];
        ii += 1;
    }
    v.truncate(ii);
}

/// Sort a polynomial key and fold repeated variables: `x*x = x` for binaries,
/// `s*s = 1` for spins.
pub(crate) fn canonicalize_key<A: smallvec::Array<Item = Index>>(
    key: &mut SmallVec<A>,
    vartype: Vartype,
) {
    key.sort_unstable();
    match vartype {
        Vartype::Binary => key.dedup(),
        Vartype::Spin => remove_doubles(key),
    }
}
