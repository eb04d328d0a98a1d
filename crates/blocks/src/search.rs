//! Binary search helpers over index ranges.
//!
//! Columns here are usually spread across structs (stop times of a block,
//! members of a chain), so the searches take a predicate on the index
//! instead of a slice.

use std::ops::Range;

/// First index in `range` for which `is_before` is false.
///
/// `is_before` must hold for a (possibly empty) prefix of the range and
/// fail for the rest.
pub fn lower_bound(range: Range<usize>, mut is_before: impl FnMut(usize) -> bool) -> usize {
    let (mut lo, mut hi) = (range.start, range.end);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if is_before(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Same answer as [`lower_bound`], probing forward from `range.start` with
/// doubling steps first.
///
/// Cost is logarithmic in the distance between `range.start` and the
/// answer, which makes repeated searches that advance a little each time
/// close to constant.
pub fn gallop_lower_bound(range: Range<usize>, mut is_before: impl FnMut(usize) -> bool) -> usize {
    let mut lo = range.start;
    let mut step = 1usize;
    while lo < range.end {
        let candidate = lo.saturating_add(step - 1).min(range.end - 1);
        if !is_before(candidate) {
            return lower_bound(lo..candidate, &mut is_before);
        }
        lo = candidate + 1;
        step = step.saturating_mul(2);
    }
    range.end
}
