use std::convert::TryFrom;

/// Number of bucket boundaries `end - k * step` (k = 0, 1, ...) that lie strictly after `start`.
///
/// `None` when `step` is not positive or the count does not fit in `usize`.
#[inline]
pub fn bucket_count(start: i64, end: i64, step: i64) -> Option<usize> {
    if step <= 0 {
        return None;
    }
    if end <= start {
        return Some(0);
    }
    let span = end as i128 - start as i128;
    let step = step as i128;
    usize::try_from((span + step - 1) / step).ok()
}

/// Upper bound reserved for a result sequence: `floor((end - start) / step) + 1`.
///
/// Exceeds [`bucket_count`] by one exactly when `end - start` is a multiple of `step`.
#[inline]
pub fn bucket_capacity(start: i64, end: i64, step: i64) -> Option<usize> {
    if step <= 0 {
        return None;
    }
    if end < start {
        return Some(0);
    }
    let span = end as i128 - start as i128;
    usize::try_from(span / step as i128 + 1).ok()
}

/// Expands a `(start, end, increment)` sweep axis. A zero increment or a degenerate
/// axis yields `start` alone; a descending axis yields nothing.
#[inline]
pub fn expand_axis_i64((start, end, step): (i64, i64, i64)) -> Vec<i64> {
    if step == 0 || start == end {
        return vec![start];
    }
    if step < 0 || start > end {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut v = start;
    while v <= end {
        out.push(v);
        v = match v.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_count_excludes_start() {
        assert_eq!(bucket_count(0, 100, 50), Some(2));
        assert_eq!(bucket_count(0, 100, 30), Some(4));
        assert_eq!(bucket_count(0, 100, 100), Some(1));
        assert_eq!(bucket_count(0, 100, 1000), Some(1));
        assert_eq!(bucket_count(100, 100, 10), Some(0));
        assert_eq!(bucket_count(200, 100, 10), Some(0));
    }

    #[test]
    fn test_bucket_capacity_is_upper_bound() {
        assert_eq!(bucket_capacity(0, 100, 50), Some(3));
        assert_eq!(bucket_capacity(0, 100, 30), Some(4));
        assert_eq!(bucket_capacity(100, 100, 10), Some(1));
        assert_eq!(bucket_capacity(200, 100, 10), Some(0));

        for &(start, end, step) in &[(0i64, 100i64, 7i64), (-50, 50, 10), (3, 4, 1), (0, 1, 5)] {
            let count = bucket_count(start, end, step).unwrap();
            let cap = bucket_capacity(start, end, step).unwrap();
            assert!(count <= cap, "count {} > capacity {}", count, cap);
            let divides = (end - start) % step == 0;
            assert_eq!(cap - count, if divides { 1 } else { 0 });
        }
    }

    #[test]
    fn test_bucket_math_rejects_non_positive_step() {
        assert_eq!(bucket_count(0, 100, 0), None);
        assert_eq!(bucket_count(0, 100, -5), None);
        assert_eq!(bucket_capacity(0, 100, 0), None);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_bucket_math_extreme_span() {
        assert_eq!(bucket_count(i64::MIN, i64::MAX, i64::MAX), Some(3));
        assert_eq!(bucket_count(i64::MIN, i64::MAX, 1), Some(u64::MAX as usize));
        assert_eq!(bucket_capacity(i64::MIN, i64::MAX, 1), None);
    }

    #[test]
    fn test_expand_axis() {
        assert_eq!(expand_axis_i64((10, 10, 0)), vec![10]);
        assert_eq!(expand_axis_i64((10, 40, 0)), vec![10]);
        assert_eq!(expand_axis_i64((10, 40, 10)), vec![10, 20, 30, 40]);
        assert_eq!(expand_axis_i64((10, 45, 10)), vec![10, 20, 30, 40]);
        assert!(expand_axis_i64((40, 10, 10)).is_empty());
        assert!(expand_axis_i64((10, 40, -10)).is_empty());
        assert_eq!(expand_axis_i64((i64::MAX - 1, i64::MAX, 5)), vec![i64::MAX - 1]);
    }
}
