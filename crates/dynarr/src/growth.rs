//! Growth policy for full arrays.
//!
//! The policy is fixed at compile time: a full array of capacity `c` grows
//! to `c * GROWTH_FACTOR + GROWTH_INCREMENT` slots. The increment makes the
//! first insertion into an empty array allocate one slot, and the factor
//! keeps the total number of relocations over `n` pushes below `2n`.

/// Multiplier applied to the current capacity when growing.
pub const GROWTH_FACTOR: usize = 2;

/// Slots added after multiplying, so that growth from zero is possible.
pub const GROWTH_INCREMENT: usize = 1;

/// Capacity an array of capacity `current` grows to when full.
///
/// Returns `None` if the result does not fit in a `usize`.
///
/// ```
/// use dynarr::growth::next_capacity;
///
/// assert_eq!(next_capacity(0), Some(1));
/// assert_eq!(next_capacity(1), Some(3));
/// assert_eq!(next_capacity(3), Some(7));
/// assert_eq!(next_capacity(usize::MAX), None);
/// ```
pub const fn next_capacity(current: usize) -> Option<usize> {
    match current.checked_mul(GROWTH_FACTOR) {
        Some(scaled) => scaled.checked_add(GROWTH_INCREMENT),
        None => None,
    }
}

/// Capacity after `n` growth steps starting from an empty array.
///
/// Saturates at `usize::MAX` instead of overflowing.
pub const fn capacity_after(n: u32) -> usize {
    let mut cap = 0usize;
    let mut i = 0;
    while i < n {
        cap = match next_capacity(cap) {
            Some(next) => next,
            None => return usize::MAX,
        };
        i += 1;
    }
    cap
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_from_empty_is_two_to_the_n_minus_one() {
        for n in 0..20u32 {
            assert_eq!(capacity_after(n), (1usize << n) - 1);
        }
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(next_capacity(usize::MAX / 2 + 1), None);
        assert_eq!(next_capacity(usize::MAX / 2), Some(usize::MAX));
    }

    #[test]
    fn capacity_after_saturates() {
        assert_eq!(capacity_after(200), usize::MAX);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn growth_is_strict(cap in 0usize..(usize::MAX / 2)) {
                let next = next_capacity(cap).unwrap();
                prop_assert_eq!(next, cap * 2 + 1);
                prop_assert!(next > cap);
            }
        }
    }
}
