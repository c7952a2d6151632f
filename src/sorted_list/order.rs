//! Three-way comparators that keep a [`SortedKeyList`](super::SortedKeyList) ordered.

use std::cmp::Ordering;

/// A strict total order over `T`.
///
/// Any closure `Fn(&T, &T) -> Ordering` is a `KeyOrder`, so ad-hoc orderings
/// (by a struct field, descending, ...) need no dedicated type.
pub trait KeyOrder<T: ?Sized> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl<T: ?Sized, F> KeyOrder<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// Ascending numeric order.
///
/// Floats are compared with IEEE-754 `total_cmp`, so NaN sorts after every
/// other value instead of breaking the ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumericOrder;

impl KeyOrder<f64> for NumericOrder {
    #[inline]
    fn compare(&self, a: &f64, b: &f64) -> Ordering {
        a.total_cmp(b)
    }
}

impl KeyOrder<f32> for NumericOrder {
    #[inline]
    fn compare(&self, a: &f32, b: &f32) -> Ordering {
        a.total_cmp(b)
    }
}

macro_rules! numeric_order_for_ints {
    ($($t:ty),* $(,)?) => {
        $(
            impl KeyOrder<$t> for NumericOrder {
                #[inline]
                fn compare(&self, a: &$t, b: &$t) -> Ordering {
                    a.cmp(b)
                }
            }
        )*
    };
}

numeric_order_for_ints!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Lexicographic (byte-wise) string order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringOrder;

impl<T> KeyOrder<T> for StringOrder
where
    T: AsRef<str> + ?Sized,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.as_ref().cmp(b.as_ref())
    }
}
