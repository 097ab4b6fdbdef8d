//! # DenseND - Trait Implementations
//!
//! - `Index` / `IndexMut` by multi-index slice
//! - `Debug`
//! - `PartialEq` (shape and element-wise equality)
//! - `Add` / `Sub` on references (same shape only)

use super::types::DenseND;
use scirs2_core::ndarray_ext::IxDyn;
use scirs2_core::numeric::Num;
use std::fmt;
use std::ops::{Add, Sub};

impl<T> std::ops::Index<&[usize]> for DenseND<T> {
    type Output = T;
    fn index(&self, index: &[usize]) -> &Self::Output {
        &self.data[IxDyn(index)]
    }
}

impl<T> std::ops::IndexMut<&[usize]> for DenseND<T> {
    fn index_mut(&mut self, index: &[usize]) -> &mut Self::Output {
        &mut self.data[IxDyn(index)]
    }
}

impl<T: fmt::Debug + Clone + Num> fmt::Debug for DenseND<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseND")
            .field("shape", &self.shape())
            .field("rank", &self.rank())
            .field("data", &self.data)
            .finish()
    }
}

impl<T: PartialEq> PartialEq for DenseND<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

/// Element-wise sum; panics on shape mismatch like the underlying ndarray.
impl<'a, T> Add<&'a DenseND<T>> for &'a DenseND<T>
where
    T: Clone + Num,
{
    type Output = DenseND<T>;

    fn add(self, rhs: &'a DenseND<T>) -> DenseND<T> {
        assert!(
            self.same_shape(rhs),
            "Shape mismatch in add: {:?} vs {:?}",
            self.shape(),
            rhs.shape()
        );
        DenseND::from_array(&self.data + &rhs.data)
    }
}

impl<'a, T> Sub<&'a DenseND<T>> for &'a DenseND<T>
where
    T: Clone + Num,
{
    type Output = DenseND<T>;

    fn sub(self, rhs: &'a DenseND<T>) -> DenseND<T> {
        assert!(
            self.same_shape(rhs),
            "Shape mismatch in sub: {:?} vs {:?}",
            self.shape(),
            rhs.shape()
        );
        DenseND::from_array(&self.data - &rhs.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        let mut tensor = DenseND::<f64>::zeros(&[2, 3, 4]);
        tensor[&[1, 2, 3]] = 7.5;
        assert_eq!(tensor[&[1, 2, 3]], 7.5);
        assert_eq!(tensor[&[0, 0, 0]], 0.0);
    }

    #[test]
    fn test_eq_compares_shape() {
        let a = DenseND::<f64>::zeros(&[2, 3]);
        let b = DenseND::<f64>::zeros(&[3, 2]);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_add_sub() {
        let a = DenseND::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let b = DenseND::from_vec(vec![0.5, 0.5, 1.0, 1.0], &[2, 2]).unwrap();

        let sum = &a + &b;
        assert_eq!(sum.to_vec(), vec![1.5, 2.5, 4.0, 5.0]);
        let diff = &sum - &b;
        assert_eq!(diff, a);
    }

    #[test]
    #[should_panic(expected = "Shape mismatch")]
    fn test_add_shape_mismatch_panics() {
        let a = DenseND::<f64>::zeros(&[2, 2]);
        let b = DenseND::<f64>::zeros(&[4]);
        let _ = &a + &b;
    }
}
