//! Khatri-Rao product (column-wise Kronecker product)
//!
//! For matrices A (I × R) and B (J × R) the Khatri-Rao product C = A ⊙ B is
//! (I·J × R) and row `i·J + j` of C is the element-wise product of row i of A
//! and row j of B. The first operand varies slowest, which matches the
//! row-major flattening used by `DenseND::unfold` and `partial_unfold`.
//!
//! Tensor regression only ever needs the product of *all factors but one*,
//! so [`khatri_rao_seq`] takes the full factor list and an optional index to
//! leave out.

use crate::error::{KernelError, KernelResult};
use scirs2_core::ndarray_ext::{Array2, ArrayView2};
use scirs2_core::numeric::Num;

/// Element count above which `khatri_rao_seq` switches to the parallel kernel
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 1 << 16;

/// Compute the Khatri-Rao product of two matrices
///
/// # Panics
///
/// Panics if the number of columns in A and B don't match. Use
/// [`khatri_rao_seq`] for a checked version.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use tenreg_kernels::khatri_rao;
///
/// let a = array![[1.0, 2.0], [3.0, 4.0]];
/// let b = array![[5.0, 6.0], [7.0, 8.0]];
/// let c = khatri_rao(&a.view(), &b.view());
/// assert_eq!(c.shape(), &[4, 2]);
///
/// // First column: [1*5, 1*7, 3*5, 3*7]
/// assert_eq!(c.column(0).to_vec(), vec![5.0, 7.0, 15.0, 21.0]);
/// ```
pub fn khatri_rao<T>(a: &ArrayView2<T>, b: &ArrayView2<T>) -> Array2<T>
where
    T: Clone + Num,
{
    let (i, r) = a.dim();
    let (j, r_b) = b.dim();
    assert_eq!(
        r, r_b,
        "Number of columns must match: A has {} columns, B has {} columns",
        r, r_b
    );

    let mut result = Array2::<T>::zeros((i * j, r));
    for ia in 0..i {
        let a_row = a.row(ia);
        for ib in 0..j {
            let b_row = b.row(ib);
            let mut out = result.row_mut(ia * j + ib);
            for c in 0..r {
                out[c] = a_row[c].clone() * b_row[c].clone();
            }
        }
    }

    result
}

/// Compute the Khatri-Rao product of two matrices, rows in parallel
///
/// # Panics
///
/// Panics if the number of columns in A and B don't match.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use tenreg_kernels::{khatri_rao, khatri_rao_parallel};
///
/// let a = array![[1.0, 2.0], [3.0, 4.0]];
/// let b = array![[5.0, 6.0], [7.0, 8.0]];
/// assert_eq!(
///     khatri_rao_parallel(&a.view(), &b.view()),
///     khatri_rao(&a.view(), &b.view())
/// );
/// ```
#[cfg(feature = "parallel")]
pub fn khatri_rao_parallel<T>(a: &ArrayView2<T>, b: &ArrayView2<T>) -> Array2<T>
where
    T: Clone + Num + Send + Sync,
{
    use scirs2_core::ndarray_ext::Axis;
    use scirs2_core::parallel_ops::*;

    let (i, r) = a.dim();
    let (j, r_b) = b.dim();
    assert_eq!(
        r, r_b,
        "Number of columns must match: A has {} columns, B has {} columns",
        r, r_b
    );

    let mut result = Array2::<T>::zeros((i * j, r));
    result
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(row, mut out)| {
            let (ia, ib) = (row / j, row % j);
            for c in 0..r {
                out[c] = a[[ia, c]].clone() * b[[ib, c]].clone();
            }
        });

    result
}

/// Khatri-Rao product of a list of matrices, optionally skipping one
///
/// Computes `M₀ ⊙ M₁ ⊙ … ⊙ M_{n-1}` in list order with `M_skip` left out.
/// The result has `Π rows(Mᵢ)` rows (over participating matrices) and R
/// columns. When no matrix participates (a single matrix that is skipped)
/// the result is the `1 × R` all-ones matrix, the neutral element of ⊙.
///
/// Large products are computed with [`khatri_rao_parallel`] when the
/// `parallel` feature is enabled.
///
/// # Errors
///
/// - [`KernelError::EmptyInput`] if `matrices` is empty
/// - [`KernelError::InvalidMode`] if `skip` is out of range
/// - [`KernelError::RankMismatch`] if the matrices disagree on R
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use tenreg_kernels::khatri_rao_seq;
///
/// let a = array![[1.0, 2.0], [3.0, 4.0]];
/// let b = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
/// let c = array![[5.0, 6.0]];
///
/// let all = khatri_rao_seq(&[a.view(), b.view(), c.view()], None).unwrap();
/// assert_eq!(all.shape(), &[6, 2]);
///
/// let without_b = khatri_rao_seq(&[a.view(), b.view(), c.view()], Some(1)).unwrap();
/// assert_eq!(without_b.shape(), &[2, 2]);
/// assert_eq!(without_b[[1, 1]], 24.0);
/// ```
pub fn khatri_rao_seq<T>(
    matrices: &[ArrayView2<T>],
    skip: Option<usize>,
) -> KernelResult<Array2<T>>
where
    T: Clone + Num + Send + Sync,
{
    let first = matrices
        .first()
        .ok_or_else(|| KernelError::empty_input("khatri_rao_seq", "matrices"))?;

    if let Some(s) = skip {
        if s >= matrices.len() {
            return Err(KernelError::invalid_mode(
                s,
                matrices.len(),
                "khatri_rao_seq: skip index",
            ));
        }
    }

    let rank = first.ncols();
    for (idx, m) in matrices.iter().enumerate() {
        if m.ncols() != rank {
            return Err(KernelError::rank_mismatch(
                "khatri_rao_seq",
                rank,
                m.ncols(),
                idx,
            ));
        }
    }

    let mut acc: Option<Array2<T>> = None;
    for (idx, m) in matrices.iter().enumerate() {
        if Some(idx) == skip {
            continue;
        }
        acc = Some(match acc {
            None => m.to_owned(),
            Some(prev) => pairwise(&prev.view(), m),
        });
    }

    Ok(acc.unwrap_or_else(|| Array2::ones((1, rank))))
}

fn pairwise<T>(a: &ArrayView2<T>, b: &ArrayView2<T>) -> Array2<T>
where
    T: Clone + Num + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        if a.nrows() * b.nrows() * a.ncols() >= PARALLEL_THRESHOLD {
            return khatri_rao_parallel(a, b);
        }
    }
    khatri_rao(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;

    #[test]
    fn test_khatri_rao_basic() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[5.0, 6.0], [7.0, 8.0]];
        let c = khatri_rao(&a.view(), &b.view());

        assert_eq!(c.shape(), &[4, 2]);
        assert_eq!(c.column(0).to_vec(), vec![5.0, 7.0, 15.0, 21.0]);
        assert_eq!(c.column(1).to_vec(), vec![12.0, 16.0, 24.0, 32.0]);
    }

    #[test]
    fn test_khatri_rao_different_row_sizes() {
        let a = array![[1.0], [2.0], [3.0]];
        let b = array![[4.0], [5.0]];
        let c = khatri_rao(&a.view(), &b.view());

        assert_eq!(c.shape(), &[6, 1]);
        assert_eq!(c.column(0).to_vec(), vec![4.0, 5.0, 8.0, 10.0, 12.0, 15.0]);
    }

    #[test]
    #[should_panic(expected = "Number of columns must match")]
    fn test_khatri_rao_mismatched_columns() {
        let a = array![[1.0, 2.0, 3.0]];
        let b = array![[4.0, 5.0]];
        khatri_rao(&a.view(), &b.view());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_khatri_rao_parallel_matches_serial() {
        let a = array![[1.0, 2.0], [3.0, 4.0], [-1.0, 0.5]];
        let b = array![[5.0, 6.0], [7.0, 8.0]];
        assert_eq!(
            khatri_rao_parallel(&a.view(), &b.view()),
            khatri_rao(&a.view(), &b.view())
        );
    }

    #[test]
    fn test_seq_matches_chained_pairwise() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[0.5, -1.0], [2.0, 1.0], [1.0, 3.0]];
        let c = array![[2.0, 1.0], [-2.0, 4.0]];

        let expected = khatri_rao(&khatri_rao(&a.view(), &b.view()).view(), &c.view());
        let got = khatri_rao_seq(&[a.view(), b.view(), c.view()], None).unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_seq_skip_middle() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[9.0, 9.0]];
        let c = array![[2.0, 1.0], [-2.0, 4.0]];

        let got = khatri_rao_seq(&[a.view(), b.view(), c.view()], Some(1)).unwrap();
        assert_eq!(got, khatri_rao(&a.view(), &c.view()));
    }

    #[test]
    fn test_seq_skip_only_matrix_is_ones() {
        let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let got = khatri_rao_seq(&[a.view()], Some(0)).unwrap();
        assert_eq!(got, array![[1.0, 1.0, 1.0]]);
    }

    #[test]
    fn test_seq_errors() {
        let a = array![[1.0, 2.0]];
        let b = array![[1.0, 2.0, 3.0]];

        let empty: [ArrayView2<f64>; 0] = [];
        assert!(matches!(
            khatri_rao_seq(&empty, None),
            Err(KernelError::EmptyInput { .. })
        ));
        assert!(matches!(
            khatri_rao_seq(&[a.view(), b.view()], None),
            Err(KernelError::RankMismatch {
                factor_index: 1,
                ..
            })
        ));
        assert!(matches!(
            khatri_rao_seq(&[a.view()], Some(1)),
            Err(KernelError::InvalidMode { .. })
        ));
    }
}
