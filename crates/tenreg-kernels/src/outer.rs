//! Outer products and CP (Kruskal) tensors
//!
//! A CP tensor with factors A₁ (I₁ × R), …, A_d (I_d × R) and optional
//! component weights λ is `W = Σ_c λ_c · A₁[:, c] ∘ … ∘ A_d[:, c]`.

use crate::error::{KernelError, KernelResult};
use crate::khatri_rao::khatri_rao_seq;
use scirs2_core::ndarray_ext::{Array1, Array2, ArrayView1, ArrayView2};
use scirs2_core::numeric::Float;
use tenreg_core::DenseND;

/// Outer product of one or more vectors
///
/// `T[i₁, …, iₙ] = v₁[i₁] · … · vₙ[iₙ]`
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use tenreg_kernels::outer_product;
///
/// let v1 = array![1.0, 2.0];
/// let v2 = array![3.0, 4.0, 5.0];
/// let v3 = array![6.0, 7.0];
///
/// let tensor = outer_product(&[v1.view(), v2.view(), v3.view()]).unwrap();
/// assert_eq!(tensor.shape(), &[2, 3, 2]);
/// assert_eq!(tensor[&[1, 2, 1]], 2.0 * 5.0 * 7.0);
/// ```
pub fn outer_product<T>(vectors: &[ArrayView1<T>]) -> KernelResult<DenseND<T>>
where
    T: Float,
{
    if vectors.is_empty() {
        return Err(KernelError::empty_input("outer_product", "vectors"));
    }

    let shape: Vec<usize> = vectors.iter().map(|v| v.len()).collect();
    let mut result = DenseND::zeros(&shape);
    result.fill_with(|idx| {
        idx.iter()
            .zip(vectors)
            .fold(T::one(), |acc, (&i, v)| acc * v[i])
    });
    Ok(result)
}

/// Reconstruct the dense tensor of a CP model
///
/// The row-major flattening of W equals `(A₁ ⊙ … ⊙ A_d) · λ`, so the
/// reconstruction is one Khatri-Rao product and one matrix–vector product.
///
/// # Errors
///
/// Returns an error if `factors` is empty, the factors disagree on R, or
/// `weights` does not have R entries.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use tenreg_kernels::cp_reconstruct;
///
/// let a = array![[1.0, 0.0], [0.0, 1.0]];
/// let b = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
///
/// let w = cp_reconstruct(&[a.view(), b.view()], None).unwrap();
/// assert_eq!(w.shape(), &[2, 3]);
/// assert_eq!(w[&[0, 1]], 3.0);
/// assert_eq!(w[&[1, 2]], 6.0);
/// ```
pub fn cp_reconstruct<T>(
    factors: &[ArrayView2<T>],
    weights: Option<&ArrayView1<T>>,
) -> KernelResult<DenseND<T>>
where
    T: Float + Send + Sync + 'static,
{
    let kr = khatri_rao_seq(factors, None)?;
    let rank = kr.ncols();

    let lambda = match weights {
        Some(w) if w.len() != rank => {
            return Err(KernelError::dimension_mismatch(
                "cp_reconstruct",
                vec![rank],
                vec![w.len()],
                "one weight per component",
            ))
        }
        Some(w) => w.to_owned(),
        None => Array1::from_elem(rank, T::one()),
    };

    let shape: Vec<usize> = factors.iter().map(|f| f.nrows()).collect();
    let flat = kr.dot(&lambda);
    DenseND::from_vec(flat.to_vec(), &shape)
        .map_err(|e| KernelError::from_tensor("cp_reconstruct", e))
}

/// Frobenius norm of a CP tensor, computed from the factors alone
///
/// Uses `‖W‖² = Σ_{c,c'} Π_k (A_kᵀ A_k)[c, c']`, costing O(R² Σ I_k) instead
/// of materialising the Π I_k entries of W.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use tenreg_kernels::{cp_norm, cp_reconstruct};
///
/// let a = array![[1.0f64, 2.0], [0.5, -1.0]];
/// let b = array![[3.0, 0.0], [1.0, 1.0], [2.0, -2.0]];
/// let dense = cp_reconstruct(&[a.view(), b.view()], None).unwrap();
/// let norm = cp_norm(&[a.view(), b.view()]).unwrap();
/// assert!((norm - dense.frobenius_norm()).abs() < 1e-12);
/// ```
pub fn cp_norm<T>(factors: &[ArrayView2<T>]) -> KernelResult<T>
where
    T: Float + 'static,
{
    let first = factors
        .first()
        .ok_or_else(|| KernelError::empty_input("cp_norm", "factors"))?;
    let rank = first.ncols();

    let mut gram = Array2::<T>::ones((rank, rank));
    for (idx, factor) in factors.iter().enumerate() {
        if factor.ncols() != rank {
            return Err(KernelError::rank_mismatch(
                "cp_norm",
                rank,
                factor.ncols(),
                idx,
            ));
        }
        gram = gram * factor.t().dot(factor);
    }

    // Round-off can push the sum a hair below zero when W ≈ 0
    Ok(gram.sum().max(T::zero()).sqrt())
}
