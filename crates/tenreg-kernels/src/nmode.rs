//! Mode-n product (tensor times matrix)
//!
//! For X with shape (I₁, …, Iₙ) and M with shape (J, Iₖ) the mode-k product
//! Y = X ×ₖ M has shape (I₁, …, J, …, Iₙ) and `Y_(k) = M · X_(k)`.
//!
//! With 1 × Iₖ row matrices the product contracts mode k down to size 1,
//! which is how the regression model evaluates `<Xᵢ, ⊗ₖ aₖ>` for a whole
//! batch without forming the rank-one tensor.

use crate::error::{KernelError, KernelResult};
use scirs2_core::ndarray_ext::ArrayView2;
use scirs2_core::numeric::Float;
use tenreg_core::DenseND;

/// Compute the mode-n product of a tensor and a matrix
///
/// # Errors
///
/// Returns [`KernelError::InvalidMode`] if `mode` is out of bounds and
/// [`KernelError::DimensionMismatch`] if the matrix column count differs
/// from `tensor.shape()[mode]`.
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use tenreg_core::DenseND;
/// use tenreg_kernels::nmode_product;
///
/// let tensor = DenseND::from_vec((0..24).map(|x| x as f64).collect(), &[2, 3, 4]).unwrap();
/// let matrix = array![[1.0, 0.0, 0.0],
///                     [0.0, 1.0, 0.0],
///                     [0.0, 0.0, 1.0],
///                     [1.0, 1.0, 0.0],
///                     [0.0, 1.0, 1.0]];
///
/// let result = nmode_product(&tensor, &matrix.view(), 1).unwrap();
/// assert_eq!(result.shape(), &[2, 5, 4]);
/// assert_eq!(result[&[0, 3, 0]], tensor[&[0, 0, 0]] + tensor[&[0, 1, 0]]);
/// ```
pub fn nmode_product<T>(
    tensor: &DenseND<T>,
    matrix: &ArrayView2<T>,
    mode: usize,
) -> KernelResult<DenseND<T>>
where
    T: Float + 'static,
{
    let rank = tensor.rank();
    if mode >= rank {
        return Err(KernelError::invalid_mode(mode, rank, "nmode_product"));
    }

    let mode_size = tensor.shape()[mode];
    let (rows, cols) = matrix.dim();
    if cols != mode_size {
        return Err(KernelError::dimension_mismatch(
            "nmode_product",
            vec![rows, mode_size],
            vec![rows, cols],
            format!("matrix columns must match tensor mode-{} size", mode),
        ));
    }

    let unfolded = tensor
        .unfold(mode)
        .map_err(|e| KernelError::from_tensor("nmode_product", e))?;
    let product = matrix.dot(&unfolded);

    let mut new_shape = tensor.shape_vec();
    new_shape[mode] = rows;
    DenseND::fold(&product, &new_shape, mode)
        .map_err(|e| KernelError::from_tensor("nmode_product", e))
}

/// Apply several mode-n products in order
///
/// Each entry is `(matrix, mode)`; the mode refers to the tensor as it is
/// after the preceding products (mode sizes change, mode indices do not).
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use tenreg_core::DenseND;
/// use tenreg_kernels::nmode_products_seq;
///
/// // Contract a (2, 3, 2) batch against a rank-one weight u ⊗ v
/// let batch = DenseND::<f64>::ones(&[2, 3, 2]);
/// let u = array![[1.0, 2.0, 3.0]];
/// let v = array![[1.0, -1.0]];
///
/// let out = nmode_products_seq(&batch, &[(u.view(), 1), (v.view(), 2)]).unwrap();
/// assert_eq!(out.shape(), &[2, 1, 1]);
/// assert_eq!(out.to_vec(), vec![0.0, 0.0]);
/// ```
pub fn nmode_products_seq<T>(
    tensor: &DenseND<T>,
    matrices: &[(ArrayView2<T>, usize)],
) -> KernelResult<DenseND<T>>
where
    T: Float + 'static,
{
    let mut result = tensor.clone();
    for (matrix, mode) in matrices {
        result = nmode_product(&result, matrix, *mode)?;
    }
    Ok(result)
}
