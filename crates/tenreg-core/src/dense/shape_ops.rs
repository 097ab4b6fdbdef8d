//! Shape manipulation operations on tensors
//!
//! This module provides reshape, permute, mode-n unfold/fold (matricization /
//! tensorization) and the batch-preserving variants used by tensor
//! regression: `partial_unfold`, `partial_fold` and `partial_vec`.
//!
//! All flattening follows row-major (C) order: when several axes are merged,
//! the last one varies fastest.

use super::types::DenseND;
use scirs2_core::ndarray_ext::{Array2, Ix2, IxDyn};
use scirs2_core::numeric::Num;

impl<T> DenseND<T>
where
    T: Clone + Num,
{
    /// Reshape the tensor to a new shape
    ///
    /// Elements are read in logical row-major order regardless of the current
    /// memory layout.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenreg_core::DenseND;
    ///
    /// let tensor = DenseND::<f64>::zeros(&[2, 3, 4]);
    /// let reshaped = tensor.reshape(&[6, 4]).unwrap();
    /// assert_eq!(reshaped.shape(), &[6, 4]);
    /// ```
    pub fn reshape(&self, new_shape: &[usize]) -> anyhow::Result<Self> {
        let new_size: usize = new_shape.iter().product();
        let old_size = self.len();
        if new_size != old_size {
            anyhow::bail!(
                "Cannot reshape tensor of size {} into shape {:?} (size {})",
                old_size,
                new_shape,
                new_size
            );
        }
        if let Ok(reshaped) = self.data.view().into_shape_with_order(IxDyn(new_shape)) {
            Ok(Self {
                data: reshaped.to_owned(),
            })
        } else {
            let flat: Vec<T> = self.data.iter().cloned().collect();
            Self::from_vec(flat, new_shape)
        }
    }

    /// Permute (transpose) the axes of the tensor.
    ///
    /// # Errors
    ///
    /// Returns an error if `axes` is not a valid permutation of `0..rank`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenreg_core::DenseND;
    ///
    /// let tensor = DenseND::<f64>::zeros(&[2, 3, 4]);
    /// let permuted = tensor.permute(&[2, 0, 1]).unwrap();
    /// assert_eq!(permuted.shape(), &[4, 2, 3]);
    /// ```
    pub fn permute(&self, axes: &[usize]) -> anyhow::Result<Self> {
        if axes.len() != self.rank() {
            anyhow::bail!(
                "Permutation axes length {} does not match tensor rank {}",
                axes.len(),
                self.rank()
            );
        }
        let mut seen = vec![false; self.rank()];
        for &axis in axes {
            if axis >= self.rank() {
                anyhow::bail!("Invalid axis {} for rank {}", axis, self.rank());
            }
            if seen[axis] {
                anyhow::bail!("Duplicate axis {} in permutation", axis);
            }
            seen[axis] = true;
        }
        let permuted = self.data.clone().permuted_axes(IxDyn(axes));
        Ok(Self { data: permuted })
    }

    /// Flatten the tensor to 1D in row-major order
    pub fn flatten(&self) -> Self {
        Self {
            data: scirs2_core::ndarray_ext::Array1::from(self.to_vec()).into_dyn(),
        }
    }

    /// Unfold (matricize) the tensor along a specific mode.
    ///
    /// The result has `shape[mode]` rows; the remaining axes, in their
    /// original order, are merged row-major into the columns.
    ///
    /// # Errors
    ///
    /// Returns an error if mode is out of bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenreg_core::DenseND;
    ///
    /// let tensor = DenseND::<f64>::from_vec((0..24).map(|x| x as f64).collect(), &[2, 3, 4])
    ///     .unwrap();
    ///
    /// let unfolded = tensor.unfold(1).unwrap();
    /// assert_eq!(unfolded.shape(), &[3, 8]);
    /// // Row 1 holds every element with middle index 1
    /// assert_eq!(unfolded[[1, 0]], tensor[&[0, 1, 0]]);
    /// assert_eq!(unfolded[[1, 4]], tensor[&[1, 1, 0]]);
    /// ```
    pub fn unfold(&self, mode: usize) -> anyhow::Result<Array2<T>> {
        if mode >= self.rank() {
            anyhow::bail!("Mode {} out of bounds for rank {}", mode, self.rank());
        }

        let shape = self.shape();
        let rows = shape[mode];
        let cols: usize = shape
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != mode)
            .map(|(_, &s)| s)
            .product();

        // Permute so that mode becomes the first axis
        let mut perm: Vec<usize> = vec![mode];
        perm.extend((0..mode).chain((mode + 1)..self.rank()));

        let permuted = self.permute(&perm)?;
        Self::row_major(&permuted.data.view(), &[rows, cols])?
            .into_dimensionality::<Ix2>()
            .map_err(|e| anyhow::anyhow!("Failed to convert to 2D: {}", e))
    }

    /// Fold (tensorize) a matrix back into a tensor.
    ///
    /// This is the exact inverse of [`DenseND::unfold`]:
    /// `DenseND::fold(&t.unfold(n)?, t.shape(), n)? == t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the mode is out of bounds or the matrix shape does
    /// not match `(shape[mode], Π_{i≠mode} shape[i])`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenreg_core::DenseND;
    ///
    /// let tensor = DenseND::<f64>::random_normal_seeded(&[2, 3, 4], 0.0, 1.0, 0);
    /// let folded = DenseND::fold(&tensor.unfold(2).unwrap(), &[2, 3, 4], 2).unwrap();
    /// assert_eq!(folded, tensor);
    /// ```
    pub fn fold(matrix: &Array2<T>, shape: &[usize], mode: usize) -> anyhow::Result<Self> {
        if mode >= shape.len() {
            anyhow::bail!("Mode {} out of bounds for target shape {:?}", mode, shape);
        }

        let expected_rows = shape[mode];
        let expected_cols: usize = shape
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != mode)
            .map(|(_, &s)| s)
            .product();

        if matrix.shape()[0] != expected_rows || matrix.shape()[1] != expected_cols {
            anyhow::bail!(
                "Matrix shape {:?} incompatible with target shape {:?} at mode {}",
                matrix.shape(),
                shape,
                mode
            );
        }

        let mut intermediate_shape = vec![shape[mode]];
        for (i, &s) in shape.iter().enumerate() {
            if i != mode {
                intermediate_shape.push(s);
            }
        }

        let flat: Vec<T> = matrix.iter().cloned().collect();
        let intermediate = Self::from_vec(flat, &intermediate_shape)?;

        let mut perm: Vec<usize> = vec![mode];
        perm.extend((0..mode).chain((mode + 1)..shape.len()));
        intermediate.permute(&inverse_permutation(&perm))
    }

    /// Vectorize every axis except the first `skip_begin` ones.
    ///
    /// For a sample batch of shape `(N, d₁, …, d_k)` and `skip_begin = 1` this
    /// returns an `(N, d₁·…·d_k)` matrix with one flattened sample per row, so
    /// a batch inner product with a flattened weight tensor becomes a plain
    /// matrix–vector product.
    ///
    /// `skip_begin = 0` yields a single row holding the whole tensor.
    ///
    /// # Errors
    ///
    /// Returns an error if `skip_begin` exceeds the tensor rank.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenreg_core::DenseND;
    ///
    /// let batch = DenseND::<f64>::from_vec((0..12).map(|x| x as f64).collect(), &[2, 2, 3])
    ///     .unwrap();
    /// let rows = batch.partial_vec(1).unwrap();
    /// assert_eq!(rows.shape(), &[2, 6]);
    /// assert_eq!(rows[[1, 0]], 6.0);
    /// ```
    pub fn partial_vec(&self, skip_begin: usize) -> anyhow::Result<Array2<T>> {
        if skip_begin > self.rank() {
            anyhow::bail!(
                "Cannot keep {} leading axes of a rank-{} tensor",
                skip_begin,
                self.rank()
            );
        }

        let leading: usize = self.shape()[..skip_begin].iter().product();
        let trailing: usize = self.shape()[skip_begin..].iter().product();

        Self::row_major(&self.data.view(), &[leading, trailing])?
            .into_dimensionality::<Ix2>()
            .map_err(|e| anyhow::anyhow!("Failed to convert to 2D: {}", e))
    }

    /// Unfold along a trailing mode while keeping the leading axes intact.
    ///
    /// `mode` counts from the first axis after the `skip_begin` leading axes.
    /// For a batch of shape `(N, d₁, …, d_k)` with `skip_begin = 1` the result
    /// has shape `(N, d_mode, Π_{j≠mode} d_j)`: each sample is unfolded
    /// independently, exactly as [`DenseND::unfold`] would unfold it.
    ///
    /// # Errors
    ///
    /// Returns an error if `skip_begin + mode` is not a valid axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenreg_core::DenseND;
    ///
    /// let batch = DenseND::<f64>::random_normal_seeded(&[5, 2, 3, 4], 0.0, 1.0, 11);
    /// let unfolded = batch.partial_unfold(1, 1).unwrap();
    /// assert_eq!(unfolded.shape(), &[5, 3, 8]);
    /// assert_eq!(unfolded[&[4, 2, 5]], batch[&[4, 1, 2, 1]]);
    /// ```
    pub fn partial_unfold(&self, mode: usize, skip_begin: usize) -> anyhow::Result<Self> {
        let axis = skip_begin + mode;
        if axis >= self.rank() {
            anyhow::bail!(
                "Mode {} out of bounds: rank {} with {} leading axes leaves {} modes",
                mode,
                self.rank(),
                skip_begin,
                self.rank().saturating_sub(skip_begin)
            );
        }

        let shape = self.shape();
        let perm = partial_permutation(self.rank(), axis, skip_begin);

        let mut target: Vec<usize> = shape[..skip_begin].to_vec();
        target.push(shape[axis]);
        target.push(
            shape[skip_begin..]
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != mode)
                .map(|(_, &s)| s)
                .product(),
        );

        let permuted = self.permute(&perm)?;
        Ok(Self {
            data: Self::row_major(&permuted.data.view(), &target)?,
        })
    }

    /// Inverse of [`DenseND::partial_unfold`].
    ///
    /// `shape` is the full shape of the original tensor (leading axes
    /// included).
    ///
    /// # Examples
    ///
    /// ```
    /// use tenreg_core::DenseND;
    ///
    /// let batch = DenseND::<f64>::random_normal_seeded(&[3, 4, 5], 0.0, 1.0, 5);
    /// let unfolded = batch.partial_unfold(1, 1).unwrap();
    /// let restored = DenseND::partial_fold(&unfolded, 1, 1, &[3, 4, 5]).unwrap();
    /// assert_eq!(restored, batch);
    /// ```
    pub fn partial_fold(
        unfolded: &Self,
        mode: usize,
        skip_begin: usize,
        shape: &[usize],
    ) -> anyhow::Result<Self> {
        let axis = skip_begin + mode;
        if axis >= shape.len() {
            anyhow::bail!(
                "Mode {} out of bounds for target shape {:?} with {} leading axes",
                mode,
                shape,
                skip_begin
            );
        }

        let others: usize = shape[skip_begin..]
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != mode)
            .map(|(_, &s)| s)
            .product();
        let mut expected: Vec<usize> = shape[..skip_begin].to_vec();
        expected.push(shape[axis]);
        expected.push(others);

        if unfolded.shape() != expected.as_slice() {
            anyhow::bail!(
                "Partially unfolded shape {:?} incompatible with target shape {:?} at mode {}",
                unfolded.shape(),
                shape,
                mode
            );
        }

        let perm = partial_permutation(shape.len(), axis, skip_begin);
        let permuted_shape: Vec<usize> = perm.iter().map(|&p| shape[p]).collect();

        let intermediate = unfolded.reshape(&permuted_shape)?;
        intermediate.permute(&inverse_permutation(&perm))
    }

    /// Copy `view` into a fresh row-major array of `shape`.
    fn row_major(
        view: &scirs2_core::ndarray_ext::ArrayView<'_, T, IxDyn>,
        shape: &[usize],
    ) -> anyhow::Result<scirs2_core::ndarray_ext::Array<T, IxDyn>> {
        let flat: Vec<T> = view.iter().cloned().collect();
        scirs2_core::ndarray_ext::Array::from_shape_vec(IxDyn(shape), flat).map_err(|e| {
            anyhow::anyhow!("Cannot lay out {} elements as {:?}: {}", view.len(), shape, e)
        })
    }
}

/// Axis order that moves `axis` right after the first `skip_begin` axes.
fn partial_permutation(rank: usize, axis: usize, skip_begin: usize) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..skip_begin).collect();
    perm.push(axis);
    perm.extend((skip_begin..rank).filter(|&i| i != axis));
    perm
}

fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        inverse[p] = i;
    }
    inverse
}
