//! Norms and inner products

use super::types::DenseND;
use scirs2_core::numeric::{Float, Num, NumCast};

impl<T> DenseND<T>
where
    T: Clone + Num,
{
    /// Compute the Frobenius norm ‖X‖_F = sqrt(Σ x²)
    ///
    /// # Examples
    ///
    /// ```
    /// use tenreg_core::DenseND;
    ///
    /// let tensor = DenseND::<f64>::from_vec(vec![3.0, 4.0], &[2]).unwrap();
    /// assert_eq!(tensor.frobenius_norm(), 5.0);
    /// ```
    pub fn frobenius_norm(&self) -> T
    where
        T: Float,
    {
        self.squared_norm().sqrt()
    }

    /// Sum of squared elements
    pub fn squared_norm(&self) -> T
    where
        T: Float,
    {
        self.data.iter().fold(T::zero(), |acc, &x| acc + x * x)
    }

    /// Full contraction ⟨X, Y⟩ = Σ x·y over two tensors of identical shape
    ///
    /// # Errors
    ///
    /// Returns an error if the shapes differ.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenreg_core::DenseND;
    ///
    /// let a = DenseND::<f64>::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
    /// let b = DenseND::<f64>::from_vec(vec![4.0, 5.0, 6.0], &[3]).unwrap();
    /// assert_eq!(a.inner(&b).unwrap(), 32.0);
    /// ```
    pub fn inner(&self, other: &Self) -> anyhow::Result<T>
    where
        T: Float,
    {
        if !self.same_shape(other) {
            anyhow::bail!(
                "Inner product requires identical shapes, got {:?} and {:?}",
                self.shape(),
                other.shape()
            );
        }
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .fold(T::zero(), |acc, (&a, &b)| acc + a * b))
    }

    /// Arithmetic mean of all elements, `None` for an empty tensor
    pub fn mean(&self) -> Option<T>
    where
        T: Float,
    {
        if self.is_empty() {
            return None;
        }
        let n = <T as NumCast>::from(self.len())?;
        Some(self.data.iter().fold(T::zero(), |acc, &x| acc + x) / n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frobenius_of_ones() {
        let tensor = DenseND::<f64>::ones(&[2, 3]);
        assert!((tensor.frobenius_norm() - 6.0f64.sqrt()).abs() < 1e-12);
        assert!((tensor.squared_norm() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_inner_matches_norm() {
        let tensor = DenseND::<f64>::random_normal_seeded(&[4, 3, 2], 0.0, 1.0, 8);
        let inner = tensor.inner(&tensor).unwrap();
        assert!((inner - tensor.squared_norm()).abs() < 1e-10);
    }

    #[test]
    fn test_inner_shape_mismatch() {
        let a = DenseND::<f64>::zeros(&[2, 3]);
        let b = DenseND::<f64>::zeros(&[6]);
        assert!(a.inner(&b).is_err());
    }

    #[test]
    fn test_mean() {
        let tensor = DenseND::<f64>::from_vec(vec![1.0, 2.0, 3.0, 6.0], &[2, 2]).unwrap();
        assert_eq!(tensor.mean(), Some(3.0));
        assert_eq!(DenseND::<f64>::zeros(&[0]).mean(), None);
    }
}
