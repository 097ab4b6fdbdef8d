//! Random tensor construction
//!
//! Uses `scirs2_core::random` for all randomness (never rand/rand_distr
//! directly). Every constructor has a `_with_rng` form that draws from a
//! caller-supplied generator, so tests and demos can reproduce exact data.

use super::types::DenseND;
use scirs2_core::ndarray_ext::{Array, IxDyn};
use scirs2_core::numeric::{Num, NumCast};
use scirs2_core::random::{thread_rng, Rng, SeedableRng, StdRng};
use scirs2_core::StandardNormal;

impl<T> DenseND<T>
where
    T: Clone + Num + NumCast,
{
    /// Create a tensor with i.i.d. values from U[low, high) using the thread RNG
    ///
    /// # Examples
    ///
    /// ```
    /// use tenreg_core::DenseND;
    ///
    /// let tensor = DenseND::<f64>::random_uniform(&[2, 3], 0.0, 1.0);
    /// assert_eq!(tensor.shape(), &[2, 3]);
    /// assert!(tensor.iter().all(|&x| (0.0..1.0).contains(&x)));
    /// ```
    pub fn random_uniform(shape: &[usize], low: f64, high: f64) -> Self {
        let mut rng = thread_rng();
        Self::random_uniform_with_rng(shape, low, high, &mut rng)
    }

    /// Create a tensor with i.i.d. values from N(mean, std²) using the thread RNG
    pub fn random_normal(shape: &[usize], mean: f64, std: f64) -> Self {
        let mut rng = thread_rng();
        Self::random_normal_with_rng(shape, mean, std, &mut rng)
    }

    /// Create a reproducible N(mean, std²) tensor from a `u64` seed
    ///
    /// # Examples
    ///
    /// ```
    /// use tenreg_core::DenseND;
    ///
    /// let a = DenseND::<f64>::random_normal_seeded(&[4, 5], 0.0, 1.0, 7);
    /// let b = DenseND::<f64>::random_normal_seeded(&[4, 5], 0.0, 1.0, 7);
    /// assert_eq!(a, b);
    /// ```
    pub fn random_normal_seeded(shape: &[usize], mean: f64, std: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::random_normal_with_rng(shape, mean, std, &mut rng)
    }

    /// Create a U[low, high) tensor drawing from `rng`
    pub fn random_uniform_with_rng<R: Rng>(
        shape: &[usize],
        low: f64,
        high: f64,
        rng: &mut R,
    ) -> Self {
        let range = high - low;
        Self::from_sampler(shape, || low + rng.random::<f64>() * range)
    }

    /// Create an N(mean, std²) tensor drawing from `rng`
    pub fn random_normal_with_rng<R: Rng>(
        shape: &[usize],
        mean: f64,
        std: f64,
        rng: &mut R,
    ) -> Self {
        Self::from_sampler(shape, || {
            let z: f64 = rng.sample(StandardNormal);
            mean + std * z
        })
    }

    fn from_sampler<F>(shape: &[usize], mut sample: F) -> Self
    where
        F: FnMut() -> f64,
    {
        let total: usize = shape.iter().product();
        let data: Vec<T> = (0..total)
            .map(|_| NumCast::from(sample()).unwrap_or_else(T::zero))
            .collect();
        Self {
            data: Array::from_shape_vec(IxDyn(shape), data)
                .expect("sampler yields exactly one value per element"),
        }
    }
}
