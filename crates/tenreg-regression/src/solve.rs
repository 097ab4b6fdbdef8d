//! Regularized normal-equation solver for one factor update

use crate::error::RegressionResult;
use scirs2_core::ndarray_ext::{Array1, Array2, ScalarOperand};
use scirs2_core::numeric::{Float, NumAssign, NumCast};
use scirs2_linalg::lstsq;
use std::iter::Sum;

/// Solve `(ΦᵀΦ + reg·I) x = Φᵀ b` for x.
///
/// With `reg == 0` a ridge floor of `sqrt(ε)·mean(diag(ΦᵀΦ))` is added so
/// rank-deficient designs (fewer samples than unknowns) still yield the
/// bounded minimum-norm-like solution. If the solve fails or returns
/// non-finite values, it is retried once with a jitter `p` times larger.
pub(crate) fn solve_regularized<T>(
    design: &Array2<T>,
    target: &Array1<T>,
    reg: T,
) -> RegressionResult<Array1<T>>
where
    T: Float + NumAssign + NumCast + Sum + ScalarOperand + Send + Sync + 'static,
{
    let p = design.ncols();
    let gram = design.t().dot(design);
    let rhs = design.t().dot(target);

    let scale = mean_diagonal(&gram);
    let floor = if reg > T::zero() {
        T::zero()
    } else {
        T::epsilon().sqrt() * scale
    };

    let mut system = gram.clone();
    add_to_diagonal(&mut system, reg + floor);

    match lstsq(&system.view(), &rhs.view(), None) {
        Ok(solution) if solution.x.iter().all(|v| v.is_finite()) => Ok(solution.x),
        _ => {
            let size = <T as NumCast>::from(p.max(1)).unwrap_or_else(T::one);
            let jitter = T::epsilon().sqrt() * scale * size;
            let mut retry = gram;
            add_to_diagonal(&mut retry, reg + floor + jitter);
            let solution = lstsq(&retry.view(), &rhs.view(), None)?;
            Ok(solution.x)
        }
    }
}

/// Mean of the diagonal, or one when the diagonal is all zeros
fn mean_diagonal<T: Float>(gram: &Array2<T>) -> T {
    let n = gram.nrows();
    if n == 0 {
        return T::one();
    }
    let trace = gram.diag().iter().fold(T::zero(), |acc, &v| acc + v);
    let count = <T as NumCast>::from(n).unwrap_or_else(T::one);
    let mean = trace / count;
    if mean > T::zero() && mean.is_finite() {
        mean
    } else {
        T::one()
    }
}

fn add_to_diagonal<T: Float + NumAssign>(matrix: &mut Array2<T>, value: T) {
    for d in matrix.diag_mut().iter_mut() {
        *d += value;
    }
}
