//! Property-based tests for the kernels

#[cfg(test)]
mod tests {
    use crate::{cp_norm, cp_reconstruct, khatri_rao_seq, nmode_product};
    use proptest::prelude::*;
    use scirs2_core::ndarray_ext::Array2;
    use tenreg_core::DenseND;

    fn factor(rows: usize, rank: usize, seed: u64) -> Array2<f64> {
        let t = DenseND::<f64>::random_normal_seeded(&[rows, rank], 0.0, 1.0, seed);
        t.unfold(0).unwrap()
    }

    proptest! {
        #[test]
        fn prop_khatri_rao_shape(
            rows in prop::collection::vec(1usize..6, 1..=4),
            rank in 1usize..5,
            skip_raw in 0usize..4,
            seed in any::<u64>(),
        ) {
            let factors: Vec<Array2<f64>> = rows
                .iter()
                .enumerate()
                .map(|(k, &r)| factor(r, rank, seed.wrapping_add(k as u64)))
                .collect();
            let views: Vec<_> = factors.iter().map(|f| f.view()).collect();
            let skip = skip_raw % rows.len();

            let kr = khatri_rao_seq(&views, Some(skip)).unwrap();
            let expected_rows: usize = rows
                .iter()
                .enumerate()
                .filter(|&(k, _)| k != skip)
                .map(|(_, &r)| r)
                .product();

            prop_assert_eq!(kr.ncols(), rank);
            prop_assert_eq!(kr.nrows(), expected_rows);
        }

        #[test]
        fn prop_cp_norm_matches_dense(
            rows in prop::collection::vec(1usize..5, 1..=3),
            rank in 1usize..4,
            seed in any::<u64>(),
        ) {
            let factors: Vec<Array2<f64>> = rows
                .iter()
                .enumerate()
                .map(|(k, &r)| factor(r, rank, seed.wrapping_add(k as u64)))
                .collect();
            let views: Vec<_> = factors.iter().map(|f| f.view()).collect();

            let dense = cp_reconstruct(&views, None).unwrap().frobenius_norm();
            let norm = cp_norm(&views).unwrap();
            prop_assert!((dense - norm).abs() <= 1e-9 * (1.0 + dense));
        }

        #[test]
        fn prop_nmode_product_is_linear(
            n in 1usize..5,
            dim in 1usize..5,
            seed in any::<u64>(),
        ) {
            let x = DenseND::<f64>::random_normal_seeded(&[n, dim], 0.0, 1.0, seed);
            let m1 = factor(2, dim, seed.wrapping_add(1));
            let m2 = factor(2, dim, seed.wrapping_add(2));
            let sum = &m1 + &m2;

            let lhs = nmode_product(&x, &sum.view(), 1).unwrap();
            let a = nmode_product(&x, &m1.view(), 1).unwrap();
            let b = nmode_product(&x, &m2.view(), 1).unwrap();
            let rhs = &a + &b;

            for (l, r) in lhs.iter().zip(rhs.iter()) {
                prop_assert!((l - r).abs() < 1e-10);
            }
        }
    }
}
