//! Mode-n unfolding of a single tensor and of a sample batch.
//!
//! Run with:
//! ```bash
//! cargo run --example unfold_fold
//! ```

use tenreg_core::DenseND;

fn main() -> anyhow::Result<()> {
    println!("=== tenreg-core: Unfold/Fold ===\n");

    let tensor = DenseND::from_vec((0..24).map(|x| x as f64).collect(), &[2, 3, 4])?;
    println!("Tensor shape: {:?}", tensor.shape());

    for mode in 0..tensor.rank() {
        let unfolded = tensor.unfold(mode)?;
        let folded = DenseND::fold(&unfolded, tensor.shape(), mode)?;
        println!(
            "  mode {} -> {:?}, roundtrip ok: {}",
            mode,
            unfolded.shape(),
            folded == tensor
        );
    }

    println!("\n--- Batch of samples ---");
    let batch = DenseND::<f64>::random_normal_seeded(&[100, 8, 6], 0.0, 1.0, 0);
    println!("Batch shape: {:?}", batch.shape());
    println!("  partial_vec: {:?}", batch.partial_vec(1)?.shape());
    for mode in 0..2 {
        let unfolded = batch.partial_unfold(mode, 1)?;
        let restored = DenseND::partial_fold(&unfolded, mode, 1, batch.shape())?;
        println!(
            "  partial_unfold mode {} -> {:?}, roundtrip ok: {}",
            mode,
            unfolded.shape(),
            restored == batch
        );
    }

    Ok(())
}
