//! POD demo: decompose the synthetic cellular flow and compare ranks.

use std::path::PathBuf;

use flow_modes::{
    export_pod, pod, pod_rank_sweep, utils::column, write_velocity_field, FlowParams, ModalError,
};
use tracing_subscriber::EnvFilter;

fn print_velocity_components(field: &[f64], nx: usize, ny: usize) {
    println!("U component (first 5x5):");
    for j in 0..ny.min(5) {
        for i in 0..nx.min(5) {
            print!("{:>10.4}", field[i + j * nx]);
        }
        println!();
    }
    println!("\nV component (first 5x5):");
    for j in 0..ny.min(5) {
        for i in 0..nx.min(5) {
            print!("{:>10.4}", field[nx * ny + i + j * nx]);
        }
        println!();
    }
}

fn main() -> Result<(), ModalError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "build".into()));
    std::fs::create_dir_all(&out_dir)?;

    let params = FlowParams::default();
    let x = params.generate(false)?;

    let rank = 4;
    let result = pod(&x, rank)?;

    println!("Singular values:");
    for (i, s) in result.singular_values.iter().enumerate() {
        println!("  σ{} = {s:.6e}", i + 1);
    }

    let snapshot = column(&x, 0);
    let recon = result.reconstruct(&result.project(&snapshot)?)?;
    println!("\nReconstructed first snapshot:");
    print_velocity_components(&recon, params.nx, params.ny);

    println!("\nComparing different ranks:");
    println!("{:>10}{:>20}{:>20}", "Rank", "Error", "Energy Captured");
    println!("{}", "-".repeat(50));
    for row in pod_rank_sweep(&x, &snapshot, &[1, 2, 4, 8, 16])? {
        println!(
            "{:>10}{:>20.6}{:>19.6}%",
            row.rank,
            row.relative_error,
            row.energy_captured * 100.0
        );
    }

    write_velocity_field(out_dir.join("velocity_field_original.bin"), &x, params.nx, params.ny)?;
    write_velocity_field(
        out_dir.join("velocity_field_reconstructed.bin"),
        &result.reconstruct_snapshots(),
        params.nx,
        params.ny,
    )?;
    export_pod(&out_dir, &result)?;
    println!("\nWrote fields and POD artifacts to {}", out_dir.display());

    Ok(())
}
