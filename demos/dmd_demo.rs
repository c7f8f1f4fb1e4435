//! DMD demo: growth/decay modes of the synthetic cellular flow.

use std::path::PathBuf;

use flow_modes::{
    dmd, dmd_error, dmd_spectrum, export_dmd, write_complex_velocity_field, ComplexMat,
    FlowParams, ModalError,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), ModalError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "build".into()));
    std::fs::create_dir_all(&out_dir)?;

    let params = FlowParams::default();
    let x = params.generate(true)?;

    // The field spans two spatial patterns.
    let rank = 2;
    let result = dmd(&x, rank)?;

    println!("DMD eigenvalues (continuous time):");
    for w in &result.eigenvalues {
        println!("  {w:.6}");
    }

    println!("\nSpectrum:");
    for m in dmd_spectrum(&result, 1e-6) {
        println!(
            "  Mode {}: |λ|={:.4}, freq={:.4}, growth={:.4}, |b|={:.4}, {}",
            m.index, m.magnitude, m.frequency, m.growth_rate, m.amplitude, m.stability
        );
    }

    println!("\nFirst few DMD modes:");
    for i in 0..5.min(result.n_dof()) {
        let row: Vec<String> = (0..result.rank())
            .map(|j| format!("{:.4}", result.modes.get(i, j)))
            .collect();
        println!("  {}", row.join("  "));
    }

    println!("\nMode amplitudes:");
    for b in &result.amplitudes {
        println!("  {b:.6}");
    }

    // Training snapshots are one time unit apart.
    let times: Vec<f64> = (0..params.n_snapshots).map(|t| t as f64).collect();
    let recon = result.reconstruct(&times);

    let (re_min, re_max) = min_max(&recon.re);
    let (im_min, im_max) = min_max(&recon.im);
    println!("\nReconstruction stats:");
    println!("  Min real: {re_min:.6}");
    println!("  Max real: {re_max:.6}");
    println!("  Min imag: {im_min:.6}");
    println!("  Max imag: {im_max:.6}");

    let err = dmd_error(&result, &x)?;
    println!("  RMSE: {:.6e}, relative error: {:.6e}", err.rmse, err.relative_error);

    write_complex_velocity_field(
        out_dir.join("velocity_field_original_dmd.bin"),
        &ComplexMat::from_real(&x),
        params.nx,
        params.ny,
    )?;
    write_complex_velocity_field(
        out_dir.join("velocity_field_reconstructed_dmd.bin"),
        &recon,
        params.nx,
        params.ny,
    )?;
    export_dmd(&out_dir, &result)?;
    println!("\nWrote fields and DMD artifacts to {}", out_dir.display());

    Ok(())
}

fn min_max(m: &faer::Mat<f64>) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for j in 0..m.ncols() {
        for i in 0..m.nrows() {
            lo = lo.min(m[(i, j)]);
            hi = hi.max(m[(i, j)]);
        }
    }
    (lo, hi)
}
