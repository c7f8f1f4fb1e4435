//! Field and artifact export.
//!
//! Binary fields use a fixed layout: little-endian `i32` nx, ny and snapshot
//! count, followed by the column-major `f64` data. Complex fields write the
//! full real block followed by the full imaginary block. Readers reject a
//! header whose dimensions disagree with the file size.
//!
//! CSV artifacts have no header row and use the shortest round-trip float
//! representation.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use faer::Mat;
use tracing::debug;

use crate::types::{ComplexMat, DmdResult, ModalError, ModalResult, PodResult, C64};

/// Header of a binary field file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldHeader {
    pub nx: usize,
    pub ny: usize,
    pub n_snapshots: usize,
}

impl FieldHeader {
    fn n_dof(&self) -> usize {
        2 * self.nx * self.ny
    }
}

/// Write a real velocity field.
pub fn write_velocity_field<P: AsRef<Path>>(
    path: P,
    x: &Mat<f64>,
    nx: usize,
    ny: usize,
) -> ModalResult<()> {
    let header = checked_header(x.nrows(), x.ncols(), nx, ny)?;
    let mut w = BufWriter::new(File::create(path.as_ref())?);
    write_header(&mut w, &header)?;
    write_block(&mut w, x)?;
    w.flush()?;
    debug!(path = %path.as_ref().display(), nx, ny, n_snapshots = x.ncols(), "wrote velocity field");
    Ok(())
}

/// Write a complex velocity field: real block, then imaginary block.
pub fn write_complex_velocity_field<P: AsRef<Path>>(
    path: P,
    x: &ComplexMat,
    nx: usize,
    ny: usize,
) -> ModalResult<()> {
    let header = checked_header(x.nrows(), x.ncols(), nx, ny)?;
    let mut w = BufWriter::new(File::create(path.as_ref())?);
    write_header(&mut w, &header)?;
    write_block(&mut w, &x.re)?;
    write_block(&mut w, &x.im)?;
    w.flush()?;
    debug!(path = %path.as_ref().display(), nx, ny, n_snapshots = x.ncols(), "wrote complex velocity field");
    Ok(())
}

/// Read a real velocity field written by [`write_velocity_field`].
pub fn read_velocity_field<P: AsRef<Path>>(path: P) -> ModalResult<(FieldHeader, Mat<f64>)> {
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut r = BufReader::new(file);
    let header = read_header(&mut r)?;
    check_file_len(&header, 1, file_len)?;
    let x = read_block(&mut r, header.n_dof(), header.n_snapshots)?;
    Ok((header, x))
}

/// Read a complex velocity field written by [`write_complex_velocity_field`].
pub fn read_complex_velocity_field<P: AsRef<Path>>(
    path: P,
) -> ModalResult<(FieldHeader, ComplexMat)> {
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut r = BufReader::new(file);
    let header = read_header(&mut r)?;
    check_file_len(&header, 2, file_len)?;
    let re = read_block(&mut r, header.n_dof(), header.n_snapshots)?;
    let im = read_block(&mut r, header.n_dof(), header.n_snapshots)?;
    Ok((header, ComplexMat { re, im }))
}

fn checked_header(rows: usize, cols: usize, nx: usize, ny: usize) -> ModalResult<FieldHeader> {
    let header = FieldHeader {
        nx,
        ny,
        n_snapshots: cols,
    };
    if rows != header.n_dof() {
        return Err(ModalError::InvalidArgument(format!(
            "field has {rows} rows, expected 2*{nx}*{ny} = {}",
            header.n_dof()
        )));
    }
    for v in [nx, ny, cols] {
        if i32::try_from(v).is_err() {
            return Err(ModalError::InvalidArgument(format!(
                "dimension {v} does not fit the i32 header"
            )));
        }
    }
    Ok(header)
}

fn write_header<W: Write>(w: &mut W, header: &FieldHeader) -> ModalResult<()> {
    for v in [header.nx, header.ny, header.n_snapshots] {
        // Range checked in `checked_header`.
        w.write_all(&(v as i32).to_le_bytes())?;
    }
    Ok(())
}

fn write_block<W: Write>(w: &mut W, x: &Mat<f64>) -> ModalResult<()> {
    for j in 0..x.ncols() {
        for i in 0..x.nrows() {
            w.write_all(&x[(i, j)].to_le_bytes())?;
        }
    }
    Ok(())
}

fn read_header<R: Read>(r: &mut R) -> ModalResult<FieldHeader> {
    let mut dims = [0usize; 3];
    for d in dims.iter_mut() {
        let mut buf = [0u8; 4];
        r.read_exact(&mut buf)?;
        let v = i32::from_le_bytes(buf);
        *d = usize::try_from(v).map_err(|_| {
            ModalError::InvalidArgument(format!("negative dimension {v} in field header"))
        })?;
    }
    Ok(FieldHeader {
        nx: dims[0],
        ny: dims[1],
        n_snapshots: dims[2],
    })
}

/// Header plus `blocks` column-major `f64` blocks must match the file size.
fn check_file_len(header: &FieldHeader, blocks: usize, file_len: u64) -> ModalResult<()> {
    let expected = header
        .nx
        .checked_mul(header.ny)
        .and_then(|v| v.checked_mul(2 * blocks))
        .and_then(|v| v.checked_mul(header.n_snapshots))
        .and_then(|v| v.checked_mul(8))
        .and_then(|v| v.checked_add(12))
        .and_then(|v| u64::try_from(v).ok());
    match expected {
        Some(len) if len == file_len => Ok(()),
        _ => Err(ModalError::InvalidArgument(format!(
            "field header {}x{}x{} does not match file size {file_len}",
            header.nx, header.ny, header.n_snapshots
        ))),
    }
}

fn read_block<R: Read>(r: &mut R, nrows: usize, ncols: usize) -> ModalResult<Mat<f64>> {
    let mut x = Mat::<f64>::zeros(nrows, ncols);
    let mut buf = [0u8; 8];
    for j in 0..ncols {
        for i in 0..nrows {
            r.read_exact(&mut buf)?;
            x[(i, j)] = f64::from_le_bytes(buf);
        }
    }
    Ok(x)
}

fn csv_writer<P: AsRef<Path>>(path: P) -> ModalResult<csv::Writer<File>> {
    Ok(csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?)
}

/// One CSV row per matrix row.
pub fn write_real_matrix_csv<P: AsRef<Path>>(path: P, x: &Mat<f64>) -> ModalResult<()> {
    let mut w = csv_writer(path)?;
    for i in 0..x.nrows() {
        w.write_record((0..x.ncols()).map(|j| x[(i, j)].to_string()))?;
    }
    w.flush()?;
    Ok(())
}

/// One value per line.
pub fn write_vector_csv<P: AsRef<Path>>(path: P, values: &[f64]) -> ModalResult<()> {
    let mut w = csv_writer(path)?;
    for v in values {
        w.write_record([v.to_string()])?;
    }
    w.flush()?;
    Ok(())
}

/// One `re,im` pair per line.
pub fn write_complex_vector_csv<P: AsRef<Path>>(path: P, values: &[C64]) -> ModalResult<()> {
    let mut w = csv_writer(path)?;
    for z in values {
        w.write_record([z.re.to_string(), z.im.to_string()])?;
    }
    w.flush()?;
    Ok(())
}

/// Real and imaginary parts to `<stem>_real.csv` and `<stem>_imag.csv` in `dir`.
pub fn write_complex_matrix_csv<P: AsRef<Path>>(
    dir: P,
    stem: &str,
    x: &ComplexMat,
) -> ModalResult<()> {
    let dir = dir.as_ref();
    write_real_matrix_csv(dir.join(format!("{stem}_real.csv")), &x.re)?;
    write_real_matrix_csv(dir.join(format!("{stem}_imag.csv")), &x.im)?;
    Ok(())
}

/// Export POD artifacts: `pod_modes.csv`, `pod_singular_values.csv`,
/// `pod_temporal_coefficients.csv`.
pub fn export_pod<P: AsRef<Path>>(dir: P, result: &PodResult) -> ModalResult<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    write_real_matrix_csv(dir.join("pod_modes.csv"), &result.modes)?;
    write_vector_csv(dir.join("pod_singular_values.csv"), &result.singular_values)?;
    write_real_matrix_csv(
        dir.join("pod_temporal_coefficients.csv"),
        &result.temporal_coefficients(),
    )?;
    debug!(dir = %dir.display(), rank = result.rank(), "exported POD artifacts");
    Ok(())
}

/// Export DMD artifacts: `dmd_modes_real.csv`, `dmd_modes_imag.csv`,
/// `dmd_eigenvalues.csv`, `dmd_amplitudes.csv`.
pub fn export_dmd<P: AsRef<Path>>(dir: P, result: &DmdResult) -> ModalResult<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    write_complex_matrix_csv(dir, "dmd_modes", &result.modes)?;
    write_complex_vector_csv(dir.join("dmd_eigenvalues.csv"), &result.eigenvalues)?;
    write_complex_vector_csv(dir.join("dmd_amplitudes.csv"), &result.amplitudes)?;
    debug!(dir = %dir.display(), rank = result.rank(), "exported DMD artifacts");
    Ok(())
}
