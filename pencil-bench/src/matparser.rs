//! MATLAB .mat file loader for pencil data.
//!
//! Reads the two coefficients of a pencil `T·x + A` from a MATLAB v5 .mat
//! file. Both arrays must be dense, square and of the same size; real and
//! complex storage are accepted in double or single precision.

use std::path::Path;

use anyhow::{bail, Context, Result};
use matfile::{MatFile, NumericData};
use num_complex::Complex64;
use pencil_core::linalg::CMat;
use pencil_core::Pencil;

/// Pencil loaded from a .mat file.
#[derive(Debug, Clone)]
pub struct MatPencil {
    /// File stem
    pub name: String,
    pub pencil: Pencil,
}

/// Parse `a_name` and `b_name` from a MATLAB .mat file into a pencil.
pub fn parse_mat<P: AsRef<Path>>(path: P, a_name: &str, b_name: &str) -> Result<MatPencil> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();

    let file = std::fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mat_file = MatFile::parse(file).context("Failed to parse MAT file")?;

    let a = get_matrix(&mat_file, a_name)?;
    let b = get_matrix(&mat_file, b_name)?;
    let pencil = Pencil::new(a, b).with_context(|| format!("Invalid pencil in {}", path.display()))?;

    Ok(MatPencil { name, pencil })
}

/// Extract a dense square matrix from a MAT file.
/// Note: matfile crate v0.5 ignores sparse arrays, so they are reported as missing.
fn get_matrix(mat: &MatFile, name: &str) -> Result<CMat> {
    let array = mat.find_by_name(name).ok_or_else(|| {
        let available: Vec<&str> = mat.arrays().iter().map(|a| a.name()).collect();
        anyhow::anyhow!(
            "Missing array: {} (found: {}; sparse arrays are not supported)",
            name,
            available.join(", ")
        )
    })?;

    let (real, imag) = match array.data() {
        NumericData::Double { real, imag } => (real.clone(), imag.clone()),
        NumericData::Single { real, imag } => (
            real.iter().map(|&x| x as f64).collect(),
            imag.as_ref().map(|v| v.iter().map(|&x| x as f64).collect()),
        ),
        _ => bail!("Unsupported numeric type for matrix {}", name),
    };

    matrix_from_column_major(name, array.size(), &real, imag.as_deref())
}

/// Assemble a square complex matrix from column-major storage.
pub fn matrix_from_column_major(name: &str, shape: &[usize], real: &[f64], imag: Option<&[f64]>) -> Result<CMat> {
    if shape.len() != 2 {
        bail!("Expected 2D array for {}, got {}D", name, shape.len());
    }
    let (nrows, ncols) = (shape[0], shape[1]);
    if nrows != ncols {
        bail!("Expected a square matrix for {}, got {}×{}", name, nrows, ncols);
    }
    if real.len() != nrows * ncols {
        bail!("Array {} has {} entries, expected {}", name, real.len(), nrows * ncols);
    }
    if let Some(im) = imag {
        if im.len() != real.len() {
            bail!("Array {} has {} imaginary entries, expected {}", name, im.len(), real.len());
        }
    }

    Ok(CMat::from_fn(nrows, ncols, |row, col| {
        let k = row + col * nrows;
        Complex64::new(real[k], imag.map_or(0.0, |im| im[k]))
    }))
}
