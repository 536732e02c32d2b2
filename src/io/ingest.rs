//! CSV ingest.
//!
//! - curvature exports (`Curve Name`, `X-Coordinate (um)`, `Point Curvature (um-1)`)
//! - theoretical curvature profiles (`x coordinate (um)`, `curvature (1/um)`)
//! - headerless numeric tables for the linear solver
//!
//! Header lookup is case-insensitive and tolerant of surrounding whitespace and
//! a UTF-8 BOM. Rows with unusable values are skipped and counted; an input with
//! no usable rows is an error (exit code 3).

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use nalgebra::{DMatrix, DVector};

use crate::domain::{Measurement, TheoreticalPoint};
use crate::error::AppError;

pub const COL_CURVE_NAME: &str = "Curve Name";
pub const COL_CURVE_LENGTH: &str = "Curve Length (um)";
pub const COL_AVERAGE_CURVATURE: &str = "Average Curvature (um-1)";
pub const COL_CURVATURE_STD: &str = "Curvature Std (um-1)";
pub const COL_X: &str = "X-Coordinate (um)";
pub const COL_Y: &str = "Y-Coordinate (um)";
pub const COL_POINT_CURVATURE: &str = "Point Curvature (um-1)";

pub const COL_THEORY_X: &str = "x coordinate (um)";
pub const COL_THEORY_CURVATURE: &str = "curvature (1/um)";

/// Load per-point curvature measurements.
pub fn load_measurements(path: &Path) -> Result<Vec<Measurement>, AppError> {
    let mut reader = open_csv(path, true)?;
    let header_map = read_header_map(&mut reader, path)?;
    let name_idx = require_column(&header_map, COL_CURVE_NAME, path)?;
    let x_idx = require_column(&header_map, COL_X, path)?;
    let k_idx = require_column(&header_map, COL_POINT_CURVATURE, path)?;

    let mut out = Vec::new();
    let mut skipped = 0usize;
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| AppError::new(2, format!("CSV parse error in '{}': {e}", path.display())))?;
        let name = record.get(name_idx).map(str::trim).filter(|s| !s.is_empty());
        let x = parse_opt_f64(record.get(x_idx));
        let k = parse_opt_f64(record.get(k_idx));
        match (name, x, k) {
            (Some(name), Some(x), Some(curvature)) => out.push(Measurement {
                curve_name: name.to_string(),
                x,
                curvature,
            }),
            _ => {
                // +2: header line plus 1-based numbering.
                log::trace!("{}: skipping line {}", path.display(), idx + 2);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        log::warn!("{}: skipped {skipped} rows without a name, x or curvature", path.display());
    }
    if out.is_empty() {
        return Err(AppError::new(
            3,
            format!("No usable curvature rows in '{}'.", path.display()),
        ));
    }
    Ok(out)
}

/// Load a theoretical curvature profile.
pub fn load_theoretical(path: &Path) -> Result<Vec<TheoreticalPoint>, AppError> {
    let mut reader = open_csv(path, true)?;
    let header_map = read_header_map(&mut reader, path)?;
    let x_idx = require_column(&header_map, COL_THEORY_X, path)?;
    let k_idx = require_column(&header_map, COL_THEORY_CURVATURE, path)?;

    let mut out = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AppError::new(2, format!("CSV parse error in '{}': {e}", path.display())))?;
        if let (Some(x), Some(curvature)) = (parse_opt_f64(record.get(x_idx)), parse_opt_f64(record.get(k_idx))) {
            out.push(TheoreticalPoint { x, curvature });
        }
    }

    if out.is_empty() {
        return Err(AppError::new(
            3,
            format!("No usable theoretical rows in '{}'.", path.display()),
        ));
    }
    Ok(out)
}

/// Load a headerless numeric table as a matrix (one CSV row per matrix row).
pub fn load_matrix(path: &Path) -> Result<DMatrix<f64>, AppError> {
    let rows = load_numeric_rows(path)?;
    let cols = rows.first().map_or(0, Vec::len);
    if let Some((line, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
        return Err(AppError::new(
            2,
            format!(
                "Ragged matrix in '{}': row {} has {} values, expected {cols}.",
                path.display(),
                line + 1,
                row.len()
            ),
        ));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Ok(DMatrix::from_row_slice(flat.len() / cols.max(1), cols, &flat))
}

/// Load a headerless numeric table as a vector (all values in reading order).
pub fn load_vector(path: &Path) -> Result<DVector<f64>, AppError> {
    let values: Vec<f64> = load_numeric_rows(path)?.into_iter().flatten().collect();
    Ok(DVector::from_vec(values))
}

fn load_numeric_rows(path: &Path) -> Result<Vec<Vec<f64>>, AppError> {
    let mut reader = open_csv(path, false)?;
    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| AppError::new(2, format!("CSV parse error in '{}': {e}", path.display())))?;
        let row = parse_numeric_record(&record)
            .map_err(|cell| AppError::new(2, format!("{} line {}: invalid number '{cell}'.", path.display(), idx + 1)))?;
        if !row.is_empty() {
            rows.push(row);
        }
    }
    if rows.is_empty() {
        return Err(AppError::new(3, format!("No numeric rows in '{}'.", path.display())));
    }
    Ok(rows)
}

/// Parse every cell of a row. Trailing empty cells (a trailing comma) are
/// ignored; an empty cell between values is an error.
fn parse_numeric_record(record: &StringRecord) -> Result<Vec<f64>, String> {
    let mut cells: Vec<&str> = record.iter().map(str::trim).collect();
    while cells.last().is_some_and(|s| s.is_empty()) {
        cells.pop();
    }
    cells
        .into_iter()
        .map(|s| s.parse::<f64>().ok().filter(|v| v.is_finite()).ok_or_else(|| s.to_string()))
        .collect()
}

fn open_csv(path: &Path, has_headers: bool) -> Result<csv::Reader<File>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn read_header_map(reader: &mut csv::Reader<File>, path: &Path) -> Result<HashMap<String, usize>, AppError> {
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers of '{}': {e}", path.display())))?;
    Ok(build_header_map(headers))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn require_column(header_map: &HashMap<String, usize>, name: &str, path: &Path) -> Result<usize, AppError> {
    header_map
        .get(&normalize_header_name(name))
        .copied()
        .ok_or_else(|| AppError::new(2, format!("Missing required column in '{}': `{name}`", path.display())))
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let v = s?.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("kappa_ingest_{}_{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn measurements_skip_rows_without_curvature() {
        let path = temp_file(
            "measurements.csv",
            "\u{feff}Curve Name,X-Coordinate (um),Y-Coordinate (um),Point Curvature (um-1)\n\
             CURVE 1,0.0,1.0,0.5\n\
             CURVE 1,1.0,1.0,\n\
             CURVE 2, 2.5 ,0.0,-0.25\n",
        );
        let rows = load_measurements(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].curve_name, "CURVE 2");
        assert_eq!(rows[1].x, 2.5);
        assert_eq!(rows[1].curvature, -0.25);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let path = temp_file("no_k.csv", "Curve Name,X-Coordinate (um)\nA,1\n");
        let err = load_measurements(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("Point Curvature"), "{err}");
    }

    #[test]
    fn theoretical_profile_loads() {
        let path = temp_file("theory.csv", "x coordinate (um),curvature (1/um)\n0,0.1\n1,0.2\n");
        let theory = load_theoretical(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(theory, vec![
            TheoreticalPoint { x: 0.0, curvature: 0.1 },
            TheoreticalPoint { x: 1.0, curvature: 0.2 },
        ]);
    }

    #[test]
    fn matrix_and_vector_tables() {
        let a_path = temp_file("a.csv", "1,2\n3,4\n");
        let b_path = temp_file("b.csv", "5\n6\n");
        let a = load_matrix(&a_path).unwrap();
        let b = load_vector(&b_path).unwrap();
        std::fs::remove_file(&a_path).ok();
        std::fs::remove_file(&b_path).ok();

        assert_eq!(a, DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]));
        assert_eq!(b, DVector::from_row_slice(&[5.0, 6.0]));
    }

    #[test]
    fn ragged_or_non_numeric_tables_fail() {
        let ragged = temp_file("ragged.csv", "1,2\n3\n");
        let err = load_matrix(&ragged).unwrap_err();
        std::fs::remove_file(&ragged).ok();
        assert!(err.message().contains("Ragged"), "{err}");

        let bad = temp_file("bad.csv", "1,x\n");
        let err = load_vector(&bad).unwrap_err();
        std::fs::remove_file(&bad).ok();
        assert!(err.message().contains("invalid number 'x'"), "{err}");
    }

    #[test]
    fn empty_interior_cell_is_rejected() {
        let gappy = temp_file("gappy.csv", "1,,3\n4,,6\n");
        let err = load_matrix(&gappy).unwrap_err();
        std::fs::remove_file(&gappy).ok();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("line 1: invalid number ''"), "{err}");

        let trailing = temp_file("trailing.csv", "1,2,\n3,4,\n");
        let a = load_matrix(&trailing).unwrap();
        std::fs::remove_file(&trailing).ok();
        assert_eq!(a, DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]));
    }
}
