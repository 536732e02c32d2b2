//! Pipelines behind the `kappa` subcommands.
//!
//! Each pipeline reads its inputs, runs the numerical core and returns the
//! results; printing and exports are left to `app`.

use nalgebra::DVector;
use rayon::prelude::*;

use crate::analysis::{MAX_GRID_POINTS, arange_inclusive, compute_all_errors, sample_theoretical, sampled_residuals};
use crate::domain::{
    CurveErrors, CurveKind, CurveRecord, CurveResiduals, CurveSummary, ConvertConfig, ResidualConfig, SolveConfig,
};
use crate::error::{AppError, SplineError};
use crate::io::{load_matrix, load_measurements, load_theoretical, load_vector, read_kapp};
use crate::spline::{bezier_chain_segments, bspline_segments, summarize_curve};

/// Outputs of `kappa convert`.
#[derive(Debug, Clone)]
pub struct ConvertOutput {
    pub records: Vec<CurveRecord>,
    /// Converted curves in file order. Curves that failed to convert are absent.
    pub curves: Vec<CurveSummary>,
    pub skipped: usize,
}

/// Outputs of `kappa residuals`.
#[derive(Debug, Clone)]
pub struct ResidualOutput {
    pub curves: Vec<CurveResiduals>,
    pub errors: Vec<CurveErrors>,
}

/// Load `A` and `b` and solve `A x = b`.
pub fn run_solve(config: &SolveConfig) -> Result<DVector<f64>, AppError> {
    let a = load_matrix(&config.matrix_path)?;
    let b = load_vector(&config.rhs_path)?;
    log::debug!(
        "solve: {}x{} system, pivoting {:?}",
        a.nrows(),
        a.ncols(),
        config.pivoting
    );
    Ok(crate::math::solve(&a, &b, config.pivoting)?)
}

/// Read a `.kapp` file and convert every curve to sampled Bezier segments.
pub fn run_convert(config: &ConvertConfig) -> Result<ConvertOutput, AppError> {
    if config.samples == 0 {
        return Err(AppError::new(2, "Sample count must be at least 1."));
    }
    if !(config.scale.is_finite() && config.scale > 0.0) {
        return Err(AppError::new(2, format!("Scale must be a positive number, got {}.", config.scale)));
    }

    let records = read_kapp(&config.input)?;
    let results: Vec<Result<CurveSummary, SplineError>> = records
        .par_iter()
        .enumerate()
        .map(|(idx, record)| convert_record(idx, record, config))
        .collect();

    let mut curves = Vec::with_capacity(results.len());
    let mut skipped = 0usize;
    for (idx, result) in results.into_iter().enumerate() {
        match result {
            Ok(curve) => curves.push(curve),
            Err(err) => {
                log::warn!("{}: skipped ({err})", CurveRecord::display_name(idx));
                skipped += 1;
            }
        }
    }

    if curves.is_empty() {
        return Err(AppError::new(
            3,
            format!("No convertible curves in '{}'.", config.input.display()),
        ));
    }

    Ok(ConvertOutput {
        records,
        curves,
        skipped,
    })
}

fn convert_record(idx: usize, record: &CurveRecord, config: &ConvertConfig) -> Result<CurveSummary, SplineError> {
    let segments = match record.kind {
        CurveKind::BSpline => bspline_segments(&record.control_points, record.bspline_type)?,
        CurveKind::Bezier => bezier_chain_segments(&record.control_points)?,
    };
    log::trace!(
        "{}: {} control points -> {} segments",
        CurveRecord::display_name(idx),
        record.control_points.len(),
        segments.len()
    );
    Ok(summarize_curve(
        CurveRecord::display_name(idx),
        record.kind,
        segments,
        config.samples,
        config.scale,
    ))
}

/// Interpolate exported curvature onto a theoretical profile and score each curve.
pub fn run_residuals(config: &ResidualConfig) -> Result<ResidualOutput, AppError> {
    let theory = load_theoretical(&config.theoretical_path)?;
    let measurements = load_measurements(&config.curvatures_path)?;

    let xs: Vec<f64> = match config.step {
        Some(step) => {
            if !(step.is_finite() && step > 0.0) {
                return Err(AppError::new(2, format!("Step must be a positive number, got {step}.")));
            }
            let (lo, hi) = theory
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
            arange_inclusive(lo, hi, step).ok_or_else(|| {
                AppError::new(
                    2,
                    format!("Step {step} over [{lo}, {hi}] exceeds {MAX_GRID_POINTS} samples."),
                )
            })?
        }
        None => theory.iter().map(|p| p.x).collect(),
    };
    let sampled = sample_theoretical(&theory, &xs);
    log::debug!(
        "residuals: {} measurements, {} theoretical samples",
        measurements.len(),
        sampled.len()
    );

    let curves = sampled_residuals(&measurements, &sampled);
    let errors = compute_all_errors(&curves, config.threshold);
    Ok(ResidualOutput { curves, errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Pivoting;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("kappa_pipeline_{}_{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn convert_config(input: PathBuf) -> ConvertConfig {
        ConvertConfig {
            input,
            samples: 20,
            scale: 2.0,
            export_csv: None,
            export_json: None,
            export_kapp: None,
        }
    }

    #[test]
    fn solve_reads_csv_system() {
        let a = temp_file("a.csv", "1,-1,1,-1\n1,0,0,0\n1,1,1,1\n1,2,4,8\n");
        let b = temp_file("b.csv", "14,4,2,2\n");
        let x = run_solve(&SolveConfig {
            matrix_path: a.clone(),
            rhs_path: b.clone(),
            pivoting: Pivoting::Partial,
        })
        .unwrap();
        std::fs::remove_file(&a).ok();
        std::fs::remove_file(&b).ok();

        let expected = [4.0, -3.0, 8.0, 5.0];
        for (got, want) in x.iter().zip(expected) {
            assert!((got - want).abs() < 1e-10, "{got} vs {want}");
        }
    }

    #[test]
    fn singular_system_maps_to_numeric_exit_code() {
        let a = temp_file("sing_a.csv", "1,2\n2,4\n");
        let b = temp_file("sing_b.csv", "1\n2\n");
        let err = run_solve(&SolveConfig {
            matrix_path: a.clone(),
            rhs_path: b.clone(),
            pivoting: Pivoting::Partial,
        })
        .unwrap_err();
        std::fs::remove_file(&a).ok();
        std::fs::remove_file(&b).ok();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn convert_skips_bad_curves() {
        // One open B-spline (5 points) and one Bezier chain with an invalid count (5 points).
        let kapp = temp_file(
            "mixed.kapp",
            "2\n1\n1\n5\n0\n1\n0\n0\n1\n2\n2\n2\n3\n0\n4\n0\n0\n1\n5\n1\n0\n0\n1\n1\n2\n1\n3\n0\n4\n0\n",
        );
        let out = run_convert(&convert_config(kapp.clone())).unwrap();
        std::fs::remove_file(&kapp).ok();

        assert_eq!(out.records.len(), 2);
        assert_eq!(out.skipped, 1);
        assert_eq!(out.curves.len(), 1);
        let curve = &out.curves[0];
        assert_eq!(curve.name, "CURVE 1");
        assert_eq!(curve.segments.len(), 2);
        assert_eq!(curve.points.len(), 40);
        // Scaled by 2: last sample lands on the last control point (4, 0) * 2.
        let last = curve.points.last().unwrap().position;
        assert!((last.x - 8.0).abs() < 1e-12 && last.y.abs() < 1e-12);
    }

    #[test]
    fn convert_with_no_usable_curves_is_exit_code_3() {
        let kapp = temp_file("bad.kapp", "1\n1\n1\n3\n0\n1\n0\n0\n1\n1\n2\n0\n");
        let err = run_convert(&convert_config(kapp.clone())).unwrap_err();
        std::fs::remove_file(&kapp).ok();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn residuals_against_resampled_theory() {
        let theory = temp_file(
            "theory.csv",
            "x coordinate (um),curvature (1/um)\n0,0.5\n10,0.5\n",
        );
        let measured = temp_file(
            "measured.csv",
            "Curve Name,X-Coordinate (um),Point Curvature (um-1)\nA,0,0.4\nA,10,0.4\n",
        );
        let out = run_residuals(&ResidualConfig {
            curvatures_path: measured.clone(),
            theoretical_path: theory.clone(),
            step: Some(2.5),
            threshold: 0.1,
            export: None,
        })
        .unwrap();
        std::fs::remove_file(&theory).ok();
        std::fs::remove_file(&measured).ok();

        assert_eq!(out.curves[0].samples.len(), 5);
        let e = &out.errors[0];
        assert_eq!(e.n, 5);
        assert!((e.absolute_error - 0.1).abs() < 1e-12);
        assert!((e.relative_error - 20.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_step_is_rejected() {
        let theory = temp_file("theory_step.csv", "x coordinate (um),curvature (1/um)\n0,1\n");
        let measured = temp_file("measured_step.csv", "Curve Name,X-Coordinate (um),Point Curvature (um-1)\nA,0,1\n");
        let err = run_residuals(&ResidualConfig {
            curvatures_path: measured.clone(),
            theoretical_path: theory.clone(),
            step: Some(0.0),
            threshold: 0.0,
            export: None,
        })
        .unwrap_err();
        std::fs::remove_file(&theory).ok();
        std::fs::remove_file(&measured).ok();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn tiny_step_is_an_input_error() {
        let theory = temp_file("theory_tiny.csv", "x coordinate (um),curvature (1/um)\n0,1\n1000,1\n");
        let measured = temp_file("measured_tiny.csv", "Curve Name,X-Coordinate (um),Point Curvature (um-1)\nA,0,1\n");
        let err = run_residuals(&ResidualConfig {
            curvatures_path: measured.clone(),
            theoretical_path: theory.clone(),
            step: Some(1e-16),
            threshold: 0.0,
            export: None,
        })
        .unwrap_err();
        std::fs::remove_file(&theory).ok();
        std::fs::remove_file(&measured).ok();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("exceeds"), "{err}");
    }
}
