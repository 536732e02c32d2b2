//! Export converted curves and residuals.
//!
//! The curvature CSV uses the Kappa column names so the file can be fed straight
//! back into `kappa residuals` or opened in a spreadsheet.

use std::fs::File;
use std::path::Path;

use chrono::Local;

use crate::domain::{ConvertConfig, CurveResiduals, CurveSummary, SegmentCurve, SegmentFile};
use crate::error::AppError;
use crate::io::ingest::{
    COL_AVERAGE_CURVATURE, COL_CURVATURE_STD, COL_CURVE_LENGTH, COL_CURVE_NAME, COL_POINT_CURVATURE, COL_X,
    COL_Y,
};

/// Write one row per sampled point. Undefined curvature is written as an empty cell.
pub fn write_curvature_csv(path: &Path, curves: &[CurveSummary]) -> Result<(), AppError> {
    let mut writer = create_csv(path)?;
    writer
        .write_record([
            COL_CURVE_NAME,
            COL_CURVE_LENGTH,
            COL_AVERAGE_CURVATURE,
            COL_CURVATURE_STD,
            COL_X,
            COL_Y,
            COL_POINT_CURVATURE,
        ])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for c in curves {
        let length = c.length.to_string();
        let mean = fmt_opt(Some(c.mean_curvature));
        let std = fmt_opt(Some(c.curvature_std));
        for p in &c.points {
            writer
                .write_record([
                    c.name.clone(),
                    length.clone(),
                    mean.clone(),
                    std.clone(),
                    p.position.x.to_string(),
                    p.position.y.to_string(),
                    fmt_opt(p.curvature),
                ])
                .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV '{}': {e}", path.display())))
}

/// Write the per-sample residuals of every curve.
pub fn write_residuals_csv(path: &Path, curves: &[CurveResiduals]) -> Result<(), AppError> {
    let mut writer = create_csv(path)?;
    writer
        .write_record(["curve_name", "x", "theoretical", "k", "residual", "residual_abs"])
        .map_err(|e| AppError::new(2, format!("Failed to write residual CSV header: {e}")))?;

    for c in curves {
        for s in &c.samples {
            writer
                .write_record([
                    c.curve_name.clone(),
                    s.x.to_string(),
                    fmt_opt(Some(s.theoretical)),
                    fmt_opt(Some(s.k)),
                    fmt_opt(Some(s.residual)),
                    fmt_opt(Some(s.residual_abs)),
                ])
                .map_err(|e| AppError::new(2, format!("Failed to write residual CSV row: {e}")))?;
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush residual CSV '{}': {e}", path.display())))
}

/// Write the Bezier segments and per-curve statistics as pretty JSON.
pub fn write_segments_json(path: &Path, curves: &[CurveSummary], config: &ConvertConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create segment JSON '{}': {e}", path.display())))?;

    let doc = SegmentFile {
        tool: "kappa".to_string(),
        generated_at: Local::now(),
        samples: config.samples,
        scale: config.scale,
        curves: curves
            .iter()
            .map(|c| SegmentCurve {
                name: c.name.clone(),
                kind: c.kind,
                segments: c.segments.clone(),
                length: c.length,
                mean_curvature: c.mean_curvature.is_finite().then_some(c.mean_curvature),
                curvature_std: c.curvature_std,
            })
            .collect(),
    };

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(2, format!("Failed to write segment JSON: {e}")))?;
    Ok(())
}

/// Read a segment JSON file written by `write_segments_json`.
pub fn read_segments_json(path: &Path) -> Result<SegmentFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open segment JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid segment JSON: {e}")))
}

fn create_csv(path: &Path) -> Result<csv::Writer<File>, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    Ok(csv::Writer::from_writer(file))
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() => v.to_string(),
        _ => String::new(),
    }
}
