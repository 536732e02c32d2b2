//! Read/write `.kapp` curve files.
//!
//! The format is line-oriented with one value per line:
//!
//! ```text
//! <curve count>
//! per curve:
//!   <curve kind>            0 = Bezier, 1 = B-spline
//!   <keyframe count>
//!   <control point count>
//!   <spline type>           B-spline only: 0 = open, 1 = closed
//!   <current keyframe>
//!   <x>\n<y>                repeated control point count times
//! ```
//!
//! Only the first keyframe is stored in the file's point block, so only it is read.

use std::fs;
use std::path::Path;

use nalgebra::Point2;

use crate::domain::{BSplineType, CurveKind, CurveRecord};
use crate::error::AppError;

/// Read and parse a `.kapp` file.
pub fn read_kapp(path: &Path) -> Result<Vec<CurveRecord>, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve file '{}': {e}", path.display())))?;
    parse_kapp(&text)
}

/// Parse `.kapp` text.
pub fn parse_kapp(text: &str) -> Result<Vec<CurveRecord>, AppError> {
    let mut tokens = tokens(text);

    // Counts come from the file; nothing is preallocated from them.
    let n_curves = tokens.next_usize("curve count")?;
    let mut records = Vec::new();

    for idx in 0..n_curves {
        let (line, code) = tokens.next_int("curve type")?;
        let kind = CurveKind::from_code(code)
            .ok_or_else(|| AppError::new(2, format!("Line {line}: unknown curve type {code}.")))?;

        let keyframes = tokens.next_usize("keyframe count")?;
        let n_points = tokens.next_usize("control point count")?;

        let bspline_type = if kind == CurveKind::BSpline {
            let (line, code) = tokens.next_int("B-spline type")?;
            BSplineType::from_code(code)
                .ok_or_else(|| AppError::new(2, format!("Line {line}: unknown B-spline type {code}.")))?
        } else {
            BSplineType::default()
        };

        let (_, keyframe) = tokens.next_int("current keyframe")?;

        let mut control_points = Vec::new();
        for _ in 0..n_points {
            let x = tokens.next_f64("x coordinate")?;
            let y = tokens.next_f64("y coordinate")?;
            control_points.push(Point2::new(x, y));
        }

        if keyframes > 1 {
            log::warn!(
                "{}: {keyframes} keyframes found, only the first is read",
                CurveRecord::display_name(idx)
            );
        }

        records.push(CurveRecord {
            kind,
            keyframes,
            bspline_type,
            keyframe,
            control_points,
        });
    }

    log::debug!("kapp: parsed {} curves", records.len());
    Ok(records)
}

/// Render records in `.kapp` layout (trailing newline, current keyframe `1`).
pub fn format_kapp(records: &[CurveRecord]) -> String {
    let mut out = format!("{}", records.len());
    for r in records {
        out.push_str(&format!("\n{}", r.kind.code()));
        out.push_str(&format!("\n{}", r.keyframes));
        out.push_str(&format!("\n{}", r.control_points.len()));
        if r.kind == CurveKind::BSpline {
            out.push_str(&format!("\n{}", r.bspline_type.code()));
        }
        out.push_str("\n1");
        for p in &r.control_points {
            out.push_str(&format!("\n{:?}\n{:?}", p.x, p.y));
        }
    }
    out.push('\n');
    out
}

/// Write records to a `.kapp` file.
pub fn write_kapp(path: &Path, records: &[CurveRecord]) -> Result<(), AppError> {
    fs::write(path, format_kapp(records))
        .map_err(|e| AppError::new(2, format!("Failed to write curve file '{}': {e}", path.display())))
}

/// Map every curve's control points through `transform`, returning new records.
pub fn transform_positions<F>(records: &[CurveRecord], transform: F) -> Vec<CurveRecord>
where
    F: Fn(&[Point2<f64>]) -> Vec<Point2<f64>>,
{
    records
        .iter()
        .map(|r| CurveRecord {
            control_points: transform(&r.control_points),
            ..r.clone()
        })
        .collect()
}

/// Non-empty trimmed lines with their 1-based line numbers.
struct Tokens<I> {
    lines: I,
}

fn tokens(text: &str) -> Tokens<impl Iterator<Item = (usize, &str)>> {
    let lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());
    Tokens { lines }
}

impl<'a, I> Tokens<I>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    fn next_token(&mut self, what: &str) -> Result<(usize, &'a str), AppError> {
        self.lines
            .next()
            .ok_or_else(|| AppError::new(2, format!("Unexpected end of curve file while reading {what}.")))
    }

    fn next_int(&mut self, what: &str) -> Result<(usize, i64), AppError> {
        let (line, tok) = self.next_token(what)?;
        // Some writers emit integral fields as floats ("3.0").
        let value = tok
            .parse::<i64>()
            .ok()
            .or_else(|| tok.parse::<f64>().ok().filter(|v| v.fract() == 0.0).map(|v| v as i64))
            .ok_or_else(|| AppError::new(2, format!("Line {line}: expected integer {what}, got '{tok}'.")))?;
        Ok((line, value))
    }

    fn next_usize(&mut self, what: &str) -> Result<usize, AppError> {
        let (line, value) = self.next_int(what)?;
        usize::try_from(value)
            .map_err(|_| AppError::new(2, format!("Line {line}: {what} must be non-negative, got {value}.")))
    }

    fn next_f64(&mut self, what: &str) -> Result<f64, AppError> {
        let (line, tok) = self.next_token(what)?;
        tok.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| AppError::new(2, format!("Line {line}: expected number for {what}, got '{tok}'.")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "2\n1\n1\n5\n0\n1\n0.0\n0.0\n10.5\n4.25\n20\n8\n30\n4\n40\n0\n0\n1\n4\n1\n1\n2\n3\n4\n5\n6\n7\n8\n";

    #[test]
    fn parses_bspline_and_bezier_records() {
        let records = parse_kapp(SAMPLE).unwrap();
        assert_eq!(records.len(), 2);

        let a = &records[0];
        assert_eq!(a.kind, CurveKind::BSpline);
        assert_eq!(a.bspline_type, BSplineType::Open);
        assert_eq!(a.control_points.len(), 5);
        assert_eq!(a.control_points[1], Point2::new(10.5, 4.25));

        let b = &records[1];
        assert_eq!(b.kind, CurveKind::Bezier);
        assert_eq!(b.keyframe, 1);
        assert_eq!(b.control_points[3], Point2::new(7.0, 8.0));
    }

    #[test]
    fn written_file_parses_back() {
        let records = parse_kapp(SAMPLE).unwrap();
        let text = format_kapp(&records);
        assert!(text.ends_with('\n'));
        assert_eq!(parse_kapp(&text).unwrap(), records);
    }

    #[test]
    fn blank_lines_and_whitespace_are_ignored() {
        let text = "1\n\n 1 \n1\n4\n1\n1\n0\n0\n1\n0\n1\n1\n0\n1\n";
        let records = parse_kapp(text).unwrap();
        assert_eq!(records[0].bspline_type, BSplineType::Closed);
        assert_eq!(records[0].control_points.len(), 4);
    }

    #[test]
    fn truncated_file_reports_what_was_missing() {
        let err = parse_kapp("1\n1\n1\n5\n0\n1\n0.0\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("y coordinate"), "{err}");
    }

    #[test]
    fn bad_token_reports_line_number() {
        let err = parse_kapp("1\n7\n").unwrap_err();
        assert!(err.message().starts_with("Line 2:"), "{err}");

        let err = parse_kapp("1\n0\n1\n4\n1\nabc\n").unwrap_err();
        assert!(err.message().starts_with("Line 6:"), "{err}");
    }

    #[test]
    fn oversized_counts_fail_at_end_of_file() {
        let err = parse_kapp("99999999999999999\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("curve type"), "{err}");

        let err = parse_kapp("1\n0\n1\n4611686018427387904\n1\n0\n0\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("x coordinate"), "{err}");
    }

    #[test]
    fn only_first_keyframe_is_read() {
        let text = "1\n1\n2\n4\n0\n1\n0\n0\n1\n2\n3\n2\n4\n0\n";
        let records = parse_kapp(text).unwrap();
        let r = &records[0];
        assert_eq!(r.keyframes, 2);
        assert_eq!(
            r.control_points,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 2.0),
                Point2::new(3.0, 2.0),
                Point2::new(4.0, 0.0),
            ]
        );

        let text = format_kapp(&records);
        assert!(text.starts_with("1\n1\n2\n4\n0\n1\n"), "{text}");
        assert_eq!(parse_kapp(&text).unwrap()[0].keyframes, 2);
    }

    #[test]
    fn transform_scales_every_curve() {
        let records = parse_kapp(SAMPLE).unwrap();
        let scaled = transform_positions(&records, |pts| pts.iter().map(|&p| p * 2.0).collect());
        assert_eq!(scaled[0].control_points[1], Point2::new(21.0, 8.5));
        assert_eq!(scaled[1].kind, CurveKind::Bezier);
    }
}
