//! Command-line parsing for the `kappa` curvature toolkit.
//!
//! Argument parsing stays here; `app` turns parsed args into config structs and
//! dispatches to the pipelines.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "kappa", version, about = "Curvature toolkit: B-spline conversion, curvature export and residuals")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Solve a dense linear system `A x = b` by Gaussian elimination.
    Solve(SolveArgs),
    /// Convert the curves of a `.kapp` file to Bezier segments and export curvature.
    Convert(ConvertArgs),
    /// Compare exported curvature against a theoretical profile.
    Residuals(ResidualArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct SolveArgs {
    /// Headerless CSV with one matrix row per line.
    #[arg(long, value_name = "CSV")]
    pub matrix: PathBuf,

    /// Headerless CSV with the right-hand side (one value per line, or one row).
    #[arg(long, value_name = "CSV")]
    pub rhs: PathBuf,

    /// Eliminate without row exchanges.
    #[arg(long)]
    pub no_pivot: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct ConvertArgs {
    /// `.kapp` curve file.
    #[arg(short, long, value_name = "KAPP")]
    pub input: PathBuf,

    /// Samples per Bezier segment.
    #[arg(short = 'n', long, env = "KAPPA_SAMPLES", default_value_t = 100)]
    pub samples: usize,

    /// Microns per pixel.
    #[arg(long, env = "KAPPA_SCALE", default_value_t = 1.0)]
    pub scale: f64,

    /// Export per-point curvature to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export Bezier segments and curve statistics to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,

    /// Write the curves rescaled to microns as a new `.kapp` file.
    #[arg(long = "export-kapp")]
    pub export_kapp: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct ResidualArgs {
    /// Curvature CSV as written by `kappa convert --export`.
    #[arg(long, value_name = "CSV")]
    pub curvatures: PathBuf,

    /// Theoretical profile CSV (`x coordinate (um)`, `curvature (1/um)`).
    #[arg(long, value_name = "CSV")]
    pub theoretical: PathBuf,

    /// Resample the theoretical profile every `step` um instead of using its own x values.
    #[arg(long)]
    pub step: Option<f64>,

    /// Minimum theoretical curvature included in the relative error.
    #[arg(long, default_value_t = 0.0)]
    pub threshold: f64,

    /// Export per-sample residuals to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}
