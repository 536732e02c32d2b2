//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - loads an optional `.env` and parses CLI arguments
//! - turns arguments into config structs
//! - runs the pipelines
//! - prints reports and writes optional exports

use clap::Parser;

use crate::cli::{Command, ConvertArgs, ResidualArgs, SolveArgs};
use crate::domain::{ConvertConfig, ResidualConfig, SolveConfig};
use crate::error::AppError;
use crate::math::Pivoting;

pub mod pipeline;

/// Entry point for the `kappa` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` is optional; it only feeds clap's `env` defaults.
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Solve(args) => handle_solve(args),
        Command::Convert(args) => handle_convert(args),
        Command::Residuals(args) => handle_residuals(args),
    }
}

fn handle_solve(args: SolveArgs) -> Result<(), AppError> {
    let config = solve_config_from_args(&args);
    let x = pipeline::run_solve(&config)?;
    println!("{}", crate::report::format_solution(&x));
    Ok(())
}

fn handle_convert(args: ConvertArgs) -> Result<(), AppError> {
    let config = convert_config_from_args(&args);
    let run = pipeline::run_convert(&config)?;

    println!("{}", crate::report::format_convert_summary(&run, &config));

    if let Some(path) = &config.export_csv {
        crate::io::write_curvature_csv(path, &run.curves)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::write_segments_json(path, &run.curves, &config)?;
    }
    if let Some(path) = &config.export_kapp {
        let scale = config.scale;
        let scaled = crate::io::transform_positions(&run.records, |pts| pts.iter().map(|&p| p * scale).collect());
        crate::io::write_kapp(path, &scaled)?;
    }

    Ok(())
}

fn handle_residuals(args: ResidualArgs) -> Result<(), AppError> {
    let config = residual_config_from_args(&args);
    let run = pipeline::run_residuals(&config)?;

    println!("{}", crate::report::format_errors(&run, config.threshold));

    if let Some(path) = &config.export {
        crate::io::write_residuals_csv(path, &run.curves)?;
    }

    Ok(())
}

pub fn solve_config_from_args(args: &SolveArgs) -> SolveConfig {
    SolveConfig {
        matrix_path: args.matrix.clone(),
        rhs_path: args.rhs.clone(),
        pivoting: if args.no_pivot { Pivoting::None } else { Pivoting::Partial },
    }
}

pub fn convert_config_from_args(args: &ConvertArgs) -> ConvertConfig {
    ConvertConfig {
        input: args.input.clone(),
        samples: args.samples,
        scale: args.scale,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
        export_kapp: args.export_kapp.clone(),
    }
}

pub fn residual_config_from_args(args: &ResidualArgs) -> ResidualConfig {
    ResidualConfig {
        curvatures_path: args.curvatures.clone(),
        theoretical_path: args.theoretical.clone(),
        step: args.step,
        threshold: args.threshold,
        export: args.export.clone(),
    }
}
