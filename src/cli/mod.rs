//! Command-line parsing for the `spook` demo binary.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the assembly/solve code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "spook", version, about = "Regularized linear least-squares reconstruction")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Solve a synthetic scenario, report the recovery error, and optionally export.
    Demo(DemoArgs),
    /// Print a previously exported solution JSON.
    Show(ShowArgs),
}

/// Options for the synthetic demo.
#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// Random seed for the scenario.
    #[arg(long, default_value_t = 1996)]
    pub seed: u64,

    /// Number of observation rows.
    #[arg(long, default_value_t = 1000)]
    pub ns: usize,

    /// Number of design-matrix columns.
    #[arg(long, default_value_t = 7)]
    pub na: usize,

    /// Number of basis columns.
    #[arg(long, default_value_t = 5)]
    pub nb: usize,

    /// Number of basis rows (observation columns).
    #[arg(long, default_value_t = 9)]
    pub ng_rows: usize,

    /// Noise level relative to the Frobenius norm of the clean observations.
    #[arg(long, default_value_t = 1e-3)]
    pub noise: f64,

    /// Solver config JSON (weights, segmentation, caching).
    #[arg(long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Sparsity weight, or comma-separated per-segment weights (with --sp-idcs).
    #[arg(long, value_delimiter = ',')]
    pub lsparse: Option<Vec<f64>>,

    /// Comma-separated segment sizes partitioning the design columns.
    #[arg(long, value_delimiter = ',')]
    pub sp_idcs: Option<Vec<usize>>,

    /// Spatial smoothness weight.
    #[arg(long)]
    pub lsmooth_spatial: Option<f64>,

    /// Spectral smoothness weight.
    #[arg(long)]
    pub lsmooth_spectral: Option<f64>,

    /// Keep the cross term between rebuilds.
    #[arg(long)]
    pub cache_cross_term: bool,

    /// Penalize boundary values in the smoothers too.
    #[arg(long)]
    pub keep_boundaries: bool,

    /// Export the solution to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

/// Options for printing a saved solution.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Solution JSON file produced by `spook demo --export`.
    #[arg(value_name = "JSON")]
    pub solution: PathBuf,
}
