//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the solver configuration (file + flag overrides)
//! - runs the demo pipeline
//! - prints reports and writes optional exports

use clap::Parser;

use crate::cli::{Command, DemoArgs, ShowArgs};
use crate::data::ScenarioConfig;
use crate::domain::{LinSolveConfig, SparsityWeights};
use crate::error::SpookError;
use crate::io::{SolutionFile, matrix_rows, read_config_json, read_solution_json, write_solution_json};

pub mod pipeline;

/// Entry point for the `spook` binary.
pub fn run() -> Result<(), SpookError> {
    // `spook` and `spook --seed 3` behave like `spook demo ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Demo(args) => handle_demo(args),
        Command::Show(args) => handle_show(args),
    }
}

fn handle_demo(args: DemoArgs) -> Result<(), SpookError> {
    let scenario_config = scenario_config_from_args(&args);
    let config = solver_config_from_args(&args)?;
    let run = pipeline::run_demo(&scenario_config, &config)?;

    println!("{}", crate::report::format_run_summary(&run));

    if let Some(path) = &args.export {
        let solution = SolutionFile {
            tool: "spook".to_string(),
            mode: run.mode,
            lsparse: run.config.lsparse.clone(),
            lsmooth: run.config.lsmooth,
            x: matrix_rows(&run.x),
            x_true: Some(matrix_rows(&run.scenario.x_true)),
            max_abs_error: Some(run.max_abs_error),
        };
        write_solution_json(path, &solution)?;
        log::info!("Wrote solution to '{}'", path.display());
    }

    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), SpookError> {
    let solution = read_solution_json(&args.solution)?;
    println!(
        "{} solution ({}), {} rows",
        solution.tool,
        solution.mode.display_name(),
        solution.x.len()
    );
    for row in &solution.x {
        let cells: Vec<String> = row.iter().map(|v| format!("{v:>9.4}")).collect();
        println!("{}", cells.join(" "));
    }
    if let Some(err) = solution.max_abs_error {
        println!("max |X - X_true| = {err:.4e}");
    }
    Ok(())
}

pub fn scenario_config_from_args(args: &DemoArgs) -> ScenarioConfig {
    ScenarioConfig {
        ns: args.ns,
        na: args.na,
        nb: args.nb,
        ng_rows: args.ng_rows,
        noise: args.noise,
        seed: args.seed,
    }
}

/// Config file (or defaults), overridden by any weight flags given.
pub fn solver_config_from_args(args: &DemoArgs) -> Result<LinSolveConfig, SpookError> {
    let mut config = match &args.config {
        Some(path) => read_config_json(path)?,
        None => LinSolveConfig::default(),
    };

    if let Some(sizes) = &args.sp_idcs {
        config.sp_idcs = Some(sizes.clone());
    }
    if let Some(values) = &args.lsparse {
        config.lsparse = match (values.as_slice(), &config.sp_idcs) {
            ([single], None) => SparsityWeights::Uniform(*single),
            _ => SparsityWeights::PerSegment(values.clone()),
        };
    }
    if let Some(spatial) = args.lsmooth_spatial {
        config.lsmooth.spatial = spatial;
    }
    if let Some(spectral) = args.lsmooth_spectral {
        config.lsmooth.spectral = spectral;
    }
    config.cache_cross_term |= args.cache_cross_term;
    if args.keep_boundaries {
        config.smoothness_drop_boundaries = false;
    }
    Ok(config)
}

/// Rewrite argv so `spook` defaults to `spook demo`.
///
/// Rules:
/// - `spook`                       -> `spook demo`
/// - `spook --seed 3 ...`          -> `spook demo --seed 3 ...`
/// - `spook --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("demo".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "demo" | "show");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "demo flags".
    if arg1.starts_with('-') {
        argv.insert(1, "demo".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_demo() {
        assert_eq!(rewrite_args(argv(&["spook"])), argv(&["spook", "demo"]));
        assert_eq!(
            rewrite_args(argv(&["spook", "--seed", "3"])),
            argv(&["spook", "demo", "--seed", "3"])
        );
        assert_eq!(rewrite_args(argv(&["spook", "--help"])), argv(&["spook", "--help"]));
        assert_eq!(rewrite_args(argv(&["spook", "show", "x.json"])), argv(&["spook", "show", "x.json"]));
    }

    #[test]
    fn weight_flags_override_defaults() {
        let cli = Cli::parse_from(argv(&[
            "spook",
            "demo",
            "--lsparse",
            "1,4",
            "--sp-idcs",
            "3,4",
            "--lsmooth-spectral",
            "0",
            "--cache-cross-term",
        ]));
        let Command::Demo(args) = cli.command else {
            panic!("expected demo command");
        };
        let config = solver_config_from_args(&args).unwrap();
        assert_eq!(config.lsparse, SparsityWeights::PerSegment(vec![1.0, 4.0]));
        assert_eq!(config.sp_idcs, Some(vec![3, 4]));
        assert_eq!(config.lsmooth.spatial, 0.1);
        assert_eq!(config.lsmooth.spectral, 0.0);
        assert!(config.cache_cross_term);
        assert!(config.smoothness_drop_boundaries);
    }

    #[test]
    fn single_lsparse_without_segments_is_uniform() {
        let cli = Cli::parse_from(argv(&["spook", "demo", "--lsparse", "2.5"]));
        let Command::Demo(args) = cli.command else {
            panic!("expected demo command");
        };
        let config = solver_config_from_args(&args).unwrap();
        assert_eq!(config.lsparse, SparsityWeights::Uniform(2.5));
        assert_eq!(scenario_config_from_args(&args), ScenarioConfig::default());
    }
}
