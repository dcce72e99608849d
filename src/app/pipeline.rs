//! Shared "demo pipeline" logic.
//!
//! Keeping this in one place keeps the core workflow testable without the CLI:
//! synthetic scenario -> base operators -> assemble -> solve -> compare with truth

use nalgebra::DMatrix;

use crate::data::{Scenario, ScenarioConfig, generate_scenario};
use crate::domain::{InputMode, LinSolveConfig, ProblemMode};
use crate::error::SpookError;
use crate::math::Operator;
use crate::report::max_abs_error;
use crate::solve::SpookLinSolve;

/// All computed outputs of a single `spook demo` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub scenario: Scenario,
    pub config: LinSolveConfig,
    pub mode: ProblemMode,
    /// `dense` or `sparse`.
    pub representation: &'static str,
    pub side: usize,
    pub x: DMatrix<f64>,
    pub max_abs_error: f64,
    pub residual_norm: f64,
    pub cross_term_builds: usize,
}

/// Generate the scenario and solve it with `config`.
pub fn run_demo(scenario_config: &ScenarioConfig, config: &LinSolveConfig) -> Result<RunOutput, SpookError> {
    let scenario = generate_scenario(scenario_config)?;
    run_demo_with_scenario(scenario, config)
}

/// Solve a pre-generated scenario.
pub fn run_demo_with_scenario(scenario: Scenario, config: &LinSolveConfig) -> Result<RunOutput, SpookError> {
    let mut spk = SpookLinSolve::new(
        &scenario.b,
        Operator::Dense(scenario.a.clone()),
        InputMode::Raw,
        Some(&scenario.g),
        config,
    )?;
    spk.solve(None, None)?;

    let x = spk.x_opt().ok_or(SpookError::NonFinite)?;
    let max_abs_error = max_abs_error(&x, &scenario.x_true)?;
    let residual_norm = spk.residual_norm().ok_or(SpookError::NonFinite)?;

    Ok(RunOutput {
        mode: spk.mode(),
        representation: spk.problem().p().kind_name(),
        side: spk.problem().side(),
        cross_term_builds: spk.cross_term_builds(),
        config: config.clone(),
        scenario,
        x,
        max_abs_error,
        residual_norm,
    })
}
