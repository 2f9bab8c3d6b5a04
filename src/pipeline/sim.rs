//! Simulator compile and execute on top of an RTL build.
//!
//! The base pipeline is the same for every request; waves and coverage are
//! layered on as plan edits after the user's own additions.

use std::sync::Arc;

use tracing::debug;

use super::layout::SimLayout;
use super::rtl::RtlOutputs;
use crate::field::{FieldRef, field_of};
use crate::plan::{
    Define, Dut, Plan, PlanError, Plusarg, SimCompilePlan, SimExecutePlan, Simulator,
    UserSimulationOptions,
};
use crate::target::Target;
use crate::value::Value;

/// What to simulate and how.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationRequest {
    simulator: Simulator,
    harness: Dut,
    options: UserSimulationOptions,
}

impl SimulationRequest {
    /// Simulate the RTL inside `harness` with default options.
    pub fn new(simulator: Simulator, harness: Dut) -> Self {
        Self {
            simulator,
            harness,
            options: UserSimulationOptions::default(),
        }
    }

    /// Replace the user options.
    #[must_use]
    pub fn with_options(mut self, options: UserSimulationOptions) -> Self {
        self.options = options;
        self
    }

    /// Selected simulator.
    #[must_use]
    pub const fn simulator(&self) -> Simulator {
        self.simulator
    }

    /// Test harness wrapped around the design.
    #[must_use]
    pub const fn harness(&self) -> &Dut {
        &self.harness
    }

    /// User options.
    #[must_use]
    pub const fn options(&self) -> &UserSimulationOptions {
        &self.options
    }
}

/// Plans, targets and artifacts of one simulation.
#[derive(Clone, Debug)]
pub struct SimOutputs {
    layout: SimLayout,
    compile_plan: SimCompilePlan,
    execute_plan: SimExecutePlan,
    compile: Arc<Target>,
    run: Arc<Target>,
}

impl SimOutputs {
    /// Output tree of the run.
    #[must_use]
    pub const fn layout(&self) -> &SimLayout {
        &self.layout
    }

    /// The compile plan after every edit.
    #[must_use]
    pub const fn compile_plan(&self) -> &SimCompilePlan {
        &self.compile_plan
    }

    /// The execute plan after every edit.
    #[must_use]
    pub const fn execute_plan(&self) -> &SimExecutePlan {
        &self.execute_plan
    }

    /// Targets that must be built to run the simulation.
    #[must_use]
    pub fn targets(&self) -> Vec<Arc<Target>> {
        vec![Arc::clone(&self.run)]
    }

    /// Compiled model.
    #[must_use]
    pub fn binary(&self) -> FieldRef {
        field_of("binary", &self.compile)
    }

    /// Directory the run executed in.
    #[must_use]
    pub fn run_dir(&self) -> FieldRef {
        field_of("run_dir", &self.run)
    }

    /// Waveform dump, when waves were requested.
    #[must_use]
    pub fn waves(&self) -> Option<FieldRef> {
        self.execute_plan
            .waves_file()
            .as_ref()
            .map(|_| field_of("waves", &self.run))
    }

    /// Coverage database, when coverage was requested.
    #[must_use]
    pub fn coverage(&self) -> Option<FieldRef> {
        self.execute_plan
            .coverage_db()
            .as_ref()
            .map(|_| field_of("coverage", &self.run))
    }
}

fn compile_plan(rtl: &RtlOutputs, request: &SimulationRequest, layout: &SimLayout) -> SimCompilePlan {
    let simulator = request.simulator();
    let harness = request.harness();
    let options = request.options();
    SimCompilePlan::new(
        options.label().clone(),
        simulator,
        harness.top_module().clone(),
        layout.model_dir(),
    )
    .append_sources([Value::from(rtl.verilog())])
    .append_sources(harness.sources().iter().cloned())
    .append_include_dirs(harness.include_dirs().iter().cloned())
    .append_defines(harness.defines().iter().cloned())
    .append_defines(options.defines().iter().cloned())
    .append_args(options.compile_args().iter().cloned())
    .apply_if(*options.waves(), |plan| {
        plan.append_defines([Define::flag("DEBUG")])
            .append_args(simulator.waves_compile_args())
    })
    .apply_if(*options.coverage(), |plan| {
        plan.append_args(simulator.coverage_compile_args())
            .with_coverage(true)
    })
}

fn execute_plan(
    compile: &Arc<Target>,
    request: &SimulationRequest,
    layout: &SimLayout,
) -> SimExecutePlan {
    let simulator = request.simulator();
    let options = request.options();
    // Runs execute in the run directory, so the model is handed file names.
    let waves = simulator.waves_file_name();
    let coverage = simulator.coverage_db_name();
    SimExecutePlan::new(options.label().clone(), simulator, layout.run_dir())
        .with_binary(Some(field_of("binary", compile).into()))
        .with_seed(*options.seed())
        .append_plusargs(
            options
                .max_cycles()
                .map(|cycles| Plusarg::with_value("max-cycles", cycles)),
        )
        .append_plusargs(
            options
                .test_program()
                .as_ref()
                .map(|program| Plusarg::with_value("testfile", program)),
        )
        .apply_if(*options.verbose(), |plan| {
            plan.append_plusargs([Plusarg::flag("verbose")])
        })
        .apply_if(*options.heartbeat(), |plan| {
            plan.append_plusargs([Plusarg::flag("heartbeat")])
        })
        .append_plusargs(options.plusargs().iter().cloned())
        .append_args_files(options.args_files().iter().cloned())
        .append_args(options.execute_args().iter().cloned())
        .apply_if(*options.waves(), |plan| {
            plan.append_plusargs([simulator.waves_plusarg(waves)])
                .with_waves_file(Some(layout.waves_file()))
        })
        .apply_if(*options.coverage(), |plan| {
            plan.append_args(simulator.coverage_run_args(coverage))
                .with_coverage_db(Some(layout.coverage_db()))
        })
}

/// Wire compile and execute for `request` against the RTL of `rtl`.
///
/// # Errors
///
/// Returns [`PlanError`] when the harness has no top module or the
/// simulator cannot honour an option, for example argument files under
/// Verilator.
pub fn compose(rtl: &RtlOutputs, request: &SimulationRequest) -> Result<SimOutputs, PlanError> {
    let layout = rtl
        .layout()
        .sim(request.simulator(), request.options().label());
    debug!(
        simulator = %request.simulator(),
        label = request.options().label(),
        waves = request.options().waves(),
        coverage = request.options().coverage(),
        "composing simulation"
    );
    let compile_plan = compile_plan(rtl, request, &layout);
    let compile = compile_plan.clone().into_target()?;
    let execute_plan = execute_plan(&compile, request, &layout);
    let run = execute_plan.clone().into_target()?;
    Ok(SimOutputs {
        layout,
        compile_plan,
        execute_plan,
        compile,
        run,
    })
}
