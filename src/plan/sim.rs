//! Simulation plans.

use std::sync::Arc;

use camino::Utf8PathBuf;

use super::{Define, PlanError, Plusarg, Resource, Simulator, plan_fields, require_component};
use crate::target::{Target, ToolTarget};
use crate::tools::{SimCompile, SimRun};
use crate::value::Value;

/// The device under test: the design sources a simulator compiles together
/// with the harness.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dut {
    name: String,
    top_module: String,
    sources: Vec<Value>,
    include_dirs: Vec<Utf8PathBuf>,
    defines: Vec<Define>,
}

impl Dut {
    /// A design with no sources yet.
    pub fn new(name: impl Into<String>, top_module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            top_module: top_module.into(),
            sources: Vec::new(),
            include_dirs: Vec::new(),
            defines: Vec::new(),
        }
    }
}

plan_fields! {
    Dut {
        name: String => with_name, edit_name;
        top_module: String => with_top_module, edit_top_module;
        sources: Vec<Value> => with_sources, edit_sources, append_sources;
        include_dirs: Vec<Utf8PathBuf> => with_include_dirs, edit_include_dirs, append_include_dirs;
        defines: Vec<Define> => with_defines, edit_defines, append_defines;
    }
}

/// Per-run knobs a user supplies on top of a simulation pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserSimulationOptions {
    label: String,
    waves: bool,
    coverage: bool,
    seed: u64,
    max_cycles: Option<u64>,
    test_program: Option<Utf8PathBuf>,
    verbose: bool,
    heartbeat: bool,
    plusargs: Vec<Plusarg>,
    defines: Vec<Define>,
    compile_args: Vec<String>,
    execute_args: Vec<String>,
    args_files: Vec<Utf8PathBuf>,
}

impl Default for UserSimulationOptions {
    fn default() -> Self {
        Self {
            label: "default".to_owned(),
            waves: false,
            coverage: false,
            seed: 0,
            max_cycles: None,
            test_program: None,
            verbose: false,
            heartbeat: false,
            plusargs: Vec::new(),
            defines: Vec::new(),
            compile_args: Vec::new(),
            execute_args: Vec::new(),
            args_files: Vec::new(),
        }
    }
}

impl UserSimulationOptions {
    /// Cycle limit, or `default` when none was requested.
    #[must_use]
    pub fn max_cycles_or(&self, default: u64) -> u64 {
        self.max_cycles.unwrap_or(default)
    }
}

plan_fields! {
    UserSimulationOptions {
        label: String => with_label, edit_label;
        waves: bool => with_waves, edit_waves;
        coverage: bool => with_coverage, edit_coverage;
        seed: u64 => with_seed, edit_seed;
        max_cycles: Option<u64> => with_max_cycles, edit_max_cycles;
        test_program: Option<Utf8PathBuf> => with_test_program, edit_test_program;
        verbose: bool => with_verbose, edit_verbose;
        heartbeat: bool => with_heartbeat, edit_heartbeat;
        plusargs: Vec<Plusarg> => with_plusargs, edit_plusargs, append_plusargs;
        defines: Vec<Define> => with_defines, edit_defines, append_defines;
        compile_args: Vec<String> => with_compile_args, edit_compile_args, append_compile_args;
        execute_args: Vec<String> => with_execute_args, edit_execute_args, append_execute_args;
        args_files: Vec<Utf8PathBuf> => with_args_files, edit_args_files, append_args_files;
    }
}

/// Everything needed to compile a simulation model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimCompilePlan {
    label: String,
    simulator: Simulator,
    top_module: String,
    sources: Vec<Value>,
    include_dirs: Vec<Utf8PathBuf>,
    defines: Vec<Define>,
    args: Vec<String>,
    resources: Vec<Resource>,
    output_dir: Utf8PathBuf,
    coverage: bool,
}

impl SimCompilePlan {
    /// A compile plan pinned to the simulator's default toolchain.
    pub fn new(
        label: impl Into<String>,
        simulator: Simulator,
        top_module: impl Into<String>,
        output_dir: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            label: label.into(),
            simulator,
            top_module: top_module.into(),
            sources: Vec::new(),
            include_dirs: Vec::new(),
            defines: Vec::new(),
            args: Vec::new(),
            resources: vec![simulator.default_resource()],
            output_dir: output_dir.into(),
            coverage: false,
        }
    }

    /// Lower into a compile target.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] when the label or top module is blank, the label
    /// is not a single path component, or no sources were supplied.
    pub fn into_target(self) -> Result<Arc<Target>, PlanError> {
        const PLAN: &str = "SimCompilePlan";
        if self.label.trim().is_empty() {
            return Err(PlanError::MissingField { plan: PLAN, field: "label" });
        }
        require_component(PLAN, "label", &self.label)?;
        if self.top_module.trim().is_empty() {
            return Err(PlanError::MissingField { plan: PLAN, field: "top_module" });
        }
        if self.sources.is_empty() {
            return Err(PlanError::Empty { plan: PLAN, field: "sources" });
        }
        Ok(SimCompile {
            simulator: self.simulator,
            label: self.label,
            top_module: self.top_module,
            sources: self.sources,
            include_dirs: self.include_dirs,
            defines: self.defines,
            args: self.args,
            resources: self.resources,
            output_dir: self.output_dir,
            coverage: self.coverage,
        }
        .into_target())
    }
}

plan_fields! {
    SimCompilePlan {
        label: String => with_label, edit_label;
        simulator: Simulator => with_simulator, edit_simulator;
        top_module: String => with_top_module, edit_top_module;
        sources: Vec<Value> => with_sources, edit_sources, append_sources;
        include_dirs: Vec<Utf8PathBuf> => with_include_dirs, edit_include_dirs, append_include_dirs;
        defines: Vec<Define> => with_defines, edit_defines, append_defines;
        args: Vec<String> => with_args, edit_args, append_args;
        resources: Vec<Resource> => with_resources, edit_resources, append_resources;
        output_dir: Utf8PathBuf => with_output_dir, edit_output_dir;
        coverage: bool => with_coverage, edit_coverage;
    }
}

/// Everything needed to run a compiled simulation model once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimExecutePlan {
    label: String,
    simulator: Simulator,
    binary: Option<Value>,
    seed: u64,
    plusargs: Vec<Plusarg>,
    args_files: Vec<Value>,
    args: Vec<String>,
    resources: Vec<Resource>,
    output_dir: Utf8PathBuf,
    waves_file: Option<Utf8PathBuf>,
    coverage_db: Option<Utf8PathBuf>,
}

impl SimExecutePlan {
    /// An execute plan with seed 0 and no binary yet.
    pub fn new(label: impl Into<String>, simulator: Simulator, output_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            label: label.into(),
            simulator,
            binary: None,
            seed: 0,
            plusargs: Vec::new(),
            args_files: Vec::new(),
            args: Vec::new(),
            resources: vec![simulator.default_resource()],
            output_dir: output_dir.into(),
            waves_file: None,
            coverage_db: None,
        }
    }

    /// Lower into a run target.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::MissingField`] when no binary was wired in and
    /// [`PlanError::Unsupported`] when Verilator is asked to read argument
    /// files.
    pub fn into_target(self) -> Result<Arc<Target>, PlanError> {
        let Some(binary) = self.binary else {
            return Err(PlanError::MissingField {
                plan: "SimExecutePlan",
                field: "binary",
            });
        };
        if self.simulator == Simulator::Verilator && !self.args_files.is_empty() {
            return Err(PlanError::Unsupported {
                simulator: self.simulator,
                feature: "argument files",
            });
        }
        Ok(SimRun {
            simulator: self.simulator,
            label: self.label,
            binary,
            seed: self.seed,
            plusargs: self.plusargs,
            args_files: self.args_files,
            args: self.args,
            resources: self.resources,
            output_dir: self.output_dir,
            waves_file: self.waves_file,
            coverage_db: self.coverage_db,
        }
        .into_target())
    }
}

plan_fields! {
    SimExecutePlan {
        label: String => with_label, edit_label;
        simulator: Simulator => with_simulator, edit_simulator;
        binary: Option<Value> => with_binary, edit_binary;
        seed: u64 => with_seed, edit_seed;
        plusargs: Vec<Plusarg> => with_plusargs, edit_plusargs, append_plusargs;
        args_files: Vec<Value> => with_args_files, edit_args_files, append_args_files;
        args: Vec<String> => with_args, edit_args, append_args;
        resources: Vec<Resource> => with_resources, edit_resources, append_resources;
        output_dir: Utf8PathBuf => with_output_dir, edit_output_dir;
        waves_file: Option<Utf8PathBuf> => with_waves_file, edit_waves_file;
        coverage_db: Option<Utf8PathBuf> => with_coverage_db, edit_coverage_db;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Plan;
    use rstest::{fixture, rstest};

    #[fixture]
    fn compile() -> SimCompilePlan {
        SimCompilePlan::new("smoke", Simulator::Verilator, "TestDriver", "build/sim")
            .append_sources([Value::path("TestDriver.v")])
    }

    #[rstest]
    fn set_then_get_round_trips(compile: SimCompilePlan) {
        let updated = compile.clone().with_top_module("Other".to_owned());
        assert_eq!(updated.top_module(), "Other");
        assert_eq!(compile.top_module(), "TestDriver");
    }

    #[rstest]
    fn edit_applies_the_function_to_the_current_value(compile: SimCompilePlan) {
        let f = |label: String| format!("{label}-cov");
        let expected = f(compile.label().clone());
        let edited = compile.clone().edit_label(f);
        assert_eq!(edited.label(), &expected);
        assert_eq!(compile.label(), "smoke");
    }

    #[rstest]
    fn appends_preserve_order(compile: SimCompilePlan) {
        let plan = compile
            .with_defines(vec![Define::flag("BASE")])
            .append_defines([Define::flag("X")])
            .append_defines([Define::flag("Y")]);
        assert_eq!(
            plan.defines(),
            &[Define::flag("BASE"), Define::flag("X"), Define::flag("Y")]
        );
    }

    #[rstest]
    fn apply_if_skips_disabled_edits(compile: SimCompilePlan) {
        let untouched = compile
            .clone()
            .apply_if(false, |p| p.append_args(["--trace"]));
        assert_eq!(untouched, compile);
        let traced = compile.apply_if(true, |p| p.append_args(["--trace"]));
        assert_eq!(traced.args(), &["--trace".to_owned()]);
    }

    #[test]
    fn compile_without_sources_is_rejected() {
        let err = SimCompilePlan::new("smoke", Simulator::Vcs, "TestDriver", "out")
            .into_target()
            .expect_err("no sources");
        assert_eq!(
            err,
            PlanError::Empty {
                plan: "SimCompilePlan",
                field: "sources",
            }
        );
    }

    #[rstest]
    #[case("../smoke")]
    #[case("regress/smoke")]
    #[case("..")]
    fn labels_must_stay_inside_the_build_root(compile: SimCompilePlan, #[case] label: &str) {
        let err = compile
            .with_label(label.to_owned())
            .into_target()
            .expect_err("label escapes its directory");
        assert_eq!(
            err,
            PlanError::NotAPathComponent {
                plan: "SimCompilePlan",
                field: "label",
                value: label.to_owned(),
            }
        );
    }

    #[test]
    fn execute_without_binary_is_rejected() {
        let err = SimExecutePlan::new("smoke", Simulator::Xcelium, "out")
            .into_target()
            .expect_err("no binary");
        assert!(matches!(err, PlanError::MissingField { field: "binary", .. }));
    }

    #[test]
    fn verilator_rejects_argument_files() {
        let err = SimExecutePlan::new("smoke", Simulator::Verilator, "out")
            .with_binary(Some(Value::path("out/smoke")))
            .append_args_files([Value::path("extra.f")])
            .into_target()
            .expect_err("argument files");
        assert!(matches!(err, PlanError::Unsupported { .. }));
    }

    #[test]
    fn get_or_else_uses_the_default_only_when_absent() {
        let options = UserSimulationOptions::default();
        assert_eq!(options.max_cycles_or(1000), 1000);
        assert_eq!(options.with_max_cycles(Some(5)).max_cycles_or(1000), 5);
    }
}
