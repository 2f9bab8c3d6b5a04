//! Simulator compile and run jobs.

use camino::Utf8PathBuf;

use super::ParamSet;
use crate::plan::{Define, Plusarg, Resource, Simulator};
use crate::resolve::WORKDIR_PARAM;
use crate::target::{Params, ToolTarget};
use crate::value::Value;

/// Compile a simulation model with one of the supported simulators.
#[derive(Clone, Debug)]
pub struct SimCompile {
    pub(crate) simulator: Simulator,
    pub(crate) label: String,
    pub(crate) top_module: String,
    pub(crate) sources: Vec<Value>,
    pub(crate) include_dirs: Vec<Utf8PathBuf>,
    pub(crate) defines: Vec<Define>,
    pub(crate) args: Vec<String>,
    pub(crate) resources: Vec<Resource>,
    pub(crate) output_dir: Utf8PathBuf,
    pub(crate) coverage: bool,
}

impl SimCompile {
    /// Path of the compiled model.
    #[must_use]
    pub fn binary(&self) -> Utf8PathBuf {
        match self.simulator {
            Simulator::Verilator => self.output_dir.join(&self.top_module),
            Simulator::Xcelium => self.output_dir.join("xcelium.d"),
            Simulator::Vcs => self.output_dir.join("simv"),
        }
    }

    fn invocation(&self) -> Vec<String> {
        let top = self.top_module.clone();
        match self.simulator {
            Simulator::Verilator => vec![
                "verilator".into(),
                "--cc".into(),
                "--exe".into(),
                "--build".into(),
                "--top-module".into(),
                top.clone(),
                "--Mdir".into(),
                self.output_dir.to_string(),
                "-o".into(),
                top,
            ],
            Simulator::Xcelium => vec![
                "xrun".into(),
                "-elaborate".into(),
                "-64bit".into(),
                "-xmlibdirname".into(),
                self.binary().to_string(),
                "-top".into(),
                top,
            ],
            Simulator::Vcs => vec![
                "vcs".into(),
                "-full64".into(),
                "-sverilog".into(),
                "-top".into(),
                top,
                "-Mdir".into(),
                self.output_dir.join("csrc").to_string(),
                "-o".into(),
                self.binary().to_string(),
            ],
        }
    }
}

impl ToolTarget for SimCompile {
    const KIND: &'static str = "sim-compile";

    fn kind(&self) -> &'static str {
        self.simulator.compile_kind()
    }

    fn output_dir(&self) -> Option<Utf8PathBuf> {
        Some(self.output_dir.clone())
    }

    fn params(&self) -> Params {
        let sim = self.simulator;
        ParamSet::new()
            .param("label", self.label.as_str())
            .param("coverage", self.coverage)
            .resources(&self.resources)
            .args(self.invocation())
            .args(
                self.include_dirs
                    .iter()
                    .flat_map(|dir| sim.include_words(dir.as_str())),
            )
            .args(self.defines.iter().flat_map(|define| sim.define_words(define)))
            .args(self.args.iter())
            .args(self.sources.iter().cloned())
            .output("binary", self.binary())
            .finish()
    }
}

/// Run a compiled simulation model once, inside its output directory.
///
/// Models write their dumps, coverage and logs into the working directory,
/// so file-name arguments are relative to `output_dir`.
#[derive(Clone, Debug)]
pub struct SimRun {
    pub(crate) simulator: Simulator,
    pub(crate) label: String,
    pub(crate) binary: Value,
    pub(crate) seed: u64,
    pub(crate) plusargs: Vec<Plusarg>,
    pub(crate) args_files: Vec<Value>,
    pub(crate) args: Vec<String>,
    pub(crate) resources: Vec<Resource>,
    pub(crate) output_dir: Utf8PathBuf,
    pub(crate) waves_file: Option<Utf8PathBuf>,
    pub(crate) coverage_db: Option<Utf8PathBuf>,
}

impl SimRun {
    /// Plusargs in command-line order. The seed always comes first.
    fn plusarg_words(&self) -> Vec<String> {
        std::iter::once(Plusarg::with_value("random_seed", self.seed))
            .chain(self.plusargs.iter().cloned())
            .map(|plusarg| plusarg.to_string())
            .collect()
    }

    fn args_file_words(&self) -> Vec<Value> {
        self.args_files
            .iter()
            .flat_map(|file| [Value::from("-f"), file.clone()])
            .collect()
    }
}

impl ToolTarget for SimRun {
    const KIND: &'static str = "sim-run";

    fn output_dir(&self) -> Option<Utf8PathBuf> {
        Some(self.output_dir.clone())
    }

    fn params(&self) -> Params {
        let common = ParamSet::new()
            .param("label", self.label.as_str())
            .param("simulator", self.simulator.as_str())
            .param(WORKDIR_PARAM, Value::Path(self.output_dir.clone()))
            .resources(&self.resources);
        let mut set = match self.simulator {
            Simulator::Verilator | Simulator::Vcs => common
                .arg(self.binary.clone())
                .args(self.plusarg_words())
                .args(self.args_file_words()),
            Simulator::Xcelium => common
                .args(["xrun", "-R", "-xmlibdirname"])
                .arg(self.binary.clone())
                .args(self.args_file_words())
                .args(self.plusarg_words()),
        }
        .args(self.args.iter())
        .output("run_dir", &self.output_dir);
        if let Some(waves) = &self.waves_file {
            set = set.output("waves", waves);
        }
        if let Some(db) = &self.coverage_db {
            set = set.output("coverage", db);
        }
        set.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::COMMAND_PARAM;
    use rstest::rstest;

    fn run(simulator: Simulator) -> SimRun {
        SimRun {
            simulator,
            label: "smoke".into(),
            binary: Value::path("model/simv"),
            seed: 7,
            plusargs: vec![Plusarg::flag("verbose")],
            args_files: Vec::new(),
            args: Vec::new(),
            resources: Vec::new(),
            output_dir: "run".into(),
            waves_file: None,
            coverage_db: None,
        }
    }

    #[rstest]
    #[case(Simulator::Verilator, "verilator")]
    #[case(Simulator::Xcelium, "xcelium-compile")]
    #[case(Simulator::Vcs, "vcs-compile")]
    fn compile_kind_follows_the_simulator(#[case] simulator: Simulator, #[case] kind: &str) {
        let target = SimCompile {
            simulator,
            label: "smoke".into(),
            top_module: "TestDriver".into(),
            sources: vec![Value::path("TestDriver.v")],
            include_dirs: Vec::new(),
            defines: Vec::new(),
            args: Vec::new(),
            resources: Vec::new(),
            output_dir: "model".into(),
            coverage: false,
        }
        .into_target();
        assert_eq!(target.name(), kind);
    }

    #[test]
    fn seed_precedes_user_plusargs() {
        let target = run(Simulator::Verilator).into_target();
        assert_eq!(
            target.param(COMMAND_PARAM),
            Some(&Value::list([
                Value::path("model/simv"),
                Value::from("+random_seed=7"),
                Value::from("+verbose"),
            ]))
        );
    }

    #[test]
    fn xcelium_runs_through_xrun() {
        let target = run(Simulator::Xcelium).into_target();
        let Some(Value::List(words)) = target.param(COMMAND_PARAM) else {
            panic!("command should be a list");
        };
        assert_eq!(words.first(), Some(&Value::from("xrun")));
        assert!(words.contains(&Value::from("+random_seed=7")));
    }
}
