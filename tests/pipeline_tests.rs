//! End-to-end composition of the bundled flows, executed against recording
//! and dry-run executors.

use camino::Utf8PathBuf;
use hwforge::builtins::Builtins;
use hwforge::pipeline::{SimulationRequest, bsp, rtl, sim};
use hwforge::plan::{BspPlan, Define, Dut, Plusarg, RtlPlan, Simulator, UserSimulationOptions};
use hwforge::resolve::{Executor, Job, Outputs, Resolver, ToolFailure};
use hwforge::runner::{CommandExecutor, DryRunExecutor};
use hwforge::value::Value;
use rstest::rstest;
use test_support::{RecordingExecutor, fake_tool, utf8_tempdir};

/// Records every job except the simulation run, which is spawned for real.
struct SpawnRuns<'a> {
    recorder: &'a RecordingExecutor,
}

impl Executor for SpawnRuns<'_> {
    fn execute(&self, job: &Job) -> Result<Outputs, ToolFailure> {
        if job.name() == "sim-run" {
            CommandExecutor::new().execute(job)
        } else {
            self.recorder.execute(job)
        }
    }
}

fn harness() -> Dut {
    Dut::new("harness", "TestDriver").append_sources([Value::path("harness/TestDriver.v")])
}

fn simulation(waves: bool) -> sim::SimOutputs {
    let rtl = rtl::compose(&RtlPlan::new("soc", ["Base"])).expect("rtl");
    let options = UserSimulationOptions::default().with_waves(waves);
    let request = SimulationRequest::new(Simulator::Verilator, harness()).with_options(options);
    sim::compose(&rtl, &request).expect("sim")
}

#[test]
fn rtl_output_directory_exists_before_the_compiler_runs() {
    let (_guard, root) = utf8_tempdir().expect("tempdir");
    let plan = RtlPlan::new("testSocket", ["WithPioTop"]).with_build_root(root.clone());
    let outputs = rtl::compose(&plan).expect("compose");
    assert_eq!(
        outputs.verilog_path(),
        root.join("testSocket/verilog/testSocket.v")
    );

    let executor = RecordingExecutor::new();
    let mut resolver = Resolver::new(&executor);
    for outcome in resolver.resolve_all(&outputs.targets()) {
        outcome.expect("rtl flow");
    }

    let events = executor.events();
    let prepare = format!("prepare {}", outputs.layout().verilog_dir());
    let prepared_at = events.iter().position(|e| *e == prepare).expect("prepared");
    let compiled_at = events
        .iter()
        .position(|e| e == "execute firrtl-compile")
        .expect("compiled");
    assert!(prepared_at < compiled_at, "events: {events:?}");
    assert!(outputs.verilog_path().exists());
    assert_eq!(executor.count("firrtl-generate"), 1, "dtc and firrtl share one generator run");
}

#[rstest]
#[case(true)]
#[case(false)]
fn waves_toggle_the_debug_define_and_dump_file(#[case] waves: bool) {
    let sim = simulation(waves);
    let dump = Plusarg::with_value("vcdfile", "sim.vcd");

    assert_eq!(sim.compile_plan().defines().contains(&Define::flag("DEBUG")), waves);
    assert_eq!(sim.execute_plan().plusargs().contains(&dump), waves);
    assert_eq!(sim.waves().is_some(), waves);

    let executor = DryRunExecutor::new();
    let mut resolver = Resolver::new(&executor);
    for outcome in resolver.resolve_all(&sim.targets()) {
        outcome.expect("dry run");
    }
    let planned = executor.planned();
    let compile = planned
        .iter()
        .find(|line| line.starts_with("verilator "))
        .expect("compile line");
    let run = planned.last().expect("run line");
    assert_eq!(compile.contains("-DDEBUG"), waves);
    assert_eq!(compile.contains("--trace"), waves);
    assert_eq!(run.contains("+vcdfile=sim.vcd"), waves);
    assert!(run.contains("+random_seed=0"));
}

#[test]
fn missing_settings_key_stops_the_bsp_before_install() {
    let (_guard, root) = utf8_tempdir().expect("tempdir");
    let plan = RtlPlan::new("soc", ["Base"]).with_build_root(root);
    let rtl = rtl::compose(&plan).expect("rtl");
    let bsp = bsp::compose(&BspPlan::new(), &rtl);
    let settings: Utf8PathBuf = rtl.layout().bsp().generated_dir().join("settings.mk");

    let executor = RecordingExecutor::new().writing("bsp-generate", "settings", "RISCV_ARCH = rv64gc\n");
    let mut resolver = Resolver::new(Builtins::new(&executor));
    let failure = resolver
        .resolve_all(&bsp.targets())
        .into_iter()
        .find_map(Result::err)
        .expect("bsp fails");

    assert_eq!(failure.failed_target(), "attributes");
    assert_eq!(failure.artifact(), Some(settings.as_path()));
    assert!(matches!(failure.cause(), ToolFailure::MalformedArtifact { .. }));
    assert!(failure.to_string().contains("RISCV_ABI"));
    assert_eq!(executor.count("bsp-generate"), 1);
    assert_eq!(executor.count("metal-install"), 0);
}

#[test]
fn complete_settings_reach_the_install_command() {
    let (_guard, root) = utf8_tempdir().expect("tempdir");
    let plan = RtlPlan::new("soc", ["Base"]).with_build_root(root);
    let rtl = rtl::compose(&plan).expect("rtl");
    let bsp = bsp::compose(&BspPlan::new(), &rtl);

    let executor = RecordingExecutor::new().writing(
        "bsp-generate",
        "settings",
        "RISCV_ARCH = rv64gc\nRISCV_ABI = lp64d\n",
    );
    let mut resolver = Resolver::new(Builtins::new(&executor));
    for outcome in resolver.resolve_all(&bsp.targets()) {
        outcome.expect("bsp");
    }

    let jobs = executor.jobs();
    let install = jobs
        .iter()
        .find(|job| job.name() == "metal-install")
        .expect("install ran");
    let command = install.command().expect("command");
    let abi_at = command.iter().position(|word| word == "--with-abi").expect("abi flag");
    assert_eq!(command.get(abi_at + 1).map(String::as_str), Some("lp64d"));
    assert_eq!(executor.count("attributes"), 0, "attributes are evaluated in-process");
}

#[cfg(unix)]
#[test]
fn verilator_coverage_database_appears_in_the_run_directory() {
    let (_guard, root) = utf8_tempdir().expect("tempdir");
    let plan = RtlPlan::new("soc", ["Base"]).with_build_root(root);
    let rtl = rtl::compose(&plan).expect("rtl");
    let options = UserSimulationOptions::default().with_coverage(true);
    let request = SimulationRequest::new(Simulator::Verilator, harness()).with_options(options);
    let sim = sim::compose(&rtl, &request).expect("sim");

    // The driver always writes coverage.dat into its working directory.
    let model_dir = sim.layout().model_dir();
    std::fs::create_dir_all(&model_dir).expect("model dir");
    fake_tool(&model_dir, "TestDriver", "touch coverage.dat").expect("fake model");

    let recorder = RecordingExecutor::new();
    let mut resolver = Resolver::new(SpawnRuns { recorder: &recorder });
    for outcome in resolver.resolve_all(&sim.targets()) {
        outcome.expect("coverage run");
    }
    assert!(sim.layout().coverage_db().exists());
    assert_eq!(recorder.count("verilator"), 1);
}
