//! Lowering CLI flows into root targets.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};

use super::RunnerError;
use crate::blueprint::Blueprint;
use crate::cli::{BitstreamArgs, BlueprintArgs, BspArgs, Flow, RtlArgs, SimArgs};
use crate::pipeline::{RtlOutputs, SimulationRequest, bitstream, bsp, rtl, sim};
use crate::plan::{BitstreamPlan, BspPlan, Dut, Plan, RtlPlan, UserSimulationOptions};
use crate::target::Target;

/// Compose `flow` and return the targets that must be built for it.
pub(super) fn compose(flow: &Flow, build_root: &Utf8Path) -> Result<Vec<Arc<Target>>> {
    match flow {
        Flow::Rtl(args) => Ok(compose_rtl(args, build_root)?.targets()),
        Flow::Bsp(args) => compose_bsp(args, build_root),
        Flow::Sim(args) => compose_sim(args, build_root),
        Flow::Bitstream(args) => compose_bitstream(args, build_root),
        Flow::Blueprint(args) => compose_blueprint(args),
    }
}

pub(super) fn rtl_plan(args: &RtlArgs, build_root: &Utf8Path) -> RtlPlan {
    RtlPlan::new(args.design.clone(), args.configs.iter().cloned())
        .with_build_root(build_root.to_owned())
        .append_extra_deps(args.deps.iter().cloned())
        .apply(|plan| match &args.top {
            Some(top) => plan.with_top_module(top.clone()),
            None => plan,
        })
        .apply(|plan| match &args.generator {
            Some(generator) => plan.with_generator(generator.clone()),
            None => plan,
        })
}

fn compose_rtl(args: &RtlArgs, build_root: &Utf8Path) -> Result<RtlOutputs> {
    rtl::compose(&rtl_plan(args, build_root))
        .with_context(|| format!("composing RTL flow for {}", args.design))
}

fn compose_bsp(args: &BspArgs, build_root: &Utf8Path) -> Result<Vec<Arc<Target>>> {
    let rtl = compose_rtl(&args.rtl, build_root)?;
    let plan = BspPlan::new()
        .append_required_attributes(args.required.iter().cloned())
        .apply(|plan| match &args.bsp_generator {
            Some(generator) => plan.with_generator(generator.clone()),
            None => plan,
        });
    Ok(bsp::compose(&plan, &rtl).targets())
}

/// Anchor `path` at the invocation directory. Simulation runs execute in
/// their run directory, and a path inside a plusarg is never rebased there.
fn anchored(path: &Utf8Path) -> Result<Utf8PathBuf> {
    let absolute =
        std::path::absolute(path).with_context(|| format!("resolving {path}"))?;
    Utf8PathBuf::from_path_buf(absolute)
        .map_err(|raw| anyhow!("{} is not valid UTF-8", raw.display()))
}

pub(super) fn simulation_request(args: &SimArgs) -> Result<SimulationRequest> {
    let test_program = args.test_program.as_deref().map(anchored).transpose()?;
    let harness = Dut::new("harness", args.harness_top.clone())
        .append_sources(args.harness_sources.iter().cloned())
        .append_include_dirs(args.include_dirs.iter().cloned());
    let options = UserSimulationOptions::default()
        .with_label(args.label.clone())
        .with_waves(args.waves)
        .with_coverage(args.coverage)
        .with_seed(args.seed)
        .with_max_cycles(args.max_cycles)
        .with_test_program(test_program)
        .with_verbose(args.sim_verbose)
        .with_heartbeat(args.heartbeat)
        .append_plusargs(args.plusargs.iter().cloned())
        .append_defines(args.defines.iter().cloned())
        .append_compile_args(args.compile_args.iter().cloned())
        .append_execute_args(args.run_args.iter().cloned())
        .append_args_files(args.args_files.iter().cloned());
    Ok(SimulationRequest::new(args.simulator, harness).with_options(options))
}

fn compose_sim(args: &SimArgs, build_root: &Utf8Path) -> Result<Vec<Arc<Target>>> {
    let rtl = compose_rtl(&args.rtl, build_root)?;
    let outputs = sim::compose(&rtl, &simulation_request(args)?).with_context(|| {
        format!(
            "composing {} simulation of {}",
            args.simulator, args.rtl.design
        )
    })?;
    Ok(outputs.targets())
}

fn compose_bitstream(args: &BitstreamArgs, build_root: &Utf8Path) -> Result<Vec<Arc<Target>>> {
    let rtl = compose_rtl(&args.rtl, build_root)?;
    let plan = BitstreamPlan::new(args.board.clone(), args.part.clone(), args.scripts_dir.clone())
        .append_constraints(args.constraints.iter().cloned())
        .append_extra_sources(args.sources.iter().cloned())
        .apply(|plan| match &args.flash_interface {
            Some(interface) => plan.with_flash_interface(interface.clone()),
            None => plan,
        })
        .apply(|plan| match args.flash_size {
            Some(size) => plan.with_flash_size_mb(size),
            None => plan,
        });
    let outputs = bitstream::compose(&plan, &rtl)
        .with_context(|| format!("composing bitstream flow for {}", args.board))?;
    Ok(outputs.targets())
}

fn compose_blueprint(args: &BlueprintArgs) -> Result<Vec<Arc<Target>>> {
    let blueprint = Blueprint::from_path(&args.path)
        .with_context(|| format!("loading blueprint {}", args.path))?;
    let linked = blueprint
        .link()
        .with_context(|| format!("linking blueprint {}", args.path))?;
    if args.roots.is_empty() {
        return Ok(linked.roots());
    }
    args.roots
        .iter()
        .map(|label| {
            linked.get(label).cloned().ok_or_else(|| {
                anyhow::Error::from(RunnerError::UnknownRoot {
                    label: label.clone(),
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn flow(args: &[&str]) -> Flow {
        let cli = Cli::try_parse_from(std::iter::once("hwforge").chain(args.iter().copied()))
            .expect("parse");
        match cli.command {
            crate::cli::Commands::Build(flow) => flow,
            other => panic!("expected a build, got {other:?}"),
        }
    }

    #[test]
    fn rtl_flags_override_plan_defaults() {
        let Flow::Rtl(args) = flow(&["rtl", "soc", "-c", "A", "-c", "B", "--top", "Top"]) else {
            panic!("expected rtl");
        };
        let plan = rtl_plan(&args, Utf8Path::new("out"));
        assert_eq!(plan.configs(), &["A", "B"]);
        assert_eq!(plan.top_module(), "Top");
        assert_eq!(plan.build_root(), "out");
    }

    #[test]
    fn sim_flags_become_user_options() {
        let Flow::Sim(args) = flow(&[
            "sim", "soc", "-c", "Base", "--waves", "--seed", "7", "--heartbeat",
        ]) else {
            panic!("expected sim");
        };
        let request = simulation_request(&args).expect("request");
        let options = request.options();
        assert!(*options.waves());
        assert!(*options.heartbeat());
        assert_eq!(*options.seed(), 7);
        assert_eq!(request.harness().top_module(), "TestDriver");
    }

    #[test]
    fn test_programs_are_anchored_at_the_invocation_directory() {
        let Flow::Sim(args) = flow(&[
            "sim", "soc", "-c", "Base", "--test-program", "tests/hello.elf",
        ]) else {
            panic!("expected sim");
        };
        let request = simulation_request(&args).expect("request");
        let program = request
            .options()
            .test_program()
            .clone()
            .expect("test program");
        assert!(program.is_absolute(), "{program}");
        assert!(program.ends_with("tests/hello.elf"));
    }

    #[test]
    fn each_flow_composes_one_root() {
        let root = Utf8Path::new("build");
        for args in [
            &["rtl", "soc", "-c", "Base"][..],
            &["bsp", "soc", "-c", "Base"],
            &["sim", "soc", "-c", "Base", "--harness", "TestDriver.v"],
            &[
                "bitstream", "soc", "-c", "Base", "--board", "arty", "--part", "xc7a35t",
                "--scripts-dir", "scripts", "--constraint", "arty.xdc",
            ],
        ] {
            let roots = compose(&flow(args), root).expect("compose");
            assert!(!roots.is_empty(), "{args:?}");
        }
    }
}
