//! Scala → FIRRTL → Verilog, plus the device tree blob.

use std::sync::Arc;

use camino::Utf8PathBuf;
use tracing::debug;

use super::layout::RtlLayout;
use crate::field::{FieldRef, field_of};
use crate::plan::{PlanError, RtlPlan};
use crate::target::{Target, ToolTarget};
use crate::tools::{Dtc, FirrtlCompile, FirrtlGenerate, ScalaCompile};

/// Targets and artifacts of an RTL build.
#[derive(Clone, Debug)]
pub struct RtlOutputs {
    design: String,
    top_module: String,
    layout: RtlLayout,
    generate: Arc<Target>,
    compile: Arc<Target>,
    dtc: Arc<Target>,
}

impl RtlOutputs {
    /// Design name.
    #[must_use]
    pub fn design(&self) -> &str {
        &self.design
    }

    /// Top module of the generated Verilog.
    #[must_use]
    pub fn top_module(&self) -> &str {
        &self.top_module
    }

    /// Output tree of the design.
    #[must_use]
    pub const fn layout(&self) -> &RtlLayout {
        &self.layout
    }

    /// The Verilog compile, which is the final step of the flow.
    #[must_use]
    pub const fn final_target(&self) -> &Arc<Target> {
        &self.compile
    }

    /// Targets that must be built to produce every RTL artifact.
    #[must_use]
    pub fn targets(&self) -> Vec<Arc<Target>> {
        vec![Arc::clone(&self.compile), Arc::clone(&self.dtc)]
    }

    /// Generated Verilog file.
    #[must_use]
    pub fn verilog(&self) -> FieldRef {
        field_of("verilog", &self.compile)
    }

    /// Path [`Self::verilog`] resolves to.
    #[must_use]
    pub fn verilog_path(&self) -> Utf8PathBuf {
        self.layout.verilog_file()
    }

    /// FIRRTL circuit.
    #[must_use]
    pub fn firrtl(&self) -> FieldRef {
        field_of("firrtl", &self.generate)
    }

    /// Annotation file written next to the circuit.
    #[must_use]
    pub fn annotations(&self) -> FieldRef {
        field_of("annotations", &self.generate)
    }

    /// Memory-init configuration.
    #[must_use]
    pub fn rom_conf(&self) -> FieldRef {
        field_of("rom_conf", &self.generate)
    }

    /// Device tree source.
    #[must_use]
    pub fn dts(&self) -> FieldRef {
        field_of("dts", &self.generate)
    }

    /// Compiled device tree.
    #[must_use]
    pub fn dtb(&self) -> FieldRef {
        field_of("dtb", &self.dtc)
    }
}

/// Wire the RTL flow for `plan`.
///
/// # Errors
///
/// Returns [`PlanError`] when the plan has no design name or no configs.
pub fn compose(plan: &RtlPlan) -> Result<RtlOutputs, PlanError> {
    plan.validate()?;
    let layout = RtlLayout::new(plan.build_root(), plan.design());
    debug!(design = plan.design(), root = %layout.root(), "composing rtl flow");
    let resources = plan.resources().clone();

    let classes = ScalaCompile {
        sources: plan.extra_deps().clone(),
        output_dir: layout.classes_dir(),
        resources: resources.clone(),
    }
    .into_target();

    let generate = FirrtlGenerate {
        classpath: field_of("classes", &classes).into(),
        generator: plan.generator().clone(),
        design: plan.design().clone(),
        top_module: plan.top_module().clone(),
        configs: plan.configs().clone(),
        output_dir: layout.firrtl_dir(),
        resources: resources.clone(),
    }
    .into_target();

    let compile = FirrtlCompile {
        firrtl: field_of("firrtl", &generate).into(),
        annotations: field_of("annotations", &generate).into(),
        top_module: plan.top_module().clone(),
        verilog: layout.verilog_file(),
        output_dir: layout.verilog_dir(),
        resources: resources.clone(),
    }
    .into_target();

    let dtc = Dtc {
        dts: field_of("dts", &generate).into(),
        dtb: layout.dtb_file(),
        resources,
    }
    .into_target();

    Ok(RtlOutputs {
        design: plan.design().clone(),
        top_module: plan.top_module().clone(),
        layout,
        generate,
        compile,
        dtc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;

    #[test]
    fn verilog_is_written_into_the_declared_directory() {
        let rtl = compose(&RtlPlan::new("testSocket", ["WithPioTop"])).expect("compose");
        assert_eq!(rtl.verilog_path(), "build/testSocket/verilog/testSocket.v");
        assert_eq!(
            rtl.final_target().output_dir(),
            Some(Utf8Path::new("build/testSocket/verilog"))
        );
    }

    #[test]
    fn composing_twice_yields_identical_targets() {
        let plan = RtlPlan::new("soc", ["Base"]);
        let first = compose(&plan).expect("compose");
        let second = compose(&plan).expect("compose");
        assert_eq!(first.final_target(), second.final_target());
        assert_eq!(first.dtb(), second.dtb());
    }

    #[test]
    fn dtc_and_verilog_share_the_generator() {
        let rtl = compose(&RtlPlan::new("soc", ["Base"])).expect("compose");
        let dtb = rtl.dtb();
        let from_dtc = dtb.target().dependencies();
        let from_verilog = rtl.final_target().dependencies();
        assert_eq!(from_dtc.first(), from_verilog.first());
    }
}
