//! Bitstream and flash image for one board.

use std::sync::Arc;

use super::layout::FpgaLayout;
use super::rtl::RtlOutputs;
use crate::field::{FieldRef, field_of};
use crate::plan::{BitstreamPlan, PlanError};
use crate::target::{Target, ToolTarget};
use crate::tools::{VivadoSynth, WriteMcs};
use crate::value::Value;

/// Targets and artifacts of a bitstream build.
#[derive(Clone, Debug)]
pub struct BitstreamOutputs {
    layout: FpgaLayout,
    synth: Arc<Target>,
    mcs: Arc<Target>,
}

impl BitstreamOutputs {
    /// Output tree for the board.
    #[must_use]
    pub const fn layout(&self) -> &FpgaLayout {
        &self.layout
    }

    /// Targets that must be built to produce the flash image.
    #[must_use]
    pub fn targets(&self) -> Vec<Arc<Target>> {
        vec![Arc::clone(&self.mcs)]
    }

    /// The bitstream.
    #[must_use]
    pub fn bitstream(&self) -> FieldRef {
        field_of("bitstream", &self.synth)
    }

    /// The configuration-memory image.
    #[must_use]
    pub fn mcs(&self) -> FieldRef {
        field_of("mcs", &self.mcs)
    }

    /// Every file the flow publishes.
    #[must_use]
    pub fn files(&self) -> Vec<FieldRef> {
        ["bitstream", "checkpoint", "utilization", "timing"]
            .into_iter()
            .map(|field| field_of(field, &self.synth))
            .chain(["mcs", "prm"].into_iter().map(|field| field_of(field, &self.mcs)))
            .collect()
    }
}

/// Wire synthesis and flash image generation for the RTL of `rtl`.
///
/// # Errors
///
/// Returns [`PlanError`] when the plan lacks a board, part or constraints.
pub fn compose(plan: &BitstreamPlan, rtl: &RtlOutputs) -> Result<BitstreamOutputs, PlanError> {
    plan.validate()?;
    let layout = rtl.layout().fpga(plan.board());
    let sources = std::iter::once(Value::from(rtl.verilog()))
        .chain(plan.extra_sources().iter().cloned())
        .collect();
    let synth = VivadoSynth {
        script: plan.scripts_dir().join("vivado.tcl"),
        design: rtl.design().to_owned(),
        top_module: rtl.top_module().to_owned(),
        part: plan.part().clone(),
        sources,
        constraints: plan.constraints().clone(),
        output_dir: layout.synth_dir(),
        resources: plan.resources().clone(),
    }
    .into_target();
    let mcs = WriteMcs {
        script: plan.scripts_dir().join("write_mcs.tcl"),
        design: rtl.design().to_owned(),
        bitstream: field_of("bitstream", &synth).into(),
        interface: plan.flash_interface().clone(),
        size_mb: *plan.flash_size_mb(),
        output_dir: layout.flash_dir(),
        resources: plan.resources().clone(),
    }
    .into_target();
    Ok(BitstreamOutputs { layout, synth, mcs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::rtl;
    use crate::plan::RtlPlan;

    #[test]
    fn flash_image_is_built_from_the_bitstream() {
        let rtl = rtl::compose(&RtlPlan::new("soc", ["Base"])).expect("rtl");
        let plan = BitstreamPlan::new("arty", "xc7a35ticsg324-1L", "fpga/scripts")
            .append_constraints([Value::path("fpga/arty.xdc")]);
        let fpga = compose(&plan, &rtl).expect("compose");
        let mcs = fpga.mcs();
        let deps = mcs.target().dependencies();
        assert_eq!(deps.first().map(|t| t.name()), Some("vivado-synth"));
        assert_eq!(fpga.files().len(), 6);
    }
}
