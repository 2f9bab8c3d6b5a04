//! Board support: generator, settings file, metal library.

use std::sync::Arc;

use super::layout::BspLayout;
use super::rtl::RtlOutputs;
use crate::field::{FieldRef, field_of};
use crate::plan::BspPlan;
use crate::target::{Target, ToolTarget};
use crate::tools::{BspGenerate, MetalInstall, ReadAttributes};

/// Targets and artifacts of a BSP build.
#[derive(Clone, Debug)]
pub struct BspOutputs {
    layout: BspLayout,
    generate: Arc<Target>,
    attributes: Arc<Target>,
    install: Arc<Target>,
}

impl BspOutputs {
    /// Output tree of the BSP.
    #[must_use]
    pub const fn layout(&self) -> &BspLayout {
        &self.layout
    }

    /// Targets that must be built to install the BSP.
    #[must_use]
    pub fn targets(&self) -> Vec<Arc<Target>> {
        vec![Arc::clone(&self.install)]
    }

    /// Settings file parsed into attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Arc<Target> {
        &self.attributes
    }

    /// One attribute of the generated settings file, e.g. `RISCV_ABI`.
    #[must_use]
    pub fn attribute(&self, key: &str) -> FieldRef {
        field_of(key, &self.attributes)
    }

    /// Generated settings file.
    #[must_use]
    pub fn settings(&self) -> FieldRef {
        field_of("settings", &self.generate)
    }

    /// Generated machine header.
    #[must_use]
    pub fn header(&self) -> FieldRef {
        field_of("header", &self.generate)
    }

    /// Installed metal library.
    #[must_use]
    pub fn library(&self) -> FieldRef {
        field_of("library", &self.install)
    }
}

/// Wire the BSP flow on top of an RTL build.
#[must_use]
pub fn compose(plan: &BspPlan, rtl: &RtlOutputs) -> BspOutputs {
    let layout = rtl.layout().bsp();
    let generate = BspGenerate {
        generator: plan.generator().clone(),
        design: rtl.design().to_owned(),
        dts: rtl.dts().into(),
        dtb: rtl.dtb().into(),
        output_dir: layout.generated_dir(),
        resources: plan.resources().clone(),
    }
    .into_target();

    let attributes = ReadAttributes::new(
        field_of("settings", &generate),
        plan.required_attributes().iter(),
    )
    .into_target();

    let install = MetalInstall {
        arch: field_of("RISCV_ARCH", &attributes).into(),
        abi: field_of("RISCV_ABI", &attributes).into(),
        header: field_of("header", &generate).into(),
        linker_script: field_of("linker_script", &generate).into(),
        output_dir: layout.install_dir(),
        resources: plan.resources().clone(),
    }
    .into_target();

    BspOutputs {
        layout,
        generate,
        attributes,
        install,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::rtl;
    use crate::plan::RtlPlan;

    #[test]
    fn metal_install_depends_on_the_parsed_attributes() {
        let rtl = rtl::compose(&RtlPlan::new("soc", ["Base"])).expect("rtl");
        let bsp = compose(&BspPlan::new(), &rtl);
        let library = bsp.library();
        let deps = library.target().dependencies();
        let names: Vec<&str> = deps.iter().map(|t| t.name()).collect();
        assert!(names.contains(&"attributes"));
        assert!(names.contains(&"bsp-generate"));
    }
}
