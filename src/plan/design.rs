//! Plans for the RTL, BSP and FPGA flows.

use camino::Utf8PathBuf;

use super::{PlanError, Resource, defaults, plan_fields, require_component};
use crate::value::Value;

/// Generator entry point used when a plan does not name one.
pub const DEFAULT_GENERATOR: &str = "freechips.rocketchip.system.Generator";

/// Inputs of the RTL generation flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RtlPlan {
    design: String,
    top_module: String,
    generator: String,
    configs: Vec<String>,
    extra_deps: Vec<Value>,
    build_root: Utf8PathBuf,
    resources: Vec<Resource>,
}

impl RtlPlan {
    /// Plan a design whose top module shares its name, rooted at the default
    /// `build` directory.
    pub fn new<I, S>(design: impl Into<String>, configs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = design.into();
        Self {
            top_module: name.clone(),
            design: name,
            generator: DEFAULT_GENERATOR.to_owned(),
            configs: configs.into_iter().map(Into::into).collect(),
            extra_deps: Vec::new(),
            build_root: Utf8PathBuf::from(forge_env::DEFAULT_BUILD_ROOT),
            resources: vec![
                Resource::new(defaults::SCALA),
                Resource::new(defaults::FIRRTL),
                Resource::new(defaults::DTC),
            ],
        }
    }

    /// Check the fields every RTL flow needs.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] for a blank design name, a design name that is
    /// not a single path component, or an empty config list.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.design.trim().is_empty() {
            return Err(PlanError::MissingField {
                plan: "RtlPlan",
                field: "design",
            });
        }
        require_component("RtlPlan", "design", &self.design)?;
        if self.configs.is_empty() {
            return Err(PlanError::Empty {
                plan: "RtlPlan",
                field: "configs",
            });
        }
        Ok(())
    }
}

plan_fields! {
    RtlPlan {
        design: String => with_design, edit_design;
        top_module: String => with_top_module, edit_top_module;
        generator: String => with_generator, edit_generator;
        configs: Vec<String> => with_configs, edit_configs, append_configs;
        extra_deps: Vec<Value> => with_extra_deps, edit_extra_deps, append_extra_deps;
        build_root: Utf8PathBuf => with_build_root, edit_build_root;
        resources: Vec<Resource> => with_resources, edit_resources, append_resources;
    }
}

/// Inputs of the board-support flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BspPlan {
    generator: String,
    required_attributes: Vec<String>,
    resources: Vec<Resource>,
}

impl Default for BspPlan {
    fn default() -> Self {
        Self {
            generator: "freedom-bsp-generator".to_owned(),
            required_attributes: vec!["RISCV_ARCH".to_owned(), "RISCV_ABI".to_owned()],
            resources: vec![Resource::new(defaults::RISCV_TOOLS)],
        }
    }
}

impl BspPlan {
    /// The default plan: requires `RISCV_ARCH` and `RISCV_ABI`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

plan_fields! {
    BspPlan {
        generator: String => with_generator, edit_generator;
        required_attributes: Vec<String> => with_required_attributes, edit_required_attributes, append_required_attributes;
        resources: Vec<Resource> => with_resources, edit_resources, append_resources;
    }
}

/// Inputs of the bitstream flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitstreamPlan {
    board: String,
    part: String,
    constraints: Vec<Value>,
    extra_sources: Vec<Value>,
    scripts_dir: Utf8PathBuf,
    flash_interface: String,
    flash_size_mb: i64,
    resources: Vec<Resource>,
}

impl BitstreamPlan {
    /// Plan a bitstream for `board` using Vivado scripts from `scripts_dir`.
    ///
    /// Flash defaults to a 16 MB `SPIx4` part.
    pub fn new(
        board: impl Into<String>,
        part: impl Into<String>,
        scripts_dir: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            board: board.into(),
            part: part.into(),
            constraints: Vec::new(),
            extra_sources: Vec::new(),
            scripts_dir: scripts_dir.into(),
            flash_interface: "SPIx4".to_owned(),
            flash_size_mb: 16,
            resources: vec![Resource::new(defaults::VIVADO)],
        }
    }

    /// Check the fields synthesis cannot run without.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] for a blank board or part, a board that is not a
    /// single path component, or when no constraint files were given.
    pub fn validate(&self) -> Result<(), PlanError> {
        const PLAN: &str = "BitstreamPlan";
        if self.board.trim().is_empty() {
            return Err(PlanError::MissingField { plan: PLAN, field: "board" });
        }
        require_component(PLAN, "board", &self.board)?;
        if self.part.trim().is_empty() {
            return Err(PlanError::MissingField { plan: PLAN, field: "part" });
        }
        if self.constraints.is_empty() {
            return Err(PlanError::Empty {
                plan: PLAN,
                field: "constraints",
            });
        }
        Ok(())
    }
}

plan_fields! {
    BitstreamPlan {
        board: String => with_board, edit_board;
        part: String => with_part, edit_part;
        constraints: Vec<Value> => with_constraints, edit_constraints, append_constraints;
        extra_sources: Vec<Value> => with_extra_sources, edit_extra_sources, append_extra_sources;
        scripts_dir: Utf8PathBuf => with_scripts_dir, edit_scripts_dir;
        flash_interface: String => with_flash_interface, edit_flash_interface;
        flash_size_mb: i64 => with_flash_size_mb, edit_flash_size_mb;
        resources: Vec<Resource> => with_resources, edit_resources, append_resources;
    }
}
