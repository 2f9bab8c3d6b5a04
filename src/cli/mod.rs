//! Command line interface definition using clap.
//!
//! Every flow is a subcommand. The same flows are available beneath `graph`
//! and `plan`, which print the composed target graph instead of building it.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

use crate::plan::{Define, Plusarg, Simulator};

mod parsing;

use parsing::{parse_flash_size, parse_label};

/// Upper bound accepted for `--flash-size`, in megabytes.
const MAX_FLASH_MB: i64 = 1024;

/// Compose and build hardware generator flows.
#[derive(Debug, Parser, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root directory every flow writes beneath.
    ///
    /// Defaults to `$HWFORGE_BUILD_ROOT`, then `build`.
    #[arg(long, value_name = "DIR")]
    pub build_root: Option<Utf8PathBuf>,

    /// Enable verbose diagnostic logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Log every job instead of running it.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Keep building the remaining roots after one fails.
    #[arg(short, long)]
    pub keep_going: bool,

    /// What to do.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Build a flow.
    #[command(flatten)]
    Build(Flow),

    /// Print the target graph of a flow in Graphviz DOT format.
    Graph {
        /// Flow to describe.
        #[command(subcommand)]
        flow: Flow,
    },

    /// Print the target graph of a flow as a JSON blueprint.
    Plan {
        /// Flow to describe.
        #[command(subcommand)]
        flow: Flow,
    },
}

/// The flows hwforge knows how to compose.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Flow {
    /// Generate Verilog and a device tree blob for a design.
    Rtl(RtlArgs),
    /// Generate and install the board support package of a design.
    Bsp(BspArgs),
    /// Compile and run a simulation of a design.
    Sim(SimArgs),
    /// Synthesise a bitstream and flash image for a design.
    Bitstream(BitstreamArgs),
    /// Build the targets of a JSON blueprint.
    Blueprint(BlueprintArgs),
}

/// Arguments shared by every flow that starts from RTL generation.
#[derive(Debug, Args, PartialEq, Eq, Clone)]
pub struct RtlArgs {
    /// Design name; also the default top module.
    #[arg(value_name = "DESIGN")]
    pub design: String,

    /// Generator configuration class. Repeat to stack configurations.
    #[arg(short, long = "config", value_name = "CLASS", required = true)]
    pub configs: Vec<String>,

    /// Top module, when it differs from the design name.
    #[arg(long, value_name = "MODULE")]
    pub top: Option<String>,

    /// Fully qualified generator main class.
    #[arg(long, value_name = "CLASS")]
    pub generator: Option<String>,

    /// Extra source or jar the generator depends on.
    #[arg(long = "dep", value_name = "PATH")]
    pub deps: Vec<Utf8PathBuf>,
}

/// Arguments of `bsp`.
#[derive(Debug, Args, PartialEq, Eq, Clone)]
pub struct BspArgs {
    /// RTL generation.
    #[command(flatten)]
    pub rtl: RtlArgs,

    /// BSP generator executable.
    #[arg(long, value_name = "PROGRAM")]
    pub bsp_generator: Option<String>,

    /// Additional key the generated settings file must define.
    #[arg(long = "require", value_name = "KEY")]
    pub required: Vec<String>,
}

/// Arguments of `sim`.
#[derive(Debug, Args, PartialEq, Eq, Clone)]
pub struct SimArgs {
    /// RTL generation.
    #[command(flatten)]
    pub rtl: RtlArgs,

    /// Simulator to compile and run with.
    #[arg(long, value_enum, default_value_t = Simulator::Verilator)]
    pub simulator: Simulator,

    /// Top module of the test harness.
    #[arg(long, value_name = "MODULE", default_value = "TestDriver")]
    pub harness_top: String,

    /// Harness source file. Repeat for several files.
    #[arg(long = "harness", value_name = "FILE")]
    pub harness_sources: Vec<Utf8PathBuf>,

    /// Include directory for the harness.
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    pub include_dirs: Vec<Utf8PathBuf>,

    /// Preprocessor define, `NAME` or `NAME=value`.
    #[arg(short = 'D', long = "define", value_name = "DEFINE")]
    pub defines: Vec<Define>,

    /// Runtime plusarg, `name` or `name=value`.
    #[arg(long = "plusarg", value_name = "ARG")]
    pub plusargs: Vec<Plusarg>,

    /// Name of this run; separates the output trees of different runs.
    #[arg(long, value_name = "NAME", default_value = "default", value_parser = parse_label)]
    pub label: String,

    /// Dump waveforms.
    #[arg(long)]
    pub waves: bool,

    /// Collect coverage.
    #[arg(long)]
    pub coverage: bool,

    /// Random seed handed to the simulation.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub seed: u64,

    /// Abort the simulation after this many cycles.
    #[arg(long, value_name = "N")]
    pub max_cycles: Option<u64>,

    /// Program image loaded by the harness.
    #[arg(long, value_name = "FILE")]
    pub test_program: Option<Utf8PathBuf>,

    /// Ask the harness for verbose output.
    #[arg(long)]
    pub sim_verbose: bool,

    /// Print a heartbeat while the simulation runs.
    #[arg(long)]
    pub heartbeat: bool,

    /// Extra argument for the simulator compile step.
    #[arg(long = "compile-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub compile_args: Vec<String>,

    /// Extra argument for the simulation run.
    #[arg(long = "run-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub run_args: Vec<String>,

    /// Argument file passed to the run with `-f`.
    #[arg(long = "args-file", value_name = "FILE")]
    pub args_files: Vec<Utf8PathBuf>,
}

/// Arguments of `bitstream`.
#[derive(Debug, Args, PartialEq, Eq, Clone)]
pub struct BitstreamArgs {
    /// RTL generation.
    #[command(flatten)]
    pub rtl: RtlArgs,

    /// Board name.
    #[arg(long, value_name = "BOARD")]
    pub board: String,

    /// FPGA part number.
    #[arg(long, value_name = "PART")]
    pub part: String,

    /// Directory holding `vivado.tcl` and `write_mcs.tcl`.
    #[arg(long, value_name = "DIR")]
    pub scripts_dir: Utf8PathBuf,

    /// Constraints file. At least one is required.
    #[arg(long = "constraint", value_name = "FILE", required = true)]
    pub constraints: Vec<Utf8PathBuf>,

    /// Additional source synthesised with the design.
    #[arg(long = "source", value_name = "FILE")]
    pub sources: Vec<Utf8PathBuf>,

    /// Flash interface of the configuration memory.
    #[arg(long, value_name = "IFACE")]
    pub flash_interface: Option<String>,

    /// Flash size in megabytes.
    #[arg(long, value_name = "MB", value_parser = parse_flash_size)]
    pub flash_size: Option<i64>,
}

/// Arguments of `blueprint`.
#[derive(Debug, Args, PartialEq, Eq, Clone)]
pub struct BlueprintArgs {
    /// Blueprint file.
    #[arg(value_name = "FILE")]
    pub path: Utf8PathBuf,

    /// Label to build instead of the blueprint's own roots.
    #[arg(long = "root", value_name = "LABEL")]
    pub roots: Vec<String>,
}
