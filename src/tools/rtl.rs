//! RTL generation tools: Scala, the FIRRTL generator and compiler, `dtc`.

use camino::{Utf8Path, Utf8PathBuf};

use super::ParamSet;
use crate::plan::Resource;
use crate::target::{Params, ToolTarget};
use crate::value::Value;

/// Compile generator sources into a class directory.
#[derive(Clone, Debug)]
pub struct ScalaCompile {
    pub(crate) sources: Vec<Value>,
    pub(crate) output_dir: Utf8PathBuf,
    pub(crate) resources: Vec<Resource>,
}

impl ToolTarget for ScalaCompile {
    const KIND: &'static str = "scala-compile";

    fn output_dir(&self) -> Option<Utf8PathBuf> {
        Some(self.output_dir.clone())
    }

    fn params(&self) -> Params {
        ParamSet::new()
            .resources(&self.resources)
            .args(["scalac", "-d", self.output_dir.as_str()])
            .args(self.sources.iter().cloned())
            .output("classes", &self.output_dir)
            .finish()
    }
}

/// Elaborate a configured design into FIRRTL plus its side files.
#[derive(Clone, Debug)]
pub struct FirrtlGenerate {
    pub(crate) classpath: Value,
    pub(crate) generator: String,
    pub(crate) design: String,
    pub(crate) top_module: String,
    pub(crate) configs: Vec<String>,
    pub(crate) output_dir: Utf8PathBuf,
    pub(crate) resources: Vec<Resource>,
}

impl FirrtlGenerate {
    fn file(&self, extension: &str) -> Utf8PathBuf {
        self.output_dir
            .join(format!("{}.{extension}", self.design))
    }
}

impl ToolTarget for FirrtlGenerate {
    const KIND: &'static str = "firrtl-generate";

    fn output_dir(&self) -> Option<Utf8PathBuf> {
        Some(self.output_dir.clone())
    }

    fn params(&self) -> Params {
        ParamSet::new()
            .resources(&self.resources)
            .args(["java", "-cp"])
            .arg(self.classpath.clone())
            .arg(self.generator.as_str())
            .args(["-td", self.output_dir.as_str()])
            .args(["-T", self.top_module.as_str()])
            .args(["-n", self.design.as_str()])
            .args(["-C".to_owned(), self.configs.join(",")])
            .output("firrtl", self.file("fir"))
            .output("annotations", self.file("anno.json"))
            .output("dts", self.file("dts"))
            .output("rom_conf", self.file("rom.conf"))
            .finish()
    }
}

/// Lower FIRRTL to a single Verilog file.
#[derive(Clone, Debug)]
pub struct FirrtlCompile {
    pub(crate) firrtl: Value,
    pub(crate) annotations: Value,
    pub(crate) top_module: String,
    pub(crate) verilog: Utf8PathBuf,
    pub(crate) output_dir: Utf8PathBuf,
    pub(crate) resources: Vec<Resource>,
}

impl ToolTarget for FirrtlCompile {
    const KIND: &'static str = "firrtl-compile";

    fn output_dir(&self) -> Option<Utf8PathBuf> {
        Some(self.output_dir.clone())
    }

    fn params(&self) -> Params {
        ParamSet::new()
            .resources(&self.resources)
            .args(["firrtl", "-i"])
            .arg(self.firrtl.clone())
            .arg("-faf")
            .arg(self.annotations.clone())
            .args(["-X", "verilog", "-tn", self.top_module.as_str()])
            .args(["-o", self.verilog.as_str()])
            .output("verilog", &self.verilog)
            .finish()
    }
}

/// Compile a device tree source into a blob.
#[derive(Clone, Debug)]
pub struct Dtc {
    pub(crate) dts: Value,
    pub(crate) dtb: Utf8PathBuf,
    pub(crate) resources: Vec<Resource>,
}

impl ToolTarget for Dtc {
    const KIND: &'static str = "dtc";

    fn output_dir(&self) -> Option<Utf8PathBuf> {
        self.dtb.parent().map(Utf8Path::to_path_buf)
    }

    fn params(&self) -> Params {
        ParamSet::new()
            .resources(&self.resources)
            .args(["dtc", "-I", "dts", "-O", "dtb", "-o", self.dtb.as_str()])
            .arg(self.dts.clone())
            .output("dtb", &self.dtb)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::OUTPUTS_PARAM;

    #[test]
    fn dtc_writes_into_the_blob_directory() {
        let target = Dtc {
            dts: Value::path("build/soc/firrtl/soc.dts"),
            dtb: "build/soc/metadata/soc.dtb".into(),
            resources: Vec::new(),
        }
        .into_target();
        assert_eq!(target.name(), "dtc");
        assert_eq!(
            target.output_dir(),
            Some(Utf8Path::new("build/soc/metadata"))
        );
    }

    #[test]
    fn generator_declares_its_side_files() {
        let target = FirrtlGenerate {
            classpath: Value::path("build/soc/classes"),
            generator: "gen.Main".into(),
            design: "soc".into(),
            top_module: "Top".into(),
            configs: vec!["A".into(), "B".into()],
            output_dir: "build/soc/firrtl".into(),
            resources: Vec::new(),
        }
        .into_target();
        let Some(Value::Map(outputs)) = target.param(OUTPUTS_PARAM) else {
            panic!("outputs should be a map");
        };
        let fields: Vec<&str> = outputs.keys().map(String::as_str).collect();
        assert_eq!(fields, ["annotations", "dts", "firrtl", "rom_conf"]);
        assert_eq!(
            outputs.get("firrtl"),
            Some(&Value::path("build/soc/firrtl/soc.fir"))
        );
    }
}
