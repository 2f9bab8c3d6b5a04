//! End-to-end tests driving the compiled binary with `assert_cmd`.
//!
//! Reports and graphs go to stdout; logs and failures go to stderr.

use std::fs;

use anyhow::{Context, Result, ensure};
use assert_cmd::Command;
use predicates::prelude::*;
use test_support::{fake_tool, utf8_tempdir};

fn hwforge() -> Result<Command> {
    Command::cargo_bin("hwforge").context("locate hwforge binary")
}

#[test]
fn graph_prints_dot_for_a_blueprint() -> Result<()> {
    let output = hwforge()?
        .args(["graph", "blueprint", "tests/data/soc.json"])
        .output()
        .context("run hwforge graph")?;
    ensure!(output.status.success(), "graph should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    ensure!(stdout.starts_with("digraph hwforge {"), "not DOT: {stdout}");
    ensure!(
        stdout.matches(" -> ").count() == 3,
        "expected dts->dtb, dts->bsp and dtb->bsp, got: {stdout}"
    );
    Ok(())
}

#[test]
fn plan_prints_a_blueprint_that_reloads() -> Result<()> {
    let output = hwforge()?
        .args(["plan", "blueprint", "tests/data/soc.json"])
        .output()
        .context("run hwforge plan")?;
    ensure!(output.status.success(), "plan should succeed");
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).context("plan output is JSON")?;
    let targets = json
        .get("targets")
        .and_then(serde_json::Value::as_object)
        .context("targets object")?;
    ensure!(targets.len() == 3, "three targets expected, got {}", targets.len());
    ensure!(
        json.get("roots").and_then(serde_json::Value::as_array).map(Vec::len) == Some(1),
        "one root expected"
    );
    Ok(())
}

#[cfg(unix)]
#[test]
fn blueprint_build_runs_jobs_in_dependency_order() -> Result<()> {
    let (_guard, dir) = utf8_tempdir()?;
    fs::copy("tests/data/touch.json", dir.join("touch.json")).context("copy blueprint")?;
    let output = hwforge()?
        .current_dir(&dir)
        .args(["blueprint", "touch.json"])
        .output()
        .context("run hwforge blueprint")?;
    ensure!(
        output.status.success(),
        "build should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    ensure!(dir.join("out/stamp").exists(), "producer should have run");
    ensure!(dir.join("out/copy").exists(), "consumer should have run");
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).context("report is JSON")?;
    let entry = report
        .as_object()
        .and_then(|map| map.iter().next())
        .context("one report entry")?;
    ensure!(entry.0.starts_with("job:"), "unexpected key {}", entry.0);
    ensure!(
        entry.1.get("copy") == Some(&serde_json::json!("out/copy")),
        "unexpected outputs {}",
        entry.1
    );
    Ok(())
}

#[test]
fn cycles_fail_before_any_job_runs() {
    let temp = tempfile::tempdir().expect("create temp dir");
    fs::copy("tests/data/cycle.json", temp.path().join("cycle.json")).expect("copy blueprint");
    hwforge()
        .expect("binary")
        .current_dir(temp.path())
        .args(["blueprint", "cycle.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "circular dependency detected: a -> b -> a",
        ))
        .stdout(predicate::str::is_empty());
}

#[cfg(unix)]
#[test]
fn first_failure_stops_the_build_unless_keep_going() {
    hwforge()
        .expect("binary")
        .args(["blueprint", "tests/data/failing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 of 2 requested targets failed"))
        .stderr(predicate::str::contains("exited with"));

    hwforge()
        .expect("binary")
        .args(["--keep-going", "blueprint", "tests/data/failing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 of 2 requested targets failed"));
}

#[cfg(unix)]
#[test]
fn a_tool_that_skips_its_output_is_reported() -> Result<()> {
    let (_guard, dir) = utf8_tempdir()?;
    let tool = fake_tool(&dir, "lazy-dtc", "exit 0")?;
    let blueprint = serde_json::json!({
        "targets": {
            "dtb": {
                "kind": "dtc",
                "params": {
                    "command": [tool.as_str()],
                    "outputs": { "dtb": { "path": dir.join("soc.dtb").as_str() } }
                }
            }
        }
    });
    fs::write(dir.join("lazy.json"), blueprint.to_string()).context("write blueprint")?;
    hwforge()?
        .current_dir(&dir)
        .args(["blueprint", "lazy.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected artifact was not produced"))
        .stderr(predicate::str::contains("soc.dtb"));
    Ok(())
}

#[test]
fn dry_run_reports_outputs_without_touching_the_build_root() -> Result<()> {
    let (_guard, dir) = utf8_tempdir()?;
    let build_root = dir.join("build");
    let output = hwforge()?
        .args(["--dry-run", "--build-root", build_root.as_str()])
        .args(["rtl", "testSocket", "-c", "WithPioTop"])
        .output()
        .context("run hwforge --dry-run rtl")?;
    ensure!(output.status.success(), "dry run should succeed");
    ensure!(!build_root.exists(), "dry run must not create {build_root}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let verilog = build_root.join("testSocket/verilog/testSocket.v");
    ensure!(stdout.contains("firrtl-compile:"), "missing compile entry: {stdout}");
    ensure!(stdout.contains(verilog.as_str()), "missing {verilog}: {stdout}");
    Ok(())
}

#[test]
fn dry_run_bsp_renders_attribute_placeholders() {
    hwforge()
        .expect("binary")
        .env("NO_COLOR", "1")
        .args(["--verbose", "--dry-run", "bsp", "soc", "-c", "Base"])
        .assert()
        .success()
        .stderr(predicate::str::contains("--with-abi ${RISCV_ABI}"))
        .stdout(predicate::str::contains("metal-install:"));
}

#[test]
fn build_root_falls_back_to_the_environment() {
    hwforge()
        .expect("binary")
        .env("HWFORGE_BUILD_ROOT", "from-env")
        .args(["graph", "rtl", "testSocket", "-c", "WithPioTop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from-env/testSocket/verilog"));

    hwforge()
        .expect("binary")
        .env("HWFORGE_BUILD_ROOT", "from-env")
        .args(["--build-root", "from-cli", "graph", "rtl", "testSocket", "-c", "WithPioTop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from-cli/testSocket/verilog"))
        .stdout(predicate::str::contains("from-env").not());
}

#[test]
fn invalid_flash_size_is_a_usage_error() {
    hwforge()
        .expect("binary")
        .args(["bitstream", "soc", "-c", "Base", "--board", "arty", "--part", "xc7a35t"])
        .args(["--scripts-dir", "fpga/scripts", "--constraint", "arty.xdc"])
        .args(["--flash-size", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--flash-size"));
}
