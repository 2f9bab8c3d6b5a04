//! Functional-update behaviour of plans as seen from outside the crate.

use hwforge::plan::{
    Define, Plan, PlanError, Plusarg, RtlPlan, SimCompilePlan, SimExecutePlan, Simulator,
    UserSimulationOptions,
};
use rstest::rstest;

#[rstest]
#[case(Simulator::Verilator)]
#[case(Simulator::Xcelium)]
#[case(Simulator::Vcs)]
fn with_leaves_the_original_plan_untouched(#[case] simulator: Simulator) {
    let base = SimCompilePlan::new("smoke", Simulator::Verilator, "TestDriver", "build/sim");
    let updated = base.clone().with_simulator(simulator);
    assert_eq!(*updated.simulator(), simulator);
    assert_eq!(*base.simulator(), Simulator::Verilator);
}

#[test]
fn edit_sees_the_current_value() {
    let base = SimCompilePlan::new("smoke", Simulator::Vcs, "TestDriver", "build/sim")
        .with_args(vec!["-Wall".to_owned()]);
    let edited = base.clone().edit_args(|mut args| {
        args.insert(0, "-O3".to_owned());
        args
    });
    assert_eq!(edited.args(), &["-O3", "-Wall"]);
    assert_eq!(base.args(), &["-Wall"]);
}

#[test]
fn plusargs_render_in_append_order() {
    let plan = SimExecutePlan::new("smoke", Simulator::Vcs, "build/run")
        .append_plusargs([Plusarg::flag("a")])
        .append_plusargs([Plusarg::with_value("b", 2), Plusarg::flag("c")]);
    let rendered: Vec<String> = plan.plusargs().iter().map(ToString::to_string).collect();
    assert_eq!(rendered, ["+a", "+b=2", "+c"]);
}

#[test]
fn apply_threads_a_reusable_edit() {
    let debug = |plan: SimCompilePlan| plan.append_defines([Define::flag("DEBUG")]);
    let plan = SimCompilePlan::new("smoke", Simulator::Xcelium, "TestDriver", "build/sim")
        .append_defines([Define::with_value("WIDTH", 32)])
        .apply(debug);
    assert_eq!(
        plan.defines(),
        &[Define::with_value("WIDTH", 32), Define::flag("DEBUG")]
    );
}

#[test]
fn rtl_edits_keep_design_defaults() {
    let plan = RtlPlan::new("testSocket", ["WithPioTop"])
        .apply_if(true, |p| p.with_top_module("Socket".to_owned()));
    assert_eq!(plan.design(), "testSocket");
    assert_eq!(plan.top_module(), "Socket");
}

#[rstest]
#[case("+verbose", Plusarg::flag("verbose"))]
#[case("seed=7", Plusarg::with_value("seed", 7))]
#[case("+file=a=b", Plusarg::with_value("file", "a=b"))]
fn plusargs_parse_from_the_command_line(#[case] text: &str, #[case] expected: Plusarg) {
    assert_eq!(text.parse::<Plusarg>(), Ok(expected));
}

#[rstest]
#[case("")]
#[case("+")]
#[case("+has space")]
fn malformed_plusargs_are_rejected(#[case] text: &str) {
    assert!(matches!(
        text.parse::<Plusarg>(),
        Err(PlanError::InvalidPlusarg { .. })
    ));
}

#[test]
fn user_options_default_to_a_quiet_seeded_run() {
    let options = UserSimulationOptions::default();
    assert_eq!(options.label(), "default");
    assert!(!*options.waves());
    assert!(!*options.coverage());
    assert_eq!(*options.seed(), 0);
    assert!(options.plusargs().is_empty());
}
