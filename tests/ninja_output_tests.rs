//! End-to-end rendering checks: descriptor files in, Ninja text out.

use camino::Utf8PathBuf;
use ninjagen::{
    descriptor,
    ir::BuildGraph,
    ninja_gen,
    registry::{CollisionPolicy, Layout, TargetRegistry},
    settings::{Platform, ResolvedSettings},
};
use rstest::rstest;

#[rstest]
fn minimal_project_renders_exactly() {
    let primary = Utf8PathBuf::from("tests/data/minimal/project.yml");
    let descriptors = descriptor::load_project(&primary).expect("load");
    let layout = Layout::new("out", "Release");
    let registry = TargetRegistry::build(&descriptors, &layout, CollisionPolicy::Warn)
        .expect("registry");
    let settings =
        ResolvedSettings::resolve(&descriptors[0].settings, "Release", Platform::Linux);
    let graph = BuildGraph::from_project(&registry, &settings, &layout, &descriptors[0].dir)
        .expect("graph");

    let ninja = ninja_gen::generate(&graph);
    let expected = concat!(
        "rule compile_cpp\n",
        "  depfile = $out.d\n",
        "  command = g++ -c -MD -MF $out.d $flags -o $out $in\n",
        "\n",
        "rule archive\n",
        "  command = ar rcs $out $in\n",
        "\n",
        "rule link\n",
        "  command = g++ -o $out $in $flags\n",
        "\n",
        "build out/Release/Intermediates/hello/hello.cpp.o: compile_cpp ",
        "tests/data/minimal/hello.cpp\n",
        "build out/Release/Products/hello: link ",
        "out/Release/Intermediates/hello/hello.cpp.o\n",
    );
    assert_eq!(ninja, expected);
}
