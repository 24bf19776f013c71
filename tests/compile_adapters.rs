// tests/compile_adapters.rs

use std::path::PathBuf;
use std::sync::Arc;

use sitepipe::compile::toolchain::ToolFailure;
use sitepipe::compile::{
    AdapterRegistry, Artifact, CompileContext, CompilerAdapter, Invocation, ProcessToolchain,
    Toolchain,
};
use sitepipe::errors::{BuildError, Result};
use sitepipe::fs::{FileSystem, RealFileSystem};
use sitepipe::resolve::ResolvedFileSet;
use sitepipe::task::Pipeline;
use sitepipe::types::{AssetClass, TaskId};
use sitepipe_test_utils::{FakeToolchain, SiteFixture};

const UI: TaskId = TaskId::Asset(AssetClass::UiModule);
const DEPS: TaskId = TaskId::Asset(AssetClass::Dependencies);
const TS: TaskId = TaskId::Asset(AssetClass::TypedScript);
const CSS: TaskId = TaskId::Asset(AssetClass::Stylesheet);

#[test]
fn ui_module_compiles_all_sources_in_one_invocation() {
    let site = SiteFixture::new();
    let toolchain = FakeToolchain::new();
    let pipeline = site.pipeline(site.config().build(), &toolchain);

    let out = pipeline.execute(UI).unwrap();

    assert_eq!(out, site.path("target/site/elm.js"));
    assert_eq!(
        site.read("target/site/elm.js"),
        "module A exposing (a)\nmodule B exposing (b)\n"
    );

    let invocations = toolchain.invocations();
    assert_eq!(invocations.len(), 1);
    let inv = &invocations[0];
    assert_eq!(inv.program, "elm");
    assert_eq!(inv.args[0], "make");
    assert!(inv.args[1].starts_with("--output="));
    assert!(inv.args[1].ends_with("elm.js"));
    assert_eq!(
        inv.args[2..].to_vec(),
        vec![
            site.path("src/main/A.elm").to_string_lossy().into_owned(),
            site.path("src/main/B.elm").to_string_lossy().into_owned(),
        ]
    );
    assert_eq!(inv.cwd, site.root());
}

#[test]
fn ui_module_without_sources_is_a_resolution_error() {
    let site = SiteFixture::new();
    std::fs::remove_dir_all(site.path("src/main")).unwrap();
    let toolchain = FakeToolchain::new();
    let pipeline = site.pipeline(site.config().build(), &toolchain);

    let err = pipeline.execute(UI).unwrap_err();

    match err {
        BuildError::Resolution { task, patterns } => {
            assert_eq!(task, UI);
            assert_eq!(patterns, vec!["src/main/**/*.elm"]);
        }
        other => panic!("expected Resolution, got {other}"),
    }
    assert_eq!(toolchain.count("elm"), 0);
    assert!(!site.exists("target/site/elm.js"));
}

#[test]
fn typed_script_uses_out_file() {
    let site = SiteFixture::new();
    site.write("src/site/lib/util.ts", "export const u = 2;\n");
    let toolchain = FakeToolchain::new();
    let pipeline = site.pipeline(site.config().build(), &toolchain);

    pipeline.execute(TS).unwrap();

    assert_eq!(
        site.read("target/site/scripts.js"),
        "const c: number = 1;\nexport const u = 2;\n"
    );
    let inv = &toolchain.invocations()[0];
    assert_eq!(inv.program, "tsc");
    assert_eq!(inv.args[0], "--outFile");
    assert!(inv.args[1].ends_with("scripts.js"));
    assert_eq!(inv.args.len(), 4);
}

#[test]
fn typed_script_without_sources_writes_an_empty_artifact() {
    let site = SiteFixture::new();
    std::fs::remove_file(site.path("src/site/c.ts")).unwrap();
    let toolchain = FakeToolchain::new();
    let pipeline = site.pipeline(site.config().build(), &toolchain);

    pipeline.execute(TS).unwrap();

    assert!(site.exists("target/site/scripts.js"));
    assert_eq!(site.read("target/site/scripts.js"), "");
    assert_eq!(toolchain.count("tsc"), 0);
}

#[test]
fn stylesheets_compile_per_file_and_concatenate_in_order() {
    let site = SiteFixture::new();
    site.write("src/site/b.less", "@b: 2px;");
    site.write("src/site/theme/z.less", "@z: 3px;\n");
    let toolchain = FakeToolchain::new();
    let pipeline = site.pipeline(site.config().build(), &toolchain);

    pipeline.execute(CSS).unwrap();

    assert_eq!(toolchain.count("lessc"), 3);
    assert_eq!(
        site.read("target/site/stylesheets.css"),
        "@b: 2px;\n@w: 1px;\n@z: 3px;\n"
    );
}

#[test]
fn stylesheets_without_sources_write_an_empty_artifact() {
    let site = SiteFixture::new();
    std::fs::remove_file(site.path("src/site/d.less")).unwrap();
    let toolchain = FakeToolchain::new();
    let pipeline = site.pipeline(site.config().build(), &toolchain);

    pipeline.execute(CSS).unwrap();

    assert_eq!(site.read("target/site/stylesheets.css"), "");
    assert_eq!(toolchain.count("lessc"), 0);
}

/// Writes the file names it was given, one per line.
#[derive(Debug)]
struct ListingCompiler;

impl CompilerAdapter for ListingCompiler {
    fn class(&self) -> AssetClass {
        AssetClass::TypedScript
    }

    fn compile(&self, ctx: &CompileContext<'_>, files: &ResolvedFileSet) -> Result<Artifact> {
        let listing: String = files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| format!("{}\n", n.to_string_lossy()))
            .collect();
        Ok(Artifact {
            path: ctx.spec.target_path.clone(),
            bytes: listing.into_bytes(),
        })
    }
}

#[test]
fn adapters_can_be_replaced_per_class() {
    let site = SiteFixture::new();
    site.write("src/site/a.ts", "let a = 0;");
    let toolchain = FakeToolchain::new();
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let adapters = AdapterRegistry::standard().with_adapter(Box::new(ListingCompiler));
    let pipeline = Pipeline::with_adapters(
        Arc::new(site.config().build()),
        fs,
        Arc::new(toolchain.clone()),
        adapters,
    )
    .unwrap();

    pipeline.execute(TS).unwrap();
    pipeline.execute(CSS).unwrap();

    assert_eq!(site.read("target/site/scripts.js"), "a.ts\nc.ts\n");
    assert_eq!(toolchain.count("tsc"), 0);
    assert_eq!(toolchain.count("lessc"), 1);
}

#[test]
fn compile_failure_reports_the_class_and_writes_nothing() {
    let site = SiteFixture::new();
    let toolchain = FakeToolchain::new();
    toolchain.fail_on("B.elm");
    let pipeline = site.pipeline(site.config().build(), &toolchain);

    let err = pipeline.execute(UI).unwrap_err();

    match &err {
        BuildError::Compile { class, message } => {
            assert_eq!(*class, AssetClass::UiModule);
            assert!(message.contains("fake compile error"), "{message}");
            assert!(message.contains("exited with 1"), "{message}");
        }
        other => panic!("expected Compile, got {other}"),
    }
    assert!(err.to_string().starts_with("[ui-module] compile failed"));
    assert!(!site.exists("target/site/elm.js"));
}

#[test]
fn failed_rebuild_keeps_the_previous_artifact() {
    let site = SiteFixture::new();
    let toolchain = FakeToolchain::new();
    let pipeline = site.pipeline(site.config().build(), &toolchain);
    pipeline.execute(CSS).unwrap();
    let before = site.read("target/site/stylesheets.css");

    site.write("src/site/d.less", "@w: ;");
    toolchain.fail_on("d.less");
    assert!(pipeline.execute(CSS).is_err());

    assert_eq!(site.read("target/site/stylesheets.css"), before);
}

#[test]
fn rebuilding_unchanged_sources_is_byte_identical() {
    let site = SiteFixture::new();
    let toolchain = FakeToolchain::new();
    let pipeline = site.pipeline(site.config().build(), &toolchain);

    for task in TaskId::ALL {
        let first = std::fs::read(pipeline.execute(task).unwrap()).unwrap();
        let second = std::fs::read(pipeline.execute(task).unwrap()).unwrap();
        assert_eq!(first, second, "{task}");
    }
}

#[test]
fn dependencies_follow_declared_order_with_transitive_deps_first() {
    let site = SiteFixture::new();
    site.write(
        "bower.json",
        r#"{ "dependencies": { "zeta": "*", "alpha": "*" } }"#,
    );
    site.write(
        "bower_components/zeta/.bower.json",
        r#"{ "main": "zeta.js", "dependencies": { "shared": "*" } }"#,
    );
    site.write("bower_components/zeta/zeta.js", "Z");
    site.write(
        "bower_components/alpha/bower.json",
        r#"{ "main": ["dist/alpha.js", "dist/alpha.css"], "dependencies": { "shared": "*" } }"#,
    );
    site.write("bower_components/alpha/dist/alpha.js", "A");
    site.write("bower_components/shared/shared.js", "S");
    let toolchain = FakeToolchain::new();
    let pipeline = site.pipeline(site.config().build(), &toolchain);

    pipeline.execute(DEPS).unwrap();

    assert_eq!(site.read("target/site/bower_components.js"), "S\nZ\nA");
}

#[test]
fn dependency_overrides_and_exclusions_apply() {
    let site = SiteFixture::new();
    site.write(
        "bower.json",
        r#"{ "dependencies": { "pkg": "*", "ui": "*" } }"#,
    );
    site.write(
        "bower_components/ui/.bower.json",
        r#"{ "main": "ui.js", "dependencies": { "core": "*" } }"#,
    );
    site.write("bower_components/ui/ui.js", "UI");
    site.write("bower_components/core/core.js", "CORE");
    site.write("bower_components/pkg/extra.js", "EXTRA");
    let toolchain = FakeToolchain::new();
    let cfg = site
        .config()
        .main_files("pkg", &["pkg.js", "extra.js"])
        .exclude_package("ui")
        .separator(";")
        .build();
    let pipeline = site.pipeline(cfg, &toolchain);

    pipeline.execute(DEPS).unwrap();

    assert_eq!(
        site.read("target/site/bower_components.js"),
        "var pkg = 1;\n;EXTRA;CORE"
    );
}

#[test]
fn missing_dependency_package_fails_without_output() {
    let site = SiteFixture::new();
    site.write("bower.json", r#"{ "dependencies": { "pkg": "*", "ghost": "*" } }"#);
    let toolchain = FakeToolchain::new();
    let pipeline = site.pipeline(site.config().build(), &toolchain);

    let err = pipeline.execute(DEPS).unwrap_err();

    match err {
        BuildError::DependencyNotFound { package, searched } => {
            assert_eq!(package, "ghost");
            assert_eq!(searched, site.path("bower_components"));
        }
        other => panic!("expected DependencyNotFound, got {other}"),
    }
    assert!(!site.exists("target/site/bower_components.js"));
}

#[test]
fn missing_entry_script_is_a_compile_error() {
    let site = SiteFixture::new();
    site.write(
        "bower_components/pkg/.bower.json",
        r#"{ "main": "dist/missing.js" }"#,
    );
    let toolchain = FakeToolchain::new();
    let pipeline = site.pipeline(site.config().build(), &toolchain);

    let err = pipeline.execute(DEPS).unwrap_err();

    assert!(
        matches!(err, BuildError::Compile { class: AssetClass::Dependencies, .. }),
        "{err}"
    );
}

#[test]
fn package_names_and_entries_stay_inside_the_dependency_dir() {
    let site = SiteFixture::new();
    site.write("outside/outside.js", "STOLEN");
    site.write("bower.json", r#"{ "dependencies": { "../outside": "*" } }"#);
    let toolchain = FakeToolchain::new();
    let pipeline = site.pipeline(site.config().build(), &toolchain);

    let err = pipeline.execute(DEPS).unwrap_err();

    assert!(
        matches!(err, BuildError::Compile { class: AssetClass::Dependencies, .. }),
        "{err}"
    );
    assert!(err.to_string().contains("invalid package name"), "{err}");
    assert!(!site.exists("target/site/bower_components.js"));

    site.write("bower.json", r#"{ "dependencies": { "pkg": "*" } }"#);
    site.write(
        "bower_components/pkg/.bower.json",
        r#"{ "main": "../../outside/outside.js" }"#,
    );
    let err = pipeline.execute(DEPS).unwrap_err();

    assert!(err.to_string().contains("points outside the package"), "{err}");
    assert!(!site.exists("target/site/bower_components.js"));
}

#[test]
fn missing_manifest_is_a_resolution_error() {
    let site = SiteFixture::new();
    std::fs::remove_file(site.path("bower.json")).unwrap();
    let toolchain = FakeToolchain::new();
    let pipeline = site.pipeline(site.config().build(), &toolchain);

    let err = pipeline.execute(DEPS).unwrap_err();

    assert!(matches!(err, BuildError::Resolution { task: DEPS, .. }), "{err}");
}

#[test]
fn manifest_without_dependencies_gives_an_empty_artifact() {
    let site = SiteFixture::new();
    site.write("bower.json", r#"{ "name": "site" }"#);
    let toolchain = FakeToolchain::new();
    let pipeline = site.pipeline(site.config().build(), &toolchain);

    pipeline.execute(DEPS).unwrap();

    assert_eq!(site.read("target/site/bower_components.js"), "");
}

#[cfg(unix)]
#[test]
fn process_toolchain_reports_exit_status_and_stderr() {
    let inv = Invocation::from_argv(
        &["sh".to_string(), "-c".to_string()],
        vec!["echo broken >&2; exit 3".to_string()],
        PathBuf::from("."),
    );

    let failure = ProcessToolchain.invoke(&inv).unwrap_err();

    assert_eq!(
        failure,
        ToolFailure::Exit {
            code: Some(3),
            stderr: "broken\n".to_string()
        }
    );
    assert!(failure.describe(&inv).contains("exited with 3:\nbroken"));
}

#[cfg(unix)]
#[test]
fn process_toolchain_returns_stdout() {
    let inv = Invocation::from_argv(
        &["sh".to_string(), "-c".to_string()],
        vec!["printf 'a{}'".to_string()],
        PathBuf::from("."),
    );

    assert_eq!(ProcessToolchain.invoke(&inv).unwrap(), b"a{}".to_vec());
}

#[test]
fn missing_program_is_a_spawn_failure() {
    let inv = Invocation::from_argv(
        &["sitepipe-no-such-compiler".to_string()],
        Vec::new(),
        PathBuf::from("."),
    );

    let failure = ProcessToolchain.invoke(&inv).unwrap_err();

    assert!(matches!(failure, ToolFailure::Spawn(_)), "{failure:?}");
    assert!(failure.describe(&inv).starts_with("could not run `sitepipe-no-such-compiler`"));
}
