// tests/inject_html.rs

use std::path::Path;
use std::sync::Arc;

use proptest::prelude::*;

use sitepipe::errors::BuildError;
use sitepipe::fs::mock::MockFileSystem;
use sitepipe::fs::FileSystem;
use sitepipe::inject::{inject_markup, Selector};
use sitepipe::registry::{ordered_directives, ArtifactRegistry, ArtifactSpec};
use sitepipe::task::Pipeline;
use sitepipe::types::{AssetClass, TaskId};
use sitepipe_test_utils::{BuildConfigBuilder, FakeToolchain, TEMPLATE};

const ELM: &str = r#"<script src="elm.js" type="text/javascript"></script>"#;
const BOWER: &str = r#"<script src="bower_components.js" type="text/javascript"></script>"#;
const SCRIPTS: &str = r#"<script src="scripts.js" type="text/javascript"></script>"#;
const STYLES: &str = r#"<link rel="stylesheet" href="stylesheets.css" type="text/css" />"#;

fn registry() -> ArtifactRegistry {
    ArtifactRegistry::new(Path::new("/project/target/site"))
}

fn inject(html: &str, selector: &str) -> Result<String, String> {
    let registry = registry();
    inject_markup(html, &Selector::parse(selector).unwrap(), &registry.directives_in_order())
}

#[test]
fn references_are_appended_to_head_in_fixed_order() {
    let out = inject(TEMPLATE, "head").unwrap();

    let expected = format!("<title>site</title>\n{ELM}{BOWER}{SCRIPTS}{STYLES}</head>");
    assert!(out.contains(&expected), "unexpected output:\n{out}");
    assert!(out.starts_with("<!DOCTYPE html>\n<html>\n<head>\n"));
    assert!(out.ends_with("<div id=\"app\"></div>\n</body>\n</html>\n"));
}

#[test]
fn id_selector_targets_the_element_and_respects_nesting() {
    let html = r#"<body><div id="app"><div class="inner">x</div></div><div>tail</div></body>"#;

    let out = inject(html, "div#app").unwrap();

    let expected = format!(r#"<div class="inner">x</div>{ELM}{BOWER}{SCRIPTS}{STYLES}</div><div>tail</div>"#);
    assert!(out.contains(&expected), "unexpected output:\n{out}");
}

#[test]
fn missing_insertion_point_is_an_error() {
    let err = inject("<html><body></body></html>", "head").unwrap_err();
    assert!(err.contains("not found"), "{err}");

    let err = inject(TEMPLATE, "#nope").unwrap_err();
    assert!(err.contains("not found"), "{err}");
}

#[test]
fn ambiguous_insertion_point_is_an_error() {
    let err = inject("<body><div></div><div></div></body>", "div").unwrap_err();
    assert!(err.contains("ambiguous (2 matches)"), "{err}");
}

#[test]
fn void_and_unclosed_elements_are_rejected() {
    let err = inject("<body><br></body>", "br").unwrap_err();
    assert!(err.contains("void element"), "{err}");

    let err = inject("<html><head><title>x</title>", "head").unwrap_err();
    assert!(err.contains("never closed"), "{err}");
}

#[test]
fn comments_and_script_text_do_not_count_as_matches() {
    let html = concat!(
        "<html><!-- <head> old head </head> -->",
        "<head><script>var s = \"<head></head>\";</script></head>",
        "<body></body></html>"
    );

    let out = inject(html, "head").unwrap();

    let expected = format!("</script>{ELM}{BOWER}{SCRIPTS}{STYLES}</head>");
    assert!(out.contains(&expected), "unexpected output:\n{out}");
}

#[test]
fn title_and_textarea_text_do_not_count_as_matches() {
    let html = concat!(
        "<html><head><title>Using <head> tags</title></head>",
        "<body><textarea><body></textarea></body></html>"
    );

    let out = inject(html, "head").unwrap();
    let expected = format!("</title>{ELM}{BOWER}{SCRIPTS}{STYLES}</head>");
    assert!(out.contains(&expected), "unexpected output:\n{out}");

    let out = inject(html, "body").unwrap();
    let expected = format!("</textarea>{ELM}{BOWER}{SCRIPTS}{STYLES}</body>");
    assert!(out.contains(&expected), "unexpected output:\n{out}");
}

#[test]
fn omitted_head_and_body_end_tags_use_the_implied_end() {
    let html = "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>x</title><body><p>hi</p></html>";

    let out = inject(html, "head").unwrap();
    let expected = format!("<title>x</title>{ELM}{BOWER}{SCRIPTS}{STYLES}<body>");
    assert!(out.contains(&expected), "unexpected output:\n{out}");

    let out = inject(html, "body").unwrap();
    let expected = format!("<p>hi</p>{ELM}{BOWER}{SCRIPTS}{STYLES}</html>");
    assert!(out.contains(&expected), "unexpected output:\n{out}");

    let out = inject("<html><body><p>hi</p>", "body").unwrap();
    assert!(out.ends_with(&format!("<p>hi</p>{ELM}{BOWER}{SCRIPTS}{STYLES}")), "{out}");
}

#[test]
fn selectors_parse_and_reject_unsupported_forms() {
    assert_eq!(Selector::parse("head").unwrap().to_string(), "head");
    assert_eq!(Selector::parse("#app").unwrap().to_string(), "#app");
    assert_eq!(Selector::parse("DIV#app").unwrap().to_string(), "div#app");
    assert!(Selector::parse("").is_err());
    assert!(Selector::parse("div > p").is_err());
    assert!(Selector::parse("div#").is_err());
}

#[test]
fn failed_injection_writes_no_site_html() {
    let fs = MockFileSystem::new();
    fs.add_file("/project/src/site/index.html", "<html><body></body></html>");
    let cfg = BuildConfigBuilder::new("/project").build();
    let site = cfg.site_output_path();

    let mock: Arc<dyn FileSystem> = Arc::new(fs.clone());
    let pipeline =
        Pipeline::new(Arc::new(cfg), mock, Arc::new(FakeToolchain::new())).unwrap();

    let err = pipeline.execute(TaskId::Html).unwrap_err();

    assert!(matches!(err, BuildError::Injection(_)), "{err}");
    assert!(!fs.exists(&site));
    assert!(fs.written_paths().is_empty());
}

#[test]
fn injection_reads_the_template_not_its_own_output() {
    let fs = MockFileSystem::new();
    fs.add_file("/project/src/site/index.html", TEMPLATE);
    let cfg = BuildConfigBuilder::new("/project").build();
    let site = cfg.site_output_path();

    let mock: Arc<dyn FileSystem> = Arc::new(fs.clone());
    let pipeline =
        Pipeline::new(Arc::new(cfg), mock, Arc::new(FakeToolchain::new())).unwrap();

    pipeline.execute(TaskId::Html).unwrap();
    let first = fs.read_to_string(&site).unwrap();
    pipeline.execute(TaskId::Html).unwrap();
    let second = fs.read_to_string(&site).unwrap();

    assert_eq!(first, second);
    assert_eq!(second.matches("elm.js").count(), 1);
    assert_eq!(second.matches("stylesheets.css").count(), 1);
}

proptest! {
    #[test]
    fn directive_order_is_independent_of_spec_order(
        order in Just(vec![0usize, 1, 2, 3]).prop_shuffle(),
        dupes in proptest::collection::vec(0usize..4, 0..4),
    ) {
        let registry = registry();
        let all: Vec<&ArtifactSpec> = AssetClass::ALL.iter().map(|c| registry.get(*c)).collect();
        let shuffled: Vec<&ArtifactSpec> = order
            .iter()
            .chain(dupes.iter())
            .map(|i| all[*i])
            .collect();

        let markup: String = ordered_directives(shuffled)
            .iter()
            .map(|d| d.to_markup())
            .collect();

        prop_assert_eq!(markup, format!("{ELM}{BOWER}{SCRIPTS}{STYLES}"));
    }
}
