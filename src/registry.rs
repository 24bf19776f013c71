// src/registry.rs

//! Static artifact registry.
//!
//! One [`ArtifactSpec`] per asset class: where the compiled output lands and
//! the markup that references it from the site HTML. The basenames are fixed
//! identifiers shared with the template's consumers; they are not
//! configurable and never derived at runtime.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::types::AssetClass;

pub const UI_MODULE_BASENAME: &str = "elm.js";
pub const DEPENDENCIES_BASENAME: &str = "bower_components.js";
pub const TYPED_SCRIPT_BASENAME: &str = "scripts.js";
pub const STYLESHEET_BASENAME: &str = "stylesheets.css";

/// Kind of element an injection directive produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `<script …></script>`
    Script,
    /// `<link … />`
    Link,
}

/// Markup snippet referencing one artifact from the site HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionDirective {
    pub kind: TagKind,
    /// Attributes in output order.
    pub attributes: Vec<(String, String)>,
}

impl InjectionDirective {
    pub fn script(src: &str) -> Self {
        Self {
            kind: TagKind::Script,
            attributes: vec![
                ("src".to_string(), src.to_string()),
                ("type".to_string(), "text/javascript".to_string()),
            ],
        }
    }

    pub fn stylesheet(href: &str) -> Self {
        Self {
            kind: TagKind::Link,
            attributes: vec![
                ("rel".to_string(), "stylesheet".to_string()),
                ("href".to_string(), href.to_string()),
                ("type".to_string(), "text/css".to_string()),
            ],
        }
    }

    /// Render the element as HTML.
    pub fn to_markup(&self) -> String {
        let mut attrs = String::new();
        for (name, value) in &self.attributes {
            let _ = write!(attrs, " {name}=\"{}\"", escape_attr(value));
        }
        match self.kind {
            TagKind::Script => format!("<script{attrs}></script>"),
            TagKind::Link => format!("<link{attrs} />"),
        }
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Where an asset class's artifact lands and how it is referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub class: AssetClass,
    pub basename: &'static str,
    pub target_path: PathBuf,
    pub directive: InjectionDirective,
}

/// The fixed mapping from asset class to [`ArtifactSpec`].
#[derive(Debug, Clone)]
pub struct ArtifactRegistry {
    specs: BTreeMap<AssetClass, ArtifactSpec>,
}

impl ArtifactRegistry {
    /// Build the registry for a target directory.
    pub fn new(target_dir: &Path) -> Self {
        let specs = AssetClass::ALL
            .into_iter()
            .map(|class| {
                let basename = basename_of(class);
                let directive = match class {
                    AssetClass::Stylesheet => InjectionDirective::stylesheet(basename),
                    _ => InjectionDirective::script(basename),
                };
                let spec = ArtifactSpec {
                    class,
                    basename,
                    target_path: target_dir.join(basename),
                    directive,
                };
                (class, spec)
            })
            .collect();
        Self { specs }
    }

    /// All artifact basenames, in injection order.
    pub fn basenames() -> impl Iterator<Item = &'static str> {
        AssetClass::ALL.into_iter().map(basename_of)
    }

    pub fn get(&self, class: AssetClass) -> &ArtifactSpec {
        // Every class is inserted by `new`.
        &self.specs[&class]
    }

    /// Specs in no particular order.
    pub fn specs(&self) -> impl Iterator<Item = &ArtifactSpec> {
        self.specs.values()
    }

    /// Injection directives in the fixed injection order.
    pub fn directives_in_order(&self) -> Vec<&InjectionDirective> {
        ordered_directives(self.specs())
    }
}

/// Sort directives into injection order, whatever order the specs come in.
pub fn ordered_directives<'a>(
    specs: impl IntoIterator<Item = &'a ArtifactSpec>,
) -> Vec<&'a InjectionDirective> {
    let mut specs: Vec<&ArtifactSpec> = specs.into_iter().collect();
    specs.sort_by_key(|s| s.class);
    specs.dedup_by_key(|s| s.class);
    specs.into_iter().map(|s| &s.directive).collect()
}

fn basename_of(class: AssetClass) -> &'static str {
    match class {
        AssetClass::UiModule => UI_MODULE_BASENAME,
        AssetClass::Dependencies => DEPENDENCIES_BASENAME,
        AssetClass::TypedScript => TYPED_SCRIPT_BASENAME,
        AssetClass::Stylesheet => STYLESHEET_BASENAME,
    }
}
