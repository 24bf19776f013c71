// src/inject.rs

//! Site HTML injection.
//!
//! The injector reads the template fresh on every run, finds the single
//! insertion element and appends the artifact references as its last
//! children. It never reads its own previous output, so repeated runs do
//! not accumulate references.

use std::fmt;
use std::path::PathBuf;

use anyhow::Context;
use regex::Regex;
use tracing::debug;

use crate::compile::Artifact;
use crate::errors::{BuildError, Result};
use crate::fs::FileSystem;
use crate::registry::InjectionDirective;

/// Elements whose content is text, never markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "title", "textarea"];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Element selector for the insertion point: `tag`, `#id` or `tag#id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
}

impl Selector {
    pub fn parse(input: &str) -> std::result::Result<Self, String> {
        let s = input.trim();
        if s.is_empty() {
            return Err("[inject].selector must not be empty".to_string());
        }

        let (tag_part, id_part) = match s.split_once('#') {
            Some((tag, id)) => (tag, Some(id)),
            None => (s, None),
        };

        let tag = if tag_part.is_empty() {
            None
        } else if is_tag_name(tag_part) {
            Some(tag_part.to_ascii_lowercase())
        } else {
            return Err(format!(
                "unsupported selector '{s}' (expected `tag`, `#id` or `tag#id`)"
            ));
        };

        let id = match id_part {
            Some(id) if !id.is_empty() && !id.contains(|c: char| c.is_whitespace() || c == '#') => {
                Some(id.to_string())
            }
            Some(_) => return Err(format!("selector '{s}' has an invalid id")),
            None => None,
        };

        Ok(Self { tag, id })
    }

    fn matches(&self, tag: &str, id: Option<&str>) -> bool {
        if let Some(want) = &self.tag {
            if want != tag {
                return false;
            }
        }
        match &self.id {
            Some(want) => id == Some(want.as_str()),
            None => true,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tag) = &self.tag {
            f.write_str(tag)?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        Ok(())
    }
}

fn is_tag_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// The page skeleton: where it is read from and where references go.
#[derive(Debug, Clone)]
pub struct HtmlTemplate {
    pub source: PathBuf,
    pub selector: Selector,
}

/// Reads a template and produces the site HTML artifact.
#[derive(Debug, Clone)]
pub struct HtmlInjector {
    output: PathBuf,
}

impl HtmlInjector {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
        }
    }

    /// Read `template` and append `directives` (already in injection order)
    /// to its insertion element. Fails without producing anything when the
    /// element is missing or ambiguous.
    pub fn inject(
        &self,
        fs: &dyn FileSystem,
        template: &HtmlTemplate,
        directives: &[&InjectionDirective],
    ) -> Result<Artifact> {
        let html = fs
            .read_to_string(&template.source)
            .with_context(|| format!("reading template {:?}", template.source))?;

        let rendered = inject_markup(&html, &template.selector, directives)
            .map_err(|msg| BuildError::Injection(format!("{msg} in {:?}", template.source)))?;

        debug!(
            template = ?template.source,
            output = ?self.output,
            injected = directives.len(),
            "rendered site html"
        );

        Ok(Artifact {
            path: self.output.clone(),
            bytes: rendered.into_bytes(),
        })
    }
}

#[derive(Debug)]
struct Tag {
    start: usize,
    name: String,
    closing: bool,
    self_closing: bool,
    id: Option<String>,
}

/// Pure injection on a template string.
///
/// Errors are plain messages; [`HtmlInjector::inject`] wraps them into
/// [`BuildError::Injection`].
pub fn inject_markup(
    html: &str,
    selector: &Selector,
    directives: &[&InjectionDirective],
) -> std::result::Result<String, String> {
    let tags = scan_tags(html)?;

    let matches: Vec<usize> = tags
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.closing && selector.matches(&t.name, t.id.as_deref()))
        .map(|(i, _)| i)
        .collect();

    let target_idx = match matches.as_slice() {
        [] => return Err(format!("insertion point `{selector}` not found")),
        [only] => *only,
        many => {
            return Err(format!(
                "insertion point `{selector}` is ambiguous ({} matches)",
                many.len()
            ));
        }
    };

    let target = &tags[target_idx];
    if target.self_closing || VOID_ELEMENTS.contains(&target.name.as_str()) {
        return Err(format!(
            "insertion point `{selector}` is a void element and cannot have children"
        ));
    }

    let insert_at = closing_tag_start(&tags, target_idx)
        .or_else(|| implied_end(&tags, target_idx, html.len()))
        .ok_or_else(|| format!("insertion point `{selector}` is never closed"))?;

    let markup: String = directives.iter().map(|d| d.to_markup()).collect();

    let mut out = String::with_capacity(html.len() + markup.len());
    out.push_str(&html[..insert_at]);
    out.push_str(&markup);
    out.push_str(&html[insert_at..]);
    Ok(out)
}

/// Byte offset of the tag closing `tags[open_idx]`, counting nested
/// elements of the same name.
fn closing_tag_start(tags: &[Tag], open_idx: usize) -> Option<usize> {
    let name = &tags[open_idx].name;
    let mut depth = 1usize;
    for tag in tags[open_idx + 1..].iter().filter(|t| &t.name == name) {
        if tag.closing {
            depth -= 1;
            if depth == 0 {
                return Some(tag.start);
            }
        } else if !tag.self_closing {
            depth += 1;
        }
    }
    None
}

/// Where an element whose end tag may be omitted ends implicitly: `head`
/// at the following `<body>`, `body` at `</html>` or the end of input.
fn implied_end(tags: &[Tag], open_idx: usize, len: usize) -> Option<usize> {
    let rest = &tags[open_idx + 1..];
    match tags[open_idx].name.as_str() {
        "head" => rest
            .iter()
            .find(|t| t.name == "body" && !t.closing)
            .map(|t| t.start),
        "body" => Some(
            rest.iter()
                .find(|t| t.name == "html" && t.closing)
                .map_or(len, |t| t.start),
        ),
        _ => None,
    }
}

/// Tokenise start/end tags, skipping comments and the text content of
/// [`RAW_TEXT_ELEMENTS`].
fn scan_tags(html: &str) -> std::result::Result<Vec<Tag>, String> {
    let token_re = Regex::new(
        r#"(?s)<!--.*?-->|<(/)?([A-Za-z][A-Za-z0-9:-]*)((?:[^>"']|"[^"]*"|'[^']*')*?)(/)?>"#,
    )
    .map_err(|e| e.to_string())?;
    let id_re = Regex::new(r#"(?i)(?:^|\s)id\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+))"#)
        .map_err(|e| e.to_string())?;

    let mut tags = Vec::new();
    let mut pos = 0;
    while let Some(caps) = token_re.captures_at(html, pos) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => break,
        };
        pos = whole.end();

        let Some(name) = caps.get(2) else {
            continue; // comment
        };

        let name = name.as_str().to_ascii_lowercase();
        let closing = caps.get(1).is_some();
        let attrs = caps.get(3).map(|m| m.as_str()).unwrap_or("");
        let self_closing = caps.get(4).is_some();
        let id = id_re.captures(attrs).and_then(|c| {
            c.get(1)
                .or_else(|| c.get(2))
                .or_else(|| c.get(3))
                .map(|m| m.as_str().to_string())
        });

        let raw_text = !closing && !self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_str());

        tags.push(Tag {
            start: whole.start(),
            name: name.clone(),
            closing,
            self_closing,
            id,
        });

        if raw_text {
            let needle = format!("</{name}");
            match html[pos..].to_ascii_lowercase().find(&needle) {
                Some(offset) => pos += offset,
                None => pos = html.len(),
            }
        }
    }

    Ok(tags)
}
