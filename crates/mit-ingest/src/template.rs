//! RN templates.
//!
//! Each class has a template describing the relative name (RN) its objects
//! contribute to their DN, for example `ap-{name}` or `subnet-[{ip}]`:
//!
//! - literal characters are copied through,
//! - `{attr}` is replaced by the value of attribute `attr` (empty if absent),
//! - `[` and `]` are never copied; either one switches on bracket mode, and
//!   the next substituted value is wrapped in literal brackets,
//! - in a template with no braces at all, `[attr]` is a bracketed
//!   substitution.
//!
//! The class-to-template table is generated out of band and embedded as
//! `data/rns.json`. It is parsed once per process and never mutated.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::error;

use mit_types::{explicit_dn, Dn};

const EMBEDDED_RN_TEMPLATES: &str = include_str!("../data/rns.json");

static EMBEDDED: LazyLock<TemplateTable> = LazyLock::new(|| {
    TemplateTable::from_json(EMBEDDED_RN_TEMPLATES).unwrap_or_else(|e| {
        error!(error = %e, "embedded RN template table is malformed");
        TemplateTable::default()
    })
});

/// The RN template table shipped with the crate.
pub fn embedded() -> &'static TemplateTable {
    &EMBEDDED
}

/// Class name to RN template lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateTable {
    templates: HashMap<String, String>,
}

impl TemplateTable {
    /// Parse a JSON object of `class -> template` strings.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn get(&self, class: &str) -> Option<&str> {
        self.templates.get(class).map(String::as_str)
    }

    pub fn contains(&self, class: &str) -> bool {
        self.templates.contains_key(class)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            templates: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Render an RN template against a record's attributes.
///
/// A template with any `{` uses placeholder substitution only; bracket
/// characters there are markers. `[attr]` substitution applies to templates
/// without braces.
pub fn render(template: &str, attributes: &Map<String, Value>) -> String {
    if template.contains('{') {
        render_placeholders(template, attributes)
    } else {
        render_bracket_names(template, attributes)
    }
}

fn render_placeholders(template: &str, attributes: &Map<String, Value>) -> String {
    let mut rn = String::with_capacity(template.len());
    let mut in_variable = false;
    let mut bracketed = false;
    let mut name = String::new();

    for c in template.chars() {
        match c {
            '{' => in_variable = true,
            '[' | ']' => bracketed = true,
            '}' => {
                let value = attribute_text(attributes, &name);
                if bracketed {
                    rn.push('[');
                    rn.push_str(&value);
                    rn.push(']');
                } else {
                    rn.push_str(&value);
                }
                in_variable = false;
                bracketed = false;
                name.clear();
            }
            c if in_variable => name.push(c),
            c => rn.push(c),
        }
    }
    rn
}

fn render_bracket_names(template: &str, attributes: &Map<String, Value>) -> String {
    let mut rn = String::with_capacity(template.len());
    // Text after an open `[`, not yet known to be an attribute name.
    let mut pending: Option<String> = None;

    for c in template.chars() {
        match c {
            '[' => {
                if let Some(text) = pending.replace(String::new()) {
                    rn.push_str(&text);
                }
            }
            ']' => {
                if let Some(attr) = pending.take().filter(|text| !text.is_empty()) {
                    rn.push('[');
                    rn.push_str(&attribute_text(attributes, &attr));
                    rn.push(']');
                }
            }
            c => match pending.as_mut() {
                Some(text) => text.push(c),
                None => rn.push(c),
            },
        }
    }
    if let Some(text) = pending {
        rn.push_str(&text);
    }
    rn
}

/// Resolve the DN of a record: its explicit `dn` if it has one, otherwise the
/// parent DN extended by the rendered template.
pub fn resolve_dn(attributes: &Map<String, Value>, parent: &Dn, template: &str) -> Dn {
    match explicit_dn(attributes) {
        Some(dn) => Dn::parse(dn),
        None => parent.child(render(template, attributes)),
    }
}

fn attribute_text(attributes: &Map<String, Value>, name: &str) -> String {
    match attributes.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
