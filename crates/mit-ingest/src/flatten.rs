//! Tree flattening.
//!
//! A managed object (MO) in a tree export is a single-key object
//! `{"<class>": {"attributes": {...}, "children": [...]}}`. The flattener
//! walks such a tree with an explicit stack, resolves every node's DN, and
//! writes one record per node.
//!
//! Each stack frame carries its parent's resolved DN by value. Children are
//! pushed in input order and therefore popped in reverse; sibling order in
//! the traversal carries no meaning because every record lands under its own
//! key.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use mit_store::IndexStore;
use mit_types::{explicit_dn, record_key, Dn};

use crate::error::IngestResult;
use crate::template::{resolve_dn, TemplateTable};

struct Frame<'v> {
    class: &'v str,
    body: &'v Value,
    parent: Dn,
}

/// Split a single-key MO object into its class and body.
pub fn mo_parts(node: &Value) -> Option<(&str, &Value)> {
    node.as_object()?
        .iter()
        .next()
        .map(|(class, body)| (class.as_str(), body))
}

/// Writes every resolvable node of an MO tree into an index.
pub struct Flattener<'a, S: IndexStore + ?Sized> {
    store: &'a S,
    templates: &'a TemplateTable,
}

impl<'a, S: IndexStore + ?Sized> Flattener<'a, S> {
    pub fn new(store: &'a S, templates: &'a TemplateTable) -> Self {
        Self { store, templates }
    }

    /// Flatten the tree rooted at `root`. Returns the number of records written.
    pub fn flatten(&self, root: &Value) -> IngestResult<usize> {
        match mo_parts(root) {
            Some((class, body)) => self.flatten_mo(class, body),
            None => {
                debug!("root is not a class-keyed object; nothing to flatten");
                Ok(0)
            }
        }
    }

    /// Flatten the tree rooted at the MO `class` with body `body`.
    pub fn flatten_mo(&self, class: &str, body: &Value) -> IngestResult<usize> {
        let mut stack = vec![Frame {
            class,
            body,
            parent: Dn::root(),
        }];
        let mut written = 0;
        let no_attributes = Map::new();

        while let Some(frame) = stack.pop() {
            let raw_attributes = frame.body.get("attributes");
            let attributes = raw_attributes
                .and_then(Value::as_object)
                .unwrap_or(&no_attributes);

            let dn = match self.templates.get(frame.class) {
                Some(template) => resolve_dn(attributes, &frame.parent, template),
                None => match explicit_dn(attributes) {
                    Some(dn) => Dn::parse(dn),
                    None => {
                        debug!(class = frame.class, "no RN template; dropping subtree");
                        continue;
                    }
                },
            };

            let dn_text = dn.to_string();
            let raw = raw_attributes.map(Value::to_string).unwrap_or_default();
            let payload = mit_json::set_path(&raw, "dn", &dn_text);
            self.store.set(&record_key(frame.class, &dn_text), &payload)?;
            written += 1;

            let Some(children) = frame.body.get("children").and_then(Value::as_array) else {
                continue;
            };
            for child in children {
                match mo_parts(child) {
                    Some((class, body)) => stack.push(Frame {
                        class,
                        body,
                        parent: dn.clone(),
                    }),
                    None => warn!(parent = %dn, "skipping child that is not a class-keyed object"),
                }
            }
        }
        Ok(written)
    }
}
