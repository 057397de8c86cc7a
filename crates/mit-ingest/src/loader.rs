//! Loading sources into an index.
//!
//! The [`Loader`] takes entries one at a time in source order, detects each
//! payload's [`Shape`], and writes the resulting records. The first error
//! stops the load; whatever was written before it stays in the store, so a
//! caller that sees an error should discard the index.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use mit_store::{InMemoryIndex, IndexStore};
use mit_types::{explicit_dn, record_key};

use crate::error::{IngestError, IngestResult};
use crate::flatten::Flattener;
use crate::shape::Shape;
use crate::source::{Entry, Source};
use crate::template::{self, TemplateTable};

/// Class used for a summary-count record when the entry has no class hint.
const SUMMARY_CLASS: &str = "moCount";

/// Stored payload of a flat element that has no `attributes` member.
const EMPTY_ATTRIBUTES: &str = "{}";

/// Counters describing one load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Entries consumed.
    pub entries: usize,
    /// Records written, including overwrites of an existing key.
    pub records: usize,
    pub line_delimited: usize,
    pub summary_count: usize,
    pub flat_array: usize,
    pub tree: usize,
    /// Entries with an empty body.
    pub empty: usize,
}

impl LoadStats {
    fn count_shape(&mut self, shape: &Shape) {
        match shape {
            Shape::LineDelimited(_) => self.line_delimited += 1,
            Shape::SummaryCount(_) => self.summary_count += 1,
            Shape::FlatArray(_) => self.flat_array += 1,
            Shape::Tree(_) => self.tree += 1,
        }
    }
}

/// Ingests entries into an index store.
pub struct Loader<'a, S: IndexStore + ?Sized> {
    store: &'a S,
    templates: &'a TemplateTable,
    stats: LoadStats,
}

impl<'a, S: IndexStore + ?Sized> Loader<'a, S> {
    pub fn new(store: &'a S, templates: &'a TemplateTable) -> Self {
        Self {
            store,
            templates,
            stats: LoadStats::default(),
        }
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    pub fn finish(self) -> LoadStats {
        self.stats
    }

    /// Ingest every entry of `src`, stopping at the first error.
    pub fn ingest_source(&mut self, src: &dyn Source) -> IngestResult<()> {
        for entry in src.entries()? {
            self.ingest_entry(&entry)?;
        }
        info!(
            entries = self.stats.entries,
            records = self.stats.records,
            "MIT load complete"
        );
        Ok(())
    }

    /// Read, classify and ingest one entry.
    pub fn ingest_entry(&mut self, entry: &Entry) -> IngestResult<()> {
        let body = entry.read().map_err(|source| IngestError::SourceRead {
            class: entry.class.clone(),
            source,
        })?;
        self.ingest_bytes(&entry.class, &body)
    }

    /// Classify and ingest one payload under the given class hint.
    pub fn ingest_bytes(&mut self, class: &str, body: &[u8]) -> IngestResult<()> {
        self.stats.entries += 1;
        let shape = Shape::detect(body).map_err(|source| IngestError::Parse {
            class: class.to_string(),
            source,
        })?;
        let Some(shape) = shape else {
            debug!(class, "empty entry");
            self.stats.empty += 1;
            return Ok(());
        };
        debug!(class, shape = shape.name(), "ingesting entry");
        self.stats.count_shape(&shape);
        let written = self.ingest_shape(class, shape)?;
        self.stats.records += written;
        Ok(())
    }

    fn ingest_shape(&self, class: &str, shape: Shape) -> IngestResult<usize> {
        match shape {
            Shape::LineDelimited(documents) => {
                for doc in &documents {
                    self.store.set(&record_key(class, &doc.oid), &doc.raw)?;
                }
                Ok(documents.len())
            }
            Shape::SummaryCount(attributes) => {
                let class = if class.is_empty() { SUMMARY_CLASS } else { class };
                let dn = attributes
                    .as_object()
                    .and_then(explicit_dn)
                    .unwrap_or_default();
                self.store.set(&record_key(class, dn), &attributes.to_string())?;
                Ok(1)
            }
            Shape::FlatArray(items) => {
                let mut written = 0;
                for mo in &items {
                    written += self.ingest_flat_mo(mo)?;
                }
                Ok(written)
            }
            Shape::Tree(root) => self.flattener().flatten(&root),
        }
    }

    /// Write one `imdata` element under `class:dn`, taking the DN verbatim
    /// from its attributes (empty if absent). Elements with children go
    /// through the flattener instead.
    fn ingest_flat_mo(&self, mo: &Value) -> IngestResult<usize> {
        let Some(members) = mo.as_object() else {
            debug!("skipping imdata element that is not an object");
            return Ok(0);
        };
        let mut written = 0;
        for (class, body) in members {
            let has_children = body
                .get("children")
                .and_then(Value::as_array)
                .is_some_and(|children| !children.is_empty());
            if has_children {
                written += self.flattener().flatten_mo(class, body)?;
                continue;
            }
            let (dn, payload) = match body.get("attributes") {
                Some(attributes) => (
                    attributes.as_object().and_then(explicit_dn).unwrap_or_default(),
                    attributes.to_string(),
                ),
                None => ("", EMPTY_ATTRIBUTES.to_string()),
            };
            self.store.set(&record_key(class, dn), &payload)?;
            written += 1;
        }
        Ok(written)
    }

    /// Ingest every entry of `src` strictly as a line-delimited document
    /// export. Each non-empty line is one record keyed by `class:<_id.$oid>`.
    pub fn ingest_documents(&mut self, src: &dyn Source) -> IngestResult<()> {
        for entry in src.entries()? {
            let body = entry.read().map_err(|source| IngestError::SourceRead {
                class: entry.class.clone(),
                source,
            })?;
            self.stats.entries += 1;
            self.stats.line_delimited += 1;
            for line in body.split(|b| *b == b'\n').map(<[u8]>::trim_ascii) {
                if line.is_empty() {
                    continue;
                }
                let value: Value =
                    serde_json::from_slice(line).map_err(|source| IngestError::Parse {
                        class: entry.class.clone(),
                        source,
                    })?;
                let oid = mit_json::get_str(&value, "_id.$oid").unwrap_or_default();
                self.store
                    .set(&record_key(&entry.class, oid), &String::from_utf8_lossy(line))?;
                self.stats.records += 1;
            }
        }
        info!(
            entries = self.stats.entries,
            records = self.stats.records,
            "document load complete"
        );
        Ok(())
    }

    fn flattener(&self) -> Flattener<'a, S> {
        Flattener::new(self.store, self.templates)
    }
}

/// Load a source into a fresh index using the embedded RN templates.
pub fn load(src: &dyn Source) -> IngestResult<InMemoryIndex> {
    load_with(src, template::embedded())
}

/// Load a source into a fresh index using the given RN templates.
pub fn load_with(src: &dyn Source, templates: &TemplateTable) -> IngestResult<InMemoryIndex> {
    let index = InMemoryIndex::new();
    Loader::new(&index, templates).ingest_source(src)?;
    Ok(index)
}

/// Load a line-delimited document export into a fresh index.
pub fn load_documents(src: &dyn Source) -> IngestResult<InMemoryIndex> {
    let index = InMemoryIndex::new();
    Loader::new(&index, template::embedded()).ingest_documents(src)?;
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FolderSource, MemSource};
    use serde_json::json;
    use std::fs;

    fn templates() -> TemplateTable {
        [
            ("fvTenant", "tn-{name}"),
            ("fvAp", "ap-{name}"),
            ("topSystem", "sys"),
            ("healthInst", "health"),
        ]
        .into_iter()
        .collect()
    }

    fn load_mem(src: MemSource) -> (InMemoryIndex, LoadStats) {
        let index = InMemoryIndex::new();
        let table = templates();
        let mut loader = Loader::new(&index, &table);
        loader.ingest_source(&src).unwrap();
        let stats = loader.finish();
        (index, stats)
    }

    // -----------------------------------------------------------------------
    // Shapes
    // -----------------------------------------------------------------------

    #[test]
    fn line_delimited_entry_keys_by_oid() {
        let line = r#"{"_id":{"$oid":"5ee97b394174748e7dd74eb8"},"siteId":"5d784dbf10000091016d97af","dn":"uni/tn-Enterprise/ap-PubSafety","epgs":["uni/tn-Enterprise/ap-PubSafety/epg-Migration"]}"#;
        let body = format!("{line}\n{}\n", r#"{"_id":{"$oid":"other"}}"#);
        let (index, stats) = load_mem(MemSource::new().with("msc_anpEpgRels", body));

        assert_eq!(stats.line_delimited, 1);
        assert_eq!(stats.records, 2);
        let doc = index.get("msc_anpEpgRels:5ee97b394174748e7dd74eb8").unwrap();
        assert_eq!(doc.raw(), line);
        assert_eq!(index.find("msc_anpEpgRels:*").unwrap().len(), 2);
    }

    #[test]
    fn line_delimited_line_without_oid_keys_on_class() {
        let body = "{\"_id\":{\"$oid\":\"a\"}}\n{\"name\":\"no-oid\"}";
        let (index, stats) = load_mem(MemSource::new().with("msc_x", body));
        assert_eq!(stats.line_delimited, 1);
        assert_eq!(index.keys().unwrap(), vec!["msc_x:", "msc_x:a"]);
        assert_eq!(index.get("msc_x:").unwrap().raw(), r#"{"name":"no-oid"}"#);
    }

    #[test]
    fn summary_count_uses_class_hint() {
        let body = r#"{"imdata":[{"moCount":{"attributes":{"count":"12","dn":"cnt","childAction":""}}}]}"#;
        let (index, stats) = load_mem(MemSource::new().with("faultInst-count", body));
        assert_eq!(stats.summary_count, 1);
        let doc = index.get("faultInst-count:cnt").unwrap();
        assert_eq!(doc.get_str("count").as_deref(), Some("12"));
    }

    #[test]
    fn summary_count_without_hint() {
        let index = InMemoryIndex::new();
        let table = templates();
        let mut loader = Loader::new(&index, &table);
        loader
            .ingest_bytes("", br#"{"imdata":[{"moCount":{"attributes":{"count":"1","dn":"cnt"}}}]}"#)
            .unwrap();
        assert!(index.get("moCount:cnt").is_ok());
    }

    #[test]
    fn flat_array_writes_attributes_verbatim() {
        let body = json!({
            "totalCount": "2",
            "imdata": [
                {"topSystem": {"attributes": {"dn": "topology/pod-1/node-101/sys", "role": "leaf"}}},
                {"topSystem": {"attributes": {"dn": "topology/pod-1/node-1/sys", "role": "controller"}}}
            ]
        });
        let (index, stats) = load_mem(MemSource::new().with("topSystem", body.to_string()));

        assert_eq!(stats.flat_array, 1);
        assert_eq!(stats.records, 2);
        let leaf = index.get("topSystem:topology/pod-1/node-101/sys").unwrap();
        assert_eq!(
            leaf.raw(),
            r#"{"dn":"topology/pod-1/node-101/sys","role":"leaf"}"#
        );
    }

    #[test]
    fn flat_array_routes_children_through_flattener() {
        let body = json!({
            "imdata": [
                {"topSystem": {
                    "attributes": {"dn": "topology/pod-1/node-101/sys", "role": "leaf"},
                    "children": [{"healthInst": {"attributes": {"cur": "100"}}}]
                }},
                {"topSystem": {
                    "attributes": {"dn": "topology/pod-1/node-102/sys", "role": "spine"},
                    "children": []
                }}
            ]
        });
        let (index, stats) = load_mem(MemSource::new().with("topSystem", body.to_string()));

        assert_eq!(stats.records, 3);
        assert_eq!(index.find("topSystem:*").unwrap().len(), 2);
        let health = index
            .find_one(format_args!("healthInst:{}/health", "topology/pod-1/node-101/sys"))
            .unwrap()
            .expect("health record");
        assert_eq!(health.get_str("cur").as_deref(), Some("100"));
    }

    #[test]
    fn flat_array_element_without_dn_keys_on_class() {
        let body = json!({"imdata": [{"fvTenant": {"attributes": {"name": "a"}}}]});
        let (index, stats) = load_mem(MemSource::new().with("fvTenant", body.to_string()));
        assert_eq!(stats.records, 1);
        assert!(index.get("fvTenant:tn-a").is_err());
        assert_eq!(index.get("fvTenant:").unwrap().raw(), r#"{"name":"a"}"#);
    }

    #[test]
    fn flat_array_keeps_classes_without_templates() {
        let index = InMemoryIndex::new();
        let table = TemplateTable::default();
        Loader::new(&index, &table)
            .ingest_bytes("vendorX", br#"{"imdata":[{"vendorX":{"attributes":{"name":"n"}}}]}"#)
            .unwrap();
        assert_eq!(index.keys().unwrap(), vec!["vendorX:"]);
    }

    #[test]
    fn flat_array_element_without_attributes() {
        let body = json!({"imdata": [{"faultInst": {}}]});
        let (index, _) = load_mem(MemSource::new().with("faultInst", body.to_string()));
        assert_eq!(index.get("faultInst:").unwrap().raw(), "{}");
    }

    #[test]
    fn tree_fallback_matches_flat_records() {
        let flat = json!({"imdata": [{"topSystem": {
            "attributes": {"dn": "topology/pod-1/node-101/sys", "role": "leaf"},
            "children": [{"healthInst": {"attributes": {"cur": "99"}}}]
        }}]});
        let tree = json!({"topSystem": {
            "attributes": {"dn": "topology/pod-1/node-101/sys", "role": "leaf"},
            "children": [{"healthInst": {"attributes": {"cur": "99"}}}]
        }});

        let (from_flat, _) = load_mem(MemSource::new().with("a", flat.to_string()));
        let (from_tree, stats) = load_mem(MemSource::new().with("b", tree.to_string()));

        assert_eq!(stats.tree, 1);
        assert_eq!(from_flat.keys().unwrap(), from_tree.keys().unwrap());
        for key in from_flat.keys().unwrap() {
            assert_eq!(from_flat.get(&key).unwrap(), from_tree.get(&key).unwrap());
        }
    }

    #[test]
    fn tenant_tree_scenario() {
        let body = r#"{"fvTenant": {"attributes": {"name":"a"}, "children": [{"fvAp":{"attributes":{"name":"A1"}}}]}}"#;
        let (index, stats) = load_mem(MemSource::new().with("", body));
        assert_eq!(stats.records, 2);
        assert!(index.get("fvTenant:tn-a").is_ok());
        assert!(index.get("fvAp:tn-a/ap-A1").is_ok());
    }

    #[test]
    fn empty_entry_contributes_nothing() {
        let (index, stats) = load_mem(MemSource::new().with("msc_emptyFile", ""));
        assert_eq!(stats.empty, 1);
        assert!(index.is_empty());
        assert!(index.find("msc_emptyFile:*").is_err());
    }

    // -----------------------------------------------------------------------
    // Failure handling
    // -----------------------------------------------------------------------

    #[test]
    fn parse_error_aborts_and_keeps_earlier_records() {
        let index = InMemoryIndex::new();
        let table = templates();
        let src = MemSource::new()
            .with("fvTenant", r#"{"fvTenant":{"attributes":{"name":"a"}}}"#)
            .with("broken", "{not json")
            .with("fvAp", r#"{"fvAp":{"attributes":{"dn":"uni/tn-a/ap-b"}}}"#);

        let err = Loader::new(&index, &table).ingest_source(&src).unwrap_err();
        assert!(matches!(err, IngestError::Parse { ref class, .. } if class == "broken"));
        assert!(index.get("fvTenant:tn-a").is_ok());
        assert!(index.find("fvAp:*").is_err());
    }

    #[test]
    fn read_error_aborts() {
        let mut src = MemSource::new();
        src.push(Entry::new("gone", || {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
        }));
        let err = load_with(&src, &templates()).unwrap_err();
        assert!(matches!(err, IngestError::SourceRead { ref class, .. } if class == "gone"));
    }

    #[test]
    fn later_entries_overwrite_earlier_keys() {
        let src = MemSource::new()
            .with("a", r#"{"fvTenant":{"attributes":{"name":"a","descr":"first"}}}"#)
            .with("b", r#"{"fvTenant":{"attributes":{"name":"a","descr":"second"}}}"#);
        let (index, stats) = load_mem(src);
        assert_eq!(stats.records, 2);
        assert_eq!(index.len(), 1);
        let doc = index.get("fvTenant:tn-a").unwrap();
        assert_eq!(doc.get_str("descr").as_deref(), Some("second"));
    }

    // -----------------------------------------------------------------------
    // Document exports
    // -----------------------------------------------------------------------

    #[test]
    fn document_load_keys_every_line() {
        let src = MemSource::new()
            .with("msc_sites", "{\"_id\":{\"$oid\":\"s1\"}}\n{\"_id\":{\"$oid\":\"s2\"}}\n")
            .with("msc_emptyFile", "");
        let index = load_documents(&src).unwrap();
        assert_eq!(index.find("msc_sites:*").unwrap().len(), 2);
        assert!(index.find("msc_emptyFile:*").is_err());
    }

    #[test]
    fn document_load_rejects_malformed_line() {
        let src = MemSource::new().with("msc_sites", "{\"_id\":{\"$oid\":\"s1\"}}\n{oops\n");
        let err = load_documents(&src).unwrap_err();
        assert!(matches!(err, IngestError::Parse { .. }));
    }

    // -----------------------------------------------------------------------
    // Folder sources
    // -----------------------------------------------------------------------

    #[test]
    fn load_folder_with_embedded_templates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("topSystem.json"),
            json!({"imdata": [
                {"topSystem": {"attributes": {"dn": "topology/pod-1/node-101/sys", "role": "leaf"},
                    "children": [{"healthInst": {"attributes": {"cur": "100"}}}]}},
                {"topSystem": {"attributes": {"dn": "topology/pod-1/node-201/sys", "role": "spine"},
                    "children": [{"healthInst": {"attributes": {"cur": "95"}}}]}},
                {"topSystem": {"attributes": {"dn": "topology/pod-1/node-1/sys", "role": "controller"}}}
            ]})
            .to_string(),
        )
        .unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let index = load(&FolderSource::new(dir.path())).unwrap();
        let systems = index.find("topSystem:*").unwrap();
        assert_eq!(systems.len(), 3);
        for system in systems {
            let role = system.get_str("role").unwrap_or_default();
            if role != "leaf" && role != "spine" {
                continue;
            }
            let dn = system.dn().unwrap();
            let health = index.find_one(format_args!("healthInst:{dn}/health")).unwrap();
            assert!(health.is_some(), "healthInst not found for {dn}");
        }
    }
}
