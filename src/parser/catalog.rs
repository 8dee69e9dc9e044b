//! Document-level lookups: the Info dictionary and the outline tree.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::model::{Metadata, NativeOutlineEntry};

use super::backend::{resolve, text_from_object};

/// Outline trees nested deeper than this are cut off.
const MAX_OUTLINE_DEPTH: i32 = 64;

/// Read all string entries of the trailer's Info dictionary.
pub(crate) fn read_info(doc: &LopdfDocument) -> Metadata {
    let mut metadata = Metadata::new();

    let Ok(info) = doc.trailer.get(b"Info") else {
        return metadata;
    };
    let Ok(info_dict) = resolve(doc, info).as_dict() else {
        return metadata;
    };

    for (key, value) in info_dict.iter() {
        if let Some(text) = text_from_object(resolve(doc, value)) {
            metadata.insert(String::from_utf8_lossy(key), text);
        }
    }

    metadata
}

/// Walk the `/Outlines` tree in source order.
///
/// Top-level items get level 1. Items linked into a cycle are visited once.
pub(crate) fn read_outline(doc: &LopdfDocument) -> Vec<NativeOutlineEntry> {
    let Ok(catalog) = doc.catalog() else {
        return vec![];
    };
    let Some(root) = catalog
        .get(b"Outlines")
        .ok()
        .and_then(|o| resolve(doc, o).as_dict().ok())
    else {
        return vec![];
    };

    let reader = OutlineReader::new(doc, catalog);
    let mut entries = Vec::new();
    let mut visited = HashSet::new();

    if let Ok(first) = root.get(b"First").and_then(Object::as_reference) {
        reader.walk(first, 1, &mut visited, &mut entries);
    }

    log::debug!("Native outline: {} entries", entries.len());
    entries
}

struct OutlineReader<'a> {
    doc: &'a LopdfDocument,
    page_index: HashMap<ObjectId, usize>,
    named: HashMap<Vec<u8>, &'a Object>,
}

impl<'a> OutlineReader<'a> {
    fn new(doc: &'a LopdfDocument, catalog: &'a Dictionary) -> Self {
        let page_index = doc
            .get_pages()
            .into_values()
            .enumerate()
            .map(|(index, id)| (id, index))
            .collect();

        Self {
            doc,
            page_index,
            named: named_destinations(doc, catalog),
        }
    }

    /// Visit an item, its children, and its following siblings.
    fn walk(
        &self,
        first: ObjectId,
        level: i32,
        visited: &mut HashSet<ObjectId>,
        entries: &mut Vec<NativeOutlineEntry>,
    ) {
        if level > MAX_OUTLINE_DEPTH {
            log::warn!("Outline nested deeper than {} levels, truncating", MAX_OUTLINE_DEPTH);
            return;
        }

        let mut next = Some(first);
        while let Some(id) = next {
            if !visited.insert(id) {
                log::warn!("Outline item {:?} visited twice, stopping", id);
                return;
            }
            let Ok(item) = self.doc.get_dictionary(id) else {
                return;
            };

            let title = item
                .get(b"Title")
                .ok()
                .and_then(|t| text_from_object(resolve(self.doc, t)))
                .unwrap_or_default();
            let page = self.item_page(item).map(|p| p as i64);
            entries.push(NativeOutlineEntry::new(level, title, page));

            if let Ok(child) = item.get(b"First").and_then(Object::as_reference) {
                self.walk(child, level + 1, visited, entries);
            }

            next = item.get(b"Next").and_then(Object::as_reference).ok();
        }
    }

    /// Destination page of an outline item, from `/Dest` or a GoTo action.
    fn item_page(&self, item: &Dictionary) -> Option<usize> {
        if let Ok(dest) = item.get(b"Dest") {
            return self.destination_page(dest, 0);
        }

        let action = resolve(self.doc, item.get(b"A").ok()?).as_dict().ok()?;
        if let Ok(kind) = action.get(b"S").and_then(Object::as_name) {
            if kind != b"GoTo" {
                return None;
            }
        }
        self.destination_page(action.get(b"D").ok()?, 0)
    }

    /// Resolve an explicit or named destination to a page index.
    fn destination_page(&self, dest: &Object, depth: usize) -> Option<usize> {
        if depth > 4 {
            return None;
        }

        match resolve(self.doc, dest) {
            Object::Array(items) => match items.first()? {
                Object::Reference(id) => self.page_index.get(id).copied(),
                Object::Integer(n) if *n >= 0 => Some(*n as usize),
                _ => None,
            },
            Object::Name(name) | Object::String(name, _) => {
                let target = self.named.get(name.as_slice())?;
                self.destination_page(target, depth + 1)
            }
            Object::Dictionary(dict) => self.destination_page(dict.get(b"D").ok()?, depth + 1),
            _ => None,
        }
    }
}

/// Named destinations from the catalog's `/Dests` dictionary and the
/// `/Names` → `/Dests` name tree.
fn named_destinations<'a>(
    doc: &'a LopdfDocument,
    catalog: &'a Dictionary,
) -> HashMap<Vec<u8>, &'a Object> {
    let mut named = HashMap::new();

    if let Some(dests) = catalog
        .get(b"Dests")
        .ok()
        .and_then(|d| resolve(doc, d).as_dict().ok())
    {
        for (key, value) in dests.iter() {
            named.insert(key.clone(), value);
        }
    }

    if let Some(tree) = catalog
        .get(b"Names")
        .ok()
        .and_then(|n| resolve(doc, n).as_dict().ok())
        .and_then(|names| names.get(b"Dests").ok())
    {
        let mut visited = HashSet::new();
        collect_name_tree(doc, tree, &mut named, &mut visited, 0);
    }

    named
}

fn collect_name_tree<'a>(
    doc: &'a LopdfDocument,
    node: &'a Object,
    out: &mut HashMap<Vec<u8>, &'a Object>,
    visited: &mut HashSet<ObjectId>,
    depth: usize,
) {
    if depth > 32 {
        return;
    }
    if let Object::Reference(id) = node {
        if !visited.insert(*id) {
            return;
        }
    }
    let Ok(dict) = resolve(doc, node).as_dict() else {
        return;
    };

    if let Ok(names) = dict.get(b"Names").and_then(Object::as_array) {
        for pair in names.chunks(2) {
            if let [Object::String(key, _), value] = pair {
                out.entry(key.clone()).or_insert(value);
            }
        }
    }

    if let Ok(kids) = dict.get(b"Kids").and_then(Object::as_array) {
        for kid in kids {
            collect_name_tree(doc, kid, out, visited, depth + 1);
        }
    }
}
