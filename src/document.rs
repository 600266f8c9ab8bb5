//! Document-source boundary.
//!
//! The extraction core only needs three things from a PDF: a page count,
//! per-page text, and the bookmark list. `PageSource` captures exactly
//! that, so the core stays independent of the PDF library and tests can
//! feed synthetic documents.

use std::collections::{BTreeMap, HashSet};

use anyhow::{Context, Result};
use tracing::warn;

/// One bookmark entry. `level` is 1-based depth in the outline tree,
/// `page` is the 1-based physical page the entry points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub level: u32,
    pub title: String,
    pub page: u32,
}

pub trait PageSource {
    fn page_count(&self) -> u32;

    /// Extracted text of a 1-based page. Unreadable pages yield an empty
    /// string so one bad page cannot abort the document.
    fn page_text(&self, page: u32) -> String;

    fn outline(&self) -> &[OutlineEntry];
}

/// lopdf-backed document source.
pub struct PdfDocument {
    inner: lopdf::Document,
    page_numbers: Vec<u32>,
    outline: Vec<OutlineEntry>,
}

impl PdfDocument {
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let inner = lopdf::Document::load_mem(bytes).context("failed to parse PDF")?;

        // get_pages keys are 1-based page numbers in document order
        let pages_map = inner.get_pages();
        let page_numbers: Vec<u32> = pages_map.keys().copied().collect();
        let outline = extract_outline(&inner, &pages_map);

        Ok(Self {
            inner,
            page_numbers,
            outline,
        })
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> u32 {
        self.page_numbers.len() as u32
    }

    fn page_text(&self, page: u32) -> String {
        if page == 0 || page > self.page_numbers.len() as u32 {
            return String::new();
        }

        match self.inner.extract_text(&[page]) {
            Ok(text) => text,
            Err(error) => {
                warn!(page, error = %error, "failed to extract page text");
                String::new()
            }
        }
    }

    fn outline(&self) -> &[OutlineEntry] {
        &self.outline
    }
}

/// Walk the `/Outlines` tree (`/First` child, `/Next` sibling links) into
/// a flat, depth-annotated entry list. Every malformed node is skipped in
/// isolation; a document without usable bookmarks yields an empty list.
fn extract_outline(
    doc: &lopdf::Document,
    pages_map: &BTreeMap<u32, lopdf::ObjectId>,
) -> Vec<OutlineEntry> {
    let Some(catalog) = trailer_dict(doc, b"Root") else {
        return Vec::new();
    };

    let Some(outlines_dict) = resolve_dict(doc, catalog.get(b"Outlines").ok()) else {
        return Vec::new();
    };

    let first_ref = match outlines_dict.get(b"First") {
        Ok(lopdf::Object::Reference(id)) => *id,
        _ => return Vec::new(),
    };

    let mut entries = Vec::new();
    // depth cap guards against circular /First chains
    walk_outline_level(doc, first_ref, 1, 64, pages_map, &mut entries);
    entries
}

fn walk_outline_level(
    doc: &lopdf::Document,
    item_id: lopdf::ObjectId,
    level: u32,
    max_depth: u32,
    pages_map: &BTreeMap<u32, lopdf::ObjectId>,
    entries: &mut Vec<OutlineEntry>,
) {
    if level > max_depth {
        return;
    }

    let mut current_id = Some(item_id);
    let mut visited = HashSet::new();

    while let Some(node_id) = current_id {
        if !visited.insert(node_id) {
            break;
        }

        let Ok(node_dict) = doc.get_object(node_id).and_then(|obj| obj.as_dict()) else {
            break;
        };

        let title = dict_string(doc, node_dict, b"Title").unwrap_or_default();
        if let Some(page) = resolve_target_page(doc, node_dict, pages_map) {
            entries.push(OutlineEntry { level, title, page });
        }

        if let Ok(lopdf::Object::Reference(child_id)) = node_dict.get(b"First") {
            walk_outline_level(doc, *child_id, level + 1, max_depth, pages_map, entries);
        }

        current_id = match node_dict.get(b"Next") {
            Ok(lopdf::Object::Reference(next_id)) => Some(*next_id),
            _ => None,
        };
    }
}

/// Resolve a bookmark's destination to a 1-based page number, trying the
/// direct `/Dest` first and then a GoTo `/A` action.
fn resolve_target_page(
    doc: &lopdf::Document,
    node_dict: &lopdf::Dictionary,
    pages_map: &BTreeMap<u32, lopdf::ObjectId>,
) -> Option<u32> {
    if let Ok(dest_obj) = node_dict.get(b"Dest") {
        if let Some(page) = dest_array_page(doc, dest_obj, pages_map) {
            return Some(page);
        }
    }

    let action_dict = resolve_dict(doc, node_dict.get(b"A").ok())?;
    match action_dict.get(b"S") {
        Ok(lopdf::Object::Name(kind)) if kind == b"GoTo" => {
            dest_array_page(doc, action_dict.get(b"D").ok()?, pages_map)
        }
        _ => None,
    }
}

fn dest_array_page(
    doc: &lopdf::Document,
    dest_obj: &lopdf::Object,
    pages_map: &BTreeMap<u32, lopdf::ObjectId>,
) -> Option<u32> {
    let dest_obj = resolve_ref(doc, dest_obj)?;
    let array = dest_obj.as_array().ok()?;
    let lopdf::Object::Reference(page_ref) = array.first()? else {
        return None;
    };

    pages_map
        .iter()
        .find_map(|(&number, &id)| (id == *page_ref).then_some(number))
}

fn trailer_dict<'a>(doc: &'a lopdf::Document, key: &[u8]) -> Option<&'a lopdf::Dictionary> {
    resolve_dict(doc, doc.trailer.get(key).ok())
}

fn resolve_dict<'a>(
    doc: &'a lopdf::Document,
    obj: Option<&'a lopdf::Object>,
) -> Option<&'a lopdf::Dictionary> {
    resolve_ref(doc, obj?)?.as_dict().ok()
}

fn resolve_ref<'a>(doc: &'a lopdf::Document, obj: &'a lopdf::Object) -> Option<&'a lopdf::Object> {
    match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Decode a string value, handling UTF-16BE (BOM-prefixed) titles, which
/// is how these textbooks store their Japanese bookmark text.
fn dict_string(doc: &lopdf::Document, dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    let obj = resolve_ref(doc, dict.get(key).ok()?)?;
    match obj {
        lopdf::Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        lopdf::Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
