// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use tracing::{info, warn};

use crate::types::MergeError;

// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];
const MAX_TREE_DEPTH: usize = 64;

pub fn page_count(pdf: &[u8]) -> Result<usize, MergeError> {
    let doc = Document::load_mem(pdf).map_err(|e| MergeError::Load(e.to_string()))?;
    Ok(doc.get_pages().len())
}

/// Concatenates the pages of every document, in order.
///
/// A single document is returned untouched. Documents that fail to load
/// are skipped, the merge only fails when none of them has a page.
pub fn merge_pdfs(pdfs: &[Vec<u8>]) -> Result<Vec<u8>, MergeError> {
    match pdfs {
        [] => return Err(MergeError::NoInput),
        [single] => return Ok(single.clone()),
        _ => {}
    }

    let mut target = Document::with_version("1.5");
    let pages_id = target.new_object_id();
    let mut kids: Vec<Object> = Vec::new();

    for (idx, pdf) in pdfs.iter().enumerate() {
        let source = match Document::load_mem(pdf) {
            Ok(source) => source,
            Err(e) => {
                warn!("Skipping document index={} length={}: {}", idx, pdf.len(), e);
                continue;
            }
        };
        if source.is_encrypted() {
            warn!("Skipping encrypted document index={}", idx);
            continue;
        }
        let page_ids = import_pages(&mut target, source, pages_id);
        if page_ids.is_empty() {
            warn!("Skipping document without pages index={}", idx);
            continue;
        }
        kids.extend(page_ids.into_iter().map(Object::Reference));
    }

    if kids.is_empty() {
        return Err(MergeError::NoPages { inputs: pdfs.len() });
    }

    let count = kids.len();
    target.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count as i64,
        }),
    );
    let catalog_id = target.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    target.trailer.set("Root", catalog_id);
    // drops the source catalogs and page trees, nothing points at them anymore
    target.prune_objects();
    target.renumber_objects();
    target.compress();

    let mut out = Vec::new();
    target
        .save_to(&mut out)
        .map_err(|e| MergeError::Serialize(e.to_string()))?;
    info!(
        "Merged documents={} pages={} length={}",
        pdfs.len(),
        count,
        out.len()
    );
    Ok(out)
}

/// Like [`merge_pdfs`], but any merge failure returns the first document instead.
pub fn merge_or_first(pdfs: &[Vec<u8>]) -> Option<Vec<u8>> {
    let first = pdfs.first()?;
    match merge_pdfs(pdfs) {
        Ok(merged) => Some(merged),
        Err(e) => {
            warn!("Merge failed, returning first document: {}", e);
            Some(first.clone())
        }
    }
}

/// Moves all objects of `source` into `target` and hangs its pages under `parent`.
fn import_pages(target: &mut Document, mut source: Document, parent: ObjectId) -> Vec<ObjectId> {
    source.renumber_objects_with(target.max_id + 1);
    let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();

    for page_id in &page_ids {
        let inherited: Vec<(&[u8], Object)> = INHERITABLE
            .iter()
            .filter_map(|key| inherited_attribute(&source, *page_id, key).map(|v| (*key, v)))
            .collect();
        if let Ok(page) = source
            .get_object_mut(*page_id)
            .and_then(Object::as_dict_mut)
        {
            for (key, value) in inherited {
                page.set(key, value);
            }
            page.set("Parent", parent);
        }
    }

    if source.max_id > target.max_id {
        target.max_id = source.max_id;
    }
    target.objects.extend(source.objects);
    page_ids
}

/// Looks up an attribute the page does not set itself in its ancestors.
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let page = doc.get_dictionary(page_id).ok()?;
    if page.has(key) {
        return None;
    }
    let mut parent = parent_of(page);
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = parent_of(node);
    }
    None
}

fn parent_of(node: &Dictionary) -> Option<ObjectId> {
    node.get(b"Parent").and_then(Object::as_reference).ok()
}
