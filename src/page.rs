//! Page-tree resolution: walking `/Pages` nodes into a dense, zero-based page index with
//! attribute inheritance (§4.5).

use std::collections::HashSet;

use crate::config::ExtractionOptions;
use crate::error::{Error, Result};
use crate::object::{Dict, Object, Reference};

/// Default media box (US Letter, in points) substituted when a page defines no `/MediaBox` and
/// none is inherited. A `/MediaBox` is technically required on every page; real-world PDFs
/// occasionally omit it anyway.
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// A resolved leaf of the page tree: geometry and content already merged with inherited
/// ancestor attributes, per Table 30 of ISO 32000-1.
#[derive(Debug, Clone)]
pub struct Page {
    /// The page's own object reference, for resource-cache keying and diagnostics.
    pub node_ref: Reference,
    /// `[llx, lly, urx, ury]`, inherited from the nearest ancestor that defines one.
    pub media_box: [f64; 4],
    /// Inherited the same way as `media_box`; falls back to it when neither is present.
    pub crop_box: [f64; 4],
    /// Normalized to one of `{0, 90, 180, 270}`.
    pub rotation: i32,
    /// The page's (possibly inherited) `/Resources` dictionary, if any ancestor defines one.
    pub resources: Option<Dict>,
    /// `/Contents`: a single stream or an array of streams, concatenated in order.
    pub content_refs: Vec<Reference>,
}

#[derive(Debug, Clone, Default)]
struct Inherited {
    media_box: Option<[f64; 4]>,
    crop_box: Option<[f64; 4]>,
    rotate: Option<i32>,
    resources: Option<Dict>,
}

/// Walk the page tree rooted at `pages_root`, depth-first, collecting every `/Page` leaf in tree
/// order. `resolve` dereferences indirect references (typically backed by the same object cache
/// the document façade uses for everything else).
pub fn collect_pages(
    pages_root: Reference,
    resolve: &mut dyn FnMut(Reference) -> Result<Object>,
    options: &ExtractionOptions,
) -> Result<Vec<Page>> {
    let mut pages = Vec::new();
    let mut visited = HashSet::new();
    walk(pages_root, &Inherited::default(), 0, &mut visited, resolve, options, &mut pages)?;
    Ok(pages)
}

fn walk(
    node_ref: Reference,
    inherited: &Inherited,
    depth: usize,
    visited: &mut HashSet<Reference>,
    resolve: &mut dyn FnMut(Reference) -> Result<Object>,
    options: &ExtractionOptions,
    pages: &mut Vec<Page>,
) -> Result<()> {
    if depth > options.max_nesting {
        return Err(Error::InvalidPageTree(format!(
            "page tree nesting exceeds {} levels",
            options.max_nesting
        )));
    }
    if !visited.insert(node_ref) {
        return Err(Error::InvalidPageTree(format!("/Kids cycle at object {node_ref}")));
    }

    let node = resolve(node_ref)?;
    let dict = node
        .as_dict()
        .ok_or_else(|| Error::InvalidPageTree(format!("object {node_ref} is not a dictionary")))?;

    let merged = merge_inherited(dict, inherited);
    let node_type = dict.get("Type").and_then(Object::as_name).unwrap_or("");

    match node_type {
        "Page" => {
            pages.push(build_page(node_ref, dict, &merged));
            Ok(())
        },
        "Pages" | "" => {
            // Some producers omit /Type on intermediate nodes; treat anything with /Kids as
            // an internal node rather than rejecting it outright.
            let kids = dict.get("Kids").and_then(Object::as_array).ok_or_else(|| {
                Error::InvalidPageTree(format!("node {node_ref} has neither /Type /Page nor /Kids"))
            })?;
            for kid in kids {
                let kid_ref = kid
                    .as_reference()
                    .ok_or_else(|| Error::InvalidPageTree(format!("/Kids entry in {node_ref} is not a reference")))?;
                walk(kid_ref, &merged, depth + 1, visited, resolve, options, pages)?;
            }
            Ok(())
        },
        other => Err(Error::InvalidPageTree(format!("unknown page tree node type {other:?} at {node_ref}"))),
    }
}

fn merge_inherited(dict: &Dict, parent: &Inherited) -> Inherited {
    Inherited {
        media_box: dict.get("MediaBox").and_then(parse_rect).or(parent.media_box),
        crop_box: dict.get("CropBox").and_then(parse_rect).or(parent.crop_box),
        rotate: dict.get("Rotate").and_then(Object::as_integer).map(|r| r as i32).or(parent.rotate),
        resources: dict.get("Resources").and_then(Object::as_dict).cloned().or_else(|| parent.resources.clone()),
    }
}

fn build_page(node_ref: Reference, dict: &Dict, inherited: &Inherited) -> Page {
    let media_box = inherited.media_box.unwrap_or_else(|| {
        log::warn!("page {node_ref}: no /MediaBox in page or ancestors, defaulting to US Letter");
        DEFAULT_MEDIA_BOX
    });
    let crop_box = inherited.crop_box.unwrap_or(media_box);
    let rotation = normalize_rotation(inherited.rotate.unwrap_or(0));
    let content_refs = dict.get("Contents").map(collect_content_refs).unwrap_or_default();

    Page { node_ref, media_box, crop_box, rotation, resources: inherited.resources.clone(), content_refs }
}

fn collect_content_refs(contents: &Object) -> Vec<Reference> {
    match contents {
        Object::Reference(r) => vec![*r],
        Object::Array(entries) => entries
            .iter()
            .filter_map(|entry| match entry.as_reference() {
                Some(r) => Some(r),
                None => {
                    log::warn!("/Contents array entry is not an indirect reference, skipping");
                    None
                },
            })
            .collect(),
        other => {
            log::warn!("/Contents is a {}, expected Reference or Array; page has no content", other.type_name());
            Vec::new()
        },
    }
}

fn parse_rect(obj: &Object) -> Option<[f64; 4]> {
    let arr = obj.as_array()?;
    if arr.len() != 4 {
        log::warn!("rectangle array has {} entries, expected 4", arr.len());
        return None;
    }
    let mut out = [0.0; 4];
    for (i, entry) in arr.iter().enumerate() {
        out[i] = entry.as_real()?;
    }
    Some(out)
}

fn normalize_rotation(rotate: i32) -> i32 {
    ((rotate % 360) + 360) % 360
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(entries: Vec<(&str, Object)>) -> Dict {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    fn rect(values: [f64; 4]) -> Object {
        Object::Array(values.iter().map(|v| Object::Real(*v)).collect())
    }

    #[test]
    fn single_page_tree() {
        let root = Reference::new(1, 0);
        let page_ref = Reference::new(2, 0);
        let mut objects = std::collections::HashMap::new();
        objects.insert(
            root,
            Object::Dict(dict(vec![
                ("Type", Object::Name("Pages".into())),
                ("Kids", Object::Array(vec![Object::Reference(page_ref)])),
                ("MediaBox", rect([0.0, 0.0, 612.0, 792.0])),
            ])),
        );
        objects.insert(
            page_ref,
            Object::Dict(dict(vec![
                ("Type", Object::Name("Page".into())),
                ("Contents", Object::Reference(Reference::new(3, 0))),
            ])),
        );
        let mut resolve = |r: Reference| objects.get(&r).cloned().ok_or(Error::InvalidReference(r.number, r.generation));
        let pages = collect_pages(root, &mut resolve, &ExtractionOptions::default()).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].media_box, [0.0, 0.0, 612.0, 792.0]);
        assert_eq!(pages[0].content_refs, vec![Reference::new(3, 0)]);
    }

    #[test]
    fn inherits_media_box_and_rotate_through_nested_pages_nodes() {
        let root = Reference::new(1, 0);
        let mid = Reference::new(2, 0);
        let page_ref = Reference::new(3, 0);
        let mut objects = std::collections::HashMap::new();
        objects.insert(
            root,
            Object::Dict(dict(vec![
                ("Type", Object::Name("Pages".into())),
                ("Kids", Object::Array(vec![Object::Reference(mid)])),
                ("MediaBox", rect([0.0, 0.0, 595.0, 842.0])),
                ("Rotate", Object::Integer(90)),
            ])),
        );
        objects.insert(
            mid,
            Object::Dict(dict(vec![
                ("Type", Object::Name("Pages".into())),
                ("Kids", Object::Array(vec![Object::Reference(page_ref)])),
            ])),
        );
        objects.insert(page_ref, Object::Dict(dict(vec![("Type", Object::Name("Page".into()))])));
        let mut resolve = |r: Reference| objects.get(&r).cloned().ok_or(Error::InvalidReference(r.number, r.generation));
        let pages = collect_pages(root, &mut resolve, &ExtractionOptions::default()).unwrap();
        assert_eq!(pages[0].media_box, [0.0, 0.0, 595.0, 842.0]);
        assert_eq!(pages[0].rotation, 90);
    }

    #[test]
    fn child_media_box_overrides_ancestor() {
        let root = Reference::new(1, 0);
        let page_ref = Reference::new(2, 0);
        let mut objects = std::collections::HashMap::new();
        objects.insert(
            root,
            Object::Dict(dict(vec![
                ("Type", Object::Name("Pages".into())),
                ("Kids", Object::Array(vec![Object::Reference(page_ref)])),
                ("MediaBox", rect([0.0, 0.0, 612.0, 792.0])),
            ])),
        );
        objects.insert(
            page_ref,
            Object::Dict(dict(vec![("Type", Object::Name("Page".into())), ("MediaBox", rect([0.0, 0.0, 200.0, 300.0]))])),
        );
        let mut resolve = |r: Reference| objects.get(&r).cloned().ok_or(Error::InvalidReference(r.number, r.generation));
        let pages = collect_pages(root, &mut resolve, &ExtractionOptions::default()).unwrap();
        assert_eq!(pages[0].media_box, [0.0, 0.0, 200.0, 300.0]);
    }

    #[test]
    fn kids_cycle_is_rejected() {
        let root = Reference::new(1, 0);
        let mut objects = std::collections::HashMap::new();
        objects.insert(
            root,
            Object::Dict(dict(vec![
                ("Type", Object::Name("Pages".into())),
                ("Kids", Object::Array(vec![Object::Reference(root)])),
            ])),
        );
        let mut resolve = |r: Reference| objects.get(&r).cloned().ok_or(Error::InvalidReference(r.number, r.generation));
        let err = collect_pages(root, &mut resolve, &ExtractionOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidPageTree(_)));
    }

    #[test]
    fn missing_media_box_defaults_to_us_letter() {
        let root = Reference::new(1, 0);
        let page_ref = Reference::new(2, 0);
        let mut objects = std::collections::HashMap::new();
        objects.insert(
            root,
            Object::Dict(dict(vec![
                ("Type", Object::Name("Pages".into())),
                ("Kids", Object::Array(vec![Object::Reference(page_ref)])),
            ])),
        );
        objects.insert(page_ref, Object::Dict(dict(vec![("Type", Object::Name("Page".into()))])));
        let mut resolve = |r: Reference| objects.get(&r).cloned().ok_or(Error::InvalidReference(r.number, r.generation));
        let pages = collect_pages(root, &mut resolve, &ExtractionOptions::default()).unwrap();
        assert_eq!(pages[0].media_box, DEFAULT_MEDIA_BOX);
    }

    #[test]
    fn negative_rotate_normalizes_into_range() {
        assert_eq!(normalize_rotation(-90), 270);
        assert_eq!(normalize_rotation(450), 90);
        assert_eq!(normalize_rotation(0), 0);
    }

    #[test]
    fn three_page_array_collects_in_order() {
        let root = Reference::new(1, 0);
        let p1 = Reference::new(2, 0);
        let p2 = Reference::new(3, 0);
        let p3 = Reference::new(4, 0);
        let mut objects = std::collections::HashMap::new();
        objects.insert(
            root,
            Object::Dict(dict(vec![
                ("Type", Object::Name("Pages".into())),
                ("Kids", Object::Array(vec![Object::Reference(p1), Object::Reference(p2), Object::Reference(p3)])),
                ("MediaBox", rect([0.0, 0.0, 612.0, 792.0])),
            ])),
        );
        for p in [p1, p2, p3] {
            objects.insert(p, Object::Dict(dict(vec![("Type", Object::Name("Page".into()))])));
        }
        let mut resolve = |r: Reference| objects.get(&r).cloned().ok_or(Error::InvalidReference(r.number, r.generation));
        let pages = collect_pages(root, &mut resolve, &ExtractionOptions::default()).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages.iter().map(|p| p.node_ref).collect::<Vec<_>>(), vec![p1, p2, p3]);
    }
}
