//! The document façade: open a PDF once, then extract text from one or all pages (§4.8).
//!
//! Resolution is single-threaded inside [`Document::open`] — the xref table, object cache, and
//! object-stream cache are all plain `HashMap`s mutated while walking the page tree. Once `open`
//! returns, every page's content bytes and font map have already been resolved and decoded, so
//! `Document` itself is immutable and `Send + Sync`: `extract_page_parallel`/`extract_all_parallel`
//! hand pages to `rayon` with no further object resolution in the hot path.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::config::{ErrorConfig, ExtractionOptions};
use crate::content;
use crate::error::{Error, Result};
use crate::fonts::{Font, ObjectResolver};
use crate::object::{Dict, Object, Reference};
use crate::objstm::parse_object_stream;
use crate::page::{self, Page};
use crate::parser::parse_indirect_object;
use crate::xref::{self, CrossRefTable, XRefEntryType};

pub use crate::content::TextSink;

/// Per-page geometry, independent of its content (§10.6 supplements this with `/CropBox`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageInfo {
    /// Page width in points, after rotation normalization (`MediaBox` width/height swapped for
    /// 90°/270° rotations).
    pub width: f64,
    /// Page height in points, after rotation normalization.
    pub height: f64,
    /// Normalized rotation in degrees: one of `{0, 90, 180, 270}`.
    pub rotation: i32,
    /// The page's (possibly inherited) crop box, `[llx, lly, urx, ury]`.
    pub crop_box: [f64; 4],
}

/// A resolved, ready-to-extract page: content bytes already filter-decoded and concatenated, font
/// resources already built.
struct ResolvedPage {
    info: PageInfo,
    content: Vec<u8>,
    fonts: HashMap<String, Font>,
}

/// An opened PDF document, ready for text extraction.
///
/// Construction (`open`) does all the fallible, stateful work: xref resolution, page-tree
/// walking, stream decompression, font-dictionary parsing. Everything after that is a read over
/// already-resolved data.
pub struct Document {
    resolved_pages: Vec<ResolvedPage>,
    options: ExtractionOptions,
    permissive: bool,
}

impl Document {
    /// Open a PDF from an in-memory byte buffer, using the default [`ExtractionOptions`].
    pub fn open(bytes: &[u8], config: ErrorConfig) -> Result<Self> {
        Self::open_with_options(bytes, config, ExtractionOptions::default())
    }

    /// Open a PDF with explicit tunables for nesting depth, `/Prev` chain length, decompression
    /// guards, and the `TJ` space-insertion threshold.
    pub fn open_with_options(
        bytes: &[u8],
        config: ErrorConfig,
        options: ExtractionOptions,
    ) -> Result<Self> {
        let permissive = config.is_permissive();

        let startxref = xref::find_startxref_offset(bytes)?;
        let xref_table = xref::parse_xref_chain(bytes, startxref, &options)?;

        let trailer = xref_table
            .trailer()
            .ok_or_else(|| Error::InvalidTrailer("no trailer dictionary found".to_string()))?
            .clone();

        let root_ref = trailer
            .get("Root")
            .and_then(Object::as_reference)
            .ok_or_else(|| Error::InvalidTrailer("trailer has no /Root reference".to_string()))?;

        let mut resolver = Resolver::new(bytes, &xref_table, &options);

        let root = resolver.resolve(root_ref)?;
        let root_dict = root
            .as_dict()
            .ok_or_else(|| Error::InvalidTrailer("/Root is not a dictionary".to_string()))?;

        let pages_ref = root_dict
            .get("Pages")
            .and_then(Object::as_reference)
            .ok_or_else(|| Error::InvalidTrailer("/Root has no /Pages reference".to_string()))?;

        let pages = page::collect_pages(pages_ref, &mut |r| resolver.resolve(r), &options)?;

        let mut resolved_pages = Vec::with_capacity(pages.len());
        for page in &pages {
            let resolved = resolve_page(page, &mut resolver, &options, permissive)?;
            resolved_pages.push(resolved);
        }

        Ok(Self { resolved_pages, options, permissive })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.resolved_pages.len()
    }

    /// Geometry for a single page, zero-indexed. `None` if `page_index` is out of range.
    pub fn get_page_info(&self, page_index: usize) -> Option<PageInfo> {
        self.resolved_pages.get(page_index).map(|p| p.info)
    }

    /// Extract the text of a single page, in content-stream emission order, writing it to `sink`.
    pub fn extract_text(&self, page_index: usize, sink: &mut dyn TextSink) -> Result<()> {
        let page = self
            .resolved_pages
            .get(page_index)
            .ok_or_else(|| Error::InvalidPageTree(format!("page index {page_index} out of range")))?;
        content::run(&page.content, &page.fonts, &self.options, self.permissive, sink)
    }

    /// Extract every page's text in order, separated by form-feed (`\x0C`).
    pub fn extract_all(&self, sink: &mut dyn TextSink) -> Result<()> {
        for (index, page) in self.resolved_pages.iter().enumerate() {
            if index > 0 {
                sink.write_str("\u{000C}")?;
            }
            content::run(&page.content, &page.fonts, &self.options, self.permissive, sink)?;
        }
        Ok(())
    }

    /// Extract a single page's text using the `rayon` global pool. Equivalent to
    /// [`Document::extract_text`] for a single page; provided for API symmetry with
    /// [`Document::extract_all_parallel`].
    pub fn extract_page_parallel(&self, page_index: usize) -> Result<String> {
        let mut sink = String::new();
        self.extract_text(page_index, &mut sink)?;
        Ok(sink)
    }

    /// Extract every page's text concurrently via `rayon`, returning results in page order
    /// regardless of completion order.
    ///
    /// `cancel`, if set to `true` from another thread, stops dispatching new pages; pages already
    /// in flight still complete. Returns [`Error::Cancelled`] if cancellation was observed before
    /// every page finished.
    pub fn extract_all_parallel(&self, cancel: Option<Arc<AtomicBool>>) -> Result<String> {
        let total = self.resolved_pages.len();
        let cancel = cancel.unwrap_or_else(|| Arc::new(AtomicBool::new(false)));

        let results: Vec<Option<Result<String>>> = self
            .resolved_pages
            .par_iter()
            .map(|page| {
                if cancel.load(Ordering::Relaxed) {
                    return None;
                }
                let mut sink = String::new();
                let result = content::run(&page.content, &page.fonts, &self.options, self.permissive, &mut sink)
                    .map(|()| sink);
                Some(result)
            })
            .collect();

        let completed = results.iter().take_while(|r| r.is_some()).count();
        if completed < total {
            return Err(Error::Cancelled { completed, total });
        }

        let mut text = String::new();
        for (index, result) in results.into_iter().enumerate() {
            if index > 0 {
                text.push('\u{000C}');
            }
            text.push_str(&result.expect("checked completed count above")?);
        }
        Ok(text)
    }
}

fn resolve_page(
    page: &Page,
    resolver: &mut Resolver,
    options: &ExtractionOptions,
    permissive: bool,
) -> Result<ResolvedPage> {
    let mut content = Vec::new();
    for (index, content_ref) in page.content_refs.iter().enumerate() {
        if index > 0 {
            content.push(b'\n');
        }
        let stream = resolver.resolve(*content_ref)?;
        match stream.decode_stream_data(options) {
            Ok(bytes) => content.extend_from_slice(&bytes),
            Err(err) if permissive => {
                log::warn!("skipping undecodable content stream {content_ref}: {err}");
            },
            Err(err) => return Err(err),
        }
    }

    let fonts = build_font_map(page.resources.as_ref(), resolver, options, permissive)?;

    let (width, height) = page_dimensions(page);
    let info = PageInfo { width, height, rotation: page.rotation, crop_box: page.crop_box };

    Ok(ResolvedPage { info, content, fonts })
}

fn page_dimensions(page: &Page) -> (f64, f64) {
    let raw_width = page.media_box[2] - page.media_box[0];
    let raw_height = page.media_box[3] - page.media_box[1];
    if page.rotation == 90 || page.rotation == 270 {
        (raw_height.abs(), raw_width.abs())
    } else {
        (raw_width.abs(), raw_height.abs())
    }
}

fn build_font_map(
    resources: Option<&Dict>,
    resolver: &mut Resolver,
    options: &ExtractionOptions,
    permissive: bool,
) -> Result<HashMap<String, Font>> {
    let mut fonts = HashMap::new();
    let Some(resources) = resources else { return Ok(fonts) };

    let font_dict_obj = match resources.get("Font") {
        Some(Object::Reference(r)) => resolver.resolve(*r)?,
        Some(obj) => obj.clone(),
        None => return Ok(fonts),
    };
    let Some(font_dict) = font_dict_obj.as_dict() else { return Ok(fonts) };

    for (name, entry) in font_dict.iter() {
        let resolved = match entry {
            Object::Reference(r) => resolver.resolve(*r)?,
            other => other.clone(),
        };
        let Some(dict) = resolved.as_dict() else {
            log::warn!("font resource '{name}' is not a dictionary; skipping");
            continue;
        };
        match Font::from_dict(dict, resolver, options) {
            Ok(font) => {
                fonts.insert(name.to_string(), font);
            },
            Err(err) if permissive => {
                log::warn!("failed to build font '{name}': {err}");
            },
            Err(err) => return Err(err),
        }
    }

    Ok(fonts)
}

/// Resolves indirect objects against the xref table, memoizing every resolution and caching each
/// object stream's full contents the first time any of its members is requested.
struct Resolver<'a> {
    bytes: &'a [u8],
    xref: &'a CrossRefTable,
    options: &'a ExtractionOptions,
    object_cache: HashMap<u32, Object>,
    objstm_cache: HashMap<u32, HashMap<u32, Object>>,
}

impl<'a> Resolver<'a> {
    fn new(bytes: &'a [u8], xref: &'a CrossRefTable, options: &'a ExtractionOptions) -> Self {
        Self {
            bytes,
            xref,
            options,
            object_cache: HashMap::new(),
            objstm_cache: HashMap::new(),
        }
    }

    fn resolve(&mut self, reference: Reference) -> Result<Object> {
        if let Some(object) = self.object_cache.get(&reference.number) {
            return Ok(object.clone());
        }

        let entry = *self
            .xref
            .get(reference.number)
            .ok_or(Error::InvalidReference(reference.number, reference.generation))?;

        let object = match entry.entry_type {
            XRefEntryType::Uncompressed => {
                let offset = entry.offset as usize;
                if offset >= self.bytes.len() {
                    return Err(Error::InvalidXrefOffset(entry.offset));
                }
                let (_, object, _) = parse_indirect_object(self.bytes, offset, self.options.max_nesting)?;
                object
            },
            XRefEntryType::Compressed => {
                let container_num = entry.offset as u32;
                if !self.objstm_cache.contains_key(&container_num) {
                    let container = self.resolve(Reference::new(container_num, 0))?;
                    let objects = parse_object_stream(&container, self.options)?;
                    self.objstm_cache.insert(container_num, objects);
                }
                self.objstm_cache
                    .get(&container_num)
                    .and_then(|objects| objects.get(&reference.number))
                    .cloned()
                    .ok_or(Error::InvalidReference(reference.number, reference.generation))?
            },
            XRefEntryType::Free => {
                return Err(Error::InvalidReference(reference.number, reference.generation));
            },
        };

        self.object_cache.insert(reference.number, object.clone());
        Ok(object)
    }
}

impl ObjectResolver for Resolver<'_> {
    fn resolve(&mut self, reference: Reference) -> Result<Object> {
        Resolver::resolve(self, reference)
    }
}
