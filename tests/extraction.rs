//! End-to-end extraction tests against hand-built minimal PDFs, covering the documented
//! concrete scenarios: single-page `Tj` extraction, multi-page ordering, `TJ` space-threshold
//! insertion, Identity-H composite font decoding, and `/Prev`-chained incremental updates.

use pdf_extract_core::{Document, ErrorConfig};

/// Builds a minimal single-font, N-page PDF from object bodies the caller supplies (already
/// formatted `<< ... >>` or `<< ... >>\nstream\n...\nendstream` bodies, one per object number
/// starting at 1). Object 1 must be the `/Root` (the Catalog).
fn build_pdf(object_bodies: &[String]) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut offsets = Vec::new();
    buf.extend_from_slice(b"%PDF-1.4\n");

    for (index, body) in object_bodies.iter().enumerate() {
        offsets.push(buf.len());
        let num = index + 1;
        buf.extend_from_slice(format!("{num} 0 obj\n{body}\nendobj\n").as_bytes());
    }

    let xref_offset = buf.len();
    let count = object_bodies.len() + 1;
    buf.extend_from_slice(format!("xref\n0 {count}\n").as_bytes());
    buf.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        buf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    buf.extend_from_slice(format!("trailer\n<< /Size {count} /Root 1 0 R >>\nstartxref\n").as_bytes());
    buf.extend_from_slice(format!("{xref_offset}").as_bytes());
    buf.extend_from_slice(b"\n%%EOF");
    buf
}

fn stream_object(dict_body: &str, content: &str) -> String {
    format!("<< {dict_body} /Length {} >>\nstream\n{content}\nendstream", content.len())
}

/// A document with a single page, a single `/F1` simple font, and the given page content.
fn single_page_pdf(content: &str) -> Vec<u8> {
    build_pdf(&[
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>".to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
        stream_object("", content),
    ])
}

#[test]
fn minimal_single_page_tj_extraction() {
    let bytes = single_page_pdf("BT /F1 12 Tf 100 700 Td (Test123) Tj ET");
    let doc = Document::open(&bytes, ErrorConfig::permissive()).unwrap();
    let mut text = String::new();
    doc.extract_text(0, &mut text).unwrap();
    assert!(text.contains("Test123"));
}

#[test]
fn three_page_document_preserves_page_order() {
    let bytes = build_pdf(&[
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R 4 0 R 5 0 R] /Count 3 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 6 0 R >> >> /Contents 7 0 R >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 6 0 R >> >> /Contents 8 0 R >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 6 0 R >> >> /Contents 9 0 R >>".to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
        stream_object("", "BT /F1 12 Tf (PageA) Tj ET"),
        stream_object("", "BT /F1 12 Tf (PageB) Tj ET"),
        stream_object("", "BT /F1 12 Tf (PageC) Tj ET"),
    ]);

    let doc = Document::open(&bytes, ErrorConfig::permissive()).unwrap();
    assert_eq!(doc.page_count(), 3);

    let mut all = String::new();
    doc.extract_all(&mut all).unwrap();
    let pos_a = all.find("PageA").unwrap();
    let pos_b = all.find("PageB").unwrap();
    let pos_c = all.find("PageC").unwrap();
    assert!(pos_a < pos_b);
    assert!(pos_b < pos_c);
}

#[test]
fn tj_array_inserts_single_space_past_threshold() {
    let bytes = single_page_pdf("BT /F1 12 Tf [(Hello) -200 (World)] TJ ET");
    let doc = Document::open(&bytes, ErrorConfig::permissive()).unwrap();
    let mut text = String::new();
    doc.extract_text(0, &mut text).unwrap();
    assert!(text.contains("Hello World"));
    assert!(!text.contains("Hello  World"));
}

#[test]
fn identity_h_composite_font_decodes_via_tounicode() {
    // CIDs 0x0048 0x0065 0x006C 0x006C 0x006F 0x0020 0x4E2D map identity-wise to
    // 'H' 'e' 'l' 'l' 'o' ' ' '中' through a ToUnicode bfrange.
    let to_unicode_cmap = "\
/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
1 beginbfrange
<0000> <FFFF> <0000>
endbfrange
endcmap
end
end";
    let bytes = build_pdf(&[
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 4 0 R >> >> /Contents 7 0 R >>".to_string(),
        "<< /Type /Font /Subtype /Type0 /BaseFont /Identity-H /Encoding /Identity-H /DescendantFonts [5 0 R] /ToUnicode 6 0 R >>".to_string(),
        "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /Identity-H /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> >>".to_string(),
        stream_object("", to_unicode_cmap),
        stream_object("", "BT /F1 12 Tf <0048 0065006C006C006F 0020 4E2D> Tj ET"),
    ]);

    let doc = Document::open(&bytes, ErrorConfig::permissive()).unwrap();
    let mut text = String::new();
    doc.extract_text(0, &mut text).unwrap();
    assert!(text.contains("Hello"));
    assert!(text.contains('中'));
}

#[test]
fn permissive_mode_substitutes_replacement_character_for_missing_font() {
    let bytes = single_page_pdf("BT /Missing 12 Tf (Hi) Tj ET");
    let doc = Document::open(&bytes, ErrorConfig::permissive()).unwrap();
    let mut text = String::new();
    doc.extract_text(0, &mut text).unwrap();
    assert_eq!(text, "\u{FFFD}\u{FFFD}");
}

#[test]
fn strict_mode_surfaces_font_not_found() {
    let bytes = single_page_pdf("BT /Missing 12 Tf (Hi) Tj ET");
    let doc = Document::open(&bytes, ErrorConfig::strict()).unwrap();
    let mut text = String::new();
    let result = doc.extract_text(0, &mut text);
    assert!(matches!(result, Err(pdf_extract_core::Error::FontNotFound(_))));
}

#[test]
fn incremental_update_prev_chain_prefers_newer_object() {
    // Base section defines object 4 as a content stream showing "Original Text". An appended
    // incremental update redefines object 4 (same number, same generation) with new content,
    // and its xref section chains back via /Prev to the base section.
    let original_content = stream_object("", "BT /F1 12 Tf (Original Text) Tj ET");
    let mut buf = Vec::new();
    let mut offsets = [0usize; 5];
    buf.extend_from_slice(b"%PDF-1.4\n");

    offsets[0] = buf.len();
    buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
    offsets[1] = buf.len();
    buf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");
    offsets[2] = buf.len();
    buf.extend_from_slice(
        b"3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>\nendobj\n",
    );
    offsets[3] = buf.len();
    buf.extend_from_slice(format!("4 0 obj\n{original_content}\nendobj\n").as_bytes());
    offsets[4] = buf.len();
    buf.extend_from_slice(
        b"5 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>\nendobj\n",
    );

    let base_xref_offset = buf.len();
    buf.extend_from_slice(b"xref\n0 6\n");
    buf.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        buf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    buf.extend_from_slice(b"trailer\n<< /Size 6 /Root 1 0 R >>\nstartxref\n");
    buf.extend_from_slice(format!("{base_xref_offset}").as_bytes());
    buf.extend_from_slice(b"\n%%EOF\n");

    // Appended incremental update: a new object 4 with updated content.
    let updated_content = stream_object("", "BT /F1 12 Tf (Updated Text) Tj ET");
    let updated_obj_offset = buf.len();
    buf.extend_from_slice(format!("4 0 obj\n{updated_content}\nendobj\n").as_bytes());

    let update_xref_offset = buf.len();
    buf.extend_from_slice(b"xref\n4 1\n");
    buf.extend_from_slice(format!("{updated_obj_offset:010} 00000 n \n").as_bytes());
    buf.extend_from_slice(format!("trailer\n<< /Size 6 /Root 1 0 R /Prev {base_xref_offset} >>\nstartxref\n").as_bytes());
    buf.extend_from_slice(format!("{update_xref_offset}").as_bytes());
    buf.extend_from_slice(b"\n%%EOF");

    let doc = Document::open(&buf, ErrorConfig::permissive()).unwrap();
    let mut text = String::new();
    doc.extract_text(0, &mut text).unwrap();
    assert!(text.contains("Updated"));
    assert!(!text.contains("Original"));
}

#[test]
fn get_page_info_reports_rotated_dimensions() {
    let bytes = build_pdf(&[
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Rotate 90 /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>".to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
        stream_object("", "BT /F1 12 Tf (Hi) Tj ET"),
    ]);
    let doc = Document::open(&bytes, ErrorConfig::permissive()).unwrap();
    let info = doc.get_page_info(0).unwrap();
    assert_eq!(info.rotation, 90);
    // Width/height swap under a 90-degree rotation.
    assert_eq!(info.width, 792.0);
    assert_eq!(info.height, 612.0);
}
