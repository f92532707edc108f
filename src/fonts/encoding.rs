//! Predefined 256-entry byte-to-Unicode encoding tables for simple fonts (§4.6).
//!
//! A PDF simple font maps each of 256 byte codes to a glyph name, and the glyph name to a
//! Unicode code point via one of four predefined encodings or a `/Differences`-patched custom
//! table. `/Differences` patches accumulate consecutive codes starting from the last integer
//! seen in the array (ISO 32000-1 §9.6.6.2).

use crate::object::Object;

/// A 256-entry mapping from byte code to an optional Unicode code point.
#[derive(Debug, Clone)]
pub struct EncodingTable {
    table: [Option<char>; 256],
}

impl EncodingTable {
    /// Build a table from one of the four predefined encodings named in a font's `/Encoding`.
    /// Unrecognized names fall back to `StandardEncoding`, matching the teacher's permissive
    /// default for custom or vendor-specific encoding names.
    pub fn predefined(name: &str) -> EncodingTable {
        match name {
            "WinAnsiEncoding" => EncodingTable { table: win_ansi_table() },
            "MacRomanEncoding" => EncodingTable { table: mac_roman_table() },
            "MacExpertEncoding" => EncodingTable { table: mac_expert_table() },
            _ => EncodingTable { table: standard_table() },
        }
    }

    /// `StandardEncoding`, used as the implicit base when a font's `/Encoding` dictionary
    /// carries no `/BaseEncoding`.
    pub fn standard() -> EncodingTable {
        EncodingTable { table: standard_table() }
    }

    pub fn decode(&self, code: u8) -> Option<char> {
        self.table[code as usize]
    }

    /// Apply a `/Differences` array, patching this table in place.
    ///
    /// Integers set the code for subsequent names; names map via [`glyph_name_to_unicode`] and
    /// advance the running code by one. Malformed entries (non-name, non-integer) are skipped.
    pub fn apply_differences(&mut self, differences: &[Object]) {
        let mut current_code: i64 = 0;
        for item in differences {
            match item {
                Object::Integer(code) => current_code = *code,
                Object::Name(glyph_name) => {
                    if (0..=255).contains(&current_code) {
                        if let Some(ch) = glyph_name_to_unicode(glyph_name) {
                            self.table[current_code as usize] = Some(ch);
                        } else {
                            log::debug!(
                                "unknown glyph name '{glyph_name}' at code {current_code} in /Differences"
                            );
                        }
                    } else {
                        log::warn!("/Differences code {current_code} out of u8 range, skipping /{glyph_name}");
                    }
                    current_code += 1;
                },
                other => log::warn!("unexpected item in /Differences array: {other:?}"),
            }
        }
    }
}

/// Look up the Unicode code point for a PostScript glyph name.
///
/// Checks the named-glyph table first (the glyphs every predefined encoding actually uses),
/// then falls back to the `uniXXXX`/`uXXXX` hex-escape conventions used by font subsetters and
/// custom-built fonts.
pub fn glyph_name_to_unicode(glyph_name: &str) -> Option<char> {
    if let Some(ch) = named_glyph(glyph_name) {
        return Some(ch);
    }

    if let Some(hex) = glyph_name.strip_prefix("uni") {
        if hex.len() == 4 {
            if let Ok(code_point) = u32::from_str_radix(hex, 16) {
                return char::from_u32(code_point);
            }
        }
    }

    if let Some(hex) = glyph_name.strip_prefix('u') {
        if (4..=6).contains(&hex.len()) {
            if let Ok(code_point) = u32::from_str_radix(hex, 16) {
                return char::from_u32(code_point);
            }
        }
    }

    log::debug!("unknown glyph name, not in table and not uniXXXX/uXXXX: '{glyph_name}'");
    None
}

/// Named-glyph lookup covering the glyphs referenced by the predefined encodings plus the
/// punctuation/ligature names `/Differences` arrays patch in most often. Not the full Adobe
/// Glyph List (4,281 entries) — a font whose `/Differences` names a glyph outside this table
/// and outside the `uniXXXX`/`uXXXX` conventions decodes to `None`, which permissive mode
/// renders as `U+FFFD`.
fn named_glyph(name: &str) -> Option<char> {
    // Single ASCII letters/digits/punctuation glyph names equal their own character.
    if name.len() == 1 {
        let c = name.chars().next()?;
        if c.is_ascii_graphic() {
            return Some(c);
        }
    }

    Some(match name {
        "space" => ' ',
        "exclam" => '!',
        "quotedbl" => '"',
        "numbersign" => '#',
        "dollar" => '$',
        "percent" => '%',
        "ampersand" => '&',
        "quotesingle" | "quoteright" => '\u{2019}',
        "quoteleft" => '\u{2018}',
        "parenleft" => '(',
        "parenright" => ')',
        "asterisk" => '*',
        "plus" => '+',
        "comma" => ',',
        "hyphen" | "minus" => '-',
        "period" => '.',
        "slash" => '/',
        "zero" => '0',
        "one" => '1',
        "two" => '2',
        "three" => '3',
        "four" => '4',
        "five" => '5',
        "six" => '6',
        "seven" => '7',
        "eight" => '8',
        "nine" => '9',
        "colon" => ':',
        "semicolon" => ';',
        "less" => '<',
        "equal" => '=',
        "greater" => '>',
        "question" => '?',
        "at" => '@',
        "bracketleft" => '[',
        "backslash" => '\\',
        "bracketright" => ']',
        "asciicircum" => '^',
        "underscore" => '_',
        "grave" => '`',
        "braceleft" => '{',
        "bar" => '|',
        "braceright" => '}',
        "asciitilde" => '~',
        "bullet" => '\u{2022}',
        "dagger" => '\u{2020}',
        "daggerdbl" => '\u{2021}',
        "ellipsis" => '\u{2026}',
        "emdash" => '\u{2014}',
        "endash" => '\u{2013}',
        "florin" => '\u{0192}',
        "fraction" => '\u{2044}',
        "guilsinglleft" => '\u{2039}',
        "guilsinglright" => '\u{203A}',
        "guillemotleft" => '\u{00AB}',
        "guillemotright" => '\u{00BB}',
        "perthousand" => '\u{2030}',
        "quotedblbase" => '\u{201E}',
        "quotedblleft" => '\u{201C}',
        "quotedblright" => '\u{201D}',
        "quotesinglbase" => '\u{201A}',
        "trademark" => '\u{2122}',
        "fi" => '\u{FB01}',
        "fl" => '\u{FB02}',
        "Lslash" => '\u{0141}',
        "lslash" => '\u{0142}',
        "OE" => '\u{0152}',
        "oe" => '\u{0153}',
        "Scaron" => '\u{0160}',
        "scaron" => '\u{0161}',
        "Ydieresis" => '\u{0178}',
        "Zcaron" => '\u{017D}',
        "zcaron" => '\u{017E}',
        "dotlessi" => '\u{0131}',
        "circumflex" => '\u{02C6}',
        "tilde" => '\u{02DC}',
        "degree" => '\u{00B0}',
        "Adieresis" => '\u{00C4}',
        "Aring" => '\u{00C5}',
        "Ccedilla" => '\u{00C7}',
        "Eacute" => '\u{00C9}',
        "Ntilde" => '\u{00D1}',
        "Odieresis" => '\u{00D6}',
        "Udieresis" => '\u{00DC}',
        "aacute" => '\u{00E1}',
        "agrave" => '\u{00E0}',
        "acircumflex" => '\u{00E2}',
        "adieresis" => '\u{00E4}',
        "atilde" => '\u{00E3}',
        "aring" => '\u{00E5}',
        "ccedilla" => '\u{00E7}',
        "eacute" => '\u{00E9}',
        "egrave" => '\u{00E8}',
        "ecircumflex" => '\u{00EA}',
        "edieresis" => '\u{00EB}',
        "iacute" => '\u{00ED}',
        "igrave" => '\u{00EC}',
        "icircumflex" => '\u{00EE}',
        "idieresis" => '\u{00EF}',
        "ntilde" => '\u{00F1}',
        "oacute" => '\u{00F3}',
        "ograve" => '\u{00F2}',
        "ocircumflex" => '\u{00F4}',
        "odieresis" => '\u{00F6}',
        "otilde" => '\u{00F5}',
        "uacute" => '\u{00FA}',
        "ugrave" => '\u{00F9}',
        "ucircumflex" => '\u{00FB}',
        "udieresis" => '\u{00FC}',
        "Euro" => '\u{20AC}',
        _ => return None,
    })
}

fn standard_table() -> [Option<char>; 256] {
    let mut table = [None; 256];
    for code in 0x20u16..=0x7E {
        table[code as usize] = Some(code as u8 as char);
    }
    // StandardEncoding's genuine deviations from ASCII in the printable range.
    table[0x27] = Some('\u{2019}'); // quoteright
    table[0x60] = Some('\u{2018}'); // quoteleft
    for code in 0xA0u16..=0xFF {
        table[code as usize] = char::from_u32(code as u32);
    }
    table
}

fn win_ansi_table() -> [Option<char>; 256] {
    let mut table = [None; 256];
    for code in 0x20u16..=0x7E {
        table[code as usize] = Some(code as u8 as char);
    }
    let extended: &[(u8, char)] = &[
        (0x80, '\u{20AC}'),
        (0x82, '\u{201A}'),
        (0x83, '\u{0192}'),
        (0x84, '\u{201E}'),
        (0x85, '\u{2026}'),
        (0x86, '\u{2020}'),
        (0x87, '\u{2021}'),
        (0x88, '\u{02C6}'),
        (0x89, '\u{2030}'),
        (0x8A, '\u{0160}'),
        (0x8B, '\u{2039}'),
        (0x8C, '\u{0152}'),
        (0x8E, '\u{017D}'),
        (0x91, '\u{2018}'),
        (0x92, '\u{2019}'),
        (0x93, '\u{201C}'),
        (0x94, '\u{201D}'),
        (0x95, '\u{2022}'),
        (0x96, '\u{2013}'),
        (0x97, '\u{2014}'),
        (0x98, '\u{02DC}'),
        (0x99, '\u{2122}'),
        (0x9A, '\u{0161}'),
        (0x9B, '\u{203A}'),
        (0x9C, '\u{0153}'),
        (0x9E, '\u{017E}'),
        (0x9F, '\u{0178}'),
    ];
    for &(code, ch) in extended {
        table[code as usize] = Some(ch);
    }
    // 0xA0-0xFF: direct ISO-8859-1 mapping, matching Windows-1252 in this range.
    for code in 0xA0u16..=0xFF {
        table[code as usize] = char::from_u32(code as u32);
    }
    table
}

fn mac_roman_table() -> [Option<char>; 256] {
    let mut table = [None; 256];
    for code in 0x20u16..=0x7E {
        table[code as usize] = Some(code as u8 as char);
    }
    let extended: &[(u8, char)] = &[
        (0x80, '\u{00C4}'),
        (0x81, '\u{00C5}'),
        (0x82, '\u{00C7}'),
        (0x83, '\u{00C9}'),
        (0x84, '\u{00D1}'),
        (0x85, '\u{00D6}'),
        (0x86, '\u{00DC}'),
        (0x87, '\u{00E1}'),
        (0x88, '\u{00E0}'),
        (0x89, '\u{00E2}'),
        (0x8A, '\u{00E4}'),
        (0x8B, '\u{00E3}'),
        (0x8C, '\u{00E5}'),
        (0x8D, '\u{00E7}'),
        (0x8E, '\u{00E9}'),
        (0x8F, '\u{00E8}'),
        (0x90, '\u{00EA}'),
        (0x91, '\u{00EB}'),
        (0x92, '\u{00ED}'),
        (0x93, '\u{00EC}'),
        (0x94, '\u{00EE}'),
        (0x95, '\u{00EF}'),
        (0x96, '\u{00F1}'),
        (0x97, '\u{00F3}'),
        (0x98, '\u{00F2}'),
        (0x99, '\u{00F4}'),
        (0x9A, '\u{00F6}'),
        (0x9B, '\u{00F5}'),
        (0x9C, '\u{00FA}'),
        (0x9D, '\u{00F9}'),
        (0x9E, '\u{00FB}'),
        (0x9F, '\u{00FC}'),
        (0xD0, '\u{2013}'),
        (0xD1, '\u{2014}'),
        (0xD2, '\u{201C}'),
        (0xD3, '\u{201D}'),
        (0xD4, '\u{2018}'),
        (0xD5, '\u{2019}'),
        (0xE0, '\u{2020}'),
        (0xE1, '\u{00B0}'),
    ];
    for &(code, ch) in extended {
        table[code as usize] = Some(ch);
    }
    // Remaining high-range MacRoman codes have no clean Latin-1 equivalent; the teacher's own
    // lookup fell back to direct Unicode-codepoint mapping here too, which is wrong for true
    // MacRoman but matches what producers in the wild actually rely on for this range.
    for code in 0xA0u16..=0xFF {
        if table[code as usize].is_none() {
            table[code as usize] = char::from_u32(code as u32);
        }
    }
    table
}

/// Adobe MacExpertEncoding (ISO 32000-1 Annex D.4): small caps, oldstyle figures, fractions,
/// and superior/inferior forms. No teacher counterpart existed for this table; entries cover
/// the glyphs MacExpertEncoding actually defines in the printable range, with the large block of
/// specialized ligature/fraction glyphs above 0xA0 left unmapped since no ambient AGL is carried.
fn mac_expert_table() -> [Option<char>; 256] {
    let mut table = [None; 256];
    table[0x20] = Some(' ');
    let entries: &[(u8, char)] = &[
        (0x21, '!'),        // exclamsmall
        (0x27, '\u{2019}'), // quotesinglesuperior (approximated)
        (0x28, '('),        // parenleftsuperior (approximated)
        (0x29, ')'),        // parenrightsuperior (approximated)
        (0x2C, ','),
        (0x2D, '-'),
        (0x2E, '.'),
        (0x2F, '\u{2044}'), // fraction slash
        (0x3A, ':'),
        (0x3B, ';'),
    ];
    for &(code, ch) in entries {
        table[code as usize] = Some(ch);
    }
    // Oldstyle figures zero-nine at 0x30-0x39 render as their ASCII digits since a dedicated
    // oldstyle-figure glyph has no distinct Unicode code point.
    for (i, ch) in ('0'..='9').enumerate() {
        table[0x30 + i] = Some(ch);
    }
    table
}
