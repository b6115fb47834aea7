//! Font faces for the page renderer.
//!
//! By default every font token maps to one of the PDF base-14 families, measured
//! with the width tables below, so rendering needs no font files at all. A
//! [`FontConfig`] can map a token onto an installed TrueType family instead; such
//! families are located with `fontdb`, measured with `rusttype` and embedded in
//! the PDF. A configured family that cannot be found is an error, never a silent
//! substitution.
//!
//! Built-in faces encode text as WinAnsi (Latin-1 plus common typographic
//! punctuation) and draw anything else as `?`. Embedded TrueType faces are
//! written as CID fonts and cover whatever the font file covers. Characters a
//! face cannot draw are listed by [`Face::missing_chars`] so the page renderer
//! can report them.

use crate::config::FontConfig;
use crate::error::RenderError;
use crate::templates::FontToken;
use fontdb::{Database, Family, Query, Style, Weight};
use log::{debug, info};
use once_cell::sync::Lazy;
use rusttype::{Font, GlyphId, Scale};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub const ALL: [FontStyle; 4] = [
        FontStyle::Regular,
        FontStyle::Bold,
        FontStyle::Italic,
        FontStyle::BoldItalic,
    ];

    pub fn new(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => FontStyle::Regular,
            (true, false) => FontStyle::Bold,
            (false, true) => FontStyle::Italic,
            (true, true) => FontStyle::BoldItalic,
        }
    }

    fn is_bold(&self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    fn is_italic(&self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }

    fn suffix(&self) -> &'static str {
        match self {
            FontStyle::Regular => "",
            FontStyle::Bold => ",Bold",
            FontStyle::Italic => ",Italic",
            FontStyle::BoldItalic => ",BoldItalic",
        }
    }
}

// -----------------------------------------------------------------------------
// WinAnsi encoding
// -----------------------------------------------------------------------------

/// Unicode code points for WinAnsi bytes 0x80..=0x9F. Zero marks unused slots.
const WIN_ANSI_HIGH: [u32; 32] = [
    0x20AC, 0, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160, 0x2039,
    0x0152, 0, 0x017D, 0, 0, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, 0x02DC,
    0x2122, 0x0161, 0x203A, 0x0153, 0, 0x017E, 0x0178,
];

/// Maps one character onto its WinAnsi byte, if it has one.
pub fn win_ansi_byte(c: char) -> Option<u8> {
    let cp = c as u32;
    match cp {
        0x20..=0x7E | 0xA0..=0xFF => Some(cp as u8),
        _ => WIN_ANSI_HIGH
            .iter()
            .position(|&u| u != 0 && u == cp)
            .map(|i| 0x80 + i as u8),
    }
}

/// The character a WinAnsi byte stands for.
fn win_ansi_char(byte: u8) -> Option<char> {
    match byte {
        0x20..=0x7E | 0xA0..=0xFF => Some(byte as char),
        0x80..=0x9F => {
            let cp = WIN_ANSI_HIGH[(byte - 0x80) as usize];
            if cp == 0 {
                None
            } else {
                char::from_u32(cp)
            }
        }
        _ => None,
    }
}

/// Encodes text for a PDF string drawn with a WinAnsi font.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' | '\n' | '\r' => b' ',
            _ => win_ansi_byte(c).unwrap_or(b'?'),
        })
        .collect()
}

// -----------------------------------------------------------------------------
// Built-in metrics
// -----------------------------------------------------------------------------

/// Advance widths for ASCII 0x20..=0x7E, in thousandths of an em.
type AsciiWidths = [u16; 95];

#[rustfmt::skip]
const HELVETICA: AsciiWidths = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: AsciiWidths = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: AsciiWidths = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: AsciiWidths = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

/// Unaccented letter used to estimate the width of a Latin-1 letter.
fn base_letter(c: char) -> Option<char> {
    Some(match c {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ð' => 'D',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' | 'Ÿ' => 'Y',
        'Š' => 'S',
        'Ž' => 'Z',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'š' => 's',
        'ž' => 'z',
        _ => return None,
    })
}

/// Full 256-entry width table for a base-14 face. Italic variants reuse the
/// upright widths, which differ by a few units at most.
fn builtin_widths(ascii: &AsciiWidths, fixed: Option<u16>) -> Vec<u16> {
    let lookup = |c: char| -> u16 {
        if let Some(w) = fixed {
            return w;
        }
        let em = ascii[('M' as usize) - 0x20];
        match c {
            ' '..='~' => ascii[(c as usize) - 0x20],
            '•' => 350,
            '–' => ascii[('0' as usize) - 0x20],
            '—' | '…' | '‰' | '™' => 1000,
            '‘' | '’' | '‚' => ascii[(',' as usize) - 0x20],
            '“' | '”' | '„' => ascii[('"' as usize) - 0x20],
            'Æ' | 'Œ' => em,
            'æ' | 'œ' => ascii[('m' as usize) - 0x20],
            'ß' => ascii[('b' as usize) - 0x20],
            _ => base_letter(c)
                .map(|b| ascii[(b as usize) - 0x20])
                .unwrap_or(ascii[('n' as usize) - 0x20]),
        }
    };
    (0u16..256)
        .map(|byte| win_ansi_char(byte as u8).map(&lookup).unwrap_or(0))
        .collect()
}

// -----------------------------------------------------------------------------
// Faces
// -----------------------------------------------------------------------------

/// Glyph lookup for an embedded TrueType program.
#[derive(Clone)]
pub struct GlyphTable {
    font: Font<'static>,
    scale: Scale,
}

impl fmt::Debug for GlyphTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphTable")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl GlyphTable {
    /// Glyph id for `c`; zero is `.notdef`.
    pub fn glyph_id(&self, c: char) -> u16 {
        self.font.glyph(c).id().0
    }

    /// Advance of glyph `gid` in thousandths of an em.
    pub fn advance(&self, gid: u16) -> u16 {
        self.font
            .glyph(GlyphId(gid))
            .scaled(self.scale)
            .h_metrics()
            .advance_width
            .round() as u16
    }
}

/// Where a face's glyphs come from, and how its text is encoded.
#[derive(Debug, Clone)]
pub enum FaceSource {
    /// One of the standard PDF fonts, referenced by name and drawn with
    /// single-byte WinAnsi codes. `widths` is indexed by WinAnsi byte.
    Builtin { widths: Vec<u16> },
    /// A TrueType program embedded as a CID font. Text is drawn with two-byte
    /// glyph ids (Identity-H).
    TrueType {
        family: String,
        data: Arc<Vec<u8>>,
        glyphs: GlyphTable,
    },
}

/// A measured face: a PDF font name plus the glyph metrics for its encoding.
#[derive(Debug, Clone)]
pub struct Face {
    pub pdf_name: String,
    pub source: FaceSource,
    /// Ascent and descent in thousandths of an em; descent is negative.
    pub ascent: f32,
    pub descent: f32,
}

/// Layout whitespace collapses to a plain space before encoding.
pub(crate) fn normalize(c: char) -> char {
    match c {
        '\t' | '\n' | '\r' => ' ',
        _ => c,
    }
}

impl Face {
    fn builtin(token: FontToken, style: FontStyle) -> Face {
        let (family, ascent, descent) = match token {
            FontToken::Sans => ("Helvetica", 718.0, -207.0),
            FontToken::Serif => ("Times", 683.0, -217.0),
            FontToken::Mono => ("Courier", 629.0, -157.0),
        };
        let pdf_name = match (token, style) {
            (FontToken::Sans, FontStyle::Regular) => "Helvetica",
            (FontToken::Sans, FontStyle::Bold) => "Helvetica-Bold",
            (FontToken::Sans, FontStyle::Italic) => "Helvetica-Oblique",
            (FontToken::Sans, FontStyle::BoldItalic) => "Helvetica-BoldOblique",
            (FontToken::Serif, FontStyle::Regular) => "Times-Roman",
            (FontToken::Serif, FontStyle::Bold) => "Times-Bold",
            (FontToken::Serif, FontStyle::Italic) => "Times-Italic",
            (FontToken::Serif, FontStyle::BoldItalic) => "Times-BoldItalic",
            (FontToken::Mono, FontStyle::Regular) => "Courier",
            (FontToken::Mono, FontStyle::Bold) => "Courier-Bold",
            (FontToken::Mono, FontStyle::Italic) => "Courier-Oblique",
            (FontToken::Mono, FontStyle::BoldItalic) => "Courier-BoldOblique",
        };
        let widths = match token {
            FontToken::Sans if style.is_bold() => builtin_widths(&HELVETICA_BOLD, None),
            FontToken::Sans => builtin_widths(&HELVETICA, None),
            FontToken::Serif if style.is_bold() => builtin_widths(&TIMES_BOLD, None),
            FontToken::Serif => builtin_widths(&TIMES_ROMAN, None),
            FontToken::Mono => builtin_widths(&HELVETICA, Some(600)),
        };
        debug!("Using built-in face {} for {} text", pdf_name, family);
        Face {
            pdf_name: pdf_name.to_string(),
            source: FaceSource::Builtin { widths },
            ascent,
            descent,
        }
    }

    pub(crate) fn true_type(family: &str, style: FontStyle, data: Vec<u8>) -> Result<Face, RenderError> {
        if data.starts_with(b"ttcf") {
            return Err(RenderError::font(family, "font collections (.ttc) cannot be embedded"));
        }
        if data.starts_with(b"OTTO") {
            return Err(RenderError::font(
                family,
                "CFF-flavoured OpenType fonts cannot be embedded; use a TrueType (.ttf) file",
            ));
        }
        let font = Font::try_from_vec(data.clone())
            .ok_or_else(|| RenderError::font(family, "not a valid TrueType font"))?;
        let upem = font.units_per_em().max(1) as f32;
        let vm = font.v_metrics_unscaled();
        // rusttype scales by ascent - descent; rescale so widths come out per mille of the em.
        let scale = Scale::uniform(1000.0 * (vm.ascent - vm.descent) / upem);
        let pdf_name = format!(
            "{}{}",
            family.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>(),
            style.suffix()
        );
        Ok(Face {
            pdf_name,
            source: FaceSource::TrueType {
                family: family.to_string(),
                data: Arc::new(data),
                glyphs: GlyphTable { font, scale },
            },
            ascent: vm.ascent * 1000.0 / upem,
            descent: vm.descent * 1000.0 / upem,
        })
    }

    /// Whether the face can draw `c`.
    pub fn covers(&self, c: char) -> bool {
        let c = normalize(c);
        match &self.source {
            FaceSource::Builtin { .. } => win_ansi_byte(c).is_some(),
            FaceSource::TrueType { glyphs, .. } => glyphs.glyph_id(c) != 0,
        }
    }

    /// Characters of `text` the face cannot draw, in order of appearance.
    pub fn missing_chars(&self, text: &str) -> Vec<char> {
        let mut missing: Vec<char> = Vec::new();
        for c in text.chars() {
            if !self.covers(c) && !missing.contains(&c) {
                missing.push(c);
            }
        }
        missing
    }

    /// Width of one character in thousandths of an em.
    pub fn char_width(&self, c: char) -> u16 {
        let c = normalize(c);
        match &self.source {
            FaceSource::Builtin { widths } => {
                widths[win_ansi_byte(c).unwrap_or(b'?') as usize]
            }
            FaceSource::TrueType { glyphs, .. } => glyphs.advance(glyphs.glyph_id(c)),
        }
    }

    /// Encodes `text` for a PDF string shown with this face: WinAnsi bytes for
    /// built-in faces, big-endian glyph ids for embedded ones.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match &self.source {
            FaceSource::Builtin { .. } => encode_win_ansi(text),
            FaceSource::TrueType { glyphs, .. } => text
                .chars()
                .flat_map(|c| glyphs.glyph_id(normalize(c)).to_be_bytes())
                .collect(),
        }
    }

    /// Width of `text` at `size` points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 * size / 1000.0
    }

    /// Distance from the top of a line box to the baseline.
    pub fn baseline_offset(&self, size: f32) -> f32 {
        self.ascent * size / 1000.0
    }

    /// Greedy word wrap. Explicit newlines start new lines; a word wider than
    /// `max_width` is broken between characters.
    pub fn wrap(&self, text: &str, size: f32, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let mut line = String::new();
            for word in paragraph.split_whitespace() {
                let candidate = if line.is_empty() {
                    word.to_string()
                } else {
                    format!("{} {}", line, word)
                };
                if self.text_width(&candidate, size) <= max_width {
                    line = candidate;
                    continue;
                }
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                if self.text_width(word, size) <= max_width {
                    line = word.to_string();
                } else {
                    for c in word.chars() {
                        let mut next = line.clone();
                        next.push(c);
                        if !line.is_empty() && self.text_width(&next, size) > max_width {
                            lines.push(std::mem::take(&mut line));
                            line.push(c);
                        } else {
                            line = next;
                        }
                    }
                }
            }
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines
    }
}

// -----------------------------------------------------------------------------
// Loading
// -----------------------------------------------------------------------------

type CacheKey = (String, FontStyle);

/// Process-wide cache of loaded TrueType faces. Entries are never mutated
/// after insertion.
static FACE_CACHE: Lazy<RwLock<HashMap<CacheKey, Arc<Face>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Whether an installed face is the requested style rather than its nearest
/// neighbour. Bold means weight 600 or heavier; oblique counts as italic.
fn face_matches(weight: Weight, face_style: Style, style: FontStyle) -> bool {
    let bold = weight.0 >= Weight::SEMIBOLD.0;
    let italic = matches!(face_style, Style::Italic | Style::Oblique);
    bold == style.is_bold() && italic == style.is_italic()
}

fn style_name(style: FontStyle) -> &'static str {
    match style {
        FontStyle::Regular => "regular",
        FontStyle::Bold => "bold",
        FontStyle::Italic => "italic",
        FontStyle::BoldItalic => "bold italic",
    }
}

fn query_face(
    db: &Database,
    family: &str,
    style: FontStyle,
) -> Result<Vec<u8>, RenderError> {
    let families = [Family::Name(family)];
    let query = Query {
        families: &families,
        weight: if style.is_bold() {
            Weight::BOLD
        } else {
            Weight::NORMAL
        },
        style: if style.is_italic() {
            Style::Italic
        } else {
            Style::Normal
        },
        ..Query::default()
    };
    let id = db.query(&query).ok_or_else(|| {
        RenderError::font(family, "not found in the configured search paths or system fonts")
    })?;
    // `query` answers with the nearest face of the family.
    match db.face(id) {
        Some(info) if face_matches(info.weight, info.style, style) => {}
        _ => {
            return Err(RenderError::font(
                family,
                format!("no {} face installed", style_name(style)),
            ))
        }
    }
    db.with_face_data(id, |data, index| {
        if index != 0 {
            None
        } else {
            Some(data.to_vec())
        }
    })
    .flatten()
    .ok_or_else(|| RenderError::font(family, "font data could not be read"))
}

fn load_true_type_face(
    family: &str,
    style: FontStyle,
    search_paths: &[PathBuf],
) -> Result<Arc<Face>, RenderError> {
    let key = (family.to_lowercase(), style);
    if let Ok(cache) = FACE_CACHE.read() {
        if let Some(face) = cache.get(&key) {
            debug!("Font cache hit for '{}' {:?}", family, style);
            return Ok(Arc::clone(face));
        }
    }
    debug!("Font cache miss for '{}' {:?}", family, style);

    let mut db = Database::new();
    for path in search_paths {
        db.load_fonts_dir(path);
    }
    db.load_system_fonts();

    let data = query_face(&db, family, style)?;
    let face = Arc::new(Face::true_type(family, style, data)?);
    info!("Loaded font '{}' ({:?}) as {}", family, style, face.pdf_name);
    if let Ok(mut cache) = FACE_CACHE.write() {
        cache.entry(key).or_insert_with(|| Arc::clone(&face));
    }
    Ok(face)
}

/// The twelve faces (three tokens, four styles) used by one render.
#[derive(Debug, Clone)]
pub struct FontSet {
    faces: HashMap<(FontToken, FontStyle), Arc<Face>>,
}

impl FontSet {
    /// Base-14 faces for every token.
    pub fn builtin() -> Self {
        let mut faces = HashMap::new();
        for token in [FontToken::Sans, FontToken::Serif, FontToken::Mono] {
            for style in FontStyle::ALL {
                faces.insert((token, style), Arc::new(Face::builtin(token, style)));
            }
        }
        FontSet { faces }
    }

    /// Built-in faces, with configured tokens replaced by TrueType families.
    pub fn load(config: &FontConfig) -> Result<Self, RenderError> {
        let mut set = Self::builtin();
        let configured = [
            (FontToken::Sans, config.sans.as_deref()),
            (FontToken::Serif, config.serif.as_deref()),
            (FontToken::Mono, config.mono.as_deref()),
        ];
        for (token, family) in configured {
            let Some(family) = family else { continue };
            for style in FontStyle::ALL {
                let face = load_true_type_face(family, style, &config.search_paths)?;
                set.faces.insert((token, style), face);
            }
        }
        Ok(set)
    }

    pub fn face(&self, token: FontToken, style: FontStyle) -> &Face {
        // Every (token, style) pair is inserted by `builtin`.
        &self.faces[&(token, style)]
    }

    /// Distinct faces in a stable order, for resource dictionaries.
    pub fn faces(&self) -> Vec<&Face> {
        let mut faces: Vec<&Face> = self.faces.values().map(|f| f.as_ref()).collect();
        faces.sort_by(|a, b| a.pdf_name.cmp(&b.pdf_name));
        faces.dedup_by(|a, b| a.pdf_name == b.pdf_name);
        faces
    }
}
