//! Page canvas: a display list per page, written out as PDF with `lopdf`.
//!
//! The layout code works in points with the origin at the top-left corner of
//! the page; the flip to PDF's bottom-left origin happens only when the
//! content streams are written. Output is deterministic: no creation dates,
//! no random identifiers, resources numbered in a stable order.

use crate::error::RenderError;
use crate::fonts::{normalize, Face, FaceSource, GlyphTable};
use crate::photo::DecodedPhoto;
use crate::templates::Rgb;
use log::debug;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;

/// Bézier control distance for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;

/// One drawing primitive. Coordinates are top-left based.
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Fill {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Outline {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
        line_width: f32,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        color: Rgb,
        width: f32,
    },
    Disc {
        cx: f32,
        cy: f32,
        r: f32,
        color: Rgb,
    },
    Ring {
        cx: f32,
        cy: f32,
        r: f32,
        color: Rgb,
        width: f32,
    },
    /// A single line of text; `y` is the baseline.
    Text {
        x: f32,
        y: f32,
        face: String,
        size: f32,
        color: Rgb,
        text: String,
    },
    /// A raster image clipped to a circle.
    Image {
        image: usize,
        cx: f32,
        cy: f32,
        r: f32,
    },
}

/// Metadata for the PDF Info dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
}

#[derive(Debug)]
pub struct Canvas {
    width: f32,
    height: f32,
    pages: Vec<Vec<Mark>>,
    faces: BTreeMap<String, Face>,
    images: Vec<DecodedPhoto>,
    /// Characters drawn with a face that has no glyph for them.
    missing: Vec<char>,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Canvas {
            width,
            height,
            pages: Vec::new(),
            faces: BTreeMap::new(),
            images: Vec::new(),
            missing: Vec::new(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Appends an empty page and returns its index.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(Vec::new());
        self.pages.len() - 1
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Characters that could not be drawn, in order of first appearance.
    pub fn missing_chars(&self) -> &[char] {
        &self.missing
    }

    pub fn marks(&self, page: usize) -> &[Mark] {
        self.pages.get(page).map(Vec::as_slice).unwrap_or(&[])
    }

    fn push(&mut self, page: usize, mark: Mark) {
        while self.pages.len() <= page {
            self.pages.push(Vec::new());
        }
        self.pages[page].push(mark);
    }

    pub fn fill_rect(&mut self, page: usize, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.push(
            page,
            Mark::Fill {
                x,
                y,
                width,
                height,
                color,
            },
        );
    }

    pub fn outline_rect(
        &mut self,
        page: usize,
        (x, y, width, height): (f32, f32, f32, f32),
        color: Rgb,
        line_width: f32,
    ) {
        self.push(
            page,
            Mark::Outline {
                x,
                y,
                width,
                height,
                color,
                line_width,
            },
        );
    }

    pub fn line(&mut self, page: usize, from: (f32, f32), to: (f32, f32), color: Rgb, width: f32) {
        if width <= 0.0 {
            return;
        }
        self.push(
            page,
            Mark::Line {
                from,
                to,
                color,
                width,
            },
        );
    }

    pub fn disc(&mut self, page: usize, cx: f32, cy: f32, r: f32, color: Rgb) {
        self.push(page, Mark::Disc { cx, cy, r, color });
    }

    pub fn ring(&mut self, page: usize, cx: f32, cy: f32, r: f32, color: Rgb, width: f32) {
        self.push(
            page,
            Mark::Ring {
                cx,
                cy,
                r,
                color,
                width,
            },
        );
    }

    /// Draws one line of text with its baseline at `y`.
    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        page: usize,
        face: &Face,
        size: f32,
        color: Rgb,
        x: f32,
        y: f32,
        text: &str,
    ) {
        if text.trim().is_empty() {
            return;
        }
        for c in face.missing_chars(text) {
            if !self.missing.contains(&c) {
                debug!("Face {} has no glyph for {:?}", face.pdf_name, c);
                self.missing.push(c);
            }
        }
        self.faces
            .entry(face.pdf_name.clone())
            .or_insert_with(|| face.clone());
        self.push(
            page,
            Mark::Text {
                x,
                y,
                face: face.pdf_name.clone(),
                size,
                color,
                text: text.to_string(),
            },
        );
    }

    /// Draws `photo` filling the circle centred on (`cx`, `cy`).
    pub fn image_circle(&mut self, page: usize, photo: DecodedPhoto, cx: f32, cy: f32, r: f32) {
        self.images.push(photo);
        let image = self.images.len() - 1;
        self.push(page, Mark::Image { image, cx, cy, r });
    }

    /// Serializes the canvas into a PDF file.
    pub fn into_pdf(self, info: &DocumentInfo) -> Result<Vec<u8>, RenderError> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut font_names = BTreeMap::new();
        let mut font_dict = Dictionary::new();
        for (i, (pdf_name, face)) in self.faces.iter().enumerate() {
            let resource = format!("F{}", i + 1);
            let font_id = add_font(&mut doc, face, &self.glyphs_used(pdf_name));
            font_dict.set(resource.as_bytes().to_vec(), font_id);
            font_names.insert(pdf_name.clone(), resource);
        }

        let mut xobjects = Dictionary::new();
        for (i, photo) in self.images.iter().enumerate() {
            let image = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => photo.width as i64,
                    "Height" => photo.height as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                },
                photo.rgb.clone(),
            );
            let image_id = doc.add_object(image);
            xobjects.set(format!("Im{}", i + 1).into_bytes(), image_id);
        }

        let resources_id = doc.add_object(dictionary! {
            "Font" => font_dict,
            "XObject" => xobjects,
        });

        let mut kids: Vec<Object> = Vec::new();
        for marks in &self.pages {
            let content = Content {
                operations: self.operations(marks, &font_names),
            };
            let encoded = content
                .encode()
                .map_err(|e| RenderError::serialize("pdf", e.to_string()))?;
            let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), self.width.into(), self.height.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }
        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => text_string(&info.title),
            "Author" => text_string(&info.author),
            "Creator" => text_string("cvforge"),
            "Producer" => text_string("cvforge"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| RenderError::serialize("pdf", e.to_string()))?;
        debug!(
            "Wrote PDF: {} page(s), {} font(s), {} image(s), {} bytes",
            page_count,
            self.faces.len(),
            self.images.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// Glyph ids drawn with the embedded face `pdf_name`, with the character
    /// each one stands for.
    fn glyphs_used(&self, pdf_name: &str) -> BTreeMap<u16, char> {
        let mut used = BTreeMap::new();
        let Some(Face {
            source: FaceSource::TrueType { glyphs, .. },
            ..
        }) = self.faces.get(pdf_name)
        else {
            return used;
        };
        for mark in self.pages.iter().flatten() {
            if let Mark::Text { face, text, .. } = mark {
                if face == pdf_name {
                    for c in text.chars() {
                        let c = normalize(c);
                        used.entry(glyphs.glyph_id(c)).or_insert(c);
                    }
                }
            }
        }
        used
    }

    fn operations(&self, marks: &[Mark], font_names: &BTreeMap<String, String>) -> Vec<Operation> {
        let h = self.height;
        let mut ops = Vec::new();
        for mark in marks {
            match mark {
                Mark::Fill {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => {
                    ops.push(color_op("rg", *color));
                    ops.push(op("re", &[*x, h - y - height, *width, *height]));
                    ops.push(op("f", &[]));
                }
                Mark::Outline {
                    x,
                    y,
                    width,
                    height,
                    color,
                    line_width,
                } => {
                    ops.push(color_op("RG", *color));
                    ops.push(op("w", &[*line_width]));
                    ops.push(op("re", &[*x, h - y - height, *width, *height]));
                    ops.push(op("S", &[]));
                }
                Mark::Line {
                    from,
                    to,
                    color,
                    width,
                } => {
                    ops.push(color_op("RG", *color));
                    ops.push(op("w", &[*width]));
                    ops.push(op("m", &[from.0, h - from.1]));
                    ops.push(op("l", &[to.0, h - to.1]));
                    ops.push(op("S", &[]));
                }
                Mark::Disc { cx, cy, r, color } => {
                    ops.push(color_op("rg", *color));
                    circle_path(&mut ops, *cx, h - cy, *r);
                    ops.push(op("f", &[]));
                }
                Mark::Ring {
                    cx,
                    cy,
                    r,
                    color,
                    width,
                } => {
                    ops.push(color_op("RG", *color));
                    ops.push(op("w", &[*width]));
                    circle_path(&mut ops, *cx, h - cy, *r);
                    ops.push(op("S", &[]));
                }
                Mark::Text {
                    x,
                    y,
                    face,
                    size,
                    color,
                    text,
                } => {
                    let (Some(resource), Some(font)) = (font_names.get(face), self.faces.get(face))
                    else {
                        continue;
                    };
                    let format = match font.source {
                        FaceSource::Builtin { .. } => StringFormat::Literal,
                        FaceSource::TrueType { .. } => StringFormat::Hexadecimal,
                    };
                    ops.push(Operation::new("BT", vec![]));
                    ops.push(Operation::new(
                        "Tf",
                        vec![Object::Name(resource.as_bytes().to_vec()), (*size).into()],
                    ));
                    ops.push(color_op("rg", *color));
                    ops.push(op("Td", &[*x, h - y]));
                    ops.push(Operation::new(
                        "Tj",
                        vec![Object::String(font.encode(text), format)],
                    ));
                    ops.push(Operation::new("ET", vec![]));
                }
                Mark::Image { image, cx, cy, r } => {
                    let d = r * 2.0;
                    ops.push(op("q", &[]));
                    circle_path(&mut ops, *cx, h - cy, *r);
                    ops.push(op("W", &[]));
                    ops.push(op("n", &[]));
                    ops.push(op("cm", &[d, 0.0, 0.0, d, cx - r, h - cy - r]));
                    ops.push(Operation::new(
                        "Do",
                        vec![Object::Name(format!("Im{}", image + 1).into_bytes())],
                    ));
                    ops.push(op("Q", &[]));
                }
            }
        }
        ops
    }
}

fn op(operator: &str, operands: &[f32]) -> Operation {
    Operation::new(operator, operands.iter().map(|v| (*v).into()).collect())
}

fn color_op(operator: &str, color: Rgb) -> Operation {
    op(operator, &color.unit())
}

fn circle_path(ops: &mut Vec<Operation>, cx: f32, cy: f32, r: f32) {
    let k = KAPPA * r;
    ops.push(op("m", &[cx + r, cy]));
    ops.push(op("c", &[cx + r, cy + k, cx + k, cy + r, cx, cy + r]));
    ops.push(op("c", &[cx - k, cy + r, cx - r, cy + k, cx - r, cy]));
    ops.push(op("c", &[cx - r, cy - k, cx - k, cy - r, cx, cy - r]));
    ops.push(op("c", &[cx + k, cy - r, cx + r, cy - k, cx + r, cy]));
}

/// A PDF text string: literal for ASCII, UTF-16BE with a byte order mark
/// otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

fn add_font(doc: &mut Document, face: &Face, used: &BTreeMap<u16, char>) -> ObjectId {
    let base_font = Object::Name(face.pdf_name.as_bytes().to_vec());
    match &face.source {
        FaceSource::Builtin { .. } => doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base_font,
            "Encoding" => "WinAnsiEncoding",
        }),
        FaceSource::TrueType { data, glyphs, .. } => {
            let file_id = doc.add_object(Stream::new(
                dictionary! { "Length1" => data.len() as i64 },
                data.as_ref().clone(),
            ));
            let descriptor_id = doc.add_object(dictionary! {
                "Type" => "FontDescriptor",
                "FontName" => base_font.clone(),
                "Flags" => 4,
                "FontBBox" => vec![
                    0.into(),
                    face.descent.into(),
                    1000.into(),
                    face.ascent.into(),
                ],
                "ItalicAngle" => 0,
                "Ascent" => face.ascent,
                "Descent" => face.descent,
                "CapHeight" => face.ascent,
                "StemV" => 80,
                "FontFile2" => file_id,
            });
            let cid_font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "CIDFontType2",
                "BaseFont" => base_font.clone(),
                "CIDSystemInfo" => dictionary! {
                    "Registry" => Object::string_literal("Adobe"),
                    "Ordering" => Object::string_literal("Identity"),
                    "Supplement" => 0,
                },
                "FontDescriptor" => descriptor_id,
                "DW" => 1000,
                "W" => cid_widths(glyphs, used),
                "CIDToGIDMap" => "Identity",
            });
            let to_unicode_id = doc.add_object(Stream::new(Dictionary::new(), to_unicode_cmap(used)));
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type0",
                "BaseFont" => base_font,
                "Encoding" => "Identity-H",
                "DescendantFonts" => vec![cid_font_id.into()],
                "ToUnicode" => to_unicode_id,
            })
        }
    }
}

/// `W` array for the glyphs in use: `gid [width]` pairs.
fn cid_widths(glyphs: &GlyphTable, used: &BTreeMap<u16, char>) -> Vec<Object> {
    used.keys()
        .flat_map(|&gid| {
            [
                Object::Integer(gid as i64),
                Object::Array(vec![Object::Integer(glyphs.advance(gid) as i64)]),
            ]
        })
        .collect()
}

/// ToUnicode CMap mapping each glyph id back to its character.
fn to_unicode_cmap(used: &BTreeMap<u16, char>) -> Vec<u8> {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );
    let entries: Vec<(&u16, &char)> = used.iter().collect();
    // A bfchar block holds at most 100 entries.
    for chunk in entries.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, c) in chunk {
            let mut units = [0u16; 2];
            let hex: String = c
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{:04X}", u))
                .collect();
            cmap.push_str(&format!("<{:04X}> <{}>\n", gid, hex));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{FontSet, FontStyle};
    use crate::templates::FontToken;

    /// First installed TrueType face that can draw `c`, if any.
    fn system_face_covering(c: char) -> Option<Face> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let found = db.faces().find_map(|info| {
            let data = db
                .with_face_data(info.id, |data, index| (index == 0).then(|| data.to_vec()))
                .flatten()?;
            let face = Face::true_type("Fixture Sans", FontStyle::Regular, data).ok()?;
            face.covers(c).then_some(face)
        });
        found
    }

    fn info() -> DocumentInfo {
        DocumentInfo {
            title: "Modern CV".to_string(),
            author: "Jane Doe".to_string(),
        }
    }

    #[test]
    fn empty_canvas_writes_valid_pdf() {
        let mut canvas = Canvas::new(612.0, 792.0);
        canvas.add_page();
        let bytes = canvas.into_pdf(&info()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn text_is_encoded_and_fonts_registered_once() {
        let fonts = FontSet::builtin();
        let face = fonts.face(FontToken::Sans, FontStyle::Bold);
        let mut canvas = Canvas::new(612.0, 792.0);
        let page = canvas.add_page();
        canvas.text(page, face, 12.0, Rgb::BLACK, 36.0, 50.0, "Café");
        canvas.text(page, face, 12.0, Rgb::BLACK, 36.0, 70.0, "Go");
        canvas.text(page, face, 12.0, Rgb::BLACK, 36.0, 90.0, "   ");
        assert_eq!(canvas.marks(page).len(), 2);

        let bytes = canvas.into_pdf(&info()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let strings: Vec<Vec<u8>> = content
            .operations
            .iter()
            .filter(|o| o.operator == "Tj")
            .filter_map(|o| match &o.operands[0] {
                Object::String(bytes, _) => Some(bytes.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(strings, vec![vec![b'C', b'a', b'f', 0xE9], b"Go".to_vec()]);
        let fonts_used: Vec<_> = content
            .operations
            .iter()
            .filter(|o| o.operator == "Tf")
            .collect();
        assert_eq!(fonts_used.len(), 2);
    }

    #[test]
    fn coordinates_are_flipped() {
        let mut canvas = Canvas::new(100.0, 200.0);
        let page = canvas.add_page();
        canvas.fill_rect(page, 10.0, 20.0, 30.0, 40.0, Rgb::BLACK);
        let ops = canvas.operations(canvas.marks(page), &BTreeMap::new());
        let re = ops.iter().find(|o| o.operator == "re").unwrap();
        let values: Vec<f32> = re.operands.iter().map(|o| o.as_float().unwrap()).collect();
        assert_eq!(values, vec![10.0, 140.0, 30.0, 40.0]);
    }

    #[test]
    fn non_ascii_info_strings_use_utf16() {
        match text_string("Zoë") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(&bytes[..2], &[0xFE, 0xFF]);
                assert_eq!(bytes.len(), 2 + 3 * 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn image_is_clipped_and_embedded() {
        let mut canvas = Canvas::new(612.0, 792.0);
        let page = canvas.add_page();
        let photo = DecodedPhoto {
            width: 2,
            height: 2,
            rgb: vec![255; 12],
        };
        canvas.image_circle(page, photo, 100.0, 100.0, 48.0);
        let ops = canvas.operations(canvas.marks(page), &BTreeMap::new());
        let operators: Vec<&str> = ops.iter().map(|o| o.operator.as_str()).collect();
        assert_eq!(operators[0], "q");
        assert!(operators.contains(&"W"));
        assert!(operators.contains(&"Do"));
        assert_eq!(operators.last(), Some(&"Q"));
        let bytes = canvas.into_pdf(&info()).unwrap();
        assert!(Document::load_mem(&bytes).is_ok());
    }

    #[test]
    fn builtin_faces_record_characters_they_cannot_draw() {
        let fonts = FontSet::builtin();
        let face = fonts.face(FontToken::Serif, FontStyle::Regular);
        let mut canvas = Canvas::new(612.0, 792.0);
        let page = canvas.add_page();
        canvas.text(page, face, 12.0, Rgb::BLACK, 36.0, 50.0, "Анна Łoś");
        canvas.text(page, face, 12.0, Rgb::BLACK, 36.0, 70.0, "Анна");
        assert_eq!(canvas.missing_chars(), &['А', 'н', 'а', 'Ł', 'ś']);
    }

    #[test]
    fn to_unicode_maps_glyphs_back_to_text() {
        let used = BTreeMap::from([(36u16, 'Ж'), (700u16, '😀')]);
        let cmap = String::from_utf8(to_unicode_cmap(&used)).unwrap();
        assert!(cmap.contains("2 beginbfchar"));
        assert!(cmap.contains("<0024> <0416>"));
        assert!(cmap.contains("<02BC> <D83DDE00>"));
        assert!(cmap.trim_end().ends_with("end"));
    }

    #[test]
    fn embedded_faces_are_written_as_cid_fonts() {
        let Some(face) = system_face_covering('Ж') else {
            return;
        };
        let mut canvas = Canvas::new(612.0, 792.0);
        let page = canvas.add_page();
        canvas.text(page, &face, 12.0, Rgb::BLACK, 36.0, 50.0, "Жанна");
        assert!(canvas.missing_chars().is_empty());

        let bytes = canvas.into_pdf(&info()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let type0 = doc
            .objects
            .values()
            .filter_map(|o| o.as_dict().ok())
            .find(|d| d.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Type0".as_slice()))
            .expect("a Type0 font");
        assert_eq!(type0.get(b"Encoding").and_then(Object::as_name).unwrap(), b"Identity-H");
        assert!(type0.get(b"ToUnicode").is_ok());

        let page_id = *doc.get_pages().get(&1).unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let shown = content
            .operations
            .iter()
            .find(|o| o.operator == "Tj")
            .and_then(|o| o.operands[0].as_str().ok())
            .unwrap();
        // Two bytes per glyph, none of them `.notdef`.
        assert_eq!(shown.len(), 10);
        assert!(shown.chunks(2).all(|g| g != [0, 0]));
    }
}
