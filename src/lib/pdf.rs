//! Page renderer: document + tokens to a fixed-size PDF.
//!
//! Layout is a fixed recipe per layout shape. The page is cut into frames
//! (an optional full-width header band, a main column and, for two-column and
//! sidebar templates, a side column) and each frame is filled top to bottom
//! with the sections the [`Recipe`] assigns to it. Text is measured with the
//! face metrics from [`crate::fonts`] and wrapped to the frame width.
//!
//! The page never shrinks or rebalances content. What does not fit is either
//! clipped and reported ([`OverflowPolicy::Report`], the default) or continued
//! on a new page with the same frame geometry ([`OverflowPolicy::Continue`]).
//!
//! Besides the PDF bytes the renderer returns a [`PageLayout`]: every block it
//! placed, with its kind, region and text. It is what tests and hosts use to
//! compare the page with the other renderers without parsing PDF.

use crate::canvas::{Canvas, DocumentInfo};
use crate::config::{OverflowPolicy, RenderConfig};
use crate::error::RenderError;
use crate::fonts::{Face, FontSet, FontStyle};
use crate::labels::Labels;
use crate::model::{CanonicalDocument, EducationEntry, ExperienceEntry, LanguageEntry};
use crate::photo::{self, DecodedPhoto, PhotoAsset};
use crate::recipe::{HeaderPlan, Recipe, Section, SectionBody};
use crate::templates::{
    Alignment, DividerStyle, FontToken, HeaderPlacement, HeadingMarker, LanguagesStyle,
    LayoutShape, Region, Rgb, SectionKind, SidePosition, SkillsStyle, SummaryStyle,
    TemplateStyle,
};
use crate::{output_file_name, OutputFormat, RenderedFile};
use log::{debug, info, warn};

/// Line height as a multiple of the font size.
const LEADING: f32 = 1.35;
/// Gutter between the columns of a two-column layout.
const COLUMN_GAP: f32 = 24.0;
const CALLOUT_FILL: Rgb = Rgb(0xf8, 0xfa, 0xfc);
const PHOTO_RADIUS: f32 = 48.0;
const AVATAR_RADIUS: f32 = 36.0;

/// What a placed block shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Portrait,
    Name,
    Title,
    Contact,
    Rule,
    /// Spans a whole section, heading included.
    Section(SectionKind),
    Heading(SectionKind),
    Summary,
    /// Spans one experience, education or language entry.
    Entry(SectionKind),
    EntryTitle,
    EntryOrganization,
    EntryPeriod,
    EntryDescription,
    SkillTag,
    SkillList,
    LanguageName,
    LanguageLevel,
    LanguageList,
}

/// One block on the page, in top-left based points.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBlock {
    pub page: usize,
    /// `None` for the full-width header band.
    pub region: Option<Region>,
    pub kind: BlockKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub text: String,
}

/// Everything the page renderer placed, in drawing order.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub pages: usize,
    pub blocks: Vec<PlacedBlock>,
}

impl PageLayout {
    pub fn blocks_of(&self, kind: BlockKind) -> impl Iterator<Item = &PlacedBlock> {
        self.blocks.iter().filter(move |b| b.kind == kind)
    }

    pub fn count(&self, kind: BlockKind) -> usize {
        self.blocks_of(kind).count()
    }

    /// Texts of every block of `kind`, in drawing order.
    pub fn texts(&self, kind: BlockKind) -> Vec<&str> {
        self.blocks_of(kind).map(|b| b.text.as_str()).collect()
    }

    /// Sections placed in `region`, in order.
    pub fn sections(&self, region: Region) -> Vec<SectionKind> {
        self.blocks
            .iter()
            .filter(|b| b.region == Some(region))
            .filter_map(|b| match b.kind {
                BlockKind::Section(kind) => Some(kind),
                _ => None,
            })
            .collect()
    }
}

/// A block that did not fit and was clipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Overflow {
    pub page: usize,
    pub region: Option<Region>,
    pub kind: BlockKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageReport {
    pub pages: usize,
    pub overflow: Vec<Overflow>,
    /// Characters the page fonts cannot draw. Built-in faces show them as `?`,
    /// embedded faces as their missing-glyph box.
    pub missing_glyphs: Vec<char>,
}

impl PageReport {
    /// True when every block was placed and every character drawn.
    pub fn is_complete(&self) -> bool {
        self.overflow.is_empty() && self.missing_glyphs.is_empty()
    }
}

/// A rectangle of the page being filled top to bottom.
#[derive(Debug, Clone, Copy)]
struct Frame {
    region: Option<Region>,
    x: f32,
    width: f32,
    /// Where content starts on continuation pages.
    top: f32,
    bottom: f32,
    cursor: f32,
    page: usize,
    /// Set once something was clipped; everything after it is clipped too.
    clipped: bool,
    /// Drawn over a filled background.
    filled: bool,
}

impl Frame {
    fn inset(&self, left: f32, right: f32) -> Frame {
        Frame {
            x: self.x + left,
            width: self.width - left - right,
            ..*self
        }
    }

    fn resume(&mut self, inner: &Frame) {
        self.cursor = inner.cursor;
        self.page = inner.page;
        self.clipped = inner.clipped;
    }
}

#[derive(Debug, Clone, Copy)]
struct Font<'f> {
    face: &'f Face,
    size: f32,
    color: Rgb,
}

impl Font<'_> {
    fn line_height(&self) -> f32 {
        self.size * LEADING
    }

    /// Baseline of a line whose box starts at `top`.
    fn baseline(&self, top: f32) -> f32 {
        top + (self.line_height() - self.size) / 2.0 + self.face.baseline_offset(self.size)
    }
}

fn blend(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

struct PageComposer<'a> {
    style: &'a TemplateStyle,
    fonts: &'a FontSet,
    policy: OverflowPolicy,
    canvas: Canvas,
    /// Background strip repainted on every page: x, width, color.
    side_fill: Option<(f32, f32, Rgb)>,
    portrait: Option<DecodedPhoto>,
    blocks: Vec<PlacedBlock>,
    overflow: Vec<Overflow>,
}

impl<'a> PageComposer<'a> {
    fn face(&self, token: FontToken, style: FontStyle) -> &'a Face {
        let fonts: &'a FontSet = self.fonts;
        fonts.face(token, style)
    }

    fn ensure_page(&mut self, page: usize) {
        while self.canvas.page_count() <= page {
            let index = self.canvas.add_page();
            if let Some((x, width, color)) = self.side_fill {
                let height = self.canvas.height();
                self.canvas.fill_rect(index, x, 0.0, width, height, color);
            }
        }
    }

    /// Makes room for `height` points, breaking the page if the policy allows.
    fn fit(&mut self, frame: &mut Frame, height: f32) -> bool {
        if frame.clipped {
            return false;
        }
        if frame.cursor + height <= frame.bottom + 0.01 {
            return true;
        }
        match self.policy {
            OverflowPolicy::Continue if frame.cursor > frame.top => {
                frame.page += 1;
                frame.cursor = frame.top;
                self.ensure_page(frame.page);
                debug!("Continuing {:?} region on page {}", frame.region, frame.page + 1);
                true
            }
            // Taller than a whole page: draw it and let the page edge cut it.
            OverflowPolicy::Continue => true,
            OverflowPolicy::Report => {
                frame.clipped = true;
                false
            }
        }
    }

    fn report(&mut self, frame: &Frame, kind: BlockKind, text: &str) {
        let excerpt: String = text.chars().take(40).collect();
        warn!(
            "Content does not fit the page: {:?} clipped in {} region on page {} ('{}')",
            kind,
            frame.region.map(|r| r.as_str()).unwrap_or("header"),
            frame.page + 1,
            excerpt
        );
        self.overflow.push(Overflow {
            page: frame.page,
            region: frame.region,
            kind,
            text: text.to_string(),
        });
    }

    fn place(&mut self, frame: &Frame, kind: BlockKind, rect: (f32, f32, f32, f32), text: &str) {
        let (x, y, width, height) = rect;
        self.blocks.push(PlacedBlock {
            page: frame.page,
            region: frame.region,
            kind,
            x,
            y,
            width,
            height,
            text: text.to_string(),
        });
    }

    /// Draws pre-wrapped lines, one per line box, and records them as one block.
    fn place_lines(
        &mut self,
        frame: &mut Frame,
        kind: BlockKind,
        lines: &[String],
        font: Font<'a>,
        alignment: Alignment,
    ) {
        let line_height = font.line_height();
        let mut first: Option<(usize, f32)> = None;
        let mut placed = 0;
        for (i, line) in lines.iter().enumerate() {
            if !self.fit(frame, line_height) {
                self.report(frame, kind, &lines[i..].join(" "));
                break;
            }
            let x = match alignment {
                Alignment::Left => frame.x,
                Alignment::Center => {
                    let width = font.face.text_width(line, font.size);
                    frame.x + ((frame.width - width) / 2.0).max(0.0)
                }
            };
            let baseline = font.baseline(frame.cursor);
            self.canvas
                .text(frame.page, font.face, font.size, font.color, x, baseline, line);
            first.get_or_insert((frame.page, frame.cursor));
            placed += 1;
            frame.cursor += line_height;
        }
        if let Some((page, y)) = first {
            self.blocks.push(PlacedBlock {
                page,
                region: frame.region,
                kind,
                x: frame.x,
                y,
                width: frame.width,
                height: line_height * placed as f32,
                text: lines[..placed].join(" "),
            });
        }
    }

    fn paragraph(
        &mut self,
        frame: &mut Frame,
        kind: BlockKind,
        text: &str,
        font: Font<'a>,
        alignment: Alignment,
    ) {
        let lines = font.face.wrap(text, font.size, frame.width);
        self.place_lines(frame, kind, &lines, font, alignment);
    }

    fn text_color(&self, frame: &Frame) -> Rgb {
        match frame.region {
            Some(Region::Side) => self.style.palette.side_text,
            _ => self.style.palette.text,
        }
    }

    fn body_font(&self, frame: &Frame) -> Font<'a> {
        Font {
            face: self.face(self.style.primary_font, FontStyle::Regular),
            size: self.style.scale.body,
            color: self.text_color(frame),
        }
    }

    // -------------------------------------------------------------------------
    // Header
    // -------------------------------------------------------------------------

    fn render_header(&mut self, frame: &mut Frame, plan: &HeaderPlan<'_>) {
        let style = self.style;
        let header = &style.header;
        let scale = &style.scale;
        if header.portrait {
            self.render_portrait(frame, plan.name);
        }
        let name_font = Font {
            face: self.face(header.name_font, FontStyle::Bold),
            size: scale.name,
            color: header.name_color,
        };
        self.paragraph(
            frame,
            BlockKind::Name,
            &header.name_case.apply(plan.name),
            name_font,
            header.alignment,
        );
        if let Some(title) = plan.title {
            frame.cursor += scale.body * 0.4;
            let title_font = Font {
                face: self.face(header.title_font, FontStyle::Regular),
                size: scale.title,
                color: header.title_color,
            };
            self.paragraph(
                frame,
                BlockKind::Title,
                &header.title_case.apply(title),
                title_font,
                header.alignment,
            );
        }
        if !plan.contact.is_empty() {
            frame.cursor += scale.body * 0.6;
            let contact_font = Font {
                face: self.face(style.primary_font, FontStyle::Regular),
                size: scale.small,
                color: style.palette.muted,
            };
            let line = plan.contact.join(style.inline_separator);
            self.paragraph(frame, BlockKind::Contact, &line, contact_font, header.alignment);
        }
        if let Some(rule) = header.rule {
            frame.cursor += scale.body * 1.2;
            if self.fit(frame, rule.width) {
                let y = frame.cursor + rule.width / 2.0;
                self.canvas.line(
                    frame.page,
                    (frame.x, y),
                    (frame.x + frame.width, y),
                    rule.color,
                    rule.width,
                );
                let rect = (frame.x, frame.cursor, frame.width, rule.width);
                self.place(frame, BlockKind::Rule, rect, "");
                frame.cursor += rule.width;
            }
        }
        frame.cursor += scale.heading * 1.5;
    }

    fn render_portrait(&mut self, frame: &mut Frame, name: &str) {
        let style = self.style;
        let radius = if self.portrait.is_some() {
            PHOTO_RADIUS
        } else {
            AVATAR_RADIUS
        };
        let block_height = radius * 2.0 + 18.0;
        if !self.fit(frame, block_height) {
            self.report(frame, BlockKind::Portrait, name);
            return;
        }
        let cx = match style.header.alignment {
            Alignment::Left => frame.x + radius,
            Alignment::Center => frame.x + frame.width / 2.0,
        };
        let cy = frame.cursor + radius;
        let rect = (cx - radius, frame.cursor, radius * 2.0, radius * 2.0);
        match self.portrait.take() {
            Some(photo) => {
                debug!("Drawing {}x{} portrait", photo.width, photo.height);
                self.canvas.image_circle(frame.page, photo, cx, cy, radius);
                self.canvas.ring(frame.page, cx, cy, radius, style.accent, 3.0);
                self.place(frame, BlockKind::Portrait, rect, "");
            }
            None => {
                let initial = photo::initial(name);
                let font = Font {
                    face: self.face(FontToken::Sans, FontStyle::Bold),
                    size: 24.0,
                    color: blend(style.accent, Rgb::WHITE, 0.5),
                };
                self.canvas.disc(frame.page, cx, cy, radius, style.accent);
                let width = font.face.text_width(&initial, font.size);
                // Optically centred on the cap height.
                let baseline = cy + font.face.baseline_offset(font.size) * 0.5;
                self.canvas.text(
                    frame.page,
                    font.face,
                    font.size,
                    font.color,
                    cx - width / 2.0,
                    baseline,
                    &initial,
                );
                self.place(frame, BlockKind::Portrait, rect, &initial);
            }
        }
        frame.cursor += block_height;
    }

    // -------------------------------------------------------------------------
    // Sections
    // -------------------------------------------------------------------------

    fn render_heading(&mut self, frame: &mut Frame, kind: SectionKind, label: &str) {
        let style = self.style;
        let (size, color) = match frame.region {
            Some(Region::Side) => (style.scale.side_heading, style.palette.side_heading),
            _ => (style.scale.heading, style.palette.heading),
        };
        let font = Font {
            face: self.face(style.heading_font, FontStyle::Bold),
            size,
            color,
        };
        let text = style.heading_case.apply(label);
        let marker = style.heading_marker == HeadingMarker::AccentDot && !frame.filled;
        let indent = if marker { 12.0 } else { 0.0 };
        let lines = font.face.wrap(&text, size, frame.width - indent);
        // Keep the heading together with the first line below it.
        let needed = font.line_height() * lines.len() as f32 + style.scale.body * LEADING;
        if !self.fit(frame, needed) {
            self.report(frame, BlockKind::Heading(kind), &text);
            return;
        }
        if marker {
            let cy = frame.cursor + font.line_height() / 2.0;
            self.canvas
                .disc(frame.page, frame.x + 3.0, cy, 3.0, style.accent);
        }
        let mut inner = frame.inset(indent, 0.0);
        self.place_lines(&mut inner, BlockKind::Heading(kind), &lines, font, style.heading_alignment);
        frame.resume(&inner);
        if style.divider == DividerStyle::Bordered {
            let y = frame.cursor + size * 0.15;
            self.canvas.line(
                frame.page,
                (frame.x, y),
                (frame.x + frame.width, y),
                style.divider_color,
                style.divider_width,
            );
            frame.cursor += size * 0.3 + style.divider_width;
        }
        frame.cursor += size * 0.6;
    }

    fn render_section(&mut self, frame: &mut Frame, section: &Section<'_>) {
        let index = self.blocks.len();
        let start = (frame.page, frame.cursor);
        if let Some(label) = &section.heading {
            self.render_heading(frame, section.kind, label);
        }
        match &section.body {
            SectionBody::Contact(items) => self.render_contact(frame, items),
            SectionBody::Summary(text) => self.render_summary(frame, text),
            SectionBody::Experience(entries) => {
                for entry in entries.iter() {
                    self.render_experience(frame, entry);
                }
            }
            SectionBody::Education(entries) => {
                for entry in entries.iter() {
                    self.render_education(frame, entry);
                }
            }
            SectionBody::Skills(skills) => self.render_skills(frame, skills),
            SectionBody::Languages(entries) => self.render_languages(frame, entries),
        }
        self.wrap_blocks(frame, index, start, BlockKind::Section(section.kind), "");
        frame.cursor += self.style.scale.heading * 1.2;
    }

    /// Inserts a block spanning everything placed since `index`.
    fn wrap_blocks(
        &mut self,
        frame: &Frame,
        index: usize,
        start: (usize, f32),
        kind: BlockKind,
        text: &str,
    ) {
        let (page, y) = self
            .blocks
            .get(index)
            .map(|b| (b.page, b.y))
            .unwrap_or(start);
        if self.blocks.len() == index && frame.clipped {
            return;
        }
        let height = if page == frame.page {
            (frame.cursor - y).max(0.0)
        } else {
            frame.bottom - y
        };
        self.blocks.insert(
            index,
            PlacedBlock {
                page,
                region: frame.region,
                kind,
                x: frame.x,
                y,
                width: frame.width,
                height,
                text: text.to_string(),
            },
        );
    }

    fn render_contact(&mut self, frame: &mut Frame, items: &[&str]) {
        let font = Font {
            size: self.style.scale.small,
            ..self.body_font(frame)
        };
        for item in items {
            self.paragraph(frame, BlockKind::Contact, item, font, Alignment::Left);
            frame.cursor += 4.0;
        }
    }

    fn render_summary(&mut self, frame: &mut Frame, text: &str) {
        let style = self.style;
        let font = self.body_font(frame);
        match style.summary {
            SummaryStyle::Titled => {
                self.paragraph(frame, BlockKind::Summary, text, font, Alignment::Left)
            }
            SummaryStyle::Callout => {
                let (bar, pad) = (3.0, 10.0);
                let lines = font.face.wrap(text, font.size, frame.width - bar - pad * 2.0);
                let height = font.line_height() * lines.len() as f32 + pad * 2.0;
                if !self.fit(frame, height) {
                    self.report(frame, BlockKind::Summary, text);
                    return;
                }
                self.canvas
                    .fill_rect(frame.page, frame.x, frame.cursor, frame.width, height, CALLOUT_FILL);
                self.canvas
                    .fill_rect(frame.page, frame.x, frame.cursor, bar, height, style.accent);
                let mut inner = frame.inset(bar + pad, pad);
                inner.cursor += pad;
                self.place_lines(&mut inner, BlockKind::Summary, &lines, font, Alignment::Left);
                frame.resume(&inner);
                frame.cursor += pad;
            }
            SummaryStyle::Quote => {
                let italic = Font {
                    face: self.face(style.primary_font, FontStyle::Italic),
                    ..font
                };
                let quoted = format!("\u{201c}{}\u{201d}", text);
                self.paragraph(frame, BlockKind::Summary, &quoted, italic, Alignment::Center);
            }
        }
    }

    /// Title on the left, period right-aligned on the first line.
    fn render_entry_header(&mut self, frame: &mut Frame, title: &str, period: &str, marker: bool) {
        let style = self.style;
        let (title, period) = (title.trim(), period.trim());
        if title.is_empty() && period.is_empty() {
            return;
        }
        let title_font = Font {
            face: self.face(style.entry_font, FontStyle::Bold),
            size: style.scale.entry_title,
            color: if frame.filled {
                style.palette.side_text
            } else {
                style.palette.heading
            },
        };
        let period_font = Font {
            face: self.face(style.detail_font, FontStyle::Regular),
            size: style.scale.small,
            color: style.palette.muted,
        };
        let period_width = period_font.face.text_width(period, period_font.size);
        let beside = period_width + 8.0 <= frame.width * 0.5;
        let title_width = if beside && !period.is_empty() {
            frame.width - period_width - 8.0
        } else {
            frame.width
        };
        let lines = title_font.face.wrap(title, title_font.size, title_width);

        let row_height = title_font.line_height();
        if !self.fit(frame, row_height) {
            self.report(frame, BlockKind::EntryTitle, title);
            return;
        }
        if marker {
            let radius = 3.5;
            self.canvas.disc(
                frame.page,
                frame.x - 14.0 + radius,
                frame.cursor + row_height / 2.0,
                radius,
                style.accent,
            );
        }
        if beside && !period.is_empty() {
            let x = frame.x + frame.width - period_width;
            let baseline = title_font.baseline(frame.cursor);
            self.canvas.text(
                frame.page,
                period_font.face,
                period_font.size,
                period_font.color,
                x,
                baseline,
                period,
            );
            let rect = (x, frame.cursor, period_width, row_height);
            self.place(frame, BlockKind::EntryPeriod, rect, period);
        }
        if lines.is_empty() {
            frame.cursor += row_height;
        } else {
            self.place_lines(frame, BlockKind::EntryTitle, &lines, title_font, Alignment::Left);
        }
        if !beside && !period.is_empty() {
            self.paragraph(frame, BlockKind::EntryPeriod, period, period_font, Alignment::Left);
        }
    }

    fn render_experience(&mut self, frame: &mut Frame, entry: &ExperienceEntry) {
        let style = self.style;
        let index = self.blocks.len();
        let start = (frame.page, frame.cursor);
        let indent = if style.entry_marker { 14.0 } else { 0.0 };
        let mut inner = frame.inset(indent, 0.0);
        self.render_entry_header(&mut inner, &entry.role, &entry.period, style.entry_marker);

        let company = entry.company.trim();
        if !company.is_empty() {
            inner.cursor += 2.0;
            let font = Font {
                face: self.face(
                    style.primary_font,
                    FontStyle::new(true, style.company_italic),
                ),
                size: style.scale.body,
                color: if style.company_accent {
                    style.accent
                } else {
                    self.text_color(frame)
                },
            };
            self.paragraph(&mut inner, BlockKind::EntryOrganization, company, font, Alignment::Left);
        }
        let description = entry.description.trim();
        if !description.is_empty() {
            inner.cursor += 2.0;
            let font = self.body_font(frame);
            self.paragraph(&mut inner, BlockKind::EntryDescription, description, font, Alignment::Left);
        }
        frame.resume(&inner);
        self.wrap_blocks(frame, index, start, BlockKind::Entry(SectionKind::Experience), &entry.role);
        frame.cursor += style.scale.body * 1.4;
    }

    fn render_education(&mut self, frame: &mut Frame, entry: &EducationEntry) {
        let style = self.style;
        let index = self.blocks.len();
        let start = (frame.page, frame.cursor);
        self.render_entry_header(frame, &entry.school, &entry.period, false);
        let degree = entry.degree.trim();
        if !degree.is_empty() {
            frame.cursor += 2.0;
            let font = Font {
                face: self.face(style.primary_font, FontStyle::new(false, style.company_italic)),
                ..self.body_font(frame)
            };
            self.paragraph(frame, BlockKind::EntryOrganization, degree, font, Alignment::Left);
        }
        self.wrap_blocks(frame, index, start, BlockKind::Entry(SectionKind::Education), &entry.school);
        frame.cursor += style.scale.body;
    }

    fn render_skills(&mut self, frame: &mut Frame, skills: &[&str]) {
        let style = self.style;
        match style.skills {
            SkillsStyle::Inline => {
                let line = skills.join(style.inline_separator);
                let font = self.body_font(frame);
                self.paragraph(frame, BlockKind::SkillList, &line, font, Alignment::Left);
            }
            SkillsStyle::Tags => {
                let font = Font {
                    face: self.face(style.detail_font, FontStyle::Regular),
                    size: style.scale.small,
                    color: style.palette.tag_text,
                };
                let (pad_x, pad_y, gap) = (6.0, 2.0, 5.0);
                let tag_height = font.line_height() + pad_y * 2.0;
                let right = frame.x + frame.width;
                let mut x = frame.x;
                let mut row_open = false;
                for (i, skill) in skills.iter().enumerate() {
                    let width = (font.face.text_width(skill, font.size) + pad_x * 2.0).min(frame.width);
                    if row_open && x + width > right {
                        frame.cursor += tag_height + gap;
                        x = frame.x;
                        row_open = false;
                    }
                    if !row_open {
                        if !self.fit(frame, tag_height) {
                            self.report(frame, BlockKind::SkillTag, &skills[i..].join(", "));
                            return;
                        }
                        row_open = true;
                    }
                    let rect = (x, frame.cursor, width, tag_height);
                    if let Some(background) = style.palette.tag_background {
                        self.canvas
                            .fill_rect(frame.page, x, frame.cursor, width, tag_height, background);
                    }
                    if let Some(border) = style.palette.tag_border {
                        self.canvas.outline_rect(frame.page, rect, border, 0.75);
                    }
                    let baseline = font.baseline(frame.cursor + pad_y);
                    self.canvas.text(
                        frame.page,
                        font.face,
                        font.size,
                        font.color,
                        x + pad_x,
                        baseline,
                        skill,
                    );
                    self.place(frame, BlockKind::SkillTag, rect, skill);
                    x += width + gap;
                }
                if row_open {
                    frame.cursor += tag_height;
                }
            }
        }
    }

    fn render_languages(&mut self, frame: &mut Frame, entries: &[LanguageEntry]) {
        let style = self.style;
        match style.languages {
            LanguagesStyle::Inline => {
                let line = entries
                    .iter()
                    .map(|e| match e.level.trim() {
                        "" => e.language.trim().to_string(),
                        level => format!("{} ({})", e.language.trim(), level),
                    })
                    .collect::<Vec<_>>()
                    .join(style.inline_separator);
                let font = self.body_font(frame);
                self.paragraph(frame, BlockKind::LanguageList, &line, font, Alignment::Left);
            }
            LanguagesStyle::Stacked => {
                for entry in entries {
                    let index = self.blocks.len();
                    let start = (frame.page, frame.cursor);
                    let name_font = Font {
                        face: self.face(style.entry_font, FontStyle::Bold),
                        ..self.body_font(frame)
                    };
                    self.paragraph(frame, BlockKind::LanguageName, &entry.language, name_font, Alignment::Left);
                    if !entry.level.trim().is_empty() {
                        let level_font = Font {
                            face: self.face(style.primary_font, FontStyle::Regular),
                            size: style.scale.small,
                            color: style.palette.muted,
                        };
                        self.paragraph(frame, BlockKind::LanguageLevel, entry.level.trim(), level_font, Alignment::Left);
                    }
                    self.wrap_blocks(
                        frame,
                        index,
                        start,
                        BlockKind::Entry(SectionKind::Languages),
                        &entry.language,
                    );
                    frame.cursor += 5.0;
                }
            }
        }
    }

    fn render_region(&mut self, frame: &mut Frame, sections: &[Section<'_>]) {
        for section in sections {
            self.render_section(frame, section);
        }
    }
}

struct Composition {
    canvas: Canvas,
    layout: PageLayout,
    report: PageReport,
}

fn compose(
    recipe: &Recipe<'_>,
    style: &TemplateStyle,
    fonts: &FontSet,
    portrait: Option<DecodedPhoto>,
    config: &RenderConfig,
) -> Composition {
    let (width, height) = config.page.size.dimensions();
    let pad = style.padding;
    let frame = |region, x: f32, frame_width: f32, filled| Frame {
        region,
        x,
        width: frame_width,
        top: pad,
        bottom: height - pad,
        cursor: pad,
        page: 0,
        clipped: false,
        filled,
    };
    let filled = style.palette.side_background.is_some();

    // Column geometry, and the strip painted behind the side region.
    let (mut main, mut side, side_fill) = match style.layout {
        LayoutShape::SingleColumn => (frame(Some(Region::Main), pad, width - pad * 2.0, false), None, None),
        LayoutShape::TwoColumn => {
            let inner = width - pad * 2.0 - COLUMN_GAP;
            let side_width = inner * style.side_fraction;
            let main_width = inner - side_width;
            let (main_x, side_x) = match style.side_position {
                SidePosition::Right => (pad, pad + main_width + COLUMN_GAP),
                SidePosition::Left => (pad + side_width + COLUMN_GAP, pad),
            };
            let fill = style.palette.side_background.map(|color| {
                (side_x - COLUMN_GAP / 2.0, side_width + COLUMN_GAP, color)
            });
            (
                frame(Some(Region::Main), main_x, main_width, false),
                Some(frame(Some(Region::Side), side_x, side_width, filled)),
                fill,
            )
        }
        LayoutShape::SidebarMain => {
            let strip = width * style.side_fraction;
            let (strip_x, main_x) = match style.side_position {
                SidePosition::Left => (0.0, strip),
                SidePosition::Right => (width - strip, 0.0),
            };
            let fill = style.palette.side_background.map(|color| (strip_x, strip, color));
            (
                frame(Some(Region::Main), main_x + pad, width - strip - pad * 2.0, false),
                Some(frame(Some(Region::Side), strip_x + pad, strip - pad * 2.0, filled)),
                fill,
            )
        }
    };

    let mut composer = PageComposer {
        style,
        fonts,
        policy: config.page.overflow,
        canvas: Canvas::new(width, height),
        side_fill,
        portrait,
        blocks: Vec::new(),
        overflow: Vec::new(),
    };
    composer.ensure_page(0);

    match style.header.placement {
        HeaderPlacement::Top => {
            let mut band = frame(None, pad, width - pad * 2.0, false);
            composer.render_header(&mut band, &recipe.header);
            for column in std::iter::once(&mut main).chain(side.as_mut()) {
                column.cursor = band.cursor;
                column.page = band.page;
                column.clipped = band.clipped;
            }
        }
        HeaderPlacement::Main => composer.render_header(&mut main, &recipe.header),
        HeaderPlacement::Side => match side.as_mut() {
            Some(side) => composer.render_header(side, &recipe.header),
            None => composer.render_header(&mut main, &recipe.header),
        },
    }

    composer.render_region(&mut main, &recipe.main);
    if let Some(side) = side.as_mut() {
        composer.render_region(side, &recipe.side);
    }

    let pages = composer.canvas.page_count();
    let missing_glyphs = composer.canvas.missing_chars().to_vec();
    if !missing_glyphs.is_empty() {
        let listed: String = missing_glyphs.iter().collect();
        warn!(
            "{} character(s) have no glyph in the page fonts: {}; map the font tokens to a TrueType family that covers them",
            missing_glyphs.len(),
            listed
        );
    }
    if !composer.overflow.is_empty() {
        warn!(
            "{} block(s) did not fit the {} page; set page.overflow = \"continue\" to paginate",
            composer.overflow.len(),
            style.display_name
        );
    }
    Composition {
        layout: PageLayout {
            width,
            height,
            pages,
            blocks: composer.blocks,
        },
        report: PageReport {
            pages,
            overflow: composer.overflow,
            missing_glyphs,
        },
        canvas: composer.canvas,
    }
}

fn prepare(
    doc: &CanonicalDocument,
    style: &TemplateStyle,
    labels: &Labels,
    photo: Option<&PhotoAsset>,
    config: &RenderConfig,
) -> Result<Composition, RenderError> {
    let fonts = FontSet::load(&config.fonts)?;
    let portrait = match photo {
        Some(photo) if style.header.portrait => Some(photo.decode()?),
        Some(_) => {
            debug!("Template {} has no portrait slot; photo ignored", style.id);
            None
        }
        None => None,
    };
    let recipe = Recipe::build(doc, style, labels);
    Ok(compose(&recipe, style, &fonts, portrait, config))
}

/// Lays the document out without writing PDF bytes.
pub fn layout(
    doc: &CanonicalDocument,
    style: &TemplateStyle,
    labels: &Labels,
    photo: Option<&PhotoAsset>,
    config: &RenderConfig,
) -> Result<(PageLayout, PageReport), RenderError> {
    let composition = prepare(doc, style, labels, photo, config)?;
    Ok((composition.layout, composition.report))
}

/// Renders the document to PDF.
///
/// Fails with [`RenderError::AssetLoad`] when a configured font family or the
/// portrait photo cannot be loaded.
pub fn render(
    doc: &CanonicalDocument,
    style: &TemplateStyle,
    labels: &Labels,
    photo: Option<&PhotoAsset>,
    config: &RenderConfig,
) -> Result<(RenderedFile, PageReport), RenderError> {
    let composition = prepare(doc, style, labels, photo, config)?;
    let name = doc.personal_info.name.trim();
    let info = DocumentInfo {
        title: style.document_title.to_string(),
        author: name.to_string(),
    };
    let bytes = composition.canvas.into_pdf(&info)?;
    info!(
        "Rendered {} PDF for '{}': {} page(s), {} bytes",
        style.display_name,
        name,
        composition.report.pages,
        bytes.len()
    );
    Ok((
        RenderedFile {
            file_name: output_file_name(name, OutputFormat::Page),
            bytes,
            media_type: OutputFormat::Page.media_type(),
        },
        composition.report,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Mark;
    use crate::config::PageConfig;
    use crate::labels::LabelKey;
    use crate::model::TemplateId;
    use crate::templates;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn jane() -> CanonicalDocument {
        let mut doc = CanonicalDocument::new("Jane Doe");
        doc.personal_info.title = "Engineer".to_string();
        doc.skills = vec!["Go".to_string()];
        doc
    }

    fn full() -> CanonicalDocument {
        let mut doc = jane();
        doc.personal_info.email = "jane@example.com".to_string();
        doc.personal_info.summary = "Builds reliable systems.".to_string();
        doc.experience = vec![
            ExperienceEntry {
                role: "Staff Engineer".to_string(),
                company: "Acme".to_string(),
                period: "2020 - Present".to_string(),
                description: "Led the platform team.".to_string(),
                ..ExperienceEntry::default()
            },
            ExperienceEntry {
                role: "Engineer".to_string(),
                company: "Initech".to_string(),
                period: "2016 - 2020".to_string(),
                ..ExperienceEntry::default()
            },
        ];
        doc.education = vec![EducationEntry {
            school: "State University".to_string(),
            degree: "BSc Computer Science".to_string(),
            period: "2012 - 2016".to_string(),
            ..EducationEntry::default()
        }];
        doc.languages = vec![LanguageEntry {
            language: "English".to_string(),
            level: "Native".to_string(),
            ..LanguageEntry::default()
        }];
        doc
    }

    fn lay_out(doc: &CanonicalDocument, id: TemplateId) -> (PageLayout, PageReport) {
        layout(doc, templates::style(id), &Labels::new(), None, &RenderConfig::default()).unwrap()
    }

    fn png() -> PhotoAsset {
        let img = RgbImage::from_pixel(16, 16, image::Rgb([10, 120, 200]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        PhotoAsset::from_bytes(out.into_inner()).unwrap()
    }

    #[test]
    fn modern_scenario_has_single_skill_tag() {
        let (layout, report) = lay_out(&jane(), TemplateId::Modern);
        assert!(report.is_complete());
        assert_eq!(report.pages, 1);
        assert_eq!(layout.texts(BlockKind::SkillTag), vec!["Go"]);
        assert_eq!(layout.sections(Region::Side), vec![SectionKind::Skills]);
        assert!(layout.sections(Region::Main).is_empty());
        assert_eq!(layout.texts(BlockKind::Name), vec!["JANE DOE"]);
        assert_eq!(layout.count(BlockKind::Entry(SectionKind::Experience)), 0);
    }

    #[test]
    fn two_column_side_region_sits_right_of_main() {
        let (layout, _) = lay_out(&full(), TemplateId::Modern);
        let main = layout.blocks_of(BlockKind::Section(SectionKind::Experience)).next().unwrap();
        let side = layout.blocks_of(BlockKind::Section(SectionKind::Skills)).next().unwrap();
        assert!(side.x > main.x + main.width);
        let name = layout.blocks_of(BlockKind::Name).next().unwrap();
        assert_eq!(name.region, None);
        assert!(main.y > name.y);
    }

    #[test]
    fn entries_follow_document_order() {
        for id in TemplateId::ALL {
            let (layout, _) = lay_out(&full(), id);
            let roles: Vec<_> = layout
                .blocks_of(BlockKind::Entry(SectionKind::Experience))
                .map(|b| b.text.as_str())
                .collect();
            assert_eq!(roles, vec!["Staff Engineer", "Engineer"], "{}", id);
        }
    }

    #[test]
    fn headings_apply_case_and_label_defaults() {
        let (layout, _) = lay_out(&full(), TemplateId::Classic);
        assert!(layout
            .texts(BlockKind::Heading(SectionKind::Experience))
            .contains(&"PROFESSIONAL EXPERIENCE"));
        let labels = Labels::new().with(LabelKey::Experience, "Berufserfahrung");
        let (layout, _) = layout_with(&full(), TemplateId::Modern, &labels);
        assert_eq!(
            layout.texts(BlockKind::Heading(SectionKind::Experience)),
            vec!["Berufserfahrung"]
        );
    }

    fn layout_with(doc: &CanonicalDocument, id: TemplateId, labels: &Labels) -> (PageLayout, PageReport) {
        layout(doc, templates::style(id), labels, None, &RenderConfig::default()).unwrap()
    }

    #[test]
    fn creative_without_photo_draws_initial() {
        let (layout, _) = lay_out(&jane(), TemplateId::Creative);
        assert_eq!(layout.texts(BlockKind::Portrait), vec!["J"]);
        let portrait = layout.blocks_of(BlockKind::Portrait).next().unwrap();
        assert_eq!(portrait.region, Some(Region::Side));
    }

    #[test]
    fn creative_with_photo_draws_image() {
        let style = templates::style(TemplateId::Creative);
        let photo = png();
        let config = RenderConfig::default();
        let composition = prepare(&jane(), style, &Labels::new(), Some(&photo), &config).unwrap();
        assert_eq!(composition.layout.texts(BlockKind::Portrait), vec![""]);
        assert!(composition
            .canvas
            .marks(0)
            .iter()
            .any(|m| matches!(m, Mark::Image { .. })));
    }

    #[test]
    fn sidebar_is_filled_on_the_left() {
        let style = templates::style(TemplateId::Creative);
        let composition =
            prepare(&jane(), style, &Labels::new(), None, &RenderConfig::default()).unwrap();
        match &composition.canvas.marks(0)[0] {
            Mark::Fill { x, y, width, color, .. } => {
                assert_eq!((*x, *y), (0.0, 0.0));
                assert!((*width - 612.0 / 3.0).abs() < 0.01);
                assert_eq!(Some(*color), style.palette.side_background);
            }
            other => panic!("unexpected first mark {other:?}"),
        }
    }

    #[test]
    fn photo_is_ignored_without_portrait_slot() {
        let mut bytes = png().bytes().to_vec();
        bytes.truncate(24);
        let broken = PhotoAsset::from_bytes(bytes).unwrap();
        let modern = templates::style(TemplateId::Modern);
        assert!(layout(&jane(), modern, &Labels::new(), Some(&broken), &RenderConfig::default()).is_ok());
        let creative = templates::style(TemplateId::Creative);
        let err = layout(&jane(), creative, &Labels::new(), Some(&broken), &RenderConfig::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::AssetLoad { .. }));
    }

    fn long_document(entries: usize) -> CanonicalDocument {
        let mut doc = full();
        doc.experience = (0..entries)
            .map(|i| ExperienceEntry {
                role: format!("Role {}", i),
                company: "Acme".to_string(),
                period: "2020".to_string(),
                description: "Shipped things. ".repeat(12),
                ..ExperienceEntry::default()
            })
            .collect();
        doc
    }

    #[test]
    fn overflow_is_reported_and_clipped_by_default() {
        let (layout, report) = lay_out(&long_document(40), TemplateId::Classic);
        assert_eq!(report.pages, 1);
        assert!(!report.is_complete());
        assert!(layout.count(BlockKind::Entry(SectionKind::Experience)) < 40);
        assert!(layout.blocks.iter().all(|b| b.y + b.height <= layout.height));
    }

    #[test]
    fn overflow_continues_on_new_pages_when_configured() {
        let config = RenderConfig {
            page: PageConfig {
                overflow: OverflowPolicy::Continue,
                ..PageConfig::default()
            },
            ..RenderConfig::default()
        };
        let style = templates::style(TemplateId::Technical);
        let (layout, report) =
            layout(&long_document(40), style, &Labels::new(), None, &config).unwrap();
        assert!(report.is_complete());
        assert!(report.pages > 1);
        assert_eq!(layout.count(BlockKind::Entry(SectionKind::Experience)), 40);
        let last = layout
            .blocks_of(BlockKind::Entry(SectionKind::Experience))
            .last()
            .unwrap();
        assert!(last.page > 0);
    }

    #[test]
    fn render_writes_pdf_with_derived_name() {
        let style = templates::style(TemplateId::Executive);
        let (file, report) =
            render(&full(), style, &Labels::new(), None, &RenderConfig::default()).unwrap();
        assert!(file.bytes.starts_with(b"%PDF-"));
        assert_eq!(file.file_name, "Jane_Doe_CV.pdf");
        assert_eq!(file.media_type, "application/pdf");
        assert_eq!(report.pages, 1);
    }

    #[test]
    fn executive_summary_is_quoted() {
        let (layout, _) = lay_out(&full(), TemplateId::Executive);
        assert_eq!(
            layout.texts(BlockKind::Summary),
            vec!["\u{201c}Builds reliable systems.\u{201d}"]
        );
        assert!(layout.count(BlockKind::Heading(SectionKind::Summary)) == 0);
    }

    #[test]
    fn executive_entry_titles_use_serif_face() {
        let style = templates::style(TemplateId::Executive);
        let composition =
            prepare(&full(), style, &Labels::new(), None, &RenderConfig::default()).unwrap();
        let face_of = |wanted: &str| {
            composition.canvas.marks(0).iter().find_map(|m| match m {
                Mark::Text { face, text, .. } if text == wanted => Some(face.clone()),
                _ => None,
            })
        };
        assert_eq!(face_of("Staff Engineer").as_deref(), Some("Times-Bold"));
        assert_eq!(face_of("2020 - Present").as_deref(), Some("Helvetica"));
    }

    #[test]
    fn report_lists_characters_the_page_fonts_cannot_draw() {
        let mut doc = jane();
        doc.personal_info.name = "Анна Łoś".to_string();
        let (_, report) = lay_out(&doc, TemplateId::Modern);
        assert!(report.overflow.is_empty());
        assert_eq!(report.missing_glyphs, vec!['А', 'Н', 'Ł', 'Ś']);
        assert!(!report.is_complete());
    }
}
