//! Word-processor renderer: document + tokens to a reflowable DOCX.
//!
//! Rendering happens in two steps. [`plan`] turns the [`Recipe`] into a flat
//! list of [`PlannedParagraph`]s with semantic roles, runs and paragraph
//! properties; [`render`] packs that plan with `docx-rs`. The plan is plain
//! data so the paragraph structure can be checked without unzipping XML.
//!
//! The template tokens are not used directly. [`WordStyle::from_tokens`]
//! derives a separate, flow-oriented mapping (Word font families, half-point
//! sizes, hex colors, heading borders) and only that mapping reaches the
//! paragraphs.

use crate::config::PageSize;
use crate::error::RenderError;
use crate::labels::Labels;
use crate::model::{CanonicalDocument, EducationEntry, ExperienceEntry, LanguageEntry};
use crate::recipe::{Recipe, Section, SectionBody};
use crate::templates::{Alignment, DividerStyle, SectionKind, SummaryStyle, TemplateStyle, TextCase};
use crate::{output_file_name, OutputFormat, RenderedFile};
use docx_rs::{
    AlignmentType, BorderType, BreakType, Docx, LineSpacing, Paragraph, ParagraphBorder,
    ParagraphBorderPosition, Run, RunFonts, Style, StyleType, Tab, TabValueType,
};
use log::{debug, info};
use std::io::Cursor;

/// Right tab stop for entry periods, in twentieths of a point.
const PERIOD_TAB: usize = 9000;

/// Per-template mapping onto word-processor primitives.
#[derive(Debug, Clone, PartialEq)]
pub struct WordStyle {
    pub body_font: &'static str,
    pub heading_font: &'static str,
    pub name_font: &'static str,
    pub detail_font: &'static str,
    pub entry_font: &'static str,
    pub heading_case: TextCase,
    pub heading_alignment: Alignment,
    pub header_alignment: Alignment,
    pub name_case: TextCase,
    pub title_case: TextCase,
    /// Hex colors without `#`.
    pub accent: String,
    pub heading_color: String,
    pub text_color: String,
    pub muted_color: String,
    /// Color of the bottom border under section headings, if any.
    pub heading_border: Option<String>,
    /// Sizes in half-points.
    pub name_size: usize,
    pub title_size: usize,
    pub heading_size: usize,
    pub entry_size: usize,
    pub body_size: usize,
    pub small_size: usize,
    pub company_italic: bool,
    pub company_accent: bool,
    pub summary: SummaryStyle,
    pub separator: &'static str,
}

fn half_points(pt: f32) -> usize {
    (pt * 2.0).round() as usize
}

impl WordStyle {
    pub fn from_tokens(style: &TemplateStyle) -> Self {
        let palette = &style.palette;
        let scale = &style.scale;
        WordStyle {
            body_font: style.primary_font.word_family(),
            heading_font: style.heading_font.word_family(),
            name_font: style.header.name_font.word_family(),
            detail_font: style.detail_font.word_family(),
            entry_font: style.entry_font.word_family(),
            heading_case: style.heading_case,
            heading_alignment: style.heading_alignment,
            header_alignment: style.header.alignment,
            name_case: style.header.name_case,
            title_case: style.header.title_case,
            accent: style.accent.hex(),
            heading_color: palette.heading.hex(),
            text_color: palette.text.hex(),
            muted_color: palette.muted.hex(),
            heading_border: match style.divider {
                DividerStyle::Bordered => Some(style.divider_color.hex()),
                DividerStyle::None => None,
            },
            name_size: half_points(scale.name),
            title_size: half_points(scale.title),
            // A single flow has no side region, so side headings use the main size.
            heading_size: half_points(scale.heading),
            entry_size: half_points(scale.entry_title),
            body_size: half_points(scale.body),
            small_size: half_points(scale.small),
            company_italic: style.company_italic,
            company_accent: style.company_accent,
            summary: style.summary,
            separator: style.inline_separator,
        }
    }
}

/// What a paragraph carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphRole {
    Name,
    Title,
    Contact,
    Heading(SectionKind),
    Summary,
    /// The first paragraph of an experience, education or language entry.
    Entry(SectionKind),
    Organization,
    Description,
    SkillList,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlannedRun {
    pub text: String,
    /// Emit a tab before the text.
    pub tab: bool,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<String>,
    /// Half-points; `None` inherits from the paragraph style.
    pub size: Option<usize>,
    pub font: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedParagraph {
    pub role: ParagraphRole,
    /// Named paragraph style.
    pub style: &'static str,
    pub alignment: Alignment,
    pub runs: Vec<PlannedRun>,
    pub right_tab: bool,
    pub bottom_border: Option<String>,
    /// Spacing in twentieths of a point.
    pub space_before: u32,
    pub space_after: u32,
}

impl PlannedParagraph {
    fn new(role: ParagraphRole, style: &'static str) -> Self {
        PlannedParagraph {
            role,
            style,
            alignment: Alignment::Left,
            runs: Vec::new(),
            right_tab: false,
            bottom_border: None,
            space_before: 0,
            space_after: 0,
        }
    }

    fn run(mut self, run: PlannedRun) -> Self {
        self.runs.push(run);
        self
    }

    fn spacing(mut self, before: u32, after: u32) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }

    /// Visible text; tabs are rendered as `\t`.
    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(|r| {
                if r.tab {
                    format!("\t{}", r.text)
                } else {
                    r.text.clone()
                }
            })
            .collect()
    }
}

/// The complete paragraph plan for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct WordPlan {
    pub style: WordStyle,
    pub paragraphs: Vec<PlannedParagraph>,
}

impl WordPlan {
    pub fn with_role(&self, role: ParagraphRole) -> impl Iterator<Item = &PlannedParagraph> {
        self.paragraphs.iter().filter(move |p| p.role == role)
    }

    /// Section headings in document order.
    pub fn sections(&self) -> Vec<SectionKind> {
        self.paragraphs
            .iter()
            .filter_map(|p| match p.role {
                ParagraphRole::Heading(kind) => Some(kind),
                ParagraphRole::Summary => Some(SectionKind::Summary),
                _ => None,
            })
            .fold(Vec::new(), |mut kinds, kind| {
                if kinds.last() != Some(&kind) {
                    kinds.push(kind);
                }
                kinds
            })
    }
}

struct Planner<'w> {
    ws: &'w WordStyle,
    paragraphs: Vec<PlannedParagraph>,
}

impl Planner<'_> {
    fn text(&self, text: impl Into<String>) -> PlannedRun {
        PlannedRun {
            text: text.into(),
            font: self.ws.body_font,
            ..PlannedRun::default()
        }
    }

    fn header(&mut self, name: &str, title: Option<&str>, contact: &[&str]) {
        let ws = self.ws;
        let mut para = PlannedParagraph::new(ParagraphRole::Name, "Title")
            .run(PlannedRun {
                font: ws.name_font,
                ..self.text(ws.name_case.apply(name))
            })
            .spacing(0, 200);
        para.alignment = ws.header_alignment;
        self.paragraphs.push(para);
        if let Some(title) = title {
            let mut para = PlannedParagraph::new(ParagraphRole::Title, "Heading2")
                .run(self.text(ws.title_case.apply(title)))
                .spacing(0, 200);
            para.alignment = ws.header_alignment;
            self.paragraphs.push(para);
        }
        if !contact.is_empty() {
            let mut para = PlannedParagraph::new(ParagraphRole::Contact, "Normal")
                .run(PlannedRun {
                    color: Some(ws.muted_color.clone()),
                    size: Some(ws.small_size),
                    ..self.text(contact.join(" | "))
                })
                .spacing(0, 400);
            para.alignment = ws.header_alignment;
            self.paragraphs.push(para);
        }
    }

    fn heading(&mut self, kind: SectionKind, label: &str) {
        let ws = self.ws;
        let mut para = PlannedParagraph::new(ParagraphRole::Heading(kind), "Heading1")
            .run(PlannedRun {
                font: ws.heading_font,
                ..self.text(ws.heading_case.apply(label))
            })
            .spacing(200, 100);
        para.alignment = ws.heading_alignment;
        para.bottom_border = ws.heading_border.clone();
        self.paragraphs.push(para);
    }

    fn section(&mut self, section: &Section<'_>) {
        if let Some(label) = &section.heading {
            self.heading(section.kind, label);
        }
        match &section.body {
            // Contact details live in the header of a flow document.
            SectionBody::Contact(_) => {}
            SectionBody::Summary(text) => self.summary(text),
            SectionBody::Experience(entries) => entries.iter().for_each(|e| self.experience(e)),
            SectionBody::Education(entries) => entries.iter().for_each(|e| self.education(e)),
            SectionBody::Skills(skills) => {
                let para = PlannedParagraph::new(ParagraphRole::SkillList, "Normal")
                    .run(self.text(skills.join(self.ws.separator)))
                    .spacing(0, 200);
                self.paragraphs.push(para);
            }
            SectionBody::Languages(entries) => entries.iter().for_each(|e| self.language(e)),
        }
    }

    fn summary(&mut self, text: &str) {
        let mut para = match self.ws.summary {
            SummaryStyle::Quote => {
                let mut para = PlannedParagraph::new(ParagraphRole::Summary, "Normal").run(
                    PlannedRun {
                        italic: true,
                        ..self.text(format!("\u{201c}{}\u{201d}", text))
                    },
                );
                para.alignment = Alignment::Center;
                para
            }
            SummaryStyle::Titled | SummaryStyle::Callout => {
                PlannedParagraph::new(ParagraphRole::Summary, "Normal").run(self.text(text))
            }
        };
        para = para.spacing(0, 300);
        self.paragraphs.push(para);
    }

    fn experience(&mut self, entry: &ExperienceEntry) {
        let ws = self.ws;
        let mut first = PlannedParagraph::new(ParagraphRole::Entry(SectionKind::Experience), "Normal")
            .run(PlannedRun {
                bold: true,
                size: Some(ws.entry_size),
                color: Some(ws.heading_color.clone()),
                font: ws.entry_font,
                ..self.text(entry.role.trim())
            });
        let period = entry.period.trim();
        if !period.is_empty() {
            first = first.run(PlannedRun {
                tab: true,
                bold: true,
                color: Some(ws.muted_color.clone()),
                font: ws.detail_font,
                ..self.text(period)
            });
            first.right_tab = true;
        }
        self.paragraphs.push(first.spacing(120, 0));

        let company = entry.company.trim();
        if !company.is_empty() {
            let color = if ws.company_accent {
                ws.accent.clone()
            } else {
                ws.text_color.clone()
            };
            let para = PlannedParagraph::new(ParagraphRole::Organization, "Normal")
                .run(PlannedRun {
                    italic: ws.company_italic,
                    color: Some(color),
                    ..self.text(company)
                })
                .spacing(0, 50);
            self.paragraphs.push(para);
        }
        let description = entry.description.trim();
        if !description.is_empty() {
            let para = PlannedParagraph::new(ParagraphRole::Description, "Normal")
                .run(self.text(description))
                .spacing(0, 200);
            self.paragraphs.push(para);
        }
    }

    fn education(&mut self, entry: &EducationEntry) {
        let mut para = PlannedParagraph::new(ParagraphRole::Entry(SectionKind::Education), "Normal")
            .run(PlannedRun {
                bold: true,
                font: self.ws.entry_font,
                ..self.text(entry.school.trim())
            });
        let degree = entry.degree.trim();
        if !degree.is_empty() {
            para = para.run(self.text(format!(" \u{2013} {}", degree)));
        }
        let period = entry.period.trim();
        if !period.is_empty() {
            para = para.run(PlannedRun {
                color: Some(self.ws.muted_color.clone()),
                ..self.text(format!(" ({})", period))
            });
        }
        self.paragraphs.push(para.spacing(0, 100));
    }

    fn language(&mut self, entry: &LanguageEntry) {
        let mut para = PlannedParagraph::new(ParagraphRole::Entry(SectionKind::Languages), "Normal")
            .run(PlannedRun {
                font: self.ws.entry_font,
                ..self.text(entry.language.trim())
            });
        let level = entry.level.trim();
        if !level.is_empty() {
            para = para.run(PlannedRun {
                color: Some(self.ws.muted_color.clone()),
                ..self.text(format!(" ({})", level))
            });
        }
        self.paragraphs.push(para);
    }
}

/// Builds the paragraph plan: header, then every section in reading order.
pub fn plan(doc: &CanonicalDocument, style: &TemplateStyle, labels: &Labels) -> WordPlan {
    let ws = WordStyle::from_tokens(style);
    let recipe = Recipe::build(doc, style, labels);
    let contact = doc.personal_info.contact_items();
    let mut planner = Planner {
        ws: &ws,
        paragraphs: Vec::new(),
    };
    planner.header(recipe.header.name, recipe.header.title, &contact);
    for section in recipe.reading_order() {
        planner.section(section);
    }
    let paragraphs = planner.paragraphs;
    debug!(
        "Planned {} DOCX paragraphs for template {}",
        paragraphs.len(),
        style.id
    );
    WordPlan {
        style: ws,
        paragraphs,
    }
}

fn alignment_type(alignment: Alignment) -> AlignmentType {
    match alignment {
        Alignment::Left => AlignmentType::Left,
        Alignment::Center => AlignmentType::Center,
    }
}

fn build_run(planned: &PlannedRun) -> Run {
    let mut run = Run::new().fonts(
        RunFonts::new()
            .ascii(planned.font)
            .hi_ansi(planned.font)
            .cs(planned.font),
    );
    if planned.tab {
        run = run.add_tab();
    }
    for (i, line) in planned.text.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(line);
    }
    if planned.bold {
        run = run.bold();
    }
    if planned.italic {
        run = run.italic();
    }
    if let Some(color) = &planned.color {
        run = run.color(color.clone());
    }
    if let Some(size) = planned.size {
        run = run.size(size);
    }
    run
}

fn build_paragraph(planned: &PlannedParagraph) -> Paragraph {
    let mut paragraph = Paragraph::new()
        .style(planned.style)
        .align(alignment_type(planned.alignment))
        .line_spacing(
            LineSpacing::new()
                .before(planned.space_before)
                .after(planned.space_after),
        );
    if planned.right_tab {
        paragraph = paragraph.add_tab(Tab::new().val(TabValueType::Right).pos(PERIOD_TAB));
    }
    if let Some(color) = &planned.bottom_border {
        paragraph.property = paragraph.property.set_border(
            ParagraphBorder::new(ParagraphBorderPosition::Bottom)
                .val(BorderType::Single)
                .size(6)
                .space(1)
                .color(color.clone()),
        );
    }
    planned
        .runs
        .iter()
        .fold(paragraph, |paragraph, run| paragraph.add_run(build_run(run)))
}

fn build_document(plan: &WordPlan, page: PageSize) -> Docx {
    let ws = &plan.style;
    let (width, height) = page.dimensions();
    let twips = |pt: f32| (pt * 20.0).round() as u32;
    let docx = Docx::new()
        .page_size(twips(width), twips(height))
        .add_style(
            Style::new("Normal", StyleType::Paragraph)
                .name("Normal")
                .size(ws.body_size)
                .color(ws.text_color.clone()),
        )
        .add_style(
            Style::new("Title", StyleType::Paragraph)
                .name("Title")
                .size(ws.name_size)
                .bold()
                .color(ws.heading_color.clone()),
        )
        .add_style(
            Style::new("Heading1", StyleType::Paragraph)
                .name("Heading 1")
                .size(ws.heading_size)
                .bold()
                .color(ws.heading_color.clone()),
        )
        .add_style(
            Style::new("Heading2", StyleType::Paragraph)
                .name("Heading 2")
                .size(ws.title_size)
                .color(ws.accent.clone()),
        );
    plan.paragraphs
        .iter()
        .fold(docx, |docx, planned| docx.add_paragraph(build_paragraph(planned)))
}

/// Renders the document to DOCX bytes.
pub fn render(
    doc: &CanonicalDocument,
    style: &TemplateStyle,
    labels: &Labels,
    page: PageSize,
) -> Result<RenderedFile, RenderError> {
    let plan = plan(doc, style, labels);
    let mut buffer = Cursor::new(Vec::new());
    build_document(&plan, page)
        .build()
        .pack(&mut buffer)
        .map_err(|e| RenderError::serialize("docx", e.to_string()))?;
    let bytes = buffer.into_inner();
    let name = doc.personal_info.name.trim();
    info!(
        "Rendered {} DOCX for '{}': {} paragraphs, {} bytes",
        style.display_name,
        name,
        plan.paragraphs.len(),
        bytes.len()
    );
    Ok(RenderedFile {
        file_name: output_file_name(name, OutputFormat::Docx),
        bytes,
        media_type: OutputFormat::Docx.media_type(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::LabelKey;
    use crate::model::TemplateId;
    use crate::templates;

    fn doc() -> CanonicalDocument {
        let mut doc = CanonicalDocument::new("Jane Doe");
        doc.personal_info.title = "Engineer".to_string();
        doc.personal_info.email = "jane@example.com".to_string();
        doc.personal_info.phone = "555-0100".to_string();
        doc.personal_info.summary = "Builds reliable systems.".to_string();
        doc.experience = vec![ExperienceEntry {
            role: "Staff Engineer".to_string(),
            company: "Acme".to_string(),
            period: "2020 - Present".to_string(),
            description: "Led the platform team.\nHired five engineers.".to_string(),
            ..ExperienceEntry::default()
        }];
        doc.education = vec![EducationEntry {
            school: "State University".to_string(),
            degree: "BSc".to_string(),
            period: "2016".to_string(),
            ..EducationEntry::default()
        }];
        doc.skills = vec!["Go".to_string(), "Rust".to_string()];
        doc.languages = vec![LanguageEntry {
            language: "French".to_string(),
            level: "B2".to_string(),
            ..LanguageEntry::default()
        }];
        doc
    }

    fn plan_for(id: TemplateId) -> WordPlan {
        plan(&doc(), templates::style(id), &Labels::new())
    }

    #[test]
    fn word_style_is_derived_from_tokens() {
        let classic = WordStyle::from_tokens(templates::style(TemplateId::Classic));
        assert_eq!(classic.body_font, "Times New Roman");
        assert_eq!(classic.heading_case, TextCase::Upper);
        assert_eq!(classic.heading_border.as_deref(), Some("000000"));

        let creative = WordStyle::from_tokens(templates::style(TemplateId::Creative));
        assert_eq!(creative.heading_border, None);
        assert_eq!(creative.accent, "6366F1");
        assert_eq!(creative.body_font, "Arial");

        let technical = WordStyle::from_tokens(templates::style(TemplateId::Technical));
        assert_eq!(technical.detail_font, "Courier New");
    }

    #[test]
    fn sections_follow_reading_order() {
        for id in TemplateId::ALL {
            let plan = plan_for(id);
            assert_eq!(
                plan.sections(),
                vec![
                    SectionKind::Summary,
                    SectionKind::Experience,
                    SectionKind::Education,
                    SectionKind::Skills,
                    SectionKind::Languages,
                ],
                "{}",
                id
            );
        }
    }

    #[test]
    fn experience_uses_right_tab_for_period() {
        let plan = plan_for(TemplateId::Modern);
        let entry = plan
            .with_role(ParagraphRole::Entry(SectionKind::Experience))
            .next()
            .unwrap();
        assert!(entry.right_tab);
        assert_eq!(entry.text(), "Staff Engineer\t2020 - Present");
        assert!(entry.runs[0].bold);
        let company = plan.with_role(ParagraphRole::Organization).next().unwrap();
        assert!(!company.runs[0].italic);
        assert_eq!(company.text(), "Acme");
    }

    #[test]
    fn organization_italics_follow_the_template() {
        for id in TemplateId::ALL {
            let style = templates::style(id);
            let plan = plan_for(id);
            let company = plan.with_role(ParagraphRole::Organization).next().unwrap();
            assert_eq!(company.runs[0].italic, style.company_italic, "{}", id);
        }
        assert!(plan_for(TemplateId::Classic)
            .with_role(ParagraphRole::Organization)
            .all(|p| p.runs[0].italic));
    }

    #[test]
    fn education_and_languages_read_inline() {
        let plan = plan_for(TemplateId::Classic);
        let edu = plan
            .with_role(ParagraphRole::Entry(SectionKind::Education))
            .next()
            .unwrap();
        assert_eq!(edu.text(), "State University \u{2013} BSc (2016)");
        let lang = plan
            .with_role(ParagraphRole::Entry(SectionKind::Languages))
            .next()
            .unwrap();
        assert_eq!(lang.text(), "French (B2)");
        let skills = plan.with_role(ParagraphRole::SkillList).next().unwrap();
        assert_eq!(skills.text(), "Go \u{2022} Rust");
    }

    #[test]
    fn header_carries_contact_for_every_template() {
        for id in TemplateId::ALL {
            let plan = plan_for(id);
            let contact = plan.with_role(ParagraphRole::Contact).next().unwrap();
            assert_eq!(contact.text(), "jane@example.com | 555-0100", "{}", id);
        }
        let modern = plan_for(TemplateId::Modern);
        assert_eq!(modern.paragraphs[0].text(), "JANE DOE");
        assert_eq!(modern.paragraphs[0].style, "Title");
    }

    #[test]
    fn headings_follow_case_labels_and_borders() {
        let labels = Labels::new().with(LabelKey::Skills, "Kenntnisse");
        let plan = plan(&doc(), templates::style(TemplateId::Executive), &labels);
        let headings: Vec<String> = plan
            .paragraphs
            .iter()
            .filter(|p| matches!(p.role, ParagraphRole::Heading(_)))
            .map(|p| p.text())
            .collect();
        assert_eq!(
            headings,
            vec!["PROFESSIONAL HISTORY", "EDUCATION", "KENNTNISSE", "GLOBAL COMMUNICATION"]
        );
        let summary = plan.with_role(ParagraphRole::Summary).next().unwrap();
        assert_eq!(summary.alignment, Alignment::Center);
        assert!(summary.runs[0].italic);

        let creative = plan_for(TemplateId::Creative);
        assert!(creative
            .paragraphs
            .iter()
            .all(|p| p.bottom_border.is_none()));
    }

    #[test]
    fn name_only_document_has_only_a_title() {
        let plan = plan(
            &CanonicalDocument::new("Solo"),
            templates::style(TemplateId::Technical),
            &Labels::new(),
        );
        assert_eq!(plan.paragraphs.len(), 1);
        assert_eq!(plan.paragraphs[0].role, ParagraphRole::Name);
    }

    #[test]
    fn render_packs_a_zip_with_derived_name() {
        let file = render(
            &doc(),
            templates::style(TemplateId::Modern),
            &Labels::new(),
            PageSize::Letter,
        )
        .unwrap();
        assert!(file.bytes.starts_with(b"PK"));
        assert_eq!(file.file_name, "Jane_Doe_CV.docx");
        assert_eq!(
            file.media_type,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
    }

    #[test]
    fn executive_entry_titles_use_serif() {
        let plan = plan_for(TemplateId::Executive);
        for kind in [SectionKind::Experience, SectionKind::Education, SectionKind::Languages] {
            let entry = plan.with_role(ParagraphRole::Entry(kind)).next().unwrap();
            assert_eq!(entry.runs[0].font, "Times New Roman", "{:?}", kind);
        }
        let modern = plan_for(TemplateId::Modern);
        let entry = modern
            .with_role(ParagraphRole::Entry(SectionKind::Experience))
            .next()
            .unwrap();
        assert_eq!(entry.runs[0].font, "Arial");
    }
}
