//! Template style registry.
//!
//! Each template is one immutable [`TemplateStyle`] record of renderer-agnostic
//! tokens. The preview, page and word-processor renderers read these tokens and
//! never branch on a template id, so adding a template means adding one
//! constructor below and one [`TemplateId`] variant.
//!
//! ```rust
//! use cvforge::templates::{self, LayoutShape};
//!
//! let style = templates::resolve("creative").unwrap();
//! assert_eq!(style.layout, LayoutShape::SidebarMain);
//! assert!(templates::resolve("nonexistent").is_err());
//! ```

use crate::error::RenderError;
use crate::labels::LabelKey;
use crate::model::TemplateId;
use once_cell::sync::Lazy;
use std::fmt;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Six uppercase hex digits without a leading `#`, the form DOCX expects.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }

    /// Components scaled to 0.0..=1.0 for PDF color operators.
    pub fn unit(&self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Abstract font family. Each renderer maps it onto concrete faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontToken {
    Sans,
    Serif,
    Mono,
}

impl FontToken {
    /// CSS font stack used by the preview.
    pub fn css_stack(&self) -> &'static str {
        match self {
            FontToken::Sans => "Helvetica, Arial, sans-serif",
            FontToken::Serif => "Georgia, 'Times New Roman', serif",
            FontToken::Mono => "'Courier New', Courier, monospace",
        }
    }

    /// Font family name written into DOCX run properties.
    pub fn word_family(&self) -> &'static str {
        match self {
            FontToken::Sans => "Arial",
            FontToken::Serif => "Times New Roman",
            FontToken::Mono => "Courier New",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCase {
    Upper,
    Normal,
}

impl TextCase {
    pub fn apply(&self, text: &str) -> String {
        match self {
            TextCase::Upper => text.to_uppercase(),
            TextCase::Normal => text.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DividerStyle {
    Bordered,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutShape {
    SingleColumn,
    TwoColumn,
    SidebarMain,
}

/// Which side of the page the secondary region sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidePosition {
    Left,
    Right,
}

/// The two content regions of a page. Single-column templates only use
/// `Main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Main,
    Side,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Main => "main",
            Region::Side => "side",
        }
    }
}

/// Where the name/title block is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPlacement {
    /// Full width across the top of the page.
    Top,
    /// At the top of the main region.
    Main,
    /// At the top of the side region.
    Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingMarker {
    None,
    AccentDot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStyle {
    /// A regular section with a heading.
    Titled,
    /// An untitled box with an accent bar on its left edge.
    Callout,
    /// An untitled, centered, italic quotation.
    Quote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillsStyle {
    Tags,
    /// One line of text joined by the template's separator.
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguagesStyle {
    /// Language on one line, level underneath.
    Stacked,
    /// `Language (level)` items joined on one line.
    Inline,
}

/// The kind of a résumé section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Contact,
    Summary,
    Experience,
    Education,
    Skills,
    Languages,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Contact => "contact",
            SectionKind::Summary => "summary",
            SectionKind::Experience => "experience",
            SectionKind::Education => "education",
            SectionKind::Skills => "skills",
            SectionKind::Languages => "languages",
        }
    }

    /// Position in the single-flow reading order.
    pub fn reading_rank(&self) -> u8 {
        match self {
            SectionKind::Contact => 0,
            SectionKind::Summary => 1,
            SectionKind::Experience => 2,
            SectionKind::Education => 3,
            SectionKind::Skills => 4,
            SectionKind::Languages => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub color: Rgb,
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderStyle {
    pub placement: HeaderPlacement,
    pub alignment: Alignment,
    pub name_case: TextCase,
    pub name_font: FontToken,
    pub name_color: Rgb,
    pub title_case: TextCase,
    pub title_font: FontToken,
    pub title_color: Rgb,
    /// Rule drawn under the header block.
    pub rule: Option<Rule>,
    /// Photo or initial avatar above the name.
    pub portrait: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub text: Rgb,
    pub heading: Rgb,
    pub muted: Rgb,
    pub tag_background: Option<Rgb>,
    pub tag_border: Option<Rgb>,
    pub tag_text: Rgb,
    pub side_background: Option<Rgb>,
    pub side_text: Rgb,
    pub side_heading: Rgb,
}

/// Font sizes in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeScale {
    pub name: f32,
    pub title: f32,
    pub heading: f32,
    /// Headings inside the side region.
    pub side_heading: f32,
    pub entry_title: f32,
    pub body: f32,
    pub small: f32,
}

/// One template's complete token record.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateStyle {
    pub id: TemplateId,
    pub display_name: &'static str,
    /// Written to the PDF Info dictionary.
    pub document_title: &'static str,

    pub primary_font: FontToken,
    pub heading_font: FontToken,
    /// Font for small details such as tags and periods.
    pub detail_font: FontToken,
    /// Font for entry titles: roles, schools and language names.
    pub entry_font: FontToken,
    pub accent: Rgb,

    pub heading_case: TextCase,
    pub heading_alignment: Alignment,
    pub divider: DividerStyle,
    pub divider_color: Rgb,
    pub divider_width: f32,
    pub heading_marker: HeadingMarker,

    pub layout: LayoutShape,
    pub side_position: SidePosition,
    /// Width of the side region as a fraction of the page width.
    pub side_fraction: f32,
    pub header: HeaderStyle,

    pub summary: SummaryStyle,
    pub summary_label: LabelKey,
    pub skills: SkillsStyle,
    pub languages: LanguagesStyle,
    pub inline_separator: &'static str,
    pub company_italic: bool,
    pub company_accent: bool,
    /// Accent dot before each experience entry.
    pub entry_marker: bool,

    pub main_sections: &'static [SectionKind],
    pub side_sections: &'static [SectionKind],
    pub label_defaults: &'static [(LabelKey, &'static str)],

    pub palette: Palette,
    pub scale: TypeScale,
    /// Page padding in points.
    pub padding: f32,
}

impl TemplateStyle {
    pub fn label_default(&self, key: LabelKey) -> Option<&'static str> {
        self.label_defaults
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// Contact details sit in the header unless a region lists them as a
    /// section of their own.
    pub fn contact_in_header(&self) -> bool {
        !self
            .main_sections
            .iter()
            .chain(self.side_sections.iter())
            .any(|k| *k == SectionKind::Contact)
    }

    pub fn has_side_region(&self) -> bool {
        self.layout != LayoutShape::SingleColumn
    }
}

const SLATE_900: Rgb = Rgb(0x0f, 0x17, 0x2a);
const SLATE_800: Rgb = Rgb(0x1e, 0x29, 0x3b);
const SLATE_700: Rgb = Rgb(0x33, 0x41, 0x55);
const SLATE_600: Rgb = Rgb(0x47, 0x55, 0x69);
const SLATE_500: Rgb = Rgb(0x64, 0x74, 0x8b);
const SLATE_400: Rgb = Rgb(0x94, 0xa3, 0xb8);
const SLATE_300: Rgb = Rgb(0xcb, 0xd5, 0xe1);
const SLATE_200: Rgb = Rgb(0xe2, 0xe8, 0xf0);
const SLATE_100: Rgb = Rgb(0xf1, 0xf5, 0xf9);
const SLATE_50: Rgb = Rgb(0xf8, 0xfa, 0xfc);
const INDIGO_600: Rgb = Rgb(0x4f, 0x46, 0xe5);
const INDIGO_500: Rgb = Rgb(0x63, 0x66, 0xf1);
const INDIGO_400: Rgb = Rgb(0x81, 0x8c, 0xf8);

fn modern() -> TemplateStyle {
    TemplateStyle {
        id: TemplateId::Modern,
        display_name: "Modern",
        document_title: "Modern CV",
        primary_font: FontToken::Sans,
        heading_font: FontToken::Sans,
        detail_font: FontToken::Sans,
        entry_font: FontToken::Sans,
        accent: SLATE_900,
        heading_case: TextCase::Normal,
        heading_alignment: Alignment::Left,
        divider: DividerStyle::Bordered,
        divider_color: SLATE_200,
        divider_width: 1.0,
        heading_marker: HeadingMarker::None,
        layout: LayoutShape::TwoColumn,
        side_position: SidePosition::Right,
        side_fraction: 1.0 / 3.0,
        header: HeaderStyle {
            placement: HeaderPlacement::Top,
            alignment: Alignment::Left,
            name_case: TextCase::Upper,
            name_font: FontToken::Sans,
            name_color: SLATE_900,
            title_case: TextCase::Normal,
            title_font: FontToken::Sans,
            title_color: SLATE_600,
            rule: Some(Rule {
                color: SLATE_900,
                width: 2.0,
            }),
            portrait: false,
        },
        summary: SummaryStyle::Titled,
        summary_label: LabelKey::About,
        skills: SkillsStyle::Tags,
        languages: LanguagesStyle::Stacked,
        inline_separator: " • ",
        company_italic: false,
        company_accent: false,
        entry_marker: false,
        main_sections: &[SectionKind::Experience, SectionKind::Education],
        side_sections: &[
            SectionKind::Summary,
            SectionKind::Skills,
            SectionKind::Languages,
        ],
        label_defaults: &[],
        palette: Palette {
            text: SLATE_800,
            heading: SLATE_900,
            muted: SLATE_500,
            tag_background: Some(SLATE_100),
            tag_border: None,
            tag_text: SLATE_700,
            side_background: None,
            side_text: SLATE_600,
            side_heading: SLATE_900,
        },
        scale: TypeScale {
            name: 28.0,
            title: 15.0,
            heading: 14.0,
            side_heading: 14.0,
            entry_title: 12.0,
            body: 10.0,
            small: 9.0,
        },
        padding: 36.0,
    }
}

fn classic() -> TemplateStyle {
    TemplateStyle {
        id: TemplateId::Classic,
        display_name: "Classic",
        document_title: "Classic CV",
        primary_font: FontToken::Serif,
        heading_font: FontToken::Serif,
        detail_font: FontToken::Serif,
        entry_font: FontToken::Serif,
        accent: Rgb::BLACK,
        heading_case: TextCase::Upper,
        heading_alignment: Alignment::Left,
        divider: DividerStyle::Bordered,
        divider_color: Rgb::BLACK,
        divider_width: 1.0,
        heading_marker: HeadingMarker::None,
        layout: LayoutShape::SingleColumn,
        side_position: SidePosition::Right,
        side_fraction: 0.0,
        header: HeaderStyle {
            placement: HeaderPlacement::Top,
            alignment: Alignment::Center,
            name_case: TextCase::Upper,
            name_font: FontToken::Serif,
            name_color: Rgb::BLACK,
            title_case: TextCase::Normal,
            title_font: FontToken::Serif,
            title_color: Rgb::BLACK,
            rule: Some(Rule {
                color: Rgb::BLACK,
                width: 2.0,
            }),
            portrait: false,
        },
        summary: SummaryStyle::Titled,
        summary_label: LabelKey::Profile,
        skills: SkillsStyle::Inline,
        languages: LanguagesStyle::Inline,
        inline_separator: " • ",
        company_italic: true,
        company_accent: false,
        entry_marker: false,
        main_sections: &[
            SectionKind::Summary,
            SectionKind::Experience,
            SectionKind::Education,
            SectionKind::Skills,
            SectionKind::Languages,
        ],
        side_sections: &[],
        label_defaults: &[(LabelKey::Experience, "Professional Experience")],
        palette: Palette {
            text: Rgb::BLACK,
            heading: Rgb::BLACK,
            muted: Rgb::BLACK,
            tag_background: None,
            tag_border: None,
            tag_text: Rgb::BLACK,
            side_background: None,
            side_text: Rgb::BLACK,
            side_heading: Rgb::BLACK,
        },
        scale: TypeScale {
            name: 24.0,
            title: 14.0,
            heading: 12.0,
            side_heading: 12.0,
            entry_title: 11.0,
            body: 10.0,
            small: 9.0,
        },
        padding: 42.0,
    }
}

fn technical() -> TemplateStyle {
    TemplateStyle {
        id: TemplateId::Technical,
        display_name: "Technical",
        document_title: "Technical CV",
        primary_font: FontToken::Sans,
        heading_font: FontToken::Sans,
        detail_font: FontToken::Mono,
        entry_font: FontToken::Sans,
        accent: INDIGO_500,
        heading_case: TextCase::Upper,
        heading_alignment: Alignment::Left,
        divider: DividerStyle::Bordered,
        divider_color: INDIGO_500,
        divider_width: 2.0,
        heading_marker: HeadingMarker::AccentDot,
        layout: LayoutShape::SidebarMain,
        side_position: SidePosition::Left,
        side_fraction: 1.0 / 3.0,
        header: HeaderStyle {
            placement: HeaderPlacement::Main,
            alignment: Alignment::Left,
            name_case: TextCase::Normal,
            name_font: FontToken::Sans,
            name_color: SLATE_900,
            title_case: TextCase::Normal,
            title_font: FontToken::Mono,
            title_color: INDIGO_600,
            rule: None,
            portrait: false,
        },
        summary: SummaryStyle::Callout,
        summary_label: LabelKey::Profile,
        skills: SkillsStyle::Tags,
        languages: LanguagesStyle::Stacked,
        inline_separator: " • ",
        company_italic: false,
        company_accent: true,
        entry_marker: true,
        main_sections: &[SectionKind::Summary, SectionKind::Experience],
        side_sections: &[
            SectionKind::Contact,
            SectionKind::Skills,
            SectionKind::Languages,
            SectionKind::Education,
        ],
        label_defaults: &[],
        palette: Palette {
            text: SLATE_800,
            heading: SLATE_900,
            muted: SLATE_500,
            tag_background: Some(Rgb::WHITE),
            tag_border: Some(SLATE_300),
            tag_text: SLATE_700,
            side_background: Some(SLATE_100),
            side_text: SLATE_600,
            side_heading: SLATE_900,
        },
        scale: TypeScale {
            name: 26.0,
            title: 13.0,
            heading: 11.0,
            side_heading: 10.0,
            entry_title: 13.0,
            body: 10.0,
            small: 8.5,
        },
        padding: 28.0,
    }
}

fn creative() -> TemplateStyle {
    TemplateStyle {
        id: TemplateId::Creative,
        display_name: "Creative",
        document_title: "Creative CV",
        primary_font: FontToken::Sans,
        heading_font: FontToken::Sans,
        detail_font: FontToken::Sans,
        entry_font: FontToken::Sans,
        accent: INDIGO_500,
        heading_case: TextCase::Normal,
        heading_alignment: Alignment::Left,
        divider: DividerStyle::None,
        divider_color: SLATE_100,
        divider_width: 0.0,
        heading_marker: HeadingMarker::AccentDot,
        layout: LayoutShape::SidebarMain,
        side_position: SidePosition::Left,
        side_fraction: 1.0 / 3.0,
        header: HeaderStyle {
            placement: HeaderPlacement::Side,
            alignment: Alignment::Center,
            name_case: TextCase::Normal,
            name_font: FontToken::Sans,
            name_color: Rgb::WHITE,
            title_case: TextCase::Normal,
            title_font: FontToken::Sans,
            title_color: INDIGO_400,
            rule: None,
            portrait: true,
        },
        summary: SummaryStyle::Titled,
        summary_label: LabelKey::Profile,
        skills: SkillsStyle::Tags,
        languages: LanguagesStyle::Stacked,
        inline_separator: " • ",
        company_italic: false,
        company_accent: true,
        entry_marker: true,
        main_sections: &[
            SectionKind::Summary,
            SectionKind::Experience,
            SectionKind::Education,
        ],
        side_sections: &[
            SectionKind::Contact,
            SectionKind::Skills,
            SectionKind::Languages,
        ],
        label_defaults: &[],
        palette: Palette {
            text: SLATE_600,
            heading: SLATE_900,
            muted: SLATE_400,
            tag_background: None,
            tag_border: Some(SLATE_700),
            tag_text: SLATE_300,
            side_background: Some(SLATE_900),
            side_text: SLATE_300,
            side_heading: SLATE_400,
        },
        scale: TypeScale {
            name: 24.0,
            title: 12.0,
            heading: 16.0,
            side_heading: 9.0,
            entry_title: 13.0,
            body: 10.0,
            small: 8.5,
        },
        padding: 28.0,
    }
}

fn executive() -> TemplateStyle {
    TemplateStyle {
        id: TemplateId::Executive,
        display_name: "Executive",
        document_title: "Executive CV",
        primary_font: FontToken::Sans,
        heading_font: FontToken::Sans,
        detail_font: FontToken::Sans,
        entry_font: FontToken::Serif,
        accent: SLATE_900,
        heading_case: TextCase::Upper,
        heading_alignment: Alignment::Left,
        divider: DividerStyle::Bordered,
        divider_color: SLATE_100,
        divider_width: 1.0,
        heading_marker: HeadingMarker::None,
        layout: LayoutShape::SingleColumn,
        side_position: SidePosition::Right,
        side_fraction: 0.0,
        header: HeaderStyle {
            placement: HeaderPlacement::Top,
            alignment: Alignment::Center,
            name_case: TextCase::Normal,
            name_font: FontToken::Serif,
            name_color: SLATE_900,
            title_case: TextCase::Upper,
            title_font: FontToken::Sans,
            title_color: SLATE_600,
            rule: Some(Rule {
                color: SLATE_300,
                width: 1.0,
            }),
            portrait: false,
        },
        summary: SummaryStyle::Quote,
        summary_label: LabelKey::Profile,
        skills: SkillsStyle::Tags,
        languages: LanguagesStyle::Stacked,
        inline_separator: " • ",
        company_italic: false,
        company_accent: false,
        entry_marker: false,
        main_sections: &[
            SectionKind::Summary,
            SectionKind::Experience,
            SectionKind::Education,
            SectionKind::Skills,
            SectionKind::Languages,
        ],
        side_sections: &[],
        label_defaults: &[
            (LabelKey::Experience, "Professional History"),
            (LabelKey::Skills, "Core Competencies"),
            (LabelKey::Languages, "Global Communication"),
        ],
        palette: Palette {
            text: SLATE_700,
            heading: SLATE_400,
            muted: SLATE_500,
            tag_background: None,
            tag_border: Some(SLATE_100),
            tag_text: SLATE_700,
            side_background: None,
            side_text: SLATE_700,
            side_heading: SLATE_400,
        },
        scale: TypeScale {
            name: 30.0,
            title: 10.0,
            heading: 9.0,
            side_heading: 9.0,
            entry_title: 14.0,
            body: 10.0,
            small: 8.5,
        },
        padding: 48.0,
    }
}

static REGISTRY: Lazy<Vec<TemplateStyle>> =
    Lazy::new(|| vec![modern(), classic(), technical(), creative(), executive()]);

/// Every registered template, in registry order.
pub fn all() -> &'static [TemplateStyle] {
    &REGISTRY
}

/// Looks up a template by its typed identifier. Never fails.
pub fn style(id: TemplateId) -> &'static TemplateStyle {
    // TemplateId::ALL and REGISTRY are declared in the same order.
    let index = TemplateId::ALL
        .iter()
        .position(|candidate| *candidate == id)
        .unwrap_or(0);
    &REGISTRY[index]
}

/// Resolves a template identifier string to its token record.
pub fn resolve(id: &str) -> Result<&'static TemplateStyle, RenderError> {
    let id: TemplateId = id.parse()?;
    Ok(style(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_id_in_order() {
        assert_eq!(all().len(), TemplateId::ALL.len());
        for id in TemplateId::ALL {
            assert_eq!(style(id).id, id);
            assert_eq!(resolve(id.as_str()).unwrap().id, id);
        }
    }

    #[test]
    fn unknown_template_is_rejected() {
        let err = resolve("nonexistent").unwrap_err();
        assert!(matches!(err, RenderError::UnknownTemplate { .. }));
        assert!(resolve("").is_err());
    }

    #[test]
    fn default_template_is_modern() {
        assert_eq!(style(TemplateId::default()).display_name, "Modern");
    }

    #[test]
    fn only_creative_has_portrait() {
        let with_portrait: Vec<_> = all()
            .iter()
            .filter(|s| s.header.portrait)
            .map(|s| s.id)
            .collect();
        assert_eq!(with_portrait, vec![TemplateId::Creative]);
    }

    #[test]
    fn sections_are_listed_once_per_template() {
        for style in all() {
            let mut seen: Vec<SectionKind> = Vec::new();
            for kind in style.main_sections.iter().chain(style.side_sections) {
                assert!(!seen.contains(kind), "{} lists {:?} twice", style.id, kind);
                seen.push(*kind);
            }
            for kind in [
                SectionKind::Summary,
                SectionKind::Experience,
                SectionKind::Education,
                SectionKind::Skills,
                SectionKind::Languages,
            ] {
                assert!(seen.contains(&kind), "{} never shows {:?}", style.id, kind);
            }
            if style.layout == LayoutShape::SingleColumn {
                assert!(style.side_sections.is_empty());
            }
        }
    }

    #[test]
    fn executive_label_defaults() {
        let exec = style(TemplateId::Executive);
        assert_eq!(
            exec.label_default(LabelKey::Experience),
            Some("Professional History")
        );
        assert_eq!(exec.label_default(LabelKey::Education), None);
        assert!(exec.contact_in_header());
        assert!(!style(TemplateId::Technical).contact_in_header());
    }

    #[test]
    fn color_formats() {
        assert_eq!(INDIGO_500.hex(), "6366F1");
        assert_eq!(INDIGO_500.to_string(), "#6366f1");
        assert_eq!(Rgb::WHITE.unit(), [1.0, 1.0, 1.0]);
        assert_eq!(TextCase::Upper.apply("Skills"), "SKILLS");
    }

    #[test]
    fn executive_sets_entry_titles_in_serif() {
        assert_eq!(style(TemplateId::Executive).entry_font, FontToken::Serif);
        assert_eq!(style(TemplateId::Executive).detail_font, FontToken::Sans);
        assert_eq!(style(TemplateId::Modern).entry_font, FontToken::Sans);
        assert_eq!(style(TemplateId::Classic).entry_font, FontToken::Serif);
    }
}
