//! Section recipe shared by all renderers.
//!
//! [`Recipe::build`] decides which sections exist for a document and where
//! they go, using only the template's region assignment. Empty sections are
//! dropped here, once, so every renderer shows the same sections in the same
//! order with the same headings.

use crate::labels::{LabelKey, Labels};
use crate::model::{CanonicalDocument, EducationEntry, ExperienceEntry, LanguageEntry};
use crate::templates::{Region, SectionKind, SummaryStyle, TemplateStyle};

/// Content of one section, borrowed from the document.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody<'a> {
    Contact(Vec<&'a str>),
    Summary(&'a str),
    Experience(&'a [ExperienceEntry]),
    Education(&'a [EducationEntry]),
    /// Non-blank skills, trimmed, in document order.
    Skills(Vec<&'a str>),
    Languages(&'a [LanguageEntry]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section<'a> {
    pub kind: SectionKind,
    /// Resolved label, before the template's heading case is applied.
    /// `None` for untitled presentations such as the summary callout.
    pub heading: Option<String>,
    pub body: SectionBody<'a>,
}

impl Section<'_> {
    pub fn entry_count(&self) -> usize {
        match &self.body {
            SectionBody::Contact(items) => items.len(),
            SectionBody::Summary(_) => 1,
            SectionBody::Experience(entries) => entries.len(),
            SectionBody::Education(entries) => entries.len(),
            SectionBody::Skills(skills) => skills.len(),
            SectionBody::Languages(entries) => entries.len(),
        }
    }
}

/// Name, title and header-level contact details.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderPlan<'a> {
    pub name: &'a str,
    pub title: Option<&'a str>,
    /// Empty when the template shows contact details as a section.
    pub contact: Vec<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe<'a> {
    pub header: HeaderPlan<'a>,
    pub main: Vec<Section<'a>>,
    pub side: Vec<Section<'a>>,
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn build_section<'a>(
    kind: SectionKind,
    doc: &'a CanonicalDocument,
    style: &TemplateStyle,
    labels: &Labels,
) -> Option<Section<'a>> {
    let label = |key| Some(labels.resolve(key, style.label_default(key)));
    let (heading, body) = match kind {
        SectionKind::Contact => {
            let items = doc.personal_info.contact_items();
            if items.is_empty() {
                return None;
            }
            (label(LabelKey::Contact), SectionBody::Contact(items))
        }
        SectionKind::Summary => {
            let summary = non_blank(&doc.personal_info.summary)?;
            let heading = match style.summary {
                SummaryStyle::Titled => label(style.summary_label),
                SummaryStyle::Callout | SummaryStyle::Quote => None,
            };
            (heading, SectionBody::Summary(summary))
        }
        SectionKind::Experience if !doc.experience.is_empty() => (
            label(LabelKey::Experience),
            SectionBody::Experience(&doc.experience),
        ),
        SectionKind::Education if !doc.education.is_empty() => (
            label(LabelKey::Education),
            SectionBody::Education(&doc.education),
        ),
        SectionKind::Skills => {
            let skills: Vec<&str> = doc.skills.iter().filter_map(|s| non_blank(s)).collect();
            if skills.is_empty() {
                return None;
            }
            (label(LabelKey::Skills), SectionBody::Skills(skills))
        }
        SectionKind::Languages if !doc.languages.is_empty() => (
            label(LabelKey::Languages),
            SectionBody::Languages(&doc.languages),
        ),
        _ => return None,
    };
    Some(Section {
        kind,
        heading,
        body,
    })
}

impl<'a> Recipe<'a> {
    pub fn build(doc: &'a CanonicalDocument, style: &TemplateStyle, labels: &Labels) -> Self {
        let info = &doc.personal_info;
        let header = HeaderPlan {
            name: info.name.trim(),
            title: non_blank(&info.title),
            contact: if style.contact_in_header() {
                info.contact_items()
            } else {
                Vec::new()
            },
        };
        let collect = |kinds: &[SectionKind]| -> Vec<Section<'a>> {
            kinds
                .iter()
                .filter_map(|kind| build_section(*kind, doc, style, labels))
                .collect()
        };
        Recipe {
            header,
            main: collect(style.main_sections),
            side: collect(style.side_sections),
        }
    }

    pub fn region(&self, region: Region) -> &[Section<'a>] {
        match region {
            Region::Main => &self.main,
            Region::Side => &self.side,
        }
    }

    /// All sections as one flow, for renderers without regions. Contact
    /// details are left out; they belong to the header of a flow document.
    pub fn reading_order(&self) -> Vec<&Section<'a>> {
        let mut sections: Vec<&Section<'a>> = self
            .main
            .iter()
            .chain(self.side.iter())
            .filter(|s| s.kind != SectionKind::Contact)
            .collect();
        sections.sort_by_key(|s| s.kind.reading_rank());
        sections
    }

    pub fn find(&self, kind: SectionKind) -> Option<&Section<'a>> {
        self.main
            .iter()
            .chain(self.side.iter())
            .find(|s| s.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TemplateId;
    use crate::templates;

    fn jane() -> CanonicalDocument {
        let mut doc = CanonicalDocument::new("Jane Doe");
        doc.personal_info.title = "Engineer".to_string();
        doc.skills = vec!["Go".to_string()];
        doc
    }

    #[test]
    fn empty_sections_are_dropped() {
        let doc = jane();
        let recipe = Recipe::build(&doc, templates::style(TemplateId::Modern), &Labels::new());
        assert!(recipe.main.is_empty());
        let kinds: Vec<_> = recipe.side.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SectionKind::Skills]);
        assert_eq!(recipe.header.title, Some("Engineer"));
        assert!(recipe.header.contact.is_empty());
    }

    #[test]
    fn name_only_document_has_no_sections_anywhere() {
        let doc = CanonicalDocument::new("Solo");
        for style in templates::all() {
            let recipe = Recipe::build(&doc, style, &Labels::new());
            assert!(recipe.main.is_empty(), "{}", style.id);
            assert!(recipe.side.is_empty(), "{}", style.id);
            assert_eq!(recipe.header.name, "Solo");
            assert_eq!(recipe.header.title, None);
        }
    }

    #[test]
    fn headings_follow_label_resolution() {
        let mut doc = jane();
        doc.experience.push(ExperienceEntry {
            role: "Dev".to_string(),
            ..ExperienceEntry::default()
        });
        let exec = templates::style(TemplateId::Executive);
        let recipe = Recipe::build(&doc, exec, &Labels::new());
        let exp = recipe.find(SectionKind::Experience).unwrap();
        assert_eq!(exp.heading.as_deref(), Some("Professional History"));

        let labels = Labels::new().with(LabelKey::Experience, "Berufserfahrung");
        let recipe = Recipe::build(&doc, exec, &labels);
        let exp = recipe.find(SectionKind::Experience).unwrap();
        assert_eq!(exp.heading.as_deref(), Some("Berufserfahrung"));
    }

    #[test]
    fn summary_is_untitled_for_callout_and_quote() {
        let mut doc = jane();
        doc.personal_info.summary = "Builds things.".to_string();
        for (id, titled) in [
            (TemplateId::Modern, true),
            (TemplateId::Technical, false),
            (TemplateId::Executive, false),
        ] {
            let recipe = Recipe::build(&doc, templates::style(id), &Labels::new());
            let summary = recipe.find(SectionKind::Summary).unwrap();
            assert_eq!(summary.heading.is_some(), titled, "{}", id);
        }
        let recipe = Recipe::build(&doc, templates::style(TemplateId::Modern), &Labels::new());
        assert_eq!(
            recipe.find(SectionKind::Summary).unwrap().heading.as_deref(),
            Some("About")
        );
    }

    #[test]
    fn contact_goes_to_sidebar_section_for_sidebar_templates() {
        let mut doc = jane();
        doc.personal_info.email = "jane@example.com".to_string();
        let recipe = Recipe::build(&doc, templates::style(TemplateId::Creative), &Labels::new());
        assert!(recipe.header.contact.is_empty());
        assert_eq!(recipe.side[0].kind, SectionKind::Contact);

        let recipe = Recipe::build(&doc, templates::style(TemplateId::Classic), &Labels::new());
        assert_eq!(recipe.header.contact, vec!["jane@example.com"]);
        assert!(recipe.find(SectionKind::Contact).is_none());
    }

    #[test]
    fn reading_order_is_fixed() {
        let mut doc = jane();
        doc.personal_info.summary = "S".to_string();
        doc.personal_info.phone = "1".to_string();
        doc.education.push(EducationEntry::default());
        doc.experience.push(ExperienceEntry::default());
        doc.languages.push(LanguageEntry::default());
        for style in templates::all() {
            let recipe = Recipe::build(&doc, style, &Labels::new());
            let kinds: Vec<_> = recipe.reading_order().iter().map(|s| s.kind).collect();
            assert_eq!(
                kinds,
                vec![
                    SectionKind::Summary,
                    SectionKind::Experience,
                    SectionKind::Education,
                    SectionKind::Skills,
                    SectionKind::Languages
                ],
                "{}",
                style.id
            );
        }
    }

    #[test]
    fn blank_skills_are_dropped() {
        let mut doc = jane();
        doc.skills = vec![String::new(), "   ".to_string()];
        for style in templates::all() {
            let recipe = Recipe::build(&doc, style, &Labels::new());
            assert!(recipe.find(SectionKind::Skills).is_none(), "{}", style.id);
        }

        doc.skills = vec![" Go ".to_string(), "\t".to_string(), "Rust".to_string()];
        let recipe = Recipe::build(&doc, templates::style(TemplateId::Modern), &Labels::new());
        let skills = recipe.find(SectionKind::Skills).unwrap();
        assert_eq!(skills.body, SectionBody::Skills(vec!["Go", "Rust"]));
        assert_eq!(skills.entry_count(), 2);
    }
}
