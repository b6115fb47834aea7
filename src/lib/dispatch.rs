//! Template and format dispatch.
//!
//! A [`Dispatcher`] resolves a template identifier and an output format
//! selector, merges per-call labels over the configured ones and hands the
//! document to exactly one renderer. Renderer errors come back unchanged.
//!
//! ```rust
//! use cvforge::{CanonicalDocument, Dispatcher, Labels, OutputFormat, Rendered};
//!
//! let dispatcher = Dispatcher::default();
//! let doc = CanonicalDocument::new("Alex Morgan");
//! let rendered = dispatcher.render(&doc, "classic", "docx", &Labels::new(), None).unwrap();
//! match rendered {
//!     Rendered::Binary(file) => assert_eq!(file.file_name, "Alex_Morgan_CV.docx"),
//!     Rendered::Preview(_) => unreachable!(),
//! }
//! assert_eq!("pdf".parse::<OutputFormat>().unwrap(), OutputFormat::Page);
//! ```

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::labels::Labels;
use crate::model::CanonicalDocument;
use crate::pdf::PageReport;
use crate::photo::PhotoAsset;
use crate::preview::VisualTree;
use crate::templates::{self, TemplateStyle};
use crate::{docx, pdf, preview, RenderedFile};
use log::debug;
use std::fmt;
use std::str::FromStr;

/// The three output surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Preview,
    Page,
    Docx,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Preview, OutputFormat::Page, OutputFormat::Docx];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Preview => "preview",
            OutputFormat::Page => "page",
            OutputFormat::Docx => "docx",
        }
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Preview => "html",
            OutputFormat::Page => "pdf",
            OutputFormat::Docx => "docx",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            OutputFormat::Preview => "text/html",
            OutputFormat::Page => "application/pdf",
            OutputFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preview" => Ok(OutputFormat::Preview),
            "page" | "pdf" => Ok(OutputFormat::Page),
            "docx" => Ok(OutputFormat::Docx),
            other => Err(RenderError::UnknownFormat(other.to_string())),
        }
    }
}

/// What [`Dispatcher::render`] produced.
#[derive(Debug, Clone)]
pub enum Rendered {
    Preview(VisualTree),
    Binary(RenderedFile),
}

/// Stateless router from (template, format) to a renderer.
///
/// Holds only the immutable configuration, so one dispatcher can serve
/// concurrent renders.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    config: RenderConfig,
}

impl Dispatcher {
    pub fn new(config: RenderConfig) -> Self {
        Dispatcher { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn labels(&self, labels: &Labels) -> Labels {
        labels.clone().or(&self.config.labels)
    }

    /// Renders `doc` with the named template into the selected format.
    ///
    /// The template is resolved first, then the format; neither failure runs a
    /// renderer.
    pub fn render(
        &self,
        doc: &CanonicalDocument,
        template_id: &str,
        format: &str,
        labels: &Labels,
        photo: Option<&PhotoAsset>,
    ) -> Result<Rendered, RenderError> {
        let style = templates::resolve(template_id)?;
        let format: OutputFormat = format.parse()?;
        debug!("Dispatching {} to the {} renderer", style.id, format);
        match format {
            OutputFormat::Preview => Ok(Rendered::Preview(self.preview_with(doc, style, labels, photo))),
            OutputFormat::Page => {
                let (file, _) = self.page_with(doc, style, labels, photo)?;
                Ok(Rendered::Binary(file))
            }
            OutputFormat::Docx => Ok(Rendered::Binary(self.docx_with(doc, style, labels)?)),
        }
    }

    pub fn render_preview(
        &self,
        doc: &CanonicalDocument,
        template_id: &str,
        labels: &Labels,
        photo: Option<&PhotoAsset>,
    ) -> Result<VisualTree, RenderError> {
        let style = templates::resolve(template_id)?;
        Ok(self.preview_with(doc, style, labels, photo))
    }

    pub fn render_page(
        &self,
        doc: &CanonicalDocument,
        template_id: &str,
        labels: &Labels,
        photo: Option<&PhotoAsset>,
    ) -> Result<RenderedFile, RenderError> {
        self.render_page_with_report(doc, template_id, labels, photo)
            .map(|(file, _)| file)
    }

    /// Like [`Dispatcher::render_page`], also returning what did not fit.
    pub fn render_page_with_report(
        &self,
        doc: &CanonicalDocument,
        template_id: &str,
        labels: &Labels,
        photo: Option<&PhotoAsset>,
    ) -> Result<(RenderedFile, PageReport), RenderError> {
        let style = templates::resolve(template_id)?;
        self.page_with(doc, style, labels, photo)
    }

    pub fn render_word_processor(
        &self,
        doc: &CanonicalDocument,
        template_id: &str,
        labels: &Labels,
    ) -> Result<RenderedFile, RenderError> {
        let style = templates::resolve(template_id)?;
        self.docx_with(doc, style, labels)
    }

    fn preview_with(
        &self,
        doc: &CanonicalDocument,
        style: &TemplateStyle,
        labels: &Labels,
        photo: Option<&PhotoAsset>,
    ) -> VisualTree {
        preview::render(doc, style, &self.labels(labels), photo)
    }

    fn page_with(
        &self,
        doc: &CanonicalDocument,
        style: &TemplateStyle,
        labels: &Labels,
        photo: Option<&PhotoAsset>,
    ) -> Result<(RenderedFile, PageReport), RenderError> {
        pdf::render(doc, style, &self.labels(labels), photo, &self.config)
    }

    fn docx_with(
        &self,
        doc: &CanonicalDocument,
        style: &TemplateStyle,
        labels: &Labels,
    ) -> Result<RenderedFile, RenderError> {
        docx::render(doc, style, &self.labels(labels), self.config.page.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config_from_source, ConfigSource};
    use crate::labels::LabelKey;
    use crate::preview::Role;
    use crate::templates::SectionKind;

    fn jane() -> CanonicalDocument {
        let mut doc = CanonicalDocument::new("Jane Doe");
        doc.personal_info.title = "Engineer".to_string();
        doc.skills = vec!["Go".to_string()];
        doc
    }

    #[test]
    fn dispatcher_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Dispatcher>();
    }

    #[test]
    fn format_selectors() {
        assert_eq!("preview".parse::<OutputFormat>().unwrap(), OutputFormat::Preview);
        assert_eq!("page".parse::<OutputFormat>().unwrap(), OutputFormat::Page);
        assert_eq!("pdf".parse::<OutputFormat>().unwrap(), OutputFormat::Page);
        assert_eq!("docx".parse::<OutputFormat>().unwrap(), OutputFormat::Docx);
        let err = "rtf".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, RenderError::UnknownFormat(ref f) if f == "rtf"));
        assert_eq!(OutputFormat::Docx.extension(), "docx");
        assert_eq!(OutputFormat::Preview.media_type(), "text/html");
    }

    #[test]
    fn unknown_template_is_checked_before_format() {
        let err = Dispatcher::default()
            .render(&jane(), "nonexistent", "rtf", &Labels::new(), None)
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownTemplate { .. }));

        let err = Dispatcher::default()
            .render(&jane(), "modern", "rtf", &Labels::new(), None)
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownFormat(_)));
    }

    #[test]
    fn every_format_is_routed() {
        let dispatcher = Dispatcher::default();
        for format in OutputFormat::ALL {
            let rendered = dispatcher
                .render(&jane(), "modern", format.as_str(), &Labels::new(), None)
                .unwrap();
            match (format, rendered) {
                (OutputFormat::Preview, Rendered::Preview(tree)) => {
                    assert_eq!(tree.find_all(Role::SkillTag).len(), 1);
                }
                (OutputFormat::Page, Rendered::Binary(file)) => {
                    assert!(file.bytes.starts_with(b"%PDF-"));
                    assert_eq!(file.file_name, "Jane_Doe_CV.pdf");
                }
                (OutputFormat::Docx, Rendered::Binary(file)) => {
                    assert!(file.bytes.starts_with(b"PK"));
                    assert_eq!(file.file_name, "Jane_Doe_CV.docx");
                }
                (format, other) => panic!("{} produced {:?}", format, other),
            }
        }
    }

    #[test]
    fn configured_labels_apply_below_call_labels() {
        let config = load_config_from_source(ConfigSource::Embedded(
            r#"
            [labels]
            sectionSkills = "Kenntnisse"
            sectionLanguages = "Sprachen"
            "#,
        ));
        let dispatcher = Dispatcher::new(config);
        let mut doc = jane();
        doc.languages = vec![crate::model::LanguageEntry {
            language: "German".to_string(),
            level: "C1".to_string(),
            ..Default::default()
        }];

        let tree = dispatcher
            .render_preview(&doc, "classic", &Labels::new().with(LabelKey::Skills, "Stack"), None)
            .unwrap();
        let skills = tree.section(SectionKind::Skills).unwrap();
        assert!(skills.text_content().contains("STACK"));
        let languages = tree.section(SectionKind::Languages).unwrap();
        assert!(languages.text_content().contains("SPRACHEN"));
    }
}
