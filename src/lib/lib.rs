//! The cvforge library renders one canonical résumé into three outputs: an
//! on-screen preview tree, a fixed-page PDF and a reflowable DOCX. The same
//! document can be shown in five templates (Modern, Classic, Technical,
//! Creative and Executive) and every output shows the same sections, in the
//! same order, with the same text.
//!
//! The document is plain data and knows nothing about templates:
//! ```rust
//! use cvforge::CanonicalDocument;
//! use std::error::Error;
//!
//! fn example() -> Result<(), Box<dyn Error>> {
//!     let doc = CanonicalDocument::from_json(r#"{
//!         "personalInfo": { "name": "Jane Doe", "title": "Engineer" },
//!         "skills": ["Go"]
//!     }"#)?;
//!     let file = cvforge::render_page(&doc, "modern", &cvforge::Labels::new(), None)?;
//!     assert_eq!(file.file_name, "Jane_Doe_CV.pdf");
//!     assert!(file.bytes.starts_with(b"%PDF-"));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! Section labels can be localized per call. Missing or blank labels fall back
//! to the template's own defaults and then to English:
//! ```rust
//! use cvforge::{CanonicalDocument, LabelKey, Labels};
//!
//! let mut doc = CanonicalDocument::new("Jane Doe");
//! doc.skills = vec!["Go".to_string()];
//! let labels = Labels::new().with(LabelKey::Skills, "Kenntnisse");
//! let tree = cvforge::render_preview(&doc, "classic", &labels, None).unwrap();
//! assert!(tree.text_content().contains("KENNTNISSE"));
//! ```
//!
//! Paper size, overflow handling, TrueType families and default labels come
//! from an optional TOML configuration handed to a [`Dispatcher`]:
//! ```toml
//! [page]
//! size = "a4"
//! overflow = "continue"
//!
//! [fonts]
//! sans = "Inter"
//!
//! [labels]
//! sectionExperience = "Berufserfahrung"
//! ```
//!
//! ## Rendering Flow
//! ```text
//! +-------------+     +------------------+     +-------------------+
//! | Canonical   |     | Template tokens  |     | Recipe            |
//! | Document    | --> | (registry)       | --> | sections, regions |
//! |             |     |                  |     | labels, order     |
//! +-------------+     +------------------+     +-------------------+
//!                                                   |
//!            +-------------------+------------------+
//!            v                   v                  v
//!     +-------------+     +-------------+     +-------------+
//!     | Preview     |     | Page        |     | Word        |
//!     | visual tree |     | PDF canvas  |     | DOCX plan   |
//!     +-------------+     +-------------+     +-------------+
//! ```

pub mod canvas;
pub mod config;
pub mod dispatch;
pub mod docx;
pub mod error;
pub mod fonts;
pub mod labels;
pub mod model;
pub mod pdf;
pub mod photo;
pub mod preview;
pub mod recipe;
pub mod templates;

pub use config::RenderConfig;
pub use dispatch::{Dispatcher, OutputFormat, Rendered};
pub use error::{AssetKind, RenderError};
pub use labels::{LabelKey, Labels};
pub use model::{CanonicalDocument, TemplateId};
pub use photo::PhotoAsset;
pub use preview::VisualTree;

/// A finished binary artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
}

/// Output file stem for a person: whitespace runs become `_`, then `_CV`.
///
/// ```rust
/// assert_eq!(cvforge::file_stem("Alex  Morgan"), "Alex_Morgan_CV");
/// assert_eq!(cvforge::file_stem(""), "CV");
/// ```
pub fn file_stem(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    if words.is_empty() {
        return "CV".to_string();
    }
    format!("{}_CV", words.join("_"))
}

pub fn output_file_name(name: &str, format: OutputFormat) -> String {
    format!("{}.{}", file_stem(name), format.extension())
}

/// Builds the preview tree with the default configuration.
pub fn render_preview(
    doc: &CanonicalDocument,
    template_id: &str,
    labels: &Labels,
    photo: Option<&PhotoAsset>,
) -> Result<VisualTree, RenderError> {
    Dispatcher::default().render_preview(doc, template_id, labels, photo)
}

/// Renders a PDF with the default configuration (letter, built-in faces,
/// overflow reported).
pub fn render_page(
    doc: &CanonicalDocument,
    template_id: &str,
    labels: &Labels,
    photo: Option<&PhotoAsset>,
) -> Result<RenderedFile, RenderError> {
    Dispatcher::default().render_page(doc, template_id, labels, photo)
}

/// Renders a DOCX with the default configuration.
pub fn render_word_processor(
    doc: &CanonicalDocument,
    template_id: &str,
    labels: &Labels,
) -> Result<RenderedFile, RenderError> {
    Dispatcher::default().render_word_processor(doc, template_id, labels)
}

/// Renders into the format named by `format` (`preview`, `page`/`pdf` or
/// `docx`) with the default configuration.
pub fn render(
    doc: &CanonicalDocument,
    template_id: &str,
    format: &str,
    labels: &Labels,
    photo: Option<&PhotoAsset>,
) -> Result<Rendered, RenderError> {
    Dispatcher::default().render(doc, template_id, format, labels, photo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stem_collapses_whitespace() {
        assert_eq!(file_stem("Alex Morgan"), "Alex_Morgan_CV");
        assert_eq!(file_stem(" Alex \t Morgan "), "Alex_Morgan_CV");
        assert_eq!(file_stem("José García"), "José_García_CV");
        assert_eq!(file_stem("   "), "CV");
    }

    #[test]
    fn output_names_share_the_stem() {
        assert_eq!(
            output_file_name("Alex Morgan", OutputFormat::Page),
            "Alex_Morgan_CV.pdf"
        );
        assert_eq!(
            output_file_name("Alex Morgan", OutputFormat::Docx),
            "Alex_Morgan_CV.docx"
        );
    }

    #[test]
    fn crate_level_functions_use_defaults() {
        let doc = CanonicalDocument::new("Alex Morgan");
        let pdf = render_page(&doc, "executive", &Labels::new(), None).unwrap();
        let docx = render_word_processor(&doc, "executive", &Labels::new()).unwrap();
        assert_eq!(pdf.media_type, "application/pdf");
        assert!(docx.bytes.starts_with(b"PK"));

        let err = render_page(&doc, "nonexistent", &Labels::new(), None).unwrap_err();
        assert!(matches!(err, RenderError::UnknownTemplate { .. }));
        assert!(matches!(
            render(&doc, "modern", "preview", &Labels::new(), None).unwrap(),
            Rendered::Preview(_)
        ));
    }
}
