//! Error taxonomy shared by every renderer and the dispatcher.
//!
//! Renderers never swallow or translate these: whatever a renderer returns is
//! what the caller sees. None of them is worth retrying inside the core.

use std::fmt;

/// The kind of external asset a render depended on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Font,
    Photo,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Font => write!(f, "font"),
            AssetKind::Photo => write!(f, "photo"),
        }
    }
}

/// Represents errors that can occur while resolving a template or producing
/// one of the output artifacts.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The template identifier is not registered. A caller bug.
    #[error("Unknown template '{id}' (expected one of: {expected})")]
    UnknownTemplate { id: String, expected: String },

    /// The output format selector is not one of preview, page or docx.
    #[error("Unknown output format '{0}' (expected preview, page or docx)")]
    UnknownFormat(String),

    /// A font or photo asset could not be located or decoded.
    #[error("Failed to load {kind} '{name}': {message}")]
    AssetLoad {
        kind: AssetKind,
        name: String,
        message: String,
    },

    /// The canonical document could not be read.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// The PDF or DOCX writer failed to produce bytes.
    #[error("Failed to write {format} output: {message}")]
    Serialize {
        format: &'static str,
        message: String,
    },
}

impl RenderError {
    pub fn font(name: impl Into<String>, message: impl Into<String>) -> Self {
        RenderError::AssetLoad {
            kind: AssetKind::Font,
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn photo(name: impl Into<String>, message: impl Into<String>) -> Self {
        RenderError::AssetLoad {
            kind: AssetKind::Photo,
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn serialize(format: &'static str, message: impl Into<String>) -> Self {
        RenderError::Serialize {
            format,
            message: message.into(),
        }
    }

    /// A short hint for a human, in the spirit of the CLI's error output.
    pub fn suggestion(&self) -> &'static str {
        match self {
            RenderError::UnknownTemplate { .. } => {
                "Use one of the registered template ids, or fall back to 'modern'"
            }
            RenderError::UnknownFormat(_) => "Pass 'preview', 'page' (or 'pdf') or 'docx'",
            RenderError::AssetLoad {
                kind: AssetKind::Font,
                ..
            } => "Check the [fonts] section of the configuration and the font search paths",
            RenderError::AssetLoad {
                kind: AssetKind::Photo,
                ..
            } => "Supply a PNG, JPEG, GIF or WebP image, raw or as a base64 data URL",
            RenderError::MalformedDocument(_) => {
                "The document must be JSON with at least personalInfo.name"
            }
            RenderError::Serialize { .. } => "Check available memory and try a smaller document",
        }
    }
}
