//! Render configuration loaded from TOML.
//!
//! Everything here is optional: a missing file, an unreadable file or invalid
//! TOML all fall back to the built-in defaults, with a warning in the log.
//!
//! # Configuration Structure
//!
//! - `[page]` selects the paper size and what happens when content does not
//!   fit the fixed page.
//! - `[fonts]` maps the three abstract font tokens (`sans`, `serif`, `mono`)
//!   onto installed TrueType families for the PDF output, and lists extra
//!   directories to search. Unset tokens use the built-in PDF faces.
//! - `[labels]` provides section labels using the same keys as the label map
//!   passed per call. Per-call labels take precedence.
//!
//! # Configuration Example
//!
//! ```toml
//! [page]
//! size = "a4"            # "letter" (default) or "a4"
//! overflow = "continue"  # "report" (default) or "continue"
//!
//! [fonts]
//! search_paths = ["./fonts"]
//! sans = "Inter"
//! serif = "Source Serif 4"
//!
//! [labels]
//! sectionExperience = "Berufserfahrung"
//! sectionSkills = "Kenntnisse"
//! ```

use crate::labels::{LabelKey, Labels};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use toml::Value;

/// Configuration source for rendering configuration.
#[derive(Debug, Clone)]
pub enum ConfigSource<'a> {
    /// Use the built-in defaults
    Default,
    /// Load configuration from a file path
    File(&'a str),
    /// Use an in-memory TOML string
    Embedded(&'a str),
}

/// Paper size in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PageSize {
    #[default]
    Letter,
    A4,
}

impl PageSize {
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::A4 => (595.28, 841.89),
        }
    }
}

/// What the page renderer does with content that does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Clip at the region bottom and list the clipped blocks in the report.
    #[default]
    Report,
    /// Continue the region on additional pages with the same geometry.
    Continue,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageConfig {
    pub size: PageSize,
    pub overflow: OverflowPolicy,
}

/// TrueType family overrides for the PDF output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FontConfig {
    pub search_paths: Vec<PathBuf>,
    pub sans: Option<String>,
    pub serif: Option<String>,
    pub mono: Option<String>,
}

impl FontConfig {
    pub fn is_builtin(&self) -> bool {
        self.sans.is_none() && self.serif.is_none() && self.mono.is_none()
    }
}

/// Complete configuration for a [`crate::Dispatcher`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderConfig {
    pub page: PageConfig,
    pub fonts: FontConfig,
    pub labels: Labels,
}

fn parse_page(value: Option<&Value>) -> PageConfig {
    let mut page = PageConfig::default();
    let Some(section) = value else {
        return page;
    };
    match section.get("size").and_then(|v| v.as_str()) {
        Some("letter") | None => {}
        Some("a4") | Some("A4") => page.size = PageSize::A4,
        Some(other) => warn!("Unknown page size '{}', using letter", other),
    }
    match section.get("overflow").and_then(|v| v.as_str()) {
        Some("report") | None => {}
        Some("continue") => page.overflow = OverflowPolicy::Continue,
        Some(other) => warn!("Unknown overflow policy '{}', using report", other),
    }
    page
}

fn family(section: &Value, key: &str) -> Option<String> {
    section
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_fonts(value: Option<&Value>) -> FontConfig {
    let Some(section) = value else {
        return FontConfig::default();
    };
    let search_paths = section
        .get("search_paths")
        .and_then(|v| v.as_array())
        .map(|paths| {
            paths
                .iter()
                .filter_map(|p| p.as_str())
                .map(PathBuf::from)
                .collect()
        })
        .unwrap_or_default();
    FontConfig {
        search_paths,
        sans: family(section, "sans"),
        serif: family(section, "serif"),
        mono: family(section, "mono"),
    }
}

fn parse_labels(value: Option<&Value>) -> Labels {
    let mut labels = Labels::new();
    let Some(table) = value.and_then(|v| v.as_table()) else {
        return labels;
    };
    for (key, value) in table {
        match (LabelKey::from_key(key), value.as_str()) {
            (Some(label_key), Some(text)) => labels.set(label_key, text),
            _ => warn!("Ignoring unknown label entry '{}'", key),
        }
    }
    labels
}

/// Parses a TOML configuration string.
///
/// Invalid TOML yields the default configuration.
///
/// # Example
/// ```rust
/// use cvforge::config::{parse_config_string, OverflowPolicy, PageSize};
///
/// let config = parse_config_string(r#"
/// [page]
/// size = "a4"
/// overflow = "continue"
/// "#);
/// assert_eq!(config.page.size, PageSize::A4);
/// assert_eq!(config.page.overflow, OverflowPolicy::Continue);
/// ```
pub fn parse_config_string(config_str: &str) -> RenderConfig {
    let config: Value = match toml::from_str(config_str) {
        Ok(v) => v,
        Err(e) => {
            warn!("Invalid configuration, using defaults: {}", e);
            return RenderConfig::default();
        }
    };

    RenderConfig {
        page: parse_page(config.get("page")),
        fonts: parse_fonts(config.get("fonts")),
        labels: parse_labels(config.get("labels")),
    }
}

/// Loads the configuration from the given source.
///
/// # Examples
/// ```rust
/// use cvforge::config::{ConfigSource, load_config_from_source, RenderConfig};
///
/// let config = load_config_from_source(ConfigSource::Default);
/// assert_eq!(config, RenderConfig::default());
///
/// // A missing file falls back to the defaults as well.
/// let config = load_config_from_source(ConfigSource::File("missing.toml"));
/// assert_eq!(config, RenderConfig::default());
/// ```
pub fn load_config_from_source(source: ConfigSource) -> RenderConfig {
    match source {
        ConfigSource::Default => RenderConfig::default(),
        ConfigSource::File(path) => {
            let config_path = Path::new(path);
            match fs::read_to_string(config_path) {
                Ok(s) => {
                    debug!("Loaded configuration from {}", config_path.display());
                    parse_config_string(&s)
                }
                Err(e) => {
                    warn!(
                        "Could not read configuration {}: {}; using defaults",
                        config_path.display(),
                        e
                    );
                    RenderConfig::default()
                }
            }
        }
        ConfigSource::Embedded(content) => parse_config_string(content),
    }
}

/// The default configuration as a commented TOML document.
pub fn default_config_toml() -> &'static str {
    r#"# cvforge configuration

[page]
# "letter" or "a4"
size = "letter"
# "report" clips content that does not fit and lists it in the log;
# "continue" adds pages.
overflow = "report"

[fonts]
# Extra directories searched for TrueType fonts, in addition to system fonts.
search_paths = []
# Uncomment to replace the built-in PDF faces with an installed family.
# sans = "Inter"
# serif = "Source Serif 4"
# mono = "JetBrains Mono"

[labels]
# sectionExperience = "Experience"
# sectionEducation = "Education"
# sectionSkills = "Skills"
# sectionLanguages = "Languages"
# sectionProfile = "Profile"
# sectionContact = "Contact"
# sectionAbout = "About"
"#
}
