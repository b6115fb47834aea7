//! The canonical, template-independent résumé document.
//!
//! This is the single value every renderer reads. It knows nothing about
//! pages, columns or fonts. Field names serialize in camelCase so documents
//! produced by the editing front end load unchanged:
//!
//! ```rust
//! use cvforge::model::CanonicalDocument;
//!
//! let doc = CanonicalDocument::from_json(r#"{
//!     "personalInfo": { "name": "Jane Doe", "title": "Engineer" },
//!     "skills": ["Go"]
//! }"#).unwrap();
//! assert_eq!(doc.personal_info.name, "Jane Doe");
//! assert!(doc.experience.is_empty());
//! ```

use crate::error::RenderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Caller-assigned list item identifier. The front end uses numbers, other
/// producers use strings; both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Number(u64),
    Text(String),
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Number(n) => write!(f, "{}", n),
            EntryId::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub summary: String,
}

impl PersonalInfo {
    /// Non-blank contact fields, in display order.
    pub fn contact_items(&self) -> Vec<&str> {
        [&self.email, &self.phone, &self.location]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub id: Option<EntryId>,
    pub role: String,
    pub company: String,
    pub period: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub id: Option<EntryId>,
    pub school: String,
    pub degree: String,
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageEntry {
    pub id: Option<EntryId>,
    pub language: String,
    pub level: String,
}

/// The five registered template identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    #[default]
    Modern,
    Classic,
    Technical,
    Creative,
    Executive,
}

impl TemplateId {
    pub const ALL: [TemplateId; 5] = [
        TemplateId::Modern,
        TemplateId::Classic,
        TemplateId::Technical,
        TemplateId::Creative,
        TemplateId::Executive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Modern => "modern",
            TemplateId::Classic => "classic",
            TemplateId::Technical => "technical",
            TemplateId::Creative => "creative",
            TemplateId::Executive => "executive",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| RenderError::UnknownTemplate {
                id: s.to_string(),
                expected: TemplateId::ALL
                    .iter()
                    .map(|id| id.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// The single source of truth handed to every renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalDocument {
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub languages: Vec<LanguageEntry>,
    #[serde(default)]
    pub template: TemplateId,
}

impl CanonicalDocument {
    /// A document with only a name; every other field empty.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            personal_info: PersonalInfo {
                name: name.into(),
                ..PersonalInfo::default()
            },
            experience: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            languages: Vec::new(),
            template: TemplateId::default(),
        }
    }

    /// The document a fresh editor session starts from.
    pub fn placeholder() -> Self {
        Self {
            personal_info: PersonalInfo {
                name: "Your Name".to_string(),
                title: "Professional Title".to_string(),
                email: "email@example.com".to_string(),
                phone: "+1 234 567 890".to_string(),
                location: "City, Country".to_string(),
                summary: "A brief summary of your professional background and goals.".to_string(),
            },
            skills: vec![
                "Skill 1".to_string(),
                "Skill 2".to_string(),
                "Skill 3".to_string(),
            ],
            ..Self::new("")
        }
    }

    /// Parses a document produced by the editing front end.
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        serde_json::from_str(json).map_err(|e| RenderError::MalformedDocument(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Switches the rendering selector. Content is never touched.
    pub fn switch_template(&mut self, template: TemplateId) {
        self.template = template;
    }

    /// Appends skills that are not already present, keeping first-seen order.
    /// Blank entries are dropped and entries are trimmed. Returns how many
    /// skills were added.
    pub fn merge_unique_skills<I, S>(&mut self, incoming: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.skills.len();
        for skill in incoming {
            let skill = skill.as_ref().trim();
            if skill.is_empty() || self.skills.iter().any(|s| s == skill) {
                continue;
            }
            self.skills.push(skill.to_string());
        }
        self.skills.len() - before
    }
}
