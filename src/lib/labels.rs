//! Localized section labels.
//!
//! A caller hands in a [`Labels`] value with any subset of the seven keys set.
//! Resolution never consults global state: caller label, then the template's
//! own default, then the static English table below. Blank caller labels
//! count as missing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKey {
    Experience,
    Education,
    Skills,
    Languages,
    Profile,
    Contact,
    About,
}

impl LabelKey {
    pub const ALL: [LabelKey; 7] = [
        LabelKey::Experience,
        LabelKey::Education,
        LabelKey::Skills,
        LabelKey::Languages,
        LabelKey::Profile,
        LabelKey::Contact,
        LabelKey::About,
    ];

    /// The key as it appears in label maps and configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelKey::Experience => "sectionExperience",
            LabelKey::Education => "sectionEducation",
            LabelKey::Skills => "sectionSkills",
            LabelKey::Languages => "sectionLanguages",
            LabelKey::Profile => "sectionProfile",
            LabelKey::Contact => "sectionContact",
            LabelKey::About => "sectionAbout",
        }
    }

    pub fn from_key(key: &str) -> Option<LabelKey> {
        LabelKey::ALL.into_iter().find(|k| k.as_str() == key)
    }

    /// Static English fallback used when neither the caller nor the template
    /// provides a label.
    pub fn english(&self) -> &'static str {
        match self {
            LabelKey::Experience => "Experience",
            LabelKey::Education => "Education",
            LabelKey::Skills => "Skills",
            LabelKey::Languages => "Languages",
            LabelKey::Profile => "Profile",
            LabelKey::Contact => "Contact",
            LabelKey::About => "About",
        }
    }
}

/// Caller-supplied section labels. Every entry is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Labels {
    pub section_experience: Option<String>,
    pub section_education: Option<String>,
    pub section_skills: Option<String>,
    pub section_languages: Option<String>,
    pub section_profile: Option<String>,
    pub section_contact: Option<String>,
    pub section_about: Option<String>,
}

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: LabelKey) -> &Option<String> {
        match key {
            LabelKey::Experience => &self.section_experience,
            LabelKey::Education => &self.section_education,
            LabelKey::Skills => &self.section_skills,
            LabelKey::Languages => &self.section_languages,
            LabelKey::Profile => &self.section_profile,
            LabelKey::Contact => &self.section_contact,
            LabelKey::About => &self.section_about,
        }
    }

    fn slot_mut(&mut self, key: LabelKey) -> &mut Option<String> {
        match key {
            LabelKey::Experience => &mut self.section_experience,
            LabelKey::Education => &mut self.section_education,
            LabelKey::Skills => &mut self.section_skills,
            LabelKey::Languages => &mut self.section_languages,
            LabelKey::Profile => &mut self.section_profile,
            LabelKey::Contact => &mut self.section_contact,
            LabelKey::About => &mut self.section_about,
        }
    }

    /// Builder-style setter.
    pub fn with(mut self, key: LabelKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: LabelKey, value: impl Into<String>) {
        *self.slot_mut(key) = Some(value.into());
    }

    /// The caller's label for `key`, if present and not blank.
    pub fn get(&self, key: LabelKey) -> Option<&str> {
        self.slot(key)
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Fills every missing entry of `self` from `fallback`.
    pub fn or(mut self, fallback: &Labels) -> Labels {
        for key in LabelKey::ALL {
            if self.get(key).is_none() {
                *self.slot_mut(key) = fallback.get(key).map(str::to_string);
            }
        }
        self
    }

    /// Resolves a label: caller entry, then `template_default`, then English.
    pub fn resolve(&self, key: LabelKey, template_default: Option<&str>) -> String {
        self.get(key)
            .or(template_default)
            .unwrap_or_else(|| key.english())
            .to_string()
    }
}
