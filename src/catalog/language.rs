//! Language media and the visibility filter shared by every page view,
//! the statistics walk and record validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::error::CatalogError;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Sinhala,
    Tamil,
    #[default]
    English,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Sinhala, Language::Tamil, Language::English];

    pub fn code(self) -> &'static str {
        match self {
            Language::Sinhala => "sinhala",
            Language::Tamil => "tamil",
            Language::English => "english",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = CatalogError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "sinhala" => Ok(Language::Sinhala),
            "tamil" => Ok(Language::Tamil),
            "english" => Ok(Language::English),
            other => Err(CatalogError::InvalidLanguage(other.to_string())),
        }
    }
}

/// Filter value chosen by a reader: everything, or one medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LanguageSelector {
    #[default]
    All,
    Only(Language),
}

impl TryFrom<String> for LanguageSelector {
    type Error = CatalogError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<LanguageSelector> for String {
    fn from(selector: LanguageSelector) -> Self {
        selector.to_string()
    }
}

impl FromStr for LanguageSelector {
    type Err = CatalogError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw == "all" {
            return Ok(LanguageSelector::All);
        }
        raw.parse().map(LanguageSelector::Only)
    }
}

impl fmt::Display for LanguageSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageSelector::All => f.write_str("all"),
            LanguageSelector::Only(language) => language.fmt(f),
        }
    }
}

/// Colour and label used to badge a record with its medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayMeta {
    pub language: Language,
    pub label: &'static str,
    pub short_label: &'static str,
    pub color: &'static str,
}

pub fn is_visible(selected: LanguageSelector, record_language: Language) -> bool {
    match selected {
        LanguageSelector::All => true,
        LanguageSelector::Only(language) => language == record_language,
    }
}

pub fn indicator_for(language: Language) -> DisplayMeta {
    match language {
        Language::Sinhala => DisplayMeta {
            language,
            label: "Sinhala",
            short_label: "SI",
            color: "#8e1b3b",
        },
        Language::Tamil => DisplayMeta {
            language,
            label: "Tamil",
            short_label: "TA",
            color: "#e67e22",
        },
        Language::English => DisplayMeta {
            language,
            label: "English",
            short_label: "EN",
            color: "#2563eb",
        },
    }
}

/// Same as [`is_visible`] for raw codes coming off the wire; unknown codes are
/// rejected on either side instead of silently hiding the record.
pub fn is_visible_code(selected: &str, record_language: &str) -> Result<bool, CatalogError> {
    let selected: LanguageSelector = selected.parse()?;
    let record_language: Language = record_language.parse()?;
    Ok(is_visible(selected, record_language))
}

pub fn indicator_for_code(language: &str) -> Result<DisplayMeta, CatalogError> {
    Ok(indicator_for(language.parse()?))
}

/// The single place where an optional language code is validated and
/// defaulted. Absent means English; anything outside the three media fails.
pub fn resolve_language(raw: Option<&str>) -> Result<Language, CatalogError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Language::default()),
        Some(code) => code.parse(),
    }
}
