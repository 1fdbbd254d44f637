//! Language code from the service's supported-language catalog.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A language the conversion service can extract, summarize, and speak.
///
/// The wire form is the service's lowercase code (`"en"`, `"zh-cn"`, ...).
/// Unknown codes are rejected at parse time rather than passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "bn")]
    Bengali,
    #[serde(rename = "bg")]
    Bulgarian,
    #[serde(rename = "cs")]
    Czech,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "nl")]
    Dutch,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "pl")]
    Polish,
    #[serde(rename = "tr")]
    Turkish,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "zh-cn")]
    ChineseSimplified,
}

/// Unknown language code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language code: {0}")]
pub struct UnsupportedLanguage(pub String);

impl Language {
    /// Every language the service accepts.
    pub const ALL: &'static [Language] = &[
        Language::English,
        Language::Bengali,
        Language::Bulgarian,
        Language::Czech,
        Language::French,
        Language::German,
        Language::Spanish,
        Language::Italian,
        Language::Dutch,
        Language::Portuguese,
        Language::Polish,
        Language::Turkish,
        Language::Japanese,
        Language::ChineseSimplified,
    ];

    /// The service's wire code for this language.
    pub const fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Bengali => "bn",
            Language::Bulgarian => "bg",
            Language::Czech => "cs",
            Language::French => "fr",
            Language::German => "de",
            Language::Spanish => "es",
            Language::Italian => "it",
            Language::Dutch => "nl",
            Language::Portuguese => "pt",
            Language::Polish => "pl",
            Language::Turkish => "tr",
            Language::Japanese => "ja",
            Language::ChineseSimplified => "zh-cn",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::English
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.code() == code)
            .ok_or(UnsupportedLanguage(code))
    }
}
