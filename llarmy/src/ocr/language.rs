use serde::{Deserialize, Serialize};

/// Tesseract language used when the caller does not name one.
pub const DEFAULT_PRINTED_LANGUAGE: &str = "eng";

/// EasyOCR language used when the caller passes an empty list.
pub const DEFAULT_GENERAL_LANGUAGE: &str = "en";

/// Ordered ISO 639 language codes for the general-purpose reader.
///
/// Entries are trimmed and blanks dropped; a list left empty falls back to
/// `["en"]`, so an instance is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct LanguageList(Vec<String>);

impl LanguageList {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let codes: Vec<String> = codes
            .into_iter()
            .map(|code| code.as_ref().trim().to_string())
            .filter(|code| !code.is_empty())
            .collect();

        if codes.is_empty() {
            Self(vec![DEFAULT_GENERAL_LANGUAGE.to_string()])
        } else {
            Self(codes)
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for LanguageList {
    fn default() -> Self {
        Self(vec![DEFAULT_GENERAL_LANGUAGE.to_string()])
    }
}

impl From<Vec<String>> for LanguageList {
    fn from(codes: Vec<String>) -> Self {
        Self::new(codes)
    }
}

impl From<LanguageList> for Vec<String> {
    fn from(list: LanguageList) -> Self {
        list.0
    }
}

impl std::fmt::Display for LanguageList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

/// Tesseract language for the printed path; blank input means the default.
pub(crate) fn printed_language(lang: Option<&str>) -> &str {
    lang.map(str::trim)
        .filter(|lang| !lang.is_empty())
        .unwrap_or(DEFAULT_PRINTED_LANGUAGE)
}
