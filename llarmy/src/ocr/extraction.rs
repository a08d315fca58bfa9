use std::fmt;

use crate::error::{LlarmyError, Result};

use super::engine::{GeneralTextEngine, PrintedTextEngine};
use super::language::{printed_language, LanguageList};
use super::loader::DecodedImage;

const EXTRACTED_PREFIX: &str = "Extracted text: ";
const NO_TEXT_FOUND: &str = "No text found in the image";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Tesseract,
    EasyOcr,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Tesseract => "tesseract",
            Backend::EasyOcr => "EasyOCR",
        }
    }

    fn error_label(&self) -> &'static str {
        match self {
            Backend::Tesseract => "Reading Printed Material Text Error",
            Backend::EasyOcr => "General Purpose Reading Text Module Error",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one extraction call.
///
/// `Display` renders the single result string handed back to agents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Trimmed, non-empty text.
    Text(String),
    Empty,
    /// The backend's own recognition error, absorbed into the result.
    EngineError { backend: Backend, detail: String },
}

impl Extraction {
    pub fn from_raw(raw: &str) -> Self {
        let text = raw.trim();
        if text.is_empty() {
            Extraction::Empty
        } else {
            Extraction::Text(text.to_string())
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Extraction::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Extraction::EngineError { .. })
    }
}

impl fmt::Display for Extraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extraction::Text(text) => writeln!(f, "{EXTRACTED_PREFIX}{text}"),
            Extraction::Empty => f.write_str(NO_TEXT_FOUND),
            Extraction::EngineError { backend, detail } => {
                write!(f, "{} ({}): {}", backend.error_label(), backend.name(), detail)
            }
        }
    }
}

/// Run the printed-material engine. Only Tesseract errors are absorbed.
pub async fn extract_printed(
    engine: &dyn PrintedTextEngine,
    image: &DecodedImage,
    lang: Option<&str>,
) -> Result<Extraction> {
    let lang = printed_language(lang);

    match engine.image_to_string(image, lang).await {
        Ok(raw) => Ok(Extraction::from_raw(&raw)),
        Err(LlarmyError::Tesseract(detail)) => {
            tracing::warn!(lang, %detail, "Tesseract failed to read image");
            Ok(Extraction::EngineError {
                backend: Backend::Tesseract,
                detail,
            })
        }
        Err(e) => Err(e),
    }
}

/// Run the general-purpose engine. Only unidentified-image errors are absorbed.
pub async fn extract_general(
    engine: &dyn GeneralTextEngine,
    image: &DecodedImage,
    langs: &LanguageList,
) -> Result<Extraction> {
    match engine.read_text(image, langs).await {
        Ok(detections) => {
            let joined = detections
                .iter()
                .map(|d| d.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            Ok(Extraction::from_raw(&joined))
        }
        Err(LlarmyError::UnidentifiedImage(detail)) => {
            tracing::warn!(langs = %langs, %detail, "EasyOCR could not identify image");
            Ok(Extraction::EngineError {
                backend: Backend::EasyOcr,
                detail,
            })
        }
        Err(e) => Err(e),
    }
}
