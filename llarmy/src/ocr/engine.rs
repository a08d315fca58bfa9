use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::language::LanguageList;
use super::loader::DecodedImage;

/// One text region found by the general-purpose reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Corner points of the text box, clockwise from top-left.
    #[serde(rename = "box")]
    pub region: Vec<[f64; 2]>,
    pub text: String,
    pub confidence: f64,
}

/// Engine tuned for printed material (scans, documents, screenshots).
///
/// Implementations report their own engine failures as
/// `LlarmyError::Tesseract`; that kind is turned into a result string by the
/// extractor, everything else propagates.
#[async_trait]
pub trait PrintedTextEngine: Send + Sync {
    async fn image_to_string(&self, image: &DecodedImage, lang: &str) -> Result<String>;

    /// Startup probe; engines without one are assumed ready.
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Multi-language engine for general images (photos, signs, handwriting).
///
/// Detections come back in the engine's reading order. An image the engine
/// cannot identify is reported as `LlarmyError::UnidentifiedImage`.
#[async_trait]
pub trait GeneralTextEngine: Send + Sync {
    async fn read_text(&self, image: &DecodedImage, langs: &LanguageList)
        -> Result<Vec<Detection>>;

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
