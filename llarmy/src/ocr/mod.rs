//! OCR equipment for agents.
//!
//! Two engines sit behind small traits so the tool layer never depends on a
//! concrete backend:
//! - `PrintedTextEngine`, implemented locally by `TesseractEngine` (leptess)
//! - `GeneralTextEngine`, implemented by `EasyOcrClient`, which talks to an
//!   EasyOCR reader over HTTP
//!
//! Inputs are normalized by the loader into a `DecodedImage` first; engines
//! only ever see decoded images. Results come back as an `Extraction` and are
//! rendered to the single result string agents expect at the tool boundary.
//!
//! # Usage
//!
//! ```rust,ignore
//! let tools = OcrTools::from_config(&config.ocr)?;
//! let text = tools.printed_material_extract_text("./scan.png", None).await?;
//! ```

mod easyocr;
mod engine;
mod extraction;
mod language;
mod loader;
mod tesseract;
mod tools;

pub use easyocr::EasyOcrClient;
pub use engine::{Detection, GeneralTextEngine, PrintedTextEngine};
pub use extraction::{extract_general, extract_printed, Backend, Extraction};
pub use language::{LanguageList, DEFAULT_GENERAL_LANGUAGE, DEFAULT_PRINTED_LANGUAGE};
pub use loader::{load, DecodedImage, ImageInput, InputKind};
pub use tesseract::TesseractEngine;
pub use tools::OcrTools;
