#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};

use llarmy::error::{LlarmyError, Result};
use llarmy::ocr::{
    DecodedImage, Detection, GeneralTextEngine, LanguageList, OcrTools, PrintedTextEngine,
};

/// A small white page, encoded in `format`.
pub fn page_bytes(format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 32, Luma([255u8])));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format)
        .unwrap_or_else(|e| panic!("Failed to encode fixture as {format:?}: {e}"));
    buffer.into_inner()
}

pub fn png_base64() -> String {
    STANDARD.encode(page_bytes(ImageFormat::Png))
}

pub fn png_data_uri() -> String {
    format!("data:image/png;base64,{}", png_base64())
}

pub fn jpeg_base64() -> String {
    STANDARD.encode(page_bytes(ImageFormat::Jpeg))
}

/// Write a PNG page into `dir` and return its path.
pub fn write_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, page_bytes(ImageFormat::Png))
        .unwrap_or_else(|e| panic!("Failed to write fixture '{name}': {e}"));
    path
}

/// Printed engine returning a canned result and remembering the language it was asked for.
pub struct ScriptedPrinted {
    result: fn() -> Result<String>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedPrinted {
    pub fn returning(result: fn() -> Result<String>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn last_language(&self) -> Option<String> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PrintedTextEngine for ScriptedPrinted {
    async fn image_to_string(&self, _image: &DecodedImage, lang: &str) -> Result<String> {
        self.calls.lock().unwrap().push(lang.to_string());
        (self.result)()
    }
}

/// General engine returning canned detections and remembering the language lists.
pub struct ScriptedGeneral {
    result: fn() -> Result<Vec<Detection>>,
    pub calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedGeneral {
    pub fn returning(result: fn() -> Result<Vec<Detection>>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn last_languages(&self) -> Option<Vec<String>> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GeneralTextEngine for ScriptedGeneral {
    async fn read_text(&self, _image: &DecodedImage, langs: &LanguageList) -> Result<Vec<Detection>> {
        self.calls.lock().unwrap().push(langs.as_slice().to_vec());
        (self.result)()
    }
}

pub fn detection(text: &str) -> Detection {
    Detection {
        region: vec![[0.0, 0.0], [10.0, 0.0], [10.0, 5.0], [0.0, 5.0]],
        text: text.to_string(),
        confidence: 0.9,
    }
}

pub fn tools(printed: Arc<ScriptedPrinted>, general: Arc<ScriptedGeneral>) -> OcrTools {
    OcrTools::new(printed, general)
}

pub fn unreadable_image() -> Result<Vec<Detection>> {
    Err(LlarmyError::UnidentifiedImage(
        "cannot identify image file".to_string(),
    ))
}
