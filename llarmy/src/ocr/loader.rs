use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{LlarmyError, Result};

const DATA_URI_PREFIX: &str = "data:image/";

/// Leading characters that mark a string as inline image data rather than a
/// path: the data-URI scheme, then the base64 renderings of the JPEG, PNG,
/// GIF, RIFF (WebP) and BMP magic bytes.
const INLINE_PREFIXES: &[&str] = &[
    DATA_URI_PREFIX,
    "/9j/",
    "iVBOR",
    "R0lGOD",
    "UklGR",
    "Qk",
];

/// How a caller-supplied string should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// A file-system path, absolute or relative to the working directory.
    Path,
    /// Base64 image data, optionally wrapped in a `data:image/...;base64,` URI.
    Base64,
}

impl std::str::FromStr for InputKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "path" => Ok(InputKind::Path),
            "base64" => Ok(InputKind::Base64),
            other => Err(format!("unknown input kind '{other}', expected 'path' or 'base64'")),
        }
    }
}

/// Image source handed to the extractors. Built per request and consumed once.
#[derive(Debug, Clone)]
pub enum ImageInput {
    Path(PathBuf),
    InlineBase64(String),
    Decoded(DynamicImage),
}

impl ImageInput {
    /// Guess the input kind from its leading characters.
    ///
    /// A path that happens to begin with one of the sniffed prefixes is read
    /// as inline data; callers that know better should use [`ImageInput::tagged`].
    /// The string is matched as given; leading whitespace makes it a path.
    pub fn sniff(raw: &str) -> Self {
        if INLINE_PREFIXES.iter().any(|prefix| raw.starts_with(prefix)) {
            ImageInput::InlineBase64(raw.to_string())
        } else {
            ImageInput::Path(PathBuf::from(raw))
        }
    }

    pub fn tagged(raw: &str, kind: InputKind) -> Self {
        match kind {
            InputKind::Path => ImageInput::Path(PathBuf::from(raw)),
            InputKind::Base64 => ImageInput::InlineBase64(raw.to_string()),
        }
    }

    /// Explicit kind when given, sniffing otherwise.
    pub fn resolve(raw: &str, kind: Option<InputKind>) -> Self {
        match kind {
            Some(kind) => Self::tagged(raw, kind),
            None => Self::sniff(raw),
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            ImageInput::Path(_) => "path",
            ImageInput::InlineBase64(_) => "base64",
            ImageInput::Decoded(_) => "decoded",
        }
    }
}

impl From<DynamicImage> for ImageInput {
    fn from(image: DynamicImage) -> Self {
        ImageInput::Decoded(image)
    }
}

/// An in-memory image owned by a single extraction call.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    image: DynamicImage,
}

impl DecodedImage {
    pub fn new(image: DynamicImage) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(LlarmyError::InvalidInput(format!(
                "image has no pixels ({}x{})",
                image.width(),
                image.height()
            )));
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn color(&self) -> ColorType {
        self.image.color()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    /// Re-encode as PNG, the hand-off format for both engines.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut cursor = Cursor::new(&mut output);

        // PNG has no float channels.
        let written = match self.image.color() {
            ColorType::Rgb32F | ColorType::Rgba32F => {
                DynamicImage::ImageRgba8(self.image.to_rgba8()).write_to(&mut cursor, ImageFormat::Png)
            }
            _ => self.image.write_to(&mut cursor, ImageFormat::Png),
        };
        written.map_err(|e| LlarmyError::Internal(format!("Failed to encode image: {e}")))?;

        Ok(output)
    }
}

/// Normalize any supported input into a decoded image.
///
/// Blocking: reads the file system and decodes pixels. Failures are returned
/// to the caller untouched.
pub fn load(input: ImageInput) -> Result<DecodedImage> {
    match input {
        ImageInput::Path(path) => load_path(&path),
        ImageInput::InlineBase64(payload) => load_inline(&payload),
        ImageInput::Decoded(image) => DecodedImage::new(image),
    }
}

fn load_path(path: &Path) -> Result<DecodedImage> {
    if path.as_os_str().is_empty() {
        return Err(LlarmyError::InvalidInput("image path is empty".to_string()));
    }

    let path = absolute_path(path)?;
    tracing::debug!(path = %path.display(), "Loading image from path");

    let image = ImageReader::open(&path)?.with_guessed_format()?.decode()?;
    DecodedImage::new(image)
}

fn load_inline(payload: &str) -> Result<DecodedImage> {
    let bytes = decode_inline(payload)?;
    tracing::debug!(bytes = bytes.len(), "Decoding inline image payload");

    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;
    DecodedImage::new(image)
}

fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn decode_inline(payload: &str) -> Result<Vec<u8>> {
    let payload = payload.trim();

    let encoded = if payload.starts_with(DATA_URI_PREFIX) {
        payload
            .split_once(',')
            .map(|(_, rest)| rest)
            .ok_or_else(|| {
                LlarmyError::InvalidInput("data URI has no ',' before its payload".to_string())
            })?
    } else {
        payload
    };

    // Wrapped base64 (MIME style) carries line breaks.
    let compact: String = encoded.split_ascii_whitespace().collect();
    if compact.is_empty() {
        return Err(LlarmyError::InvalidInput(
            "inline image payload is empty".to_string(),
        ));
    }

    Ok(STANDARD.decode(compact)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([255u8])));
        let mut output = Vec::new();
        img.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
            .unwrap();
        output
    }

    fn jpeg_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(8, 8));
        let mut output = Vec::new();
        img.write_to(&mut Cursor::new(&mut output), ImageFormat::Jpeg)
            .unwrap();
        output
    }

    fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut output = Vec::new();
        img.write_to(&mut Cursor::new(&mut output), ImageFormat::Bmp)
            .unwrap();
        output
    }

    #[test]
    fn sniff_recognizes_inline_prefixes() {
        let png = STANDARD.encode(png_bytes(2, 2));
        assert!(png.starts_with("iVBOR"));
        assert!(matches!(ImageInput::sniff(&png), ImageInput::InlineBase64(_)));

        let jpeg = STANDARD.encode(jpeg_bytes());
        assert!(jpeg.starts_with("/9j/"));
        assert!(matches!(ImageInput::sniff(&jpeg), ImageInput::InlineBase64(_)));

        let bmp = STANDARD.encode(bmp_bytes(2, 2));
        assert!(bmp.starts_with("Qk"));
        assert!(matches!(ImageInput::sniff(&bmp), ImageInput::InlineBase64(_)));

        for raw in ["data:image/png;base64,AAAA", "R0lGODlhAQABAAAAACw=", "UklGRiQAAABXRUJQ"] {
            assert!(
                matches!(ImageInput::sniff(raw), ImageInput::InlineBase64(_)),
                "{raw} should be inline"
            );
        }
    }

    #[test]
    fn sniff_treats_everything_else_as_path() {
        for raw in ["./image_7_vw.jpg", "/tmp/scan.png", "C:\\scans\\a.bmp", "photo.gif"] {
            assert!(
                matches!(ImageInput::sniff(raw), ImageInput::Path(_)),
                "{raw} should be a path"
            );
        }
    }

    #[test]
    fn sniff_does_not_trim() {
        let png = STANDARD.encode(png_bytes(2, 2));
        let padded = format!(" {png}");
        match ImageInput::sniff(&padded) {
            ImageInput::Path(path) => assert_eq!(path, PathBuf::from(&padded)),
            other => panic!("expected a path, got {}", other.kind_label()),
        }
    }

    #[test]
    fn tagged_overrides_sniffing() {
        // A file literally named like a PNG payload.
        let input = ImageInput::resolve("iVBORfile.png", Some(InputKind::Path));
        assert!(matches!(input, ImageInput::Path(_)));

        let input = ImageInput::resolve("iVBORfile.png", None);
        assert!(matches!(input, ImageInput::InlineBase64(_)));
    }

    #[test]
    fn input_kind_parses() {
        assert_eq!("Path".parse::<InputKind>().unwrap(), InputKind::Path);
        assert_eq!("base64".parse::<InputKind>().unwrap(), InputKind::Base64);
        assert!("url".parse::<InputKind>().is_err());
    }

    #[test]
    fn data_uri_payload_is_decoded() {
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(6, 4)));
        let image = load(ImageInput::sniff(&uri)).unwrap();
        assert_eq!((image.width(), image.height()), (6, 4));
        assert_eq!(image.color(), ColorType::L8);
    }

    #[test]
    fn bare_base64_payload_is_decoded() {
        let encoded = STANDARD.encode(jpeg_bytes());
        let image = load(ImageInput::sniff(&encoded)).unwrap();
        assert_eq!((image.width(), image.height()), (8, 8));
    }

    #[test]
    fn bare_bmp_payload_is_decoded() {
        let encoded = STANDARD.encode(bmp_bytes(5, 3));
        let image = load(ImageInput::sniff(&encoded)).unwrap();
        assert_eq!((image.width(), image.height()), (5, 3));
    }

    #[test]
    fn wrapped_base64_payload_is_decoded() {
        let encoded = STANDARD.encode(png_bytes(3, 3));
        let wrapped = encoded
            .as_bytes()
            .chunks(16)
            .map(|chunk| std::str::from_utf8(chunk).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        let image = load(ImageInput::InlineBase64(wrapped)).unwrap();
        assert_eq!(image.width(), 3);
    }

    #[test]
    fn invalid_base64_is_a_decode_failure() {
        let err = load(ImageInput::sniff("iVBOR***not base64***")).unwrap_err();
        assert!(matches!(err, LlarmyError::Base64(_)));
        assert!(err.is_decode_failure());
    }

    #[test]
    fn valid_base64_of_non_image_is_a_decode_failure() {
        let payload = format!("data:image/png;base64,{}", STANDARD.encode(b"plain text"));
        let err = load(ImageInput::sniff(&payload)).unwrap_err();
        assert!(matches!(err, LlarmyError::ImageDecode(_)));
    }

    #[test]
    fn data_uri_without_comma_is_rejected() {
        let err = load(ImageInput::sniff("data:image/png;base64")).unwrap_err();
        assert!(matches!(err, LlarmyError::InvalidInput(_)));
    }

    #[test]
    fn missing_file_is_a_decode_failure() {
        let err = load(ImageInput::sniff("/no/such/file.png")).unwrap_err();
        assert!(matches!(err, LlarmyError::Io(_)));
        assert!(err.is_decode_failure());
    }

    #[test]
    fn empty_path_is_rejected() {
        let err = load(ImageInput::Path(PathBuf::new())).unwrap_err();
        assert!(matches!(err, LlarmyError::InvalidInput(_)));
    }

    #[test]
    fn file_path_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.png");
        std::fs::write(&path, png_bytes(12, 5)).unwrap();

        let image = load(ImageInput::sniff(path.to_str().unwrap())).unwrap();
        assert_eq!((image.width(), image.height()), (12, 5));
    }

    #[test]
    fn file_with_wrong_extension_is_decoded_by_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actually_png.jpg");
        std::fs::write(&path, png_bytes(4, 4)).unwrap();

        let image = load(ImageInput::Path(path)).unwrap();
        assert_eq!(image.width(), 4);
    }

    #[test]
    fn relative_paths_resolve_against_working_directory() {
        let resolved = absolute_path(Path::new("scans/page.png")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("scans/page.png"));
    }

    #[test]
    fn zero_sized_images_are_rejected() {
        let err = DecodedImage::new(DynamicImage::new_luma8(0, 10)).unwrap_err();
        assert!(matches!(err, LlarmyError::InvalidInput(_)));
    }

    #[test]
    fn decoded_input_passes_through() {
        let image = load(ImageInput::from(DynamicImage::new_rgb8(7, 3))).unwrap();
        assert_eq!((image.width(), image.height()), (7, 3));
        assert_eq!(&image.to_png().unwrap()[..4], b"\x89PNG");
    }

    #[test]
    fn float_images_encode_to_png() {
        let image = DecodedImage::new(DynamicImage::new_rgb32f(2, 2)).unwrap();
        assert_eq!(&image.to_png().unwrap()[..4], b"\x89PNG");
    }
}
