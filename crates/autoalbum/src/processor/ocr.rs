use std::io::Cursor;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::ProcessError;
use crate::processor::TextExtractor;

const DEFAULT_LANGUAGE: &str = "eng";

/// Tesseract-backed text extractor.
///
/// A fresh engine is initialised per image; the batch is sequential and
/// Tesseract handles are not `Sync`.
pub struct TesseractExtractor {
    data_path: PathBuf,
    language: String,
}

impl TesseractExtractor {
    pub fn new<P: AsRef<Path>>(data_path: P, language: &str) -> Self {
        let language = match language.trim() {
            "" => DEFAULT_LANGUAGE.to_string(),
            lang => lang.to_string(),
        };

        Self {
            data_path: data_path.as_ref().to_path_buf(),
            language,
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Runs OCR over encoded image bytes (any format `image` can decode).
    pub fn recognize(&self, image_data: &[u8]) -> Result<String, ProcessError> {
        let img = image::load_from_memory(image_data)
            .map_err(|e| ProcessError::OcrFailed(format!("Failed to load image: {}", e)))?;

        // leptess reads PNG reliably regardless of the source encoding
        let mut png_data = Vec::new();
        img.write_to(&mut Cursor::new(&mut png_data), image::ImageFormat::Png)
            .map_err(|e| ProcessError::OcrFailed(format!("Failed to convert image: {}", e)))?;

        let data_path = self.data_path.to_str().ok_or_else(|| {
            ProcessError::OcrFailed(format!(
                "Tessdata path is not valid UTF-8: {}",
                self.data_path.display()
            ))
        })?;

        let mut lt = leptess::LepTess::new(Some(data_path), &self.language).map_err(|e| {
            ProcessError::OcrFailed(format!("Failed to initialize Tesseract: {}", e))
        })?;

        lt.set_image_from_mem(&png_data)
            .map_err(|e| ProcessError::OcrFailed(format!("Failed to set image for OCR: {}", e)))?;

        let text = lt
            .get_utf8_text()
            .map_err(|e| ProcessError::OcrFailed(format!("OCR failed: {}", e)))?;

        debug!("Recognized {} characters", text.chars().count());
        Ok(text)
    }
}

impl TextExtractor for TesseractExtractor {
    fn extract(&self, image: &[u8]) -> String {
        let _span = tracing::info_span!("processor.ocr", language = %self.language).entered();

        match self.recognize(image) {
            Ok(text) => text,
            Err(e) => {
                warn!("Text extraction failed, treating image as text-free: {}", e);
                String::new()
            }
        }
    }
}
