pub mod ocr;

pub use ocr::TesseractExtractor;

/// Turns image bytes into raw text.
///
/// Implementations never fail: an image that cannot be read by the OCR
/// engine yields an empty string, which the classifier treats as a photo.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, image: &[u8]) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedText(&'static str);

    impl TextExtractor for FixedText {
        fn extract(&self, _image: &[u8]) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn test_extractor_is_object_safe() {
        let extractors: Vec<Box<dyn TextExtractor>> = vec![
            Box::new(FixedText("hello world")),
            Box::new(TesseractExtractor::new("/usr/share/tessdata", "eng")),
        ];

        assert_eq!(extractors[0].extract(b""), "hello world");
        assert_eq!(extractors[1].extract(b"not an image"), "");
    }
}
