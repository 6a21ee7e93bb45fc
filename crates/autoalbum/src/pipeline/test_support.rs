//! Fake collaborators shared by the pipeline and batch unit tests.

use std::collections::VecDeque;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::enricher::{CompletionError, CompletionService, Enricher};
use crate::labeler::PhotoLabeler;
use crate::processor::TextExtractor;
use crate::storage::Relocator;

use super::runner::Pipeline;

pub struct FixedExtractor(pub String);

impl TextExtractor for FixedExtractor {
    fn extract(&self, _image: &[u8]) -> String {
        self.0.clone()
    }
}

pub struct CountingLabeler {
    pub labels: Vec<String>,
    pub calls: Arc<AtomicUsize>,
}

impl PhotoLabeler for CountingLabeler {
    fn label(&self, _image: &[u8]) -> Vec<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.labels.clone()
    }
}

/// Answers prompts from a queue, then with `fallback`.
pub struct ScriptedCompletion {
    pub responses: Mutex<VecDeque<Result<String, CompletionError>>>,
    pub fallback: Option<String>,
    pub calls: Arc<AtomicUsize>,
}

impl CompletionService for ScriptedCompletion {
    fn complete(&self, _prompt: &str, _t: f32, _m: u32) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(next) = self.responses.lock().unwrap().pop_front() {
            return next;
        }
        self.fallback.clone().ok_or(CompletionError::EmptyResponse)
    }
}

pub struct Fakes {
    pub completion_calls: Arc<AtomicUsize>,
    pub label_calls: Arc<AtomicUsize>,
}

/// A pipeline whose extractor always returns `text`.
pub fn fake_pipeline(
    text: &str,
    labels: &[&str],
    responses: Vec<Result<String, CompletionError>>,
    archive: &Path,
) -> (Pipeline, Fakes) {
    let completion_calls = Arc::new(AtomicUsize::new(0));
    let label_calls = Arc::new(AtomicUsize::new(0));

    let pipeline = Pipeline::new(
        Box::new(FixedExtractor(text.to_string())),
        Box::new(CountingLabeler {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            calls: Arc::clone(&label_calls),
        }),
        Enricher::new(Box::new(ScriptedCompletion {
            responses: Mutex::new(responses.into()),
            fallback: None,
            calls: Arc::clone(&completion_calls),
        })),
        Relocator::new(archive),
    );

    (
        pipeline,
        Fakes {
            completion_calls,
            label_calls,
        },
    )
}

pub fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

pub fn jpeg_bytes() -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        8,
        8,
        image::Rgb([90, 90, 90]),
    ));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

pub fn write_jpeg(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, jpeg_bytes()).unwrap();
    path
}
