//! Stand-ins for the OCR engine and the hosted services.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use autoalbum::enricher::{CompletionError, CompletionService};
use autoalbum::labeler::PhotoLabeler;
use autoalbum::processor::TextExtractor;

/// Returns queued texts in call order, then the empty string.
pub struct QueuedExtractor {
    texts: Mutex<VecDeque<String>>,
}

impl QueuedExtractor {
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: Mutex::new(texts.into_iter().map(Into::into).collect()),
        }
    }
}

impl TextExtractor for QueuedExtractor {
    fn extract(&self, _image: &[u8]) -> String {
        self.texts.lock().unwrap().pop_front().unwrap_or_default()
    }
}

/// Labeler returning the same labels for every image.
pub struct FixedLabeler {
    labels: Vec<String>,
    pub calls: Arc<Mutex<usize>>,
}

impl FixedLabeler {
    pub fn new(labels: &[&str]) -> Self {
        Self {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            calls: Arc::new(Mutex::new(0)),
        }
    }
}

impl PhotoLabeler for FixedLabeler {
    fn label(&self, _image: &[u8]) -> Vec<String> {
        *self.calls.lock().unwrap() += 1;
        self.labels.clone()
    }
}

/// One observed completion request.
#[derive(Debug, Clone)]
pub struct Request {
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Completion service that answers by prompt kind.
///
/// Correction echoes the chunk back with a `[fixed]` marker, categorization
/// returns `category` and naming returns `name_reply` verbatim.
pub struct PromptCompletion {
    pub category: String,
    pub name_reply: String,
    pub fail_correction: bool,
    pub requests: Arc<Mutex<Vec<Request>>>,
}

pub const CORRECTION_PREFIX: &str =
    "Correct the following text and output only the corrected text with nothing else added: ";

impl PromptCompletion {
    pub fn new(category: &str, name_reply: &str) -> Self {
        Self {
            category: category.to_string(),
            name_reply: name_reply.to_string(),
            fail_correction: false,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_correction() -> Self {
        Self {
            fail_correction: true,
            ..Self::new("Unused", "unused.jpg")
        }
    }
}

impl CompletionService for PromptCompletion {
    fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(Request {
            prompt: prompt.to_string(),
            temperature,
            max_tokens,
        });

        if let Some(chunk) = prompt.strip_prefix(CORRECTION_PREFIX) {
            if self.fail_correction {
                return Err(CompletionError::Api {
                    status: 503,
                    message: "service unavailable".to_string(),
                });
            }
            return Ok(format!(" {}[fixed]\n", chunk));
        }
        if prompt.contains("one or two word category") {
            return Ok(format!("\n{}\n", self.category));
        }
        if prompt.contains("meaningful filename") {
            return Ok(self.name_reply.clone());
        }
        Err(CompletionError::EmptyResponse)
    }
}

/// `n` distinct words.
pub fn words(n: usize) -> String {
    (1..=n)
        .map(|i| format!("word{}", i))
        .collect::<Vec<_>>()
        .join(" ")
}
