use std::path::PathBuf;

use tracing::{debug, info_span};

use crate::classifier::{classify, word_count, Classification};
use crate::enricher::{Enricher, Enrichment, OpenAiCompletion, Stage};
use crate::labeler::{GoogleVisionLabeler, PhotoLabeler};
use crate::metadata;
use crate::processor::{TesseractExtractor, TextExtractor};
use crate::sanitize;
use crate::storage::Relocator;
use crate::worker::record::FileResult;

use super::config::PipelineConfig;
use super::context::PipelineContext;
use super::error::PipelineError;
use super::progress::{ProgressEvent, ProgressReporter};

pub struct Pipeline {
    extractor: Box<dyn TextExtractor>,
    labeler: Box<dyn PhotoLabeler>,
    enricher: Enricher,
    relocator: Relocator,
}

impl Pipeline {
    /// Production constructor: Tesseract, OpenAI and Cloud Vision.
    pub fn from_config(config: &PipelineConfig) -> crate::Result<Self> {
        use secrecy::{ExposeSecret, SecretString};

        let extractor = TesseractExtractor::new(&config.tessdata_path, &config.ocr_language);

        let completion = OpenAiCompletion::new(
            SecretString::from(config.openai_api_key.expose_secret().to_owned()),
            &config.openai_model,
            &config.openai_base_url,
            config.openai_timeout,
        )?;

        let labeler = GoogleVisionLabeler::new(
            SecretString::from(config.vision_api_key.expose_secret().to_owned()),
            &config.vision_endpoint,
            config.vision_max_results,
            config.vision_timeout,
        )?;

        Ok(Self::new(
            Box::new(extractor),
            Box::new(labeler),
            Enricher::new(Box::new(completion)),
            Relocator::new(&config.archive_directory),
        ))
    }

    /// Wires explicit collaborators; tests pass fakes here.
    pub fn new(
        extractor: Box<dyn TextExtractor>,
        labeler: Box<dyn PhotoLabeler>,
        enricher: Enricher,
        relocator: Relocator,
    ) -> Self {
        Self {
            extractor,
            labeler,
            enricher,
            relocator,
        }
    }

    /// Run the full pipeline for a single image.
    /// Returns a (FileResult, PipelineContext) pair; errors only affect this file.
    pub fn run(
        &self,
        mut ctx: PipelineContext,
        progress: &dyn ProgressReporter,
    ) -> (FileResult, PipelineContext) {
        let filename = sanitize::redact_path(&ctx.record.source_path);
        let _pipeline_span = info_span!("pipeline",
            record_id = %ctx.record.id,
            filename = %filename,
        )
        .entered();

        // Step 1: OCR
        {
            let _step = info_span!("extract_text").entered();
            if let Err(e) = self.step_extract_text(&mut ctx) {
                return Self::failed(ctx, e, progress);
            }
        }

        // Step 2: Classify
        let classification = {
            let _step = info_span!("classify").entered();
            self.step_classify(&ctx, progress)
        };

        // Step 3: Branch
        match classification {
            Classification::Document => match self.run_document(&mut ctx, progress) {
                Ok((final_path, category)) => {
                    let result = FileResult::document(&ctx.record, final_path, category);
                    (result, ctx)
                }
                Err(e) => Self::failed(ctx, e, progress),
            },
            Classification::Photo => match self.run_photo(&mut ctx, progress) {
                Ok(labels) => {
                    let result = FileResult::photo(&ctx.record, labels);
                    (result, ctx)
                }
                Err(e) => Self::failed(ctx, e, progress),
            },
        }
    }

    fn failed(
        ctx: PipelineContext,
        error: PipelineError,
        progress: &dyn ProgressReporter,
    ) -> (FileResult, PipelineContext) {
        let err_msg = error.to_string();
        progress.report(ProgressEvent::Failed {
            error: err_msg.clone(),
        });
        (FileResult::failure(&ctx.record, err_msg), ctx)
    }

    fn step_extract_text(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let content = ctx.record.content()?;
        let text = self.extractor.extract(content);
        ctx.record.record_text(text);
        Ok(())
    }

    fn step_classify(
        &self,
        ctx: &PipelineContext,
        progress: &dyn ProgressReporter,
    ) -> Classification {
        let text = ctx.record.text().unwrap_or_default();
        let classification = ctx.record.record_classification(classify(text));

        progress.report(ProgressEvent::Classified {
            classification,
            word_count: word_count(text),
        });
        classification
    }

    fn run_document(
        &self,
        ctx: &mut PipelineContext,
        progress: &dyn ProgressReporter,
    ) -> Result<(PathBuf, String), PipelineError> {
        let enrichment = {
            let _step = info_span!("enrich").entered();
            self.step_enrich(ctx, progress)?
        };

        {
            let _step = info_span!("write_metadata").entered();
            metadata::write_user_comment(&ctx.record.source_path, &enrichment.corrected_text)?;
            progress.report(ProgressEvent::MetadataWritten);
        }

        let final_path = {
            let _step = info_span!("relocate").entered();
            self.relocator
                .relocate_as(&ctx.record.source_path, &enrichment.filename)?
        };

        debug!(
            "Archived {} -> {} (category: {})",
            sanitize::redact_path(&ctx.record.source_path),
            sanitize::redact_path(&final_path),
            enrichment.category
        );
        progress.report(ProgressEvent::Relocated {
            final_path: final_path.clone(),
        });

        let category = enrichment.category.clone();
        ctx.final_path = Some(final_path.clone());
        ctx.enrichment = Some(enrichment);
        Ok((final_path, category))
    }

    fn step_enrich(
        &self,
        ctx: &PipelineContext,
        progress: &dyn ProgressReporter,
    ) -> Result<Enrichment, PipelineError> {
        let text = ctx.record.text().unwrap_or_default();

        let enrichment = self.enricher.enrich(text, |stage| {
            progress.report(match stage {
                Stage::Corrected(corrected) => ProgressEvent::Corrected {
                    chars: corrected.chars().count(),
                },
                Stage::Categorized(category) => ProgressEvent::Categorized {
                    category: category.to_string(),
                },
                Stage::Named(filename) => ProgressEvent::Named {
                    filename: filename.to_string(),
                },
            })
        })?;

        Ok(enrichment)
    }

    fn run_photo(
        &self,
        ctx: &mut PipelineContext,
        progress: &dyn ProgressReporter,
    ) -> Result<Vec<String>, PipelineError> {
        let _step = info_span!("label").entered();

        let labels = self.labeler.label(ctx.record.content()?);
        progress.report(ProgressEvent::Labeled {
            labels: labels.clone(),
        });

        ctx.labels = labels.clone();
        Ok(labels)
    }
}
