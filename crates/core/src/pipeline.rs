use crate::classify::{Classifier, PageContext};
use crate::dedup::dedup_questions;
use crate::error::IngestError;
use crate::extract::{PageContent, PageExtractor};
use crate::models::{detect_subject, Question, SegmenterOptions};
use crate::normalize::TextNormalizer;
use crate::segment::Segmenter;
use crate::store::CorpusStore;
use sha2::{Digest, Sha256};

pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub struct QuestionPipeline {
    normalizer: TextNormalizer,
    segmenter: Segmenter,
    classifier: Classifier,
    options: SegmenterOptions,
}

impl QuestionPipeline {
    pub fn new(options: SegmenterOptions) -> Result<Self, IngestError> {
        Ok(Self {
            normalizer: TextNormalizer::new()?,
            segmenter: Segmenter::new(options)?,
            classifier: Classifier::new()?,
            options,
        })
    }

    /// Runs normalize, segment, classify, and dedup over already-extracted
    /// pages. Pages that clean down to nothing produce no questions.
    pub fn process_pages(&self, document_id: &str, pages: &[PageContent]) -> Vec<Question> {
        let subject = detect_subject(document_id);
        let mut questions = Vec::new();

        for page in pages {
            let cleaned = self.normalizer.clean_page(&page.text);
            if cleaned.is_empty() {
                continue;
            }

            let context = PageContext {
                page: page.number,
                has_diagram: !page.images.is_empty(),
                diagrams: page.images.clone(),
            };

            for span in self.segmenter.split_page(&cleaned) {
                questions.push(self.classifier.enrich(&span, &context, document_id, &subject));
            }
        }

        dedup_questions(questions, self.options.dedup_prefix_chars)
    }

    /// Decodes one document and extracts its question set. A decode failure
    /// is the caller's to report; the document's stored state is untouched.
    pub fn process_document(
        &self,
        extractor: &dyn PageExtractor,
        document_id: &str,
        bytes: &[u8],
    ) -> Result<Vec<Question>, IngestError> {
        let pages = extractor.extract_pages(document_id, bytes)?;
        Ok(self.process_pages(document_id, &pages))
    }

    /// Sequentially reprocesses the named documents against the store. Each
    /// failure is recorded and the loop continues; failed documents keep
    /// whatever question set they had.
    pub fn process_corpus(
        &self,
        store: &mut CorpusStore,
        extractor: &dyn PageExtractor,
        document_ids: &[String],
    ) -> ProcessingReport {
        let mut report = ProcessingReport::default();

        for document_id in document_ids {
            let bytes = match store.get(document_id) {
                Some(document) => document.bytes.clone(),
                None => {
                    report.skipped.push(SkippedDocument {
                        document_id: document_id.clone(),
                        reason: IngestError::UnknownDocument(document_id.clone()).to_string(),
                    });
                    continue;
                }
            };

            match self.process_document(extractor, document_id, &bytes) {
                Ok(questions) => {
                    let question_count = questions.len();
                    if let Err(error) = store.set_questions(document_id, questions) {
                        report.persist_errors.push(error.to_string());
                    }
                    report.processed.push(ProcessedDocument {
                        document_id: document_id.clone(),
                        question_count,
                    });
                }
                Err(error) => report.skipped.push(SkippedDocument {
                    document_id: document_id.clone(),
                    reason: error.to_string(),
                }),
            }
        }

        report
    }
}

#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub document_id: String,
    pub question_count: usize,
}

#[derive(Debug, Clone)]
pub struct SkippedDocument {
    pub document_id: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ProcessingReport {
    pub processed: Vec<ProcessedDocument>,
    pub skipped: Vec<SkippedDocument>,
    pub persist_errors: Vec<String>,
}
