pub mod classify;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod search;
pub mod segment;
pub mod store;
pub mod thesaurus;

pub use classify::{Classifier, PageContext};
pub use dedup::dedup_questions;
pub use error::{IngestError, SearchError, StoreError};
pub use extract::{LopdfExtractor, PageContent, PageExtractor};
pub use models::{
    detect_subject, DiagramImage, DocumentMatches, DocumentStatus, MatchReason, Question,
    QuestionKind, SearchMatch, SearchRequest, SearchResults, SegmenterOptions, StoredDocument,
    SubjectMatches,
};
pub use normalize::{collapse_whitespace, TextNormalizer};
pub use pipeline::{
    digest_bytes, ProcessedDocument, ProcessingReport, QuestionPipeline, SkippedDocument,
};
pub use search::{highlight, search};
pub use segment::{Boundary, BoundaryKind, Segmenter, Span};
pub use store::{CorpusStore, TopicStore};
pub use thesaurus::{parse_topic_lines, Thesaurus};
