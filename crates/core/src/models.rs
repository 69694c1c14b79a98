use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QuestionKind {
    Standard,
    MultipleChoice,
    Structured,
}

/// One embedded raster region lifted from a page, kept as the raw stream
/// bytes the PDF carried for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagramImage {
    pub name: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub document_id: String,
    pub page: u32,
    pub ordinal: u32,
    pub number: String,
    pub text_raw: String,
    pub text_clean: String,
    pub kind: QuestionKind,
    pub subject: String,
    pub has_diagram: bool,
    pub has_diagram_ref: bool,
    pub diagrams: Vec<DiagramImage>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DocumentStatus {
    Unprocessed,
    Ready,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub document_id: String,
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
    pub checksum: String,
    pub subject: String,
    pub ingested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub questions: Vec<Question>,
}

impl StoredDocument {
    pub fn status(&self) -> DocumentStatus {
        if self.questions.is_empty() {
            DocumentStatus::Unprocessed
        } else {
            DocumentStatus::Ready
        }
    }
}

/// Tunable extraction thresholds. Values were tuned empirically against real
/// papers and are deliberately not part of any contract.
#[derive(Debug, Clone, Copy)]
pub struct SegmenterOptions {
    /// Spans shorter than this after trimming are boundary noise, not questions.
    pub min_span_chars: usize,
    /// Length of the canonical-text prefix used as the dedup identity key.
    pub dedup_prefix_chars: usize,
}

impl Default for SegmenterOptions {
    fn default() -> Self {
        Self {
            min_span_chars: 15,
            dedup_prefix_chars: 120,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchReason {
    DirectText,
    RelatedContent,
    DiagramKeyword,
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub include_diagrams: bool,
}

#[derive(Debug, Clone)]
pub struct SearchMatch {
    pub question: Question,
    pub reason: MatchReason,
}

/// All matches from one document, already ordered by (page, ordinal).
#[derive(Debug, Clone)]
pub struct DocumentMatches {
    pub document_id: String,
    pub matches: Vec<SearchMatch>,
}

#[derive(Debug, Clone)]
pub struct SubjectMatches {
    pub subject: String,
    pub documents: Vec<DocumentMatches>,
}

#[derive(Debug, Clone)]
pub struct SearchResults {
    pub query: String,
    pub total: usize,
    pub subjects: Vec<SubjectMatches>,
}

const SUBJECT_CODES: [(&str, &str); 5] = [
    ("0580", "Mathematics"),
    ("0460", "Geography"),
    ("0625", "Physics"),
    ("0610", "Biology"),
    ("0620", "Chemistry"),
];

/// Syllabus-code subject lookup keyed on substrings of the document id.
pub fn detect_subject(document_id: &str) -> String {
    for (code, name) in SUBJECT_CODES {
        if document_id.contains(code) {
            return name.to_string();
        }
    }
    "General".to_string()
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
