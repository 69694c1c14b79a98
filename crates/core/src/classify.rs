use crate::error::IngestError;
use crate::models::{DiagramImage, Question, QuestionKind};
use crate::normalize::collapse_whitespace;
use crate::segment::{BoundaryKind, Span};
use regex::Regex;

/// Page-level facts shared by every question emitted from that page.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub page: u32,
    pub has_diagram: bool,
    pub diagrams: Vec<DiagramImage>,
}

pub struct Classifier {
    mcq_marker: Regex,
    diagram_ref: Regex,
}

impl Classifier {
    pub fn new() -> Result<Self, IngestError> {
        Ok(Self {
            // A letter option A-D followed by real content marks an MCQ.
            mcq_marker: Regex::new(r"\b[A-D][.)]\s+[A-Za-z]")?,
            diagram_ref: Regex::new(r"(?i)\bFig\.?\s*\d+|\bdiagram\b")?,
        })
    }

    fn kind_of(&self, span: &Span) -> QuestionKind {
        if self.mcq_marker.is_match(&span.text) {
            QuestionKind::MultipleChoice
        } else if span.kind == BoundaryKind::SubPart {
            QuestionKind::Structured
        } else {
            QuestionKind::Standard
        }
    }

    /// Turns a raw span into a question record carrying its page metadata
    /// and subject. The ordinal is a placeholder until deduplication has
    /// settled the final sequence.
    pub fn enrich(&self, span: &Span, context: &PageContext, document_id: &str, subject: &str) -> Question {
        Question {
            document_id: document_id.to_string(),
            page: context.page,
            ordinal: 0,
            number: span.label.clone(),
            text_raw: span.text.clone(),
            text_clean: collapse_whitespace(&span.text),
            kind: self.kind_of(span),
            subject: subject.to_string(),
            has_diagram: context.has_diagram,
            has_diagram_ref: self.diagram_ref.is_match(&span.text),
            diagrams: context.diagrams.clone(),
        }
    }
}
