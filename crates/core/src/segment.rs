use crate::error::IngestError;
use crate::models::SegmenterOptions;
use regex::Regex;

/// A single question-start marker found in page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    pub offset: usize,
    pub label: String,
    pub rank: usize,
    pub kind: BoundaryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    /// `3 Calculate ...` or `3. Calculate ...` style numeric stems.
    Numbered,
    /// `(a)`, `(ii)` style sub-part markers.
    SubPart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub label: String,
    pub kind: BoundaryKind,
}

/// Each pattern captures the full marker as group 1 (its start is the span
/// boundary) and the question label as group 2. Markers may sit at the start
/// of a line or after whitespace; papers often run several questions
/// together on one extracted line.
const BOUNDARY_PATTERNS: [(&str, BoundaryKind); 3] = [
    // Bare question number followed by a capitalized stem.
    (r"(?m)(?:^|\s)((\d+)\s+[A-Z])", BoundaryKind::Numbered),
    // Numbered marker with a dot or closing paren.
    (r"(?m)(?:^|\s)((\d+)[.)]\s+)", BoundaryKind::Numbered),
    // Parenthesized sub-part marker.
    (r"(?m)(?:^|\s)(\(([a-z]|i{1,3})\)\s+)", BoundaryKind::SubPart),
];

pub struct Segmenter {
    patterns: Vec<(Regex, BoundaryKind)>,
    options: SegmenterOptions,
}

impl Segmenter {
    pub fn new(options: SegmenterOptions) -> Result<Self, IngestError> {
        let patterns = BOUNDARY_PATTERNS
            .iter()
            .map(|(pattern, kind)| Ok((Regex::new(pattern)?, *kind)))
            .collect::<Result<Vec<_>, IngestError>>()?;

        Ok(Self { patterns, options })
    }

    /// Collects boundary markers from every pattern family into one stream
    /// ordered by offset. Ties at the same offset keep the earliest-declared
    /// pattern; numeric markers outrank sub-part markers.
    fn boundaries(&self, text: &str) -> Vec<Boundary> {
        let mut found = Vec::new();

        for (rank, (pattern, kind)) in self.patterns.iter().enumerate() {
            for captures in pattern.captures_iter(text) {
                let (Some(marker), Some(label)) = (captures.get(1), captures.get(2)) else {
                    continue;
                };
                found.push(Boundary {
                    offset: marker.start(),
                    label: label.as_str().to_string(),
                    rank,
                    kind: *kind,
                });
            }
        }

        found.sort_by(|a, b| a.offset.cmp(&b.offset).then(a.rank.cmp(&b.rank)));
        found.dedup_by_key(|boundary| boundary.offset);
        found
    }

    /// Splits one page of cleaned text into candidate question spans. Each
    /// span runs from its boundary to the next boundary (or end of text);
    /// spans below the minimum length are boundary noise and dropped.
    pub fn split_page(&self, text: &str) -> Vec<Span> {
        let boundaries = self.boundaries(text);
        let mut spans = Vec::new();

        for (index, boundary) in boundaries.iter().enumerate() {
            let end = boundaries
                .get(index + 1)
                .map_or(text.len(), |next| next.offset);

            let span_text = text[boundary.offset..end].trim();
            if span_text.chars().count() < self.options.min_span_chars {
                continue;
            }

            spans.push(Span {
                text: span_text.to_string(),
                label: boundary.label.clone(),
                kind: boundary.kind,
            });
        }

        spans
    }
}
