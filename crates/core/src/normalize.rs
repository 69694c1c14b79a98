use crate::error::IngestError;
use regex::Regex;

/// Print-artifact phrases that show up in scanned exam papers, including the
/// mirror-printed margin text some scanners emit.
const EXCLUDE_PATTERNS: [&str; 5] = [
    r"DO NOT WRITE",
    r"TURN OVER",
    r"© UCLES",
    r"NIGRAM SIHT",
    r"ETIRW TON",
];

/// Minimum trimmed line length to survive cleaning; anything shorter is
/// margin noise or a stray page marker.
const MIN_LINE_CHARS: usize = 3;

pub struct TextNormalizer {
    exclusions: Vec<Regex>,
    cid_marker: Regex,
}

impl TextNormalizer {
    pub fn new() -> Result<Self, IngestError> {
        let exclusions = EXCLUDE_PATTERNS
            .iter()
            .map(|pattern| Regex::new(&format!("(?i){pattern}")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            exclusions,
            cid_marker: Regex::new(r"\(cid:\d+\)")?,
        })
    }

    fn should_exclude_line(&self, line: &str) -> bool {
        if line.chars().count() < MIN_LINE_CHARS {
            return true;
        }
        self.exclusions.iter().any(|pattern| pattern.is_match(line))
    }

    /// Strips artifact lines and OCR placeholders from one page of raw text,
    /// collapsing repeated spaces but keeping line boundaries for the
    /// segmenter. Garbage in yields an empty string, never an error.
    pub fn clean_page(&self, raw: &str) -> String {
        let mut cleaned_lines = Vec::new();

        for line in raw.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || self.should_exclude_line(trimmed) {
                continue;
            }

            let without_cids = self.cid_marker.replace_all(trimmed, "");
            let collapsed = without_cids.split_whitespace().collect::<Vec<_>>().join(" ");
            if !collapsed.is_empty() {
                cleaned_lines.push(collapsed);
            }
        }

        cleaned_lines.join("\n")
    }
}

/// Flattens all whitespace runs to single spaces. Used for canonical text
/// and dedup keys, where line boundaries no longer matter.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
