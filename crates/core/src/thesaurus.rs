use crate::models::MatchReason;
use std::collections::BTreeMap;

/// The read-only starter table. Admin-imported topics live beside it and
/// shadow it on a name collision.
const BUILTIN_TOPICS: [(&str, &[&str]); 6] = [
    (
        "algebra",
        &[
            "equation", "solve", "variable", "expression", "simplify", "expand", "factorise",
            "quadratic", "linear",
        ],
    ),
    (
        "geometry",
        &[
            "angle", "triangle", "circle", "polygon", "area", "perimeter", "volume", "pythagoras",
        ],
    ),
    (
        "photosynthesis",
        &["photosynthesis", "chlorophyll", "glucose", "carbon dioxide", "oxygen"],
    ),
    (
        "electricity",
        &["current", "voltage", "resistance", "circuit", "ohm", "power"],
    ),
    ("cells", &["cell", "nucleus", "cytoplasm", "membrane", "mitochondria"]),
    ("bonding", &["ionic", "covalent", "metallic", "bond", "molecule"]),
];

/// Merged view over the built-in table and the admin-editable learned table.
/// Topic names are lowercased on entry, which keeps each source
/// case-insensitively unique.
#[derive(Debug, Clone, Default)]
pub struct Thesaurus {
    learned: BTreeMap<String, Vec<String>>,
}

impl Thesaurus {
    pub fn new(learned: BTreeMap<String, Vec<String>>) -> Self {
        let learned = learned
            .into_iter()
            .map(|(topic, keywords)| (topic.to_lowercase(), keywords))
            .collect();
        Self { learned }
    }

    pub fn learned(&self) -> &BTreeMap<String, Vec<String>> {
        &self.learned
    }

    pub fn insert_learned(&mut self, topic: &str, keywords: Vec<String>) {
        self.learned.insert(topic.to_lowercase(), keywords);
    }

    /// Built-in topics first, learned entries replacing same-named ones.
    pub fn merged(&self) -> BTreeMap<String, Vec<String>> {
        let mut merged: BTreeMap<String, Vec<String>> = BUILTIN_TOPICS
            .iter()
            .map(|(topic, keywords)| {
                (
                    (*topic).to_string(),
                    keywords.iter().map(|keyword| (*keyword).to_string()).collect(),
                )
            })
            .collect();

        for (topic, keywords) in &self.learned {
            merged.insert(topic.clone(), keywords.clone());
        }

        merged
    }

    /// Two-level topic match: a literal hit on the question text, or a hit on
    /// a topic name whose vocabulary appears in the text. Exact substring
    /// comparison only, case-insensitive, so matches stay auditable.
    pub fn topic_match(&self, query: &str, question_text: &str) -> Option<MatchReason> {
        let query = query.to_lowercase();
        let text = question_text.to_lowercase();

        if text.contains(&query) {
            return Some(MatchReason::DirectText);
        }

        for (topic, keywords) in self.merged() {
            if !topic.contains(&query) {
                continue;
            }
            if keywords
                .iter()
                .any(|keyword| text.contains(&keyword.to_lowercase()))
            {
                return Some(MatchReason::RelatedContent);
            }
        }

        None
    }
}

/// Parses `topic, keyword, keyword, ...` lines into a topic table. Blank
/// lines and lines without at least one keyword are skipped.
pub fn parse_topic_lines(input: &str) -> BTreeMap<String, Vec<String>> {
    let mut topics = BTreeMap::new();

    for line in input.lines() {
        let mut fields = line
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty());

        let Some(topic) = fields.next() else {
            continue;
        };
        let keywords: Vec<String> = fields.map(str::to_string).collect();
        if keywords.is_empty() {
            continue;
        }

        topics.insert(topic.to_lowercase(), keywords);
    }

    topics
}
