use crate::error::SearchError;
use crate::models::{
    DocumentMatches, MatchReason, SearchMatch, SearchRequest, SearchResults, SubjectMatches,
};
use crate::store::CorpusStore;
use crate::thesaurus::Thesaurus;
use regex::Regex;
use std::collections::BTreeMap;

/// Queries a question on a diagram-bearing page can satisfy even when the
/// literal word never appears in its text.
const DIAGRAM_TERMS: [&str; 5] = ["diagram", "figure", "fig", "graph", "chart"];

fn diagram_keyword_match(query: &str) -> bool {
    DIAGRAM_TERMS
        .iter()
        .any(|term| term.contains(query) || query.contains(term))
}

/// Resolves a query against every ready document, grouped by subject then
/// document, each group ordered by (page, ordinal). Unprocessed documents
/// never appear.
pub fn search(
    store: &CorpusStore,
    thesaurus: &Thesaurus,
    request: &SearchRequest,
) -> Result<SearchResults, SearchError> {
    let query = request.query.trim().to_lowercase();
    if query.is_empty() {
        return Err(SearchError::EmptyQuery);
    }

    let mut by_subject: BTreeMap<String, BTreeMap<String, Vec<SearchMatch>>> = BTreeMap::new();
    let mut total = 0;

    for document in store.ready() {
        for question in &document.questions {
            let reason = thesaurus
                .topic_match(&query, &question.text_clean)
                .or_else(|| {
                    let diagram_bearing = question.has_diagram || question.has_diagram_ref;
                    (request.include_diagrams && diagram_bearing && diagram_keyword_match(&query))
                        .then_some(MatchReason::DiagramKeyword)
                });

            if let Some(reason) = reason {
                by_subject
                    .entry(question.subject.clone())
                    .or_default()
                    .entry(document.document_id.clone())
                    .or_default()
                    .push(SearchMatch {
                        question: question.clone(),
                        reason,
                    });
                total += 1;
            }
        }
    }

    let subjects = by_subject
        .into_iter()
        .map(|(subject, documents)| SubjectMatches {
            subject,
            documents: documents
                .into_iter()
                .map(|(document_id, mut matches)| {
                    matches.sort_by_key(|hit| (hit.question.page, hit.question.ordinal));
                    DocumentMatches {
                        document_id,
                        matches,
                    }
                })
                .collect(),
        })
        .collect();

    Ok(SearchResults {
        query: request.query.clone(),
        total,
        subjects,
    })
}

/// Wraps every case-insensitive occurrence of the query in `[[`/`]]` markers
/// for presentation layers. Unmatchable input comes back unchanged.
pub fn highlight(text: &str, query: &str) -> String {
    if query.trim().is_empty() {
        return text.to_string();
    }

    match Regex::new(&format!("(?i){}", regex::escape(query))) {
        Ok(pattern) => pattern
            .replace_all(text, |captures: &regex::Captures| {
                format!("[[{}]]", &captures[0])
            })
            .into_owned(),
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Question, QuestionKind};
    use tempfile::tempdir;

    fn question(document_id: &str, page: u32, ordinal: u32, text: &str) -> Question {
        Question {
            document_id: document_id.to_string(),
            page,
            ordinal,
            number: ordinal.to_string(),
            text_raw: text.to_string(),
            text_clean: text.to_string(),
            kind: QuestionKind::Standard,
            subject: crate::models::detect_subject(document_id),
            has_diagram: false,
            has_diagram_ref: false,
            diagrams: Vec::new(),
        }
    }

    fn corpus() -> (tempfile::TempDir, CorpusStore) {
        let dir = tempdir().unwrap();
        let mut store = CorpusStore::open(dir.path().join("corpus.json")).unwrap();

        store.put("0580_s21_qp.pdf", vec![1]).unwrap();
        store
            .set_questions(
                "0580_s21_qp.pdf",
                vec![
                    question("0580_s21_qp.pdf", 2, 1, "3. Simplify 2x + 3x fully."),
                    question("0580_s21_qp.pdf", 1, 2, "1. Solve the equation x + 2 = 5."),
                ],
            )
            .unwrap();

        store.put("0610_w20_qp.pdf", vec![2]).unwrap();
        store
            .set_questions(
                "0610_w20_qp.pdf",
                vec![question(
                    "0610_w20_qp.pdf",
                    4,
                    1,
                    "7. Explain photosynthesis in green plants.",
                )],
            )
            .unwrap();

        store.put("pending.pdf", vec![3]).unwrap();
        (dir, store)
    }

    #[test]
    fn literal_query_matches_with_direct_reason() {
        let (_dir, store) = corpus();
        let results = search(
            &store,
            &Thesaurus::default(),
            &SearchRequest {
                query: "photosynthesis".to_string(),
                include_diagrams: false,
            },
        )
        .unwrap();

        assert_eq!(results.total, 1);
        assert_eq!(results.subjects[0].subject, "Biology");
        assert_eq!(
            results.subjects[0].documents[0].matches[0].reason,
            MatchReason::DirectText
        );
    }

    #[test]
    fn topic_query_matches_vocabulary_with_related_reason() {
        let (_dir, store) = corpus();
        let results = search(
            &store,
            &Thesaurus::default(),
            &SearchRequest {
                query: "algebra".to_string(),
                include_diagrams: false,
            },
        )
        .unwrap();

        // Both maths questions carry algebra vocabulary, neither the word.
        assert_eq!(results.total, 2);
        assert!(results.subjects[0].documents[0]
            .matches
            .iter()
            .all(|hit| hit.reason == MatchReason::RelatedContent));
    }

    #[test]
    fn results_are_ordered_by_page_then_ordinal() {
        let (_dir, store) = corpus();
        let results = search(
            &store,
            &Thesaurus::default(),
            &SearchRequest {
                query: "algebra".to_string(),
                include_diagrams: false,
            },
        )
        .unwrap();

        let pages: Vec<u32> = results.subjects[0].documents[0]
            .matches
            .iter()
            .map(|hit| hit.question.page)
            .collect();
        assert_eq!(pages, vec![1, 2]);
    }

    #[test]
    fn unprocessed_documents_are_invisible_to_search() {
        let (_dir, store) = corpus();
        let results = search(
            &store,
            &Thesaurus::default(),
            &SearchRequest {
                query: "pdf".to_string(),
                include_diagrams: true,
            },
        )
        .unwrap();

        assert!(results
            .subjects
            .iter()
            .flat_map(|subject| &subject.documents)
            .all(|document| document.document_id != "pending.pdf"));
    }

    #[test]
    fn diagram_queries_reach_diagram_bearing_questions_only_with_the_flag() {
        let dir = tempdir().unwrap();
        let mut store = CorpusStore::open(dir.path().join("corpus.json")).unwrap();
        store.put("0625_s19_qp.pdf", vec![1]).unwrap();

        let mut with_diagram = question(
            "0625_s19_qp.pdf",
            3,
            1,
            "5. Using the circuit shown, calculate the current.",
        );
        with_diagram.has_diagram = true;
        store
            .set_questions("0625_s19_qp.pdf", vec![with_diagram])
            .unwrap();

        let request = |include_diagrams| SearchRequest {
            query: "diagram".to_string(),
            include_diagrams,
        };

        let hidden = search(&store, &Thesaurus::default(), &request(false)).unwrap();
        assert_eq!(hidden.total, 0);

        let shown = search(&store, &Thesaurus::default(), &request(true)).unwrap();
        assert_eq!(shown.total, 1);
        assert_eq!(
            shown.subjects[0].documents[0].matches[0].reason,
            MatchReason::DiagramKeyword
        );
    }

    #[test]
    fn empty_query_is_rejected() {
        let (_dir, store) = corpus();
        let result = search(
            &store,
            &Thesaurus::default(),
            &SearchRequest {
                query: "   ".to_string(),
                include_diagrams: false,
            },
        );
        assert!(matches!(result, Err(SearchError::EmptyQuery)));
    }

    #[test]
    fn highlight_wraps_matches_case_insensitively() {
        assert_eq!(
            highlight("Simplify the EQUATION.", "equation"),
            "Simplify the [[EQUATION]]."
        );
        assert_eq!(highlight("nothing here", "xyz"), "nothing here");
    }
}
