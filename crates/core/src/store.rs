use crate::error::StoreError;
use crate::models::{DocumentStatus, Question, StoredDocument};
use crate::pipeline::digest_bytes;
use crate::thesaurus::Thesaurus;
use chrono::Utc;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Durable corpus: every mutation rewrites the whole snapshot blob. The
/// in-memory map is authoritative; if a write fails the memory state is
/// kept so the caller can retry.
pub struct CorpusStore {
    path: PathBuf,
    documents: BTreeMap<String, StoredDocument>,
}

impl CorpusStore {
    /// Loads the snapshot fully into memory. A missing file is an empty
    /// corpus; an unreadable one is surfaced rather than silently dropped.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let documents = if path.exists() {
            let bytes = fs::read(&path)?;
            serde_json::from_slice(&bytes).map_err(|error| StoreError::CorruptSnapshot {
                path: path.display().to_string(),
                details: error.to_string(),
            })?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, documents })
    }

    fn persist(&self) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec(&self.documents)?;
        fs::write(&self.path, encoded).map_err(|error| StoreError::Persist {
            path: self.path.display().to_string(),
            details: error.to_string(),
        })
    }

    /// Stores raw document bytes as an unprocessed entry. Re-putting an id
    /// replaces the payload and clears any derived questions.
    pub fn put(&mut self, document_id: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let checksum = digest_bytes(&bytes);
        self.documents.insert(
            document_id.to_string(),
            StoredDocument {
                document_id: document_id.to_string(),
                checksum,
                subject: crate::models::detect_subject(document_id),
                bytes,
                ingested_at: Utc::now(),
                processed_at: None,
                questions: Vec::new(),
            },
        );
        self.persist()
    }

    pub fn get(&self, document_id: &str) -> Option<&StoredDocument> {
        self.documents.get(document_id)
    }

    /// Replaces a document's entire derived question set; never merges.
    pub fn set_questions(
        &mut self,
        document_id: &str,
        questions: Vec<Question>,
    ) -> Result<(), StoreError> {
        let document = self
            .documents
            .get_mut(document_id)
            .ok_or_else(|| StoreError::UnknownDocument(document_id.to_string()))?;

        document.questions = questions;
        document.processed_at = Some(Utc::now());
        self.persist()
    }

    pub fn remove(&mut self, document_id: &str) -> Result<Option<StoredDocument>, StoreError> {
        let removed = self.documents.remove(document_id);
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn all(&self) -> &BTreeMap<String, StoredDocument> {
        &self.documents
    }

    /// Documents whose question set has been derived; only these are
    /// visible to search.
    pub fn ready(&self) -> impl Iterator<Item = &StoredDocument> {
        self.documents
            .values()
            .filter(|document| document.status() == DocumentStatus::Ready)
    }

    pub fn unprocessed_ids(&self) -> Vec<String> {
        self.documents
            .values()
            .filter(|document| document.status() == DocumentStatus::Unprocessed)
            .map(|document| document.document_id.clone())
            .collect()
    }
}

/// Learned-topic table with the same snapshot discipline as the corpus.
pub struct TopicStore {
    path: PathBuf,
    thesaurus: Thesaurus,
}

impl TopicStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let learned: BTreeMap<String, Vec<String>> = if path.exists() {
            let bytes = fs::read(&path)?;
            serde_json::from_slice(&bytes).map_err(|error| StoreError::CorruptSnapshot {
                path: path.display().to_string(),
                details: error.to_string(),
            })?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            thesaurus: Thesaurus::new(learned),
        })
    }

    pub fn thesaurus(&self) -> &Thesaurus {
        &self.thesaurus
    }

    /// Adds or replaces learned topics and persists the table.
    pub fn import(&mut self, topics: BTreeMap<String, Vec<String>>) -> Result<usize, StoreError> {
        let imported = topics.len();
        for (topic, keywords) in topics {
            self.thesaurus.insert_learned(&topic, keywords);
        }

        let encoded = serde_json::to_vec(self.thesaurus.learned())?;
        fs::write(&self.path, encoded).map_err(|error| StoreError::Persist {
            path: self.path.display().to_string(),
            details: error.to_string(),
        })?;

        Ok(imported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionKind;
    use tempfile::tempdir;

    fn question(document_id: &str, ordinal: u32) -> Question {
        Question {
            document_id: document_id.to_string(),
            page: 1,
            ordinal,
            number: ordinal.to_string(),
            text_raw: format!("{ordinal}. Question body"),
            text_clean: format!("{ordinal}. Question body"),
            kind: QuestionKind::Standard,
            subject: "General".to_string(),
            has_diagram: false,
            has_diagram_ref: false,
            diagrams: Vec::new(),
        }
    }

    #[test]
    fn questions_round_trip_through_the_snapshot() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("corpus.json");

        let questions = vec![question("a.pdf", 1), question("a.pdf", 2)];
        {
            let mut store = CorpusStore::open(&path)?;
            store.put("a.pdf", b"%PDF-1.4 fake".to_vec())?;
            store.set_questions("a.pdf", questions.clone())?;
        }

        let reloaded = CorpusStore::open(&path)?;
        assert_eq!(reloaded.all()["a.pdf"].questions, questions);
        assert_eq!(reloaded.all()["a.pdf"].bytes, b"%PDF-1.4 fake".to_vec());
        Ok(())
    }

    #[test]
    fn unprocessed_documents_are_excluded_from_ready() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let mut store = CorpusStore::open(dir.path().join("corpus.json"))?;

        store.put("pending.pdf", vec![1])?;
        store.put("done.pdf", vec![2])?;
        store.set_questions("done.pdf", vec![question("done.pdf", 1)])?;

        let ready: Vec<&str> = store.ready().map(|d| d.document_id.as_str()).collect();
        assert_eq!(ready, vec!["done.pdf"]);
        assert_eq!(store.unprocessed_ids(), vec!["pending.pdf".to_string()]);
        Ok(())
    }

    #[test]
    fn reputting_a_document_clears_derived_questions() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let mut store = CorpusStore::open(dir.path().join("corpus.json"))?;

        store.put("a.pdf", vec![1])?;
        store.set_questions("a.pdf", vec![question("a.pdf", 1)])?;
        store.put("a.pdf", vec![2])?;

        assert_eq!(
            store.get("a.pdf").unwrap().status(),
            DocumentStatus::Unprocessed
        );
        Ok(())
    }

    #[test]
    fn removing_a_document_deletes_its_questions() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("corpus.json");
        let mut store = CorpusStore::open(&path)?;

        store.put("a.pdf", vec![1])?;
        store.set_questions("a.pdf", vec![question("a.pdf", 1)])?;
        let removed = store.remove("a.pdf")?;

        assert!(removed.is_some());
        assert!(CorpusStore::open(&path)?.all().is_empty());
        Ok(())
    }

    #[test]
    fn missing_snapshot_opens_as_empty_corpus() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let store = CorpusStore::open(dir.path().join("absent.json"))?;
        assert!(store.all().is_empty());
        Ok(())
    }

    #[test]
    fn corrupt_snapshot_is_reported_not_discarded() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("corpus.json");
        fs::write(&path, b"{ not json")?;

        match CorpusStore::open(&path) {
            Err(StoreError::CorruptSnapshot { .. }) => Ok(()),
            other => panic!("expected corrupt snapshot error, got {:?}", other.err()),
        }
    }

    #[test]
    fn set_questions_for_unknown_document_fails() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let mut store = CorpusStore::open(dir.path().join("corpus.json"))?;

        let result = store.set_questions("ghost.pdf", Vec::new());
        assert!(matches!(result, Err(StoreError::UnknownDocument(_))));
        Ok(())
    }

    #[test]
    fn learned_topics_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("topics.json");

        {
            let mut topics = TopicStore::open(&path)?;
            let mut table = BTreeMap::new();
            table.insert("differentiation".to_string(), vec!["derivative".to_string()]);
            assert_eq!(topics.import(table)?, 1);
        }

        let reloaded = TopicStore::open(&path)?;
        assert_eq!(
            reloaded.thesaurus().learned()["differentiation"],
            vec!["derivative".to_string()]
        );
        Ok(())
    }
}
