//! Reference document library

use super::{ChatStore, ReferenceDocument};
use crate::error::{Result, TeachmateError};
use crate::ingest::split_into_chunks;
use chrono::Utc;

const DOCUMENTS_KEY: &str = "chatbot_documents";

/// Input for [`ChatStore::save_document`]
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub file_type: String,
    pub file_size: u64,
    pub content: String,
    pub tags: Vec<String>,
    pub folder: String,
}

impl ChatStore {
    fn all_documents(&self) -> Result<Vec<ReferenceDocument>> {
        self.read_json(DOCUMENTS_KEY)
    }

    fn save_all_documents(&self, documents: &[ReferenceDocument]) -> Result<()> {
        self.write_json(DOCUMENTS_KEY, documents)
    }

    /// Store an extracted document, newest first
    ///
    /// Content beyond `max_chars` characters is dropped. The chunk count
    /// reflects the full extracted text split with [`split_into_chunks`].
    pub fn save_document(
        &self,
        doc: NewDocument,
        chunk_size: usize,
        max_chars: usize,
    ) -> Result<ReferenceDocument> {
        let chunk_count = split_into_chunks(&doc.content, chunk_size).len();
        let content: String = doc.content.chars().take(max_chars).collect();

        let stored = ReferenceDocument {
            id: uuid::Uuid::new_v4().to_string(),
            title: doc.title,
            file_type: doc.file_type,
            file_size: doc.file_size,
            content,
            chunk_count,
            tags: doc.tags,
            folder: doc.folder,
            created_at: Utc::now(),
        };

        let mut documents = self.all_documents()?;
        documents.insert(0, stored.clone());
        self.save_all_documents(&documents)?;
        tracing::info!(document = %stored.id, title = %stored.title, chunks = chunk_count, "Saved reference document");
        Ok(stored)
    }

    /// Documents without their content, newest first
    pub fn documents(&self) -> Result<Vec<ReferenceDocument>> {
        Ok(self
            .all_documents()?
            .into_iter()
            .map(|mut d| {
                d.content.clear();
                d
            })
            .collect())
    }

    /// Stored text of one document
    pub fn document_content(&self, id: &str) -> Result<Option<String>> {
        Ok(self
            .all_documents()?
            .into_iter()
            .find(|d| d.id == id)
            .map(|d| d.content))
    }

    /// Stored text of several documents, in the order requested
    ///
    /// Unknown ids are skipped.
    pub fn document_contents(&self, ids: &[String]) -> Result<Vec<String>> {
        let documents = self.all_documents()?;
        Ok(ids
            .iter()
            .filter_map(|id| documents.iter().find(|d| &d.id == id))
            .map(|d| d.content.clone())
            .collect())
    }

    /// Delete a document
    pub fn delete_document(&self, id: &str) -> Result<()> {
        let documents: Vec<ReferenceDocument> = self
            .all_documents()?
            .into_iter()
            .filter(|d| d.id != id)
            .collect();
        self.save_all_documents(&documents)
    }

    /// Replace a document's tags
    pub fn update_document_tags(&self, id: &str, tags: Vec<String>) -> Result<()> {
        self.update_document(id, |d| d.tags = tags)
    }

    /// Move a document to another folder
    pub fn update_document_folder(&self, id: &str, folder: &str) -> Result<()> {
        self.update_document(id, |d| d.folder = folder.to_string())
    }

    /// Resolve a full document id from a unique prefix
    pub fn resolve_document_id(&self, prefix: &str) -> Result<String> {
        let matches: Vec<String> = self
            .all_documents()?
            .into_iter()
            .map(|d| d.id)
            .filter(|id| id.starts_with(prefix))
            .collect();
        match matches.as_slice() {
            [] => Err(TeachmateError::NotFound(format!("document {}", prefix)).into()),
            [only] => Ok(only.clone()),
            _ => Err(TeachmateError::Storage(format!(
                "Document prefix {} is ambiguous ({} matches)",
                prefix,
                matches.len()
            ))
            .into()),
        }
    }

    fn update_document<F>(&self, id: &str, change: F) -> Result<()>
    where
        F: FnOnce(&mut ReferenceDocument),
    {
        let mut documents = self.all_documents()?;
        let doc = documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| TeachmateError::NotFound(format!("document {}", id)))?;
        change(doc);
        self.save_all_documents(&documents)
    }
}
