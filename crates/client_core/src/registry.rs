use shared::{
    domain::{DocumentId, DocumentStatus},
    protocol::DocumentRecord,
};
use tracing::warn;

use crate::error::RegistryError;

/// Ordered collection of uploaded documents, newest first. The single
/// source of truth for what has been uploaded in this session.
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    records: Vec<DocumentRecord>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends a freshly uploaded record.
    pub fn add(&mut self, record: DocumentRecord) -> Result<(), RegistryError> {
        if self.contains(&record.id) {
            return Err(RegistryError::DuplicateId(record.id));
        }
        self.records.insert(0, record);
        Ok(())
    }

    pub fn remove(&mut self, id: &DocumentId) -> Result<DocumentRecord, RegistryError> {
        let index = self
            .records
            .iter()
            .position(|record| &record.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;
        Ok(self.records.remove(index))
    }

    pub fn list(&self) -> &[DocumentRecord] {
        &self.records
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.records.iter().any(|record| &record.id == id)
    }

    pub fn count_by_status(&self, status: DocumentStatus) -> usize {
        self.records
            .iter()
            .filter(|record| record.status == status)
            .count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replaces the whole collection from a remote list fetch, keeping
    /// the server's newest-first order. A repeated id keeps its first
    /// occurrence; later ones are dropped.
    pub fn reset(&mut self, records: Vec<DocumentRecord>) -> usize {
        let mut kept: Vec<DocumentRecord> = Vec::with_capacity(records.len());
        for record in records {
            if kept.iter().any(|other| other.id == record.id) {
                warn!(document_id = %record.id, "registry: dropping duplicate id from list response");
                continue;
            }
            kept.push(record);
        }
        self.records = kept;
        self.records.len()
    }

    /// Whole-record replacement on a status-changing event. Status only
    /// moves forward out of `processing`; any other replacement leaves
    /// the stored record untouched and reports `false`.
    pub fn update(&mut self, record: DocumentRecord) -> Result<bool, RegistryError> {
        let index = self
            .records
            .iter()
            .position(|existing| existing.id == record.id)
            .ok_or_else(|| RegistryError::NotFound(record.id.clone()))?;
        let moved_forward = self.records[index].status == DocumentStatus::Processing
            && record.status != DocumentStatus::Processing;
        if !moved_forward {
            return Ok(false);
        }
        self.records[index] = record;
        Ok(true)
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
