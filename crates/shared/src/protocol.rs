use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DocumentId, DocumentStatus, QueryId};

/// One uploaded document as the service reports it. `chunk_count` and
/// `total_tokens` stay zero until processing completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub filename: String,
    pub file_size: u64,
    pub file_type: String,
    pub upload_date: DateTime<Utc>,
    pub status: DocumentStatus,
    #[serde(default)]
    pub chunk_count: u32,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Passage reference attached to an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub filename: String,
    pub chunk_index: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryHttpRequest {
    pub question: String,
    pub top_k: u32,
}

/// Answer payload for a single query; also the shape of one history
/// entry from `GET /api/queries`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query_id: QueryId,
    pub question: String,
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_documents: u64,
    pub ready_documents: u64,
    pub total_queries: u64,
    #[serde(default)]
    pub total_vectors: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}
