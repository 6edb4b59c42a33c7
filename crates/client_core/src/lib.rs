use std::{sync::Arc, time::Duration};

use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::{DocumentId, DocumentStatus},
    protocol::{DocumentRecord, QueryHttpRequest, QueryResponse, StatsResponse},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

pub mod conversation;
pub mod error;
pub mod registry;
pub mod stats;
pub mod upload;

pub use conversation::{ConversationLog, ConversationTurn};
pub use error::{DeleteError, QueryError, RegistryError, RemoteError, UploadError};
pub use registry::DocumentRegistry;
pub use stats::SessionStats;

/// Passages requested per query.
pub const DEFAULT_TOP_K: u32 = 5;
const STATUS_POLL_ATTEMPTS: usize = 8;
const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(750);

/// State change notifications for observers (the rendered view).
#[derive(Debug, Clone)]
pub enum SessionEvent {
    DocumentAdded { record: DocumentRecord },
    DocumentUpdated { record: DocumentRecord },
    DocumentRemoved { document_id: DocumentId },
    DocumentsRefreshed { count: usize },
    StatsUpdated { stats: SessionStats },
    TurnAppended { turn: ConversationTurn },
    Error(String),
}

struct SessionState {
    registry: DocumentRegistry,
    conversation: ConversationLog,
    stats: SessionStats,
    upload_in_flight: bool,
}

/// Root of the client. Owns the document registry, the conversation log
/// and the session stats for one session, and serializes every mutation
/// behind a single async lock. Remote calls go out unlocked; state is
/// only touched once their outcome is known.
pub struct SessionClient {
    http: Client,
    server_url: String,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionClient {
    pub fn new(server_url: impl Into<String>) -> Arc<Self> {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            http: Client::new(),
            server_url,
            inner: Mutex::new(SessionState {
                registry: DocumentRegistry::new(),
                conversation: ConversationLog::new(),
                stats: SessionStats::default(),
                upload_in_flight: false,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.server_url, path)
    }

    pub async fn documents(&self) -> Vec<DocumentRecord> {
        self.inner.lock().await.registry.list().to_vec()
    }

    pub async fn turns(&self) -> Vec<ConversationTurn> {
        self.inner.lock().await.conversation.turns().to_vec()
    }

    pub async fn stats(&self) -> SessionStats {
        self.inner.lock().await.stats.clone()
    }

    pub async fn ready_document_count(&self) -> usize {
        self.inner
            .lock()
            .await
            .registry
            .count_by_status(DocumentStatus::Ready)
    }

    /// Replaces the registry from the remote document list and
    /// recomputes stats. Callers that treat this as best-effort (initial
    /// load) log the error and keep the current registry.
    pub async fn refresh_documents(&self) -> Result<usize, RemoteError> {
        let records = self
            .get_json::<Vec<DocumentRecord>>("/documents", "failed to fetch documents")
            .await?;
        let count = {
            let mut guard = self.inner.lock().await;
            guard.registry.reset(records)
        };
        let _ = self
            .events
            .send(SessionEvent::DocumentsRefreshed { count });
        self.refresh_stats().await;
        Ok(count)
    }

    /// Recomputes the session stats. The remote query count degrades to
    /// unknown on fetch failure; local counts are always current.
    pub async fn refresh_stats(&self) -> SessionStats {
        let total_queries = match self
            .get_json::<StatsResponse>("/stats", "failed to fetch stats")
            .await
        {
            Ok(response) => Some(response.total_queries),
            Err(err) => {
                warn!("stats: remote fetch failed, query count unknown: {err}");
                None
            }
        };
        let stats = {
            let mut guard = self.inner.lock().await;
            let stats = SessionStats {
                ready_documents: guard.registry.count_by_status(DocumentStatus::Ready),
                total_documents: guard.registry.len(),
                total_queries,
            };
            guard.stats = stats.clone();
            stats
        };
        let _ = self.events.send(SessionEvent::StatsUpdated {
            stats: stats.clone(),
        });
        stats
    }

    /// Validates and uploads one file, registering the returned record.
    /// The call blocks until the service has ingested and indexed the
    /// document; a record that comes back `ready` is queryable as soon
    /// as this returns. At most one upload is in flight per session.
    pub async fn upload_document(
        self: &Arc<Self>,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<DocumentRecord, UploadError> {
        upload::validate_extension(filename)?;

        {
            let mut guard = self.inner.lock().await;
            if guard.upload_in_flight {
                return Err(UploadError::UploadInFlight);
            }
            guard.upload_in_flight = true;
        }

        let result = self.submit_upload(filename, bytes).await;
        self.inner.lock().await.upload_in_flight = false;

        let record = match result {
            Ok(record) => record,
            Err(err) => {
                let _ = self.events.send(SessionEvent::Error(format!(
                    "upload of {filename:?} failed: {err}"
                )));
                return Err(err.into());
            }
        };

        self.inner.lock().await.registry.add(record.clone())?;
        info!(
            document_id = %record.id,
            filename,
            status = record.status.as_str(),
            "upload: document registered"
        );
        let _ = self.events.send(SessionEvent::DocumentAdded {
            record: record.clone(),
        });
        self.refresh_stats().await;

        if record.status == DocumentStatus::Processing {
            let client = Arc::clone(self);
            let document_id = record.id.clone();
            tokio::spawn(async move {
                client.poll_document_status(document_id).await;
            });
        }

        Ok(record)
    }

    async fn submit_upload(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<DocumentRecord, RemoteError> {
        let form = upload::multipart_form(filename, bytes);
        let response = self
            .http
            .post(self.api_url("/documents/upload"))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RemoteError::from_response(response, "failed to upload document").await);
        }
        Ok(response.json().await?)
    }

    /// Bounded follow-up for a record that came back `processing`: the
    /// service only reports transitions through the list endpoint, so
    /// re-fetch it a few times and apply the first forward move.
    async fn poll_document_status(self: Arc<Self>, document_id: DocumentId) {
        for attempt in 0..STATUS_POLL_ATTEMPTS {
            tokio::time::sleep(STATUS_POLL_INTERVAL).await;
            let records = match self
                .get_json::<Vec<DocumentRecord>>("/documents", "failed to fetch documents")
                .await
            {
                Ok(records) => records,
                Err(err) => {
                    warn!(document_id = %document_id, attempt, "status poll: list fetch failed: {err}");
                    continue;
                }
            };
            let Some(record) = records.into_iter().find(|record| record.id == document_id)
            else {
                info!(document_id = %document_id, "status poll: document vanished remotely");
                return;
            };
            if record.status == DocumentStatus::Processing {
                continue;
            }
            let updated = {
                let mut guard = self.inner.lock().await;
                guard.registry.update(record.clone()).unwrap_or(false)
            };
            if updated {
                info!(
                    document_id = %record.id,
                    status = record.status.as_str(),
                    "status poll: document left processing"
                );
                let _ = self.events.send(SessionEvent::DocumentUpdated { record });
                self.refresh_stats().await;
            }
            return;
        }
        info!(document_id = %document_id, "status poll: attempts exhausted, still processing");
    }

    /// Deletes a document the registry knows about. The registry is only
    /// mutated after the service confirms; a missing id fails locally
    /// without a network call.
    pub async fn delete_document(&self, document_id: &DocumentId) -> Result<(), DeleteError> {
        if !self.inner.lock().await.registry.contains(document_id) {
            return Err(DeleteError::NotFound(document_id.clone()));
        }

        let url = self.api_url(&format!("/documents/{document_id}"));
        let response = match self.http.delete(url).send().await {
            Ok(response) => response,
            Err(err) => {
                let err = RemoteError::from(err);
                let _ = self.events.send(SessionEvent::Error(format!(
                    "failed to delete document {document_id}: {err}"
                )));
                return Err(err.into());
            }
        };
        if !response.status().is_success() {
            let err = RemoteError::from_response(response, "failed to delete document").await;
            let _ = self.events.send(SessionEvent::Error(format!(
                "failed to delete document {document_id}: {err}"
            )));
            return Err(err.into());
        }

        {
            let mut guard = self.inner.lock().await;
            let _ = guard.registry.remove(document_id);
        }
        info!(document_id = %document_id, "documents: deleted");
        let _ = self.events.send(SessionEvent::DocumentRemoved {
            document_id: document_id.clone(),
        });
        self.refresh_stats().await;
        Ok(())
    }

    /// Submits one question. Gating happens at a single instant under
    /// the session lock: blank input, an in-flight submission, and a
    /// registry without ready documents are rejected before any network
    /// call and append nothing. The user turn is appended optimistically
    /// and retained even when the answer never arrives.
    pub async fn submit_question(&self, question: &str) -> Result<ConversationTurn, QueryError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QueryError::BlankQuestion);
        }

        {
            let mut guard = self.inner.lock().await;
            if guard.conversation.is_submitting() {
                return Err(QueryError::QueryInFlight);
            }
            if guard.registry.count_by_status(DocumentStatus::Ready) == 0 {
                return Err(QueryError::NoReadyDocuments);
            }
            let turn = guard.conversation.begin(question);
            let _ = self.events.send(SessionEvent::TurnAppended { turn });
        }

        let request = QueryHttpRequest {
            question: question.to_string(),
            top_k: DEFAULT_TOP_K,
        };
        let result = self.post_query(&request).await;

        let mut guard = self.inner.lock().await;
        match result {
            Ok(response) => {
                let turn = guard
                    .conversation
                    .complete(response.answer, response.sources);
                drop(guard);
                info!(sources = turn.sources.len(), "query: answered");
                let _ = self.events.send(SessionEvent::TurnAppended { turn: turn.clone() });
                Ok(turn)
            }
            Err(err) => {
                guard.conversation.fail();
                drop(guard);
                warn!("query: failed: {err}");
                let _ = self
                    .events
                    .send(SessionEvent::Error("failed to process query".to_string()));
                Err(err.into())
            }
        }
    }

    async fn post_query(&self, request: &QueryHttpRequest) -> Result<QueryResponse, RemoteError> {
        let response = self
            .http
            .post(self.api_url("/query"))
            .json(request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RemoteError::from_response(response, "failed to process query").await);
        }
        Ok(response.json().await?)
    }

    /// Recent answered queries as the service recorded them. Read-only;
    /// never merged into the live conversation log.
    pub async fn fetch_query_history(&self, limit: u32) -> Result<Vec<QueryResponse>, RemoteError> {
        let response = self
            .http
            .get(self.api_url("/queries"))
            .query(&[("limit", limit)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RemoteError::from_response(response, "failed to fetch query history").await);
        }
        Ok(response.json().await?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        fallback: &str,
    ) -> Result<T, RemoteError> {
        let response = self.http.get(self.api_url(path)).send().await?;
        if !response.status().is_success() {
            return Err(RemoteError::from_response(response, fallback).await);
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
