/// Summary counts for one session.
///
/// `ready_documents` and `total_documents` derive from the local
/// registry at refresh time; `total_queries` comes from the remote
/// service and is `None` while the last fetch has failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub ready_documents: usize,
    pub total_documents: usize,
    pub total_queries: Option<u64>,
}
