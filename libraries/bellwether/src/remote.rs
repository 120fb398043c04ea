//! Contract for the remote document store: two flat collections with
//! whole-document semantics, reached over the network. Any call may fail with a
//! `RemoteError`; callers treat that as being offline for that single operation,
//! never as fatal to the session.

pub type Document = serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Tardiness,
    GradeStrandSections,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Tardiness => "tardiness",
            Collection::GradeStrandSections => "gradeStrandSections",
        }
    }
}

/// An order-by clause for `fetch_all`. The only ordering the system uses is
/// timestamp-descending on the tardiness collection.
#[derive(Clone, Copy, Debug)]
pub struct OrderBy {
    pub field: &'static str,
    pub descending: bool,
}

impl OrderBy {
    pub fn timestamp_desc() -> Self {
        OrderBy {
            field: "timestamp",
            descending: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The request never completed (network down, DNS, aborted).
    #[error("remote store unreachable: {0}")]
    Unreachable(String),
    /// The store answered with a non-success status.
    #[error("remote store rejected the request with status {0}")]
    Status(u16),
    /// The store answered but the payload didn't parse.
    #[error("remote store returned a malformed payload: {0}")]
    Malformed(String),
}

/// One method per verb per collection. Document identity for tardiness records is
/// the record's `id`; for options it is the synthetic `grade-strand-section` key.
pub trait RemoteStore {
    async fn fetch_all(
        &self,
        collection: Collection,
        order: Option<OrderBy>,
    ) -> Result<Vec<Document>, RemoteError>;

    /// Create or fully overwrite the document under `doc_id`.
    async fn put(
        &self,
        collection: Collection,
        doc_id: &str,
        doc: &Document,
    ) -> Result<(), RemoteError>;

    /// Merge `doc` into the document under `doc_id`. The system only ever sends
    /// complete documents, so in practice this is also a full overwrite.
    async fn update(
        &self,
        collection: Collection,
        doc_id: &str,
        doc: &Document,
    ) -> Result<(), RemoteError>;

    async fn delete(&self, collection: Collection, doc_id: &str) -> Result<(), RemoteError>;
}
