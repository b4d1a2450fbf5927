//! Evidence corpus with HNSW nearest-neighbour search
//!
//! Documents, metadata and embeddings persist in a SQLite table; the HNSW
//! index lives in memory and is rebuilt from that table on open.
//!
//! # HNSW Parameters
//!
//! - **M**: Number of bi-directional links per node (16)
//! - **efConstruction**: Candidate list size during construction (200)
//! - **efSearch**: Candidate list size during search (64, raised to the fetch
//!   size when a query asks for more)
//!
//! Re-adding a document id replaces the document. HNSW cannot delete points,
//! so the superseded point stays in the graph and is filtered out of results.

use crate::StoreError;
use factline_domain::traits::{RetrievalStore, RetrievedDocument, ServiceError};
use hnsw_rs::prelude::*;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

const DEFAULT_M: usize = 16;
const DEFAULT_EF_CONSTRUCTION: usize = 200;
const DEFAULT_EF_SEARCH: usize = 64;
const DEFAULT_MAX_ELEMENTS: usize = 100_000;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    document TEXT NOT NULL,
    metadata TEXT NOT NULL,
    embedding TEXT NOT NULL
);
";

struct StoredDocument {
    id: String,
    document: String,
    metadata: HashMap<String, String>,
}

struct IndexState {
    hnsw: Hnsw<'static, f32, DistCosine>,
    /// Live HNSW point id -> document
    docs: HashMap<usize, StoredDocument>,
    /// Document id -> live HNSW point id
    by_id: HashMap<String, usize>,
    next_id: usize,
    /// Superseded points still present in the graph
    stale: usize,
}

impl IndexState {
    fn new() -> Self {
        let nb_layer = 16.min((DEFAULT_MAX_ELEMENTS as f32).ln().trunc() as usize);
        Self {
            hnsw: Hnsw::<'static, f32, DistCosine>::new(
                DEFAULT_M,
                DEFAULT_MAX_ELEMENTS,
                nb_layer,
                DEFAULT_EF_CONSTRUCTION,
                DistCosine {},
            ),
            docs: HashMap::new(),
            by_id: HashMap::new(),
            next_id: 0,
            stale: 0,
        }
    }

    fn insert(&mut self, embedding: &[f32], doc: StoredDocument) {
        let internal_id = self.next_id;
        self.next_id += 1;

        if let Some(previous) = self.by_id.insert(doc.id.clone(), internal_id) {
            self.docs.remove(&previous);
            self.stale += 1;
        }

        let embedding_vec = embedding.to_vec();
        self.hnsw.insert((&embedding_vec, internal_id));
        self.docs.insert(internal_id, doc);
    }
}

/// Persistent retrieval store for authoritative sources
///
/// # Examples
///
/// ```no_run
/// use factline_store::CorpusIndex;
/// use factline_domain::traits::RetrievalStore;
/// use std::collections::HashMap;
///
/// let corpus = CorpusIndex::in_memory(3).unwrap();
/// corpus.add(&[1.0, 0.0, 0.0], "WHO guidance", HashMap::new(), "who_1").unwrap();
/// let hits = corpus.query(&[1.0, 0.0, 0.0], 5).unwrap();
/// assert_eq!(hits[0].id, "who_1");
/// ```
pub struct CorpusIndex {
    dimension: usize,
    conn: Mutex<Connection>,
    index: Mutex<IndexState>,
}

impl CorpusIndex {
    /// Open (or create) a corpus database and rebuild the index from it
    pub fn open<P: AsRef<Path>>(path: P, dimension: usize) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;

        let mut state = IndexState::new();
        let mut loaded = 0usize;
        {
            let mut stmt =
                conn.prepare("SELECT id, document, metadata, embedding FROM documents ORDER BY rowid")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            for (id, document, metadata, embedding) in rows {
                let embedding: Vec<f32> = serde_json::from_str(&embedding)?;
                if embedding.len() != dimension {
                    warn!(
                        "skipping corpus document {}: dimension {} != {}",
                        id,
                        embedding.len(),
                        dimension
                    );
                    continue;
                }
                let metadata: HashMap<String, String> = serde_json::from_str(&metadata)?;
                state.insert(&embedding, StoredDocument { id, document, metadata });
                loaded += 1;
            }
        }
        debug!("corpus opened with {} documents", loaded);

        Ok(Self {
            dimension,
            conn: Mutex::new(conn),
            index: Mutex::new(state),
        })
    }

    /// Corpus backed by an in-memory database
    pub fn in_memory(dimension: usize) -> Result<Self, StoreError> {
        Self::open(":memory:", dimension)
    }

    /// Expected embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of live documents
    pub fn len(&self) -> usize {
        self.index.lock().map(|s| s.docs.len()).unwrap_or(0)
    }

    /// Check if the corpus is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<(), StoreError> {
        if embedding.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }
        Ok(())
    }

    /// Insert or replace a document
    pub fn insert_document(
        &self,
        embedding: &[f32],
        document: &str,
        metadata: HashMap<String, String>,
        id: &str,
    ) -> Result<(), StoreError> {
        self.check_dimension(embedding)?;

        {
            let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            conn.execute(
                "INSERT INTO documents (id, document, metadata, embedding)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                 document = excluded.document, metadata = excluded.metadata,
                 embedding = excluded.embedding",
                params![
                    id,
                    document,
                    serde_json::to_string(&metadata)?,
                    serde_json::to_string(embedding)?,
                ],
            )?;
        }

        let mut state = self.index.lock().map_err(|_| StoreError::LockPoisoned)?;
        state.insert(
            embedding,
            StoredDocument {
                id: id.to_string(),
                document: document.to_string(),
                metadata,
            },
        );
        Ok(())
    }

    /// Up to `k` nearest live documents, closest first
    pub fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<RetrievedDocument>, StoreError> {
        self.check_dimension(embedding)?;

        let state = self.index.lock().map_err(|_| StoreError::LockPoisoned)?;
        if k == 0 || state.docs.is_empty() {
            return Ok(Vec::new());
        }

        let fetch = k + state.stale;
        let ef_search = DEFAULT_EF_SEARCH.max(fetch);
        let mut hits: Vec<RetrievedDocument> = state
            .hnsw
            .search(embedding, fetch, ef_search)
            .into_iter()
            .filter_map(|neighbour| {
                state.docs.get(&neighbour.d_id).map(|doc| RetrievedDocument {
                    id: doc.id.clone(),
                    metadata: doc.metadata.clone(),
                    document: doc.document.clone(),
                    distance: neighbour.distance,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        Ok(hits)
    }
}

impl RetrievalStore for CorpusIndex {
    fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<RetrievedDocument>, ServiceError> {
        self.search(embedding, k).map_err(ServiceError::from)
    }

    fn add(
        &self,
        embedding: &[f32],
        document: &str,
        metadata: HashMap<String, String>,
        id: &str,
    ) -> Result<(), ServiceError> {
        self.insert_document(embedding, document, metadata, id)
            .map_err(ServiceError::from)
    }
}
