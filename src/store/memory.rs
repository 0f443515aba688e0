use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use async_trait::async_trait;

use super::{ensure_code, ensure_url, LinkStore, Result, StoreError, MAX_ALLOC_ATTEMPTS};
use crate::codegen::CodeGenerator;
use crate::models::{Record, Resolution};

/// In-memory store backed by a DashMap.
///
/// Per-code atomicity comes from the map's shard locks: `entry()` gives an
/// exclusive insert-if-absent for allocation, and `get_mut()` holds the shard
/// write lock across the whole read-modify-write of a resolution or update,
/// so concurrent operations on the same code serialize while operations on
/// other codes proceed.
pub struct MemoryStore {
    links: DashMap<String, Record>,
    codegen: CodeGenerator,
}

impl MemoryStore {
    pub fn new(codegen: CodeGenerator) -> Self {
        Self {
            links: DashMap::new(),
            codegen,
        }
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn allocate(&self, url: &str, indexable: bool) -> Result<Record> {
        ensure_url(url)?;

        for attempt in 1..=MAX_ALLOC_ATTEMPTS {
            let code = self.codegen.generate();
            match self.links.entry(code.clone()) {
                Entry::Occupied(_) => {
                    tracing::debug!(
                        "code '{}' already taken (attempt {}/{})",
                        code,
                        attempt,
                        MAX_ALLOC_ATTEMPTS
                    );
                }
                Entry::Vacant(slot) => {
                    let record = Record {
                        code,
                        url: url.to_owned(),
                        clicks: 0,
                        indexable,
                        created_at: Utc::now().naive_utc(),
                    };
                    slot.insert(record.clone());
                    return Ok(record);
                }
            }
        }

        Err(StoreError::KeyspaceExhausted {
            attempts: MAX_ALLOC_ATTEMPTS,
        })
    }

    async fn resolve(&self, code: &str) -> Result<Resolution> {
        ensure_code(code)?;

        match self.links.get_mut(code) {
            Some(mut link) => {
                // Increment and snapshot under the same shard write lock.
                link.clicks += 1;
                Ok(Resolution {
                    url: link.url.clone(),
                    indexable: link.indexable,
                })
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn update(&self, code: &str, url: &str, indexable: bool) -> Result<Record> {
        ensure_code(code)?;
        ensure_url(url)?;

        match self.links.get_mut(code) {
            Some(mut link) => {
                // `clicks` is deliberately left alone.
                link.url = url.to_owned();
                link.indexable = indexable;
                Ok(link.clone())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, code: &str) -> Result<()> {
        ensure_code(code)?;

        match self.links.remove(code) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    async fn analytics(&self, code: &str) -> Result<Record> {
        ensure_code(code)?;

        match self.links.get(code) {
            Some(link) => Ok(link.clone()),
            None => Err(StoreError::NotFound),
        }
    }
}
