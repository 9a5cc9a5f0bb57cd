use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use super::{BulkReport, SearchPage, TextIndex};
use crate::models::RoomSearchDoc;

/// In-memory index for the test suites and index-less local runs. Applies the
/// same 5/3/1 field weighting as the real engine with plain lowercase token
/// matching (no fuzziness), and deterministic tie-breaking so assertions on
/// result order are stable.
#[derive(Default)]
pub struct MemoryIndex {
    docs: RwLock<HashMap<String, RoomSearchDoc>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.docs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<RoomSearchDoc> {
        self.docs.read().unwrap().get(id).cloned()
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| t.to_lowercase())
        .collect()
}

fn term_hits(field: &str, term: &str) -> u64 {
    tokens(field).iter().filter(|t| *t == term).count() as u64
}

fn score(doc: &RoomSearchDoc, terms: &[String]) -> u64 {
    let mut s = 0;
    for term in terms {
        s += 5 * term_hits(&doc.title, term);
        s += 3 * term_hits(&doc.search_combined, term);
        if let Some(ref d) = doc.description {
            s += term_hits(d, term);
        }
    }
    s
}

#[async_trait]
impl TextIndex for MemoryIndex {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, doc: &RoomSearchDoc) -> Result<()> {
        self.docs
            .write()
            .unwrap()
            .insert(doc.id.clone(), doc.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        // absent id is success
        self.docs.write().unwrap().remove(id);
        Ok(())
    }

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<SearchPage> {
        let terms = tokens(query);

        let mut scored: Vec<(u64, String)> = self
            .docs
            .read()
            .unwrap()
            .values()
            .filter_map(|doc| {
                let s = score(doc, &terms);
                (s > 0).then(|| (s, doc.id.clone()))
            })
            .collect();

        // score desc, id asc on ties
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        let total = scored.len() as u64;
        let from = (page.saturating_sub(1) as usize) * page_size as usize;
        let ids = scored
            .into_iter()
            .skip(from)
            .take(page_size as usize)
            .map(|(_, id)| id)
            .collect();

        Ok(SearchPage { ids, total })
    }

    async fn bulk_upsert(&self, docs: &[RoomSearchDoc]) -> Result<BulkReport> {
        let mut map = self.docs.write().unwrap();
        for doc in docs {
            map.insert(doc.id.clone(), doc.clone());
        }
        Ok(BulkReport {
            succeeded: docs.len(),
            failed: 0,
        })
    }
}
