use anyhow::{anyhow, Result};
use async_trait::async_trait;
use opensearch::http::request::JsonBody;
use opensearch::http::transport::Transport;
use opensearch::http::StatusCode;
use opensearch::indices::{IndicesCreateParts, IndicesExistsParts};
use opensearch::{BulkParts, DeleteParts, IndexParts, OpenSearch, SearchParts};
use serde_json::{json, Value};

use super::{BulkReport, SearchPage, TextIndex};
use crate::models::RoomSearchDoc;

pub struct OpenSearchIndex {
    client: OpenSearch,
    index: String,
}

impl OpenSearchIndex {
    pub fn new(url: &str, index: &str) -> Result<Self> {
        let transport = Transport::single_node(url)?;
        Ok(Self {
            client: OpenSearch::new(transport),
            index: index.to_string(),
        })
    }

    /// Quick reachability probe used by the startup retry loop.
    pub async fn ping(&self) -> Result<()> {
        let res = self.client.ping().send().await?;
        res.error_for_status_code()?;
        Ok(())
    }
}

/// The domain's text is accent-sensitive natural language; search must be
/// accent- and case-insensitive, hence lowercase + asciifolding on every
/// searchable field.
fn room_mapping() -> Value {
    json!({
        "settings": {
            "analysis": {
                "analyzer": {
                    "vi_analyzer": {
                        "tokenizer": "standard",
                        "filter": ["lowercase", "asciifolding"]
                    }
                }
            }
        },
        "mappings": {
            "properties": {
                "id":              { "type": "keyword" },
                "province":        { "type": "text", "analyzer": "vi_analyzer" },
                "district":        { "type": "text", "analyzer": "vi_analyzer" },
                "ward":            { "type": "text", "analyzer": "vi_analyzer" },
                "title":           { "type": "text", "analyzer": "vi_analyzer" },
                "description":     { "type": "text", "analyzer": "vi_analyzer" },
                "search_combined": { "type": "text", "analyzer": "vi_analyzer" }
            }
        }
    })
}

#[async_trait]
impl TextIndex for OpenSearchIndex {
    async fn ensure_schema(&self) -> Result<()> {
        let exists = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[&self.index]))
            .send()
            .await?;
        if exists.status_code().is_success() {
            return Ok(());
        }

        let res = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&self.index))
            .body(room_mapping())
            .send()
            .await?;

        if res.status_code().is_success() {
            return Ok(());
        }
        // Lost a race with another instance creating the same index.
        let body = res.text().await.unwrap_or_default();
        if body.contains("resource_already_exists_exception") {
            return Ok(());
        }
        Err(anyhow!("index creation failed: {body}"))
    }

    async fn upsert(&self, doc: &RoomSearchDoc) -> Result<()> {
        let res = self
            .client
            .index(IndexParts::IndexId(&self.index, &doc.id))
            .body(doc)
            .send()
            .await?;
        res.error_for_status_code()?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let res = self
            .client
            .delete(DeleteParts::IndexId(&self.index, id))
            .send()
            .await?;
        // Already gone counts as deleted.
        if res.status_code() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        res.error_for_status_code()?;
        Ok(())
    }

    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<SearchPage> {
        let from = (page.saturating_sub(1) as u64) * page_size as u64;

        let res = self
            .client
            .search(SearchParts::Index(&[&self.index]))
            .body(json!({
                "track_total_hits": true,
                "query": {
                    "multi_match": {
                        "query": query,
                        "fields": ["title^5", "search_combined^3", "description^1"],
                        "type": "best_fields",
                        "fuzziness": "AUTO"
                    }
                },
                "from": from,
                "size": page_size,
                "_source": ["id"]
            }))
            .send()
            .await?;
        let res = res.error_for_status_code()?;

        let body: Value = res.json().await?;
        let total = body["hits"]["total"]["value"].as_u64().unwrap_or(0);

        let mut ids = Vec::new();
        if let Some(hits) = body["hits"]["hits"].as_array() {
            for hit in hits {
                if let Some(id) = hit["_id"].as_str() {
                    ids.push(id.to_string());
                }
            }
        }

        Ok(SearchPage { ids, total })
    }

    async fn bulk_upsert(&self, docs: &[RoomSearchDoc]) -> Result<BulkReport> {
        if docs.is_empty() {
            return Ok(BulkReport::default());
        }

        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(docs.len() * 2);
        for doc in docs {
            body.push(json!({ "index": { "_id": doc.id } }).into());
            body.push(serde_json::to_value(doc)?.into());
        }

        let res = self
            .client
            .bulk(BulkParts::Index(&self.index))
            .body(body)
            .send()
            .await?;
        let res = res.error_for_status_code()?;

        let response: Value = res.json().await?;
        let mut report = BulkReport::default();
        if let Some(items) = response["items"].as_array() {
            for item in items {
                if item["index"]["error"].is_null() {
                    report.succeeded += 1;
                } else {
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }
}
