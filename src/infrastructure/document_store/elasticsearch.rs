use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::{
    ports::{
        BulkIndexItem, BulkIndexResponse, DocumentRef, DocumentStore, IndexedItem, StoredDocument,
    },
    DomainError, Fields, StoreError,
};
use crate::infrastructure::config::{ApiFlavor, AppConfig, ElasticsearchConfig};

/// Elasticsearch over its REST API. The underlying connection pool is built
/// once and shared by every request.
#[derive(Debug)]
pub struct ElasticsearchStore {
    client: Client,
    base: Url,
    api: ApiFlavor,
}

impl ElasticsearchStore {
    pub fn new(config: &ElasticsearchConfig) -> Result<Self, DomainError> {
        let base = Url::parse(&config.host).map_err(|e| {
            DomainError::initialization(format!("invalid elasticsearch host {}: {e}", config.host))
        })?;
        if base.cannot_be_a_base() {
            return Err(DomainError::initialization(format!(
                "invalid elasticsearch host {}",
                config.host
            )));
        }

        let mut builder = Client::builder();
        if let Some(seconds) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| DomainError::initialization(e.to_string()))?;

        info!(host = %base, api = ?config.api, "elasticsearch client ready");

        Ok(Self {
            client,
            base,
            api: config.api,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        Self::new(config.elasticsearch()?)
    }

    /// Returns `false` when the index did not exist.
    pub async fn delete_index(&self, index: &str) -> Result<bool, StoreError> {
        let url = self.endpoint(&[index])?;
        let (status, body) = self.send(self.client.delete(url)).await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check(status, body, None).map(|_| true)
    }

    pub async fn create_index(
        &self,
        index: &str,
        doc_type: &str,
        mapping: Value,
    ) -> Result<(), StoreError> {
        let url = self.endpoint(&[index])?;
        let (status, body) = self
            .send(self.client.put(url).json(&self.index_body(doc_type, mapping)))
            .await?;
        check(status, body, None).map(|_| ())
    }

    fn index_body(&self, doc_type: &str, mapping: Value) -> Value {
        let mappings = match self.api {
            ApiFlavor::Typeless => mapping,
            ApiFlavor::Typed => {
                let mut typed = Fields::new();
                typed.insert(doc_type.to_string(), mapping);
                Value::Object(typed)
            }
        };
        json!({ "mappings": mappings })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Internal(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn document_url(&self, doc: &DocumentRef) -> Result<Url, StoreError> {
        let (index, doc_type, id) = parts(doc);
        match self.api {
            ApiFlavor::Typeless => self.endpoint(&[index, "_doc", id]),
            ApiFlavor::Typed => self.endpoint(&[index, doc_type, id]),
        }
    }

    fn update_url(&self, doc: &DocumentRef) -> Result<Url, StoreError> {
        let (index, doc_type, id) = parts(doc);
        match self.api {
            ApiFlavor::Typeless => self.endpoint(&[index, "_update", id]),
            ApiFlavor::Typed => self.endpoint(&[index, doc_type, id, "_update"]),
        }
    }

    /// Newline-delimited action/source pairs, with the trailing newline the
    /// bulk endpoint requires.
    fn bulk_body(&self, items: &[BulkIndexItem]) -> Result<String, StoreError> {
        let mut body = String::new();

        for item in items {
            let mut meta = Fields::new();
            meta.insert("_index".to_string(), json!(item.location.index));
            if self.api == ApiFlavor::Typed {
                meta.insert("_type".to_string(), json!(item.location.doc_type));
            }

            body.push_str(&json!({ "index": meta }).to_string());
            body.push('\n');
            body.push_str(
                &serde_json::to_string(&item.body)
                    .map_err(|e| StoreError::Internal(e.to_string()))?,
            );
            body.push('\n');
        }

        Ok(body)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<(StatusCode, Value), StoreError> {
        let request = builder
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        debug!(method = %request.method(), url = %request.url(), "elasticsearch request");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok((status, body))
    }
}

fn parts(doc: &DocumentRef) -> (&str, &str, &str) {
    (
        doc.location.index.as_str(),
        doc.location.doc_type.as_str(),
        doc.id.as_str(),
    )
}

#[derive(Debug, Deserialize)]
struct BulkReply {
    items: Vec<BulkReplyItem>,
}

#[derive(Debug, Deserialize)]
struct BulkReplyItem {
    index: BulkItemStatus,
}

#[derive(Debug, Deserialize)]
struct BulkItemStatus {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    status: u16,
    #[serde(default)]
    error: Option<Value>,
    #[serde(rename = "_source", default)]
    source: Fields,
}

impl BulkItemStatus {
    fn into_item(self) -> Result<IndexedItem, StoreError> {
        if let Some(error) = self.error {
            let reason = reason(&error).unwrap_or_else(|| error.to_string());
            return Err(if self.status == StatusCode::CONFLICT.as_u16() {
                StoreError::Conflict(reason)
            } else {
                StoreError::Rejected {
                    status: self.status,
                    reason,
                }
            });
        }

        let id = self
            .id
            .ok_or_else(|| StoreError::malformed("bulk item without _id"))?;
        Ok(IndexedItem {
            id,
            source: self.source,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GetReply {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: Fields,
}

#[derive(Debug, Deserialize)]
struct UpdateReply {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    get: Option<UpdateGet>,
}

#[derive(Debug, Deserialize)]
struct UpdateGet {
    #[serde(rename = "_source", default)]
    source: Fields,
}

fn reason(error: &Value) -> Option<String> {
    error
        .get("reason")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::to_string)
}

fn error_reason(status: StatusCode, body: &Value) -> String {
    body.get("error")
        .and_then(reason)
        .or_else(|| body.get("result").and_then(Value::as_str).map(str::to_string))
        .or_else(|| body.as_str().map(str::to_string))
        .unwrap_or_else(|| status.to_string())
}

/// Maps a non-success status to a store error. `doc` is the addressed
/// document, when there is one, so a 404 can say which.
fn check(status: StatusCode, body: Value, doc: Option<&DocumentRef>) -> Result<Value, StoreError> {
    if status.is_success() {
        return Ok(body);
    }

    let reason = error_reason(status, &body);
    Err(match (status, doc) {
        (StatusCode::NOT_FOUND, Some(doc)) => StoreError::not_found(&doc.location.index, &doc.id),
        (StatusCode::CONFLICT, _) => StoreError::Conflict(reason),
        _ => StoreError::Rejected {
            status: status.as_u16(),
            reason,
        },
    })
}

fn parse<T: DeserializeOwned>(body: Value) -> Result<T, StoreError> {
    serde_json::from_value(body).map_err(|e| StoreError::malformed(e.to_string()))
}

#[async_trait]
impl DocumentStore for ElasticsearchStore {
    async fn bulk_index(&self, items: &[BulkIndexItem]) -> Result<BulkIndexResponse, StoreError> {
        let url = self.endpoint(&["_bulk"])?;
        let request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(self.bulk_body(items)?);

        let (status, body) = self.send(request).await?;
        let reply: BulkReply = parse(check(status, body, None)?)?;

        Ok(BulkIndexResponse {
            items: reply
                .items
                .into_iter()
                .map(|item| item.index.into_item())
                .collect(),
        })
    }

    async fn get(&self, doc: &DocumentRef) -> Result<StoredDocument, StoreError> {
        let url = self.document_url(doc)?;
        let (status, body) = self.send(self.client.get(url)).await?;
        let reply: GetReply = parse(check(status, body, Some(doc))?)?;

        Ok(StoredDocument {
            id: reply.id,
            source: reply.source,
        })
    }

    async fn update(
        &self,
        doc: &DocumentRef,
        partial: &Fields,
    ) -> Result<StoredDocument, StoreError> {
        let url = self.update_url(doc)?;
        let request = self
            .client
            .post(url)
            .query(&[("_source", "true")])
            .json(&json!({ "doc": partial }));

        let (status, body) = self.send(request).await?;
        let reply: UpdateReply = parse(check(status, body, Some(doc))?)?;

        Ok(StoredDocument {
            id: reply.id,
            source: reply.get.map(|get| get.source).unwrap_or_default(),
        })
    }

    async fn delete(&self, doc: &DocumentRef) -> Result<(), StoreError> {
        let url = self.document_url(doc)?;
        let (status, body) = self.send(self.client.delete(url)).await?;
        check(status, body, Some(doc)).map(|_| ())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let (status, body) = self.send(self.client.get(self.base.clone())).await?;
        check(status, body, None).map(|_| ())
    }
}
