//! Shared helpers: a minimal Elasticsearch look-alike served by axum, and a
//! way to serve any router on an ephemeral port.

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use es_driver::infrastructure::{ElasticsearchConfig, ElasticsearchStore};

type Reply = (StatusCode, Json<Value>);

/// Typeless (7.x style) document endpoints over an in-process map.
#[derive(Default)]
pub struct FakeCluster {
    docs: Mutex<HashMap<(String, String), Map<String, Value>>>,
    indices: Mutex<HashMap<String, Value>>,
    next_id: AtomicUsize,
    requests: AtomicUsize,
}

impl FakeCluster {
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn document(&self, index: &str, id: &str) -> Option<Map<String, Value>> {
        self.docs
            .lock()
            .unwrap()
            .get(&(index.to_string(), id.to_string()))
            .cloned()
    }

    pub fn mappings(&self, index: &str) -> Option<Value> {
        self.indices.lock().unwrap().get(index).cloned()
    }

    fn hit(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

async fn root(State(cluster): State<Arc<FakeCluster>>) -> Json<Value> {
    cluster.hit();
    Json(json!({ "name": "fake", "version": { "number": "7.17.0" } }))
}

async fn bulk(State(cluster): State<Arc<FakeCluster>>, body: String) -> Json<Value> {
    cluster.hit();
    let lines: Vec<&str> = body.lines().filter(|l| !l.trim().is_empty()).collect();
    let mut items = Vec::new();

    for pair in lines.chunks(2) {
        let action: Value = serde_json::from_str(pair[0]).unwrap();
        let index = action["index"]["_index"].as_str().unwrap().to_string();
        let source: Value = serde_json::from_str(pair[1]).unwrap();

        match source {
            Value::Object(map) => {
                let id = format!("doc{}", cluster.next_id.fetch_add(1, Ordering::SeqCst) + 1);
                cluster
                    .docs
                    .lock()
                    .unwrap()
                    .insert((index.clone(), id.clone()), map);
                items.push(json!({
                    "index": { "_index": index, "_id": id, "_version": 1, "result": "created", "status": 201 }
                }));
            }
            _ => items.push(json!({
                "index": {
                    "_index": index,
                    "status": 400,
                    "error": { "type": "mapper_parsing_exception", "reason": "source is not an object" }
                }
            })),
        }
    }

    Json(json!({ "took": 1, "errors": false, "items": items }))
}

async fn get_doc(
    State(cluster): State<Arc<FakeCluster>>,
    Path((index, id)): Path<(String, String)>,
) -> Reply {
    cluster.hit();
    match cluster.document(&index, &id) {
        Some(source) => (
            StatusCode::OK,
            Json(json!({ "_index": index, "_id": id, "_version": 1, "found": true, "_source": source })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "_index": index, "_id": id, "found": false })),
        ),
    }
}

async fn update_doc(
    State(cluster): State<Arc<FakeCluster>>,
    Path((index, id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Reply {
    cluster.hit();
    let mut docs = cluster.docs.lock().unwrap();
    let Some(existing) = docs.get_mut(&(index.clone(), id.clone())) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": { "type": "document_missing_exception", "reason": format!("[{id}]: document missing") },
                "status": 404
            })),
        );
    };

    if let Some(Value::Object(partial)) = body.get("doc") {
        for (key, value) in partial {
            existing.insert(key.clone(), value.clone());
        }
    }

    let mut reply = json!({ "_index": index, "_id": id, "_version": 2, "result": "updated" });
    if params.get("_source").map(String::as_str) == Some("true") {
        reply["get"] = json!({ "found": true, "_source": existing.clone() });
    }
    (StatusCode::OK, Json(reply))
}

async fn delete_doc(
    State(cluster): State<Arc<FakeCluster>>,
    Path((index, id)): Path<(String, String)>,
) -> Reply {
    cluster.hit();
    match cluster.docs.lock().unwrap().remove(&(index.clone(), id.clone())) {
        Some(_) => (
            StatusCode::OK,
            Json(json!({ "_index": index, "_id": id, "result": "deleted" })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "_index": index, "_id": id, "result": "not_found" })),
        ),
    }
}

async fn create_index(
    State(cluster): State<Arc<FakeCluster>>,
    Path(index): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    cluster.hit();
    let mut indices = cluster.indices.lock().unwrap();
    if indices.contains_key(&index) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": { "type": "resource_already_exists_exception", "reason": format!("index [{index}] already exists") },
                "status": 400
            })),
        );
    }

    indices.insert(index.clone(), body["mappings"].clone());
    (
        StatusCode::OK,
        Json(json!({ "acknowledged": true, "index": index })),
    )
}

async fn delete_index(
    State(cluster): State<Arc<FakeCluster>>,
    Path(index): Path<String>,
) -> Reply {
    cluster.hit();
    if cluster.indices.lock().unwrap().remove(&index).is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": { "type": "index_not_found_exception", "reason": format!("no such index [{index}]") },
                "status": 404
            })),
        );
    }

    cluster.docs.lock().unwrap().retain(|(i, _), _| i != &index);
    (StatusCode::OK, Json(json!({ "acknowledged": true })))
}

pub fn fake_cluster_router(cluster: Arc<FakeCluster>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/_bulk", post(bulk))
        .route("/{index}", put(create_index).delete(delete_index))
        .route("/{index}/_doc/{id}", get(get_doc).delete(delete_doc))
        .route("/{index}/_update/{id}", post(update_doc))
        .with_state(cluster)
}

/// Serves `router` on 127.0.0.1 and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub async fn spawn_cluster() -> (Arc<FakeCluster>, String) {
    let cluster = Arc::new(FakeCluster::default());
    let url = serve(fake_cluster_router(cluster.clone())).await;
    (cluster, url)
}

pub fn store_for(url: &str) -> ElasticsearchStore {
    ElasticsearchStore::new(&ElasticsearchConfig::new(url)).unwrap()
}
