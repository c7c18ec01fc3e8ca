//! Qdrant REST client

use super::{SearchClient, SearchResult};
use crate::cancel::{cancellable, CancellationToken};
use crate::config::VectorStoreConfig;
use crate::error::{LexRagError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Payload keys written at ingestion time
pub mod payload_keys {
    pub const TEXT: &str = "text";
    pub const YEAR: &str = "an";
    pub const LAW_NUMBER: &str = "numar_lege";
    pub const LAW_CODE: &str = "cod_document";
    pub const FILENAME: &str = "filename";
    pub const CHUNK: &str = "chunk";
}

/// Metadata stored next to each chunk vector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointPayload {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "an", default)]
    pub year: i64,
    #[serde(rename = "numar_lege", default)]
    pub law_number: String,
    #[serde(rename = "cod_document", default)]
    pub law_code: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub chunk: i64,
}

/// One point as produced by the batch embedding job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: PointPayload,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    #[serde(default)]
    score: f32,
    #[serde(default)]
    payload: Option<Map<String, Value>>,
}

/// Client for a single Qdrant collection
pub struct QdrantClient {
    http_client: reqwest::Client,
    config: VectorStoreConfig,
}

impl QdrantClient {
    pub fn new(config: VectorStoreConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &VectorStoreConfig {
        &self.config
    }

    pub fn collection(&self) -> &str {
        &self.config.collection
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!(
            "{}/collections/{}{}",
            self.config.url.trim_end_matches('/'),
            self.config.collection,
            suffix
        )
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        let builder = self.http_client.request(method, url);
        match self.config.api_key {
            Some(ref key) => builder.header("api-key", key),
            None => builder,
        }
    }

    async fn query(&self, vector: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let body = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });

        let response = self
            .request(reqwest::Method::POST, self.collection_url("/points/search"))
            .json(&body)
            .send()
            .await
            .map_err(|e| LexRagError::SearchUnavailable(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LexRagError::SearchUnavailable(format!(
                "Qdrant API error (HTTP {}): {}",
                status, text
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| LexRagError::SearchUnavailable(format!("invalid response body: {}", e)))?;

        Ok(parsed
            .result
            .into_iter()
            .map(|point| {
                let payload = point.payload.unwrap_or_default();
                SearchResult {
                    score: point.score,
                    text: string_field(&payload, payload_keys::TEXT),
                    year: int_field(&payload, payload_keys::YEAR),
                    law_number: string_field(&payload, payload_keys::LAW_NUMBER),
                    law_code: string_field(&payload, payload_keys::LAW_CODE),
                    filename: string_field(&payload, payload_keys::FILENAME),
                    chunk: int_field(&payload, payload_keys::CHUNK),
                }
            })
            .collect())
    }

    /// Drop the collection if present and create it empty with cosine distance
    pub async fn recreate_collection(&self, dimensions: usize) -> Result<()> {
        let response = self
            .request(reqwest::Method::DELETE, self.collection_url(""))
            .send()
            .await
            .map_err(|e| LexRagError::SearchUnavailable(format!("request failed: {}", e)))?;
        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(LexRagError::SearchUnavailable(format!(
                "failed to delete collection {}: HTTP {}",
                self.config.collection,
                response.status()
            )));
        }

        let response = self
            .request(reqwest::Method::PUT, self.collection_url(""))
            .json(&json!({
                "vectors": {"size": dimensions, "distance": "Cosine"}
            }))
            .send()
            .await
            .map_err(|e| LexRagError::SearchUnavailable(format!("request failed: {}", e)))?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LexRagError::SearchUnavailable(format!(
                "failed to create collection {} (HTTP {}): {}",
                self.config.collection, status, text
            )));
        }

        tracing::info!(
            "Recreated collection {} ({} dims, cosine)",
            self.config.collection,
            dimensions
        );
        Ok(())
    }

    /// Insert or replace points, waiting until they are searchable
    pub async fn upsert_points(&self, points: &[VectorPoint]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let response = self
            .request(reqwest::Method::PUT, self.collection_url("/points?wait=true"))
            .json(&json!({ "points": points }))
            .send()
            .await
            .map_err(|e| LexRagError::SearchUnavailable(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LexRagError::SearchUnavailable(format!(
                "upsert failed (HTTP {}): {}",
                status, text
            )));
        }

        tracing::debug!("Upserted {} points into {}", points.len(), self.config.collection);
        Ok(())
    }
}

#[async_trait]
impl SearchClient for QdrantClient {
    async fn search(
        &self,
        vector: &[f32],
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>> {
        let limit = if limit == 0 {
            self.config.default_limit
        } else {
            limit
        };

        match cancellable(cancel, self.query(vector, limit)).await {
            Ok(results) => {
                tracing::debug!("Qdrant returned {} results", results.len());
                Ok(results)
            }
            Err(LexRagError::Cancelled) => Err(LexRagError::Cancelled),
            Err(e) => {
                tracing::warn!("Search in {} failed: {}", self.config.collection, e);
                Ok(Vec::new())
            }
        }
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/", self.config.url.trim_end_matches('/'));
        match self.request(reqwest::Method::GET, url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

fn string_field(payload: &Map<String, Value>, key: &str) -> String {
    match payload.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn int_field(payload: &Map<String, Value>, key: &str) -> i64 {
    match payload.get(key) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(url: String, api_key: Option<&str>) -> QdrantClient {
        QdrantClient::new(VectorStoreConfig {
            url,
            collection: "laws".to_string(),
            api_key: api_key.map(String::from),
            timeout_secs: 5,
            default_limit: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_maps_payload() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/collections/laws/points/search")
            .match_body(Matcher::PartialJson(json!({"limit": 2, "with_payload": true})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"result": [
                    {"id": 1, "score": 0.92, "payload": {
                        "text": "Law 123 says X is regulated.", "an": 2020,
                        "numar_lege": "123", "cod_document": "L",
                        "filename": "20l123", "chunk": 0
                    }},
                    {"id": 2, "score": 0.41, "payload": {"text": "partial"}}
                ], "status": "ok", "time": 0.001})
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(server.url(), None);
        let results = client
            .search(&[0.1, 0.2], 2, &CancellationToken::new())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].law_number, "123");
        assert_eq!(results[0].law_code, "L");
        assert_eq!(results[0].year, 2020);
        assert_eq!(results[0].filename, "20l123");
        assert!(results[0].score > results[1].score);
        assert_eq!(results[1].text, "partial");
        assert_eq!(results[1].year, 0);
        assert_eq!(results[1].law_number, "");
    }

    #[tokio::test]
    async fn test_zero_limit_uses_default() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/collections/laws/points/search")
            .match_body(Matcher::PartialJson(json!({"limit": 5})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"result": []}).to_string())
            .create_async()
            .await;

        let client = client_for(server.url(), None);
        let results = client
            .search(&[0.1], 0, &CancellationToken::new())
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_sends_api_key() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/collections/laws/points/search")
            .match_header("api-key", "secret")
            .with_status(200)
            .with_body(json!({"result": []}).to_string())
            .create_async()
            .await;

        let client = client_for(server.url(), Some("secret"));
        client
            .search(&[0.1], 1, &CancellationToken::new())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_degrades_to_empty() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/collections/laws/points/search")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = client_for(server.url(), None);
        let results = client
            .search(&[0.1], 3, &CancellationToken::new())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_degrades_to_empty() {
        let client = client_for("http://127.0.0.1:1".to_string(), None);
        let results = client
            .search(&[0.1], 3, &CancellationToken::new())
            .await
            .unwrap();
        assert!(results.is_empty());
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_cancelled_search_is_error() {
        let client = client_for("http://127.0.0.1:1".to_string(), None);
        let token = CancellationToken::new();
        token.cancel();
        let result = client.search(&[0.1], 3, &token).await;
        assert!(matches!(result, Err(LexRagError::Cancelled)));
    }

    #[tokio::test]
    async fn test_recreate_and_upsert() {
        let mut server = Server::new_async().await;
        let delete = server
            .mock("DELETE", "/collections/laws")
            .with_status(404)
            .create_async()
            .await;
        let create = server
            .mock("PUT", "/collections/laws")
            .match_body(Matcher::Json(
                json!({"vectors": {"size": 3, "distance": "Cosine"}}),
            ))
            .with_status(200)
            .with_body(json!({"result": true}).to_string())
            .create_async()
            .await;
        let upsert = server
            .mock("PUT", "/collections/laws/points")
            .match_query(Matcher::UrlEncoded("wait".into(), "true".into()))
            .match_body(Matcher::PartialJson(json!({"points": [
                {"id": 7, "payload": {"an": 2019, "numar_lege": "55"}}
            ]})))
            .with_status(200)
            .with_body(json!({"result": {"status": "completed"}}).to_string())
            .create_async()
            .await;

        let client = client_for(server.url(), None);
        client.recreate_collection(3).await.unwrap();
        client
            .upsert_points(&[VectorPoint {
                id: 7,
                vector: vec![0.1, 0.2, 0.3],
                payload: PointPayload {
                    text: "Art. 1".to_string(),
                    year: 2019,
                    law_number: "55".to_string(),
                    law_code: "L".to_string(),
                    filename: "19l55".to_string(),
                    chunk: 0,
                },
            }])
            .await
            .unwrap();

        delete.assert_async().await;
        create.assert_async().await;
        upsert.assert_async().await;
    }

    #[test]
    fn test_lenient_payload_fields() {
        let payload: Map<String, Value> =
            serde_json::from_value(json!({"an": "2021", "numar_lege": 77})).unwrap();
        assert_eq!(int_field(&payload, payload_keys::YEAR), 2021);
        assert_eq!(string_field(&payload, payload_keys::LAW_NUMBER), "77");
        assert_eq!(int_field(&payload, payload_keys::CHUNK), 0);
    }
}
