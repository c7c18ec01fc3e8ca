//! Offline ingestion of embedded chunks into the vector store

use crate::cancel::{cancellable, CancellationToken};
use crate::error::{LexRagError, Result};
use crate::llm::HttpEmbedder;
use crate::search::{QdrantClient, VectorPoint};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Points per upsert request
pub const DEFAULT_UPSERT_BATCH: usize = 256;

/// File name the embedding service writes next to the input directory
pub const POINTS_FILE_NAME: &str = "embeddings.json";

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Directory of chunk files, as seen by the embedding service
    pub input_dir: PathBuf,
    /// Points file to reuse or expect; defaults to `embeddings.json` beside `input_dir`
    pub points_file: Option<PathBuf>,
    /// Drop and recreate the collection before uploading
    pub recreate: bool,
    /// Required vector length
    pub dimensions: usize,
    pub batch_size: usize,
}

impl IngestOptions {
    pub fn new(input_dir: impl Into<PathBuf>, dimensions: usize) -> Self {
        Self {
            input_dir: input_dir.into(),
            points_file: None,
            recreate: false,
            dimensions,
            batch_size: DEFAULT_UPSERT_BATCH,
        }
    }

    /// Where the points file is expected
    pub fn resolved_points_file(&self) -> PathBuf {
        match self.points_file {
            Some(ref path) => path.clone(),
            None => self
                .input_dir
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(POINTS_FILE_NAME),
        }
    }
}

/// Summary of one ingestion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub points_file: PathBuf,
    /// True when an existing points file was used instead of running the batch job
    pub reused_points_file: bool,
    pub recreated_collection: bool,
    pub points: usize,
    pub batches: usize,
}

/// Embed a chunk directory (unless already done) and upload the points
pub async fn run_ingestion(
    embedder: &HttpEmbedder,
    store: &QdrantClient,
    options: &IngestOptions,
    cancel: &CancellationToken,
) -> Result<IngestReport> {
    if options.dimensions == 0 {
        return Err(LexRagError::InvalidInput(
            "dimensions must be positive".to_string(),
        ));
    }

    let expected = options.resolved_points_file();
    let (points_file, reused) = if expected.exists() {
        tracing::info!("Reusing points file {}", expected.display());
        (expected, true)
    } else {
        let job = embedder.embed_directory(&options.input_dir, cancel).await?;
        tracing::info!(
            "Embedding service wrote {} points to {}",
            job.count,
            job.embeddings_file.display()
        );
        (job.embeddings_file, false)
    };

    let points = load_points(&points_file).await?;
    validate_dimensions(&points, options.dimensions)?;

    if options.recreate {
        cancellable(cancel, store.recreate_collection(options.dimensions)).await?;
    }

    let batch_size = options.batch_size.max(1);
    let mut batches = 0;
    for batch in points.chunks(batch_size) {
        cancellable(cancel, store.upsert_points(batch)).await?;
        batches += 1;
        tracing::debug!("Uploaded batch {} ({} points)", batches, batch.len());
    }

    tracing::info!(
        "Ingested {} points into {} in {} batches",
        points.len(),
        store.collection(),
        batches
    );

    Ok(IngestReport {
        points_file,
        reused_points_file: reused,
        recreated_collection: options.recreate,
        points: points.len(),
        batches,
    })
}

/// Read a points file written by the embedding service
pub async fn load_points(path: &Path) -> Result<Vec<VectorPoint>> {
    let content = tokio::fs::read_to_string(path).await?;
    let points: Vec<VectorPoint> = serde_json::from_str(&content)?;
    Ok(points)
}

fn validate_dimensions(points: &[VectorPoint], dimensions: usize) -> Result<()> {
    match points.iter().find(|p| p.vector.len() != dimensions) {
        Some(point) => Err(LexRagError::InvalidInput(format!(
            "point {} has {} dimensions, expected {}",
            point.id,
            point.vector.len(),
            dimensions
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmbeddingServiceConfig, VectorStoreConfig};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tempfile::TempDir;

    fn points_json(count: usize, dims: usize) -> String {
        let points: Vec<_> = (0..count)
            .map(|i| {
                json!({
                    "id": i,
                    "vector": vec![0.1; dims],
                    "payload": {
                        "text": format!("line {}", i), "an": 2020,
                        "numar_lege": "Lege/2020", "cod_document": "L",
                        "filename": "20lege", "chunk": 1
                    }
                })
            })
            .collect();
        serde_json::to_string(&points).unwrap()
    }

    fn clients(embed_url: String, qdrant_url: String) -> (HttpEmbedder, QdrantClient) {
        let embedder = HttpEmbedder::new(EmbeddingServiceConfig {
            url: embed_url,
            dimensions: 3,
            ..EmbeddingServiceConfig::default()
        })
        .unwrap();
        let store = QdrantClient::new(VectorStoreConfig {
            url: qdrant_url,
            collection: "laws".to_string(),
            api_key: None,
            timeout_secs: 5,
            default_limit: 5,
        })
        .unwrap();
        (embedder, store)
    }

    #[tokio::test]
    async fn test_existing_points_file_skips_batch_job() {
        let temp = TempDir::new().unwrap();
        let input_dir = temp.path().join("chunks");
        std::fs::create_dir_all(&input_dir).unwrap();
        std::fs::write(temp.path().join(POINTS_FILE_NAME), points_json(5, 3)).unwrap();

        let mut embed_server = Server::new_async().await;
        let batch_job = embed_server
            .mock("POST", "/embed-batch")
            .expect(0)
            .create_async()
            .await;
        let mut qdrant = Server::new_async().await;
        let upsert = qdrant
            .mock("PUT", "/collections/laws/points")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"result": {"status": "completed"}}).to_string())
            .expect(3)
            .create_async()
            .await;

        let (embedder, store) = clients(embed_server.url(), qdrant.url());
        let options = IngestOptions {
            batch_size: 2,
            ..IngestOptions::new(&input_dir, 3)
        };
        let report = run_ingestion(&embedder, &store, &options, &CancellationToken::new())
            .await
            .unwrap();

        batch_job.assert_async().await;
        upsert.assert_async().await;
        assert!(report.reused_points_file);
        assert_eq!(report.points, 5);
        assert_eq!(report.batches, 3);
        assert!(!report.recreated_collection);
    }

    #[tokio::test]
    async fn test_runs_batch_job_and_recreates_collection() {
        let temp = TempDir::new().unwrap();
        let input_dir = temp.path().join("chunks");
        let written = temp.path().join("service-output.json");
        std::fs::write(&written, points_json(2, 3)).unwrap();

        let mut embed_server = Server::new_async().await;
        let batch_job = embed_server
            .mock("POST", "/embed-batch")
            .match_body(Matcher::Json(json!({"input_dir": input_dir.to_str().unwrap()})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"count": 2, "embeddings_file": written.to_str().unwrap()}).to_string())
            .create_async()
            .await;
        let mut qdrant = Server::new_async().await;
        qdrant
            .mock("DELETE", "/collections/laws")
            .with_status(200)
            .create_async()
            .await;
        let create = qdrant
            .mock("PUT", "/collections/laws")
            .with_status(200)
            .create_async()
            .await;
        qdrant
            .mock("PUT", "/collections/laws/points")
            .match_query(Matcher::Any)
            .with_status(200)
            .create_async()
            .await;

        let (embedder, store) = clients(embed_server.url(), qdrant.url());
        let options = IngestOptions {
            recreate: true,
            ..IngestOptions::new(&input_dir, 3)
        };
        let report = run_ingestion(&embedder, &store, &options, &CancellationToken::new())
            .await
            .unwrap();

        batch_job.assert_async().await;
        create.assert_async().await;
        assert!(!report.reused_points_file);
        assert_eq!(report.points_file, written);
        assert_eq!(report.batches, 1);
        assert!(report.recreated_collection);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_uploads_nothing() {
        let temp = TempDir::new().unwrap();
        let points_file = temp.path().join("points.json");
        std::fs::write(&points_file, points_json(2, 4)).unwrap();

        let mut qdrant = Server::new_async().await;
        let upsert = qdrant
            .mock("PUT", "/collections/laws/points")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let (embedder, store) = clients("http://127.0.0.1:1".to_string(), qdrant.url());
        let options = IngestOptions {
            points_file: Some(points_file),
            ..IngestOptions::new(temp.path().join("chunks"), 3)
        };
        let result = run_ingestion(&embedder, &store, &options, &CancellationToken::new()).await;

        assert!(matches!(result, Err(LexRagError::InvalidInput(msg)) if msg.contains("4 dimensions")));
        upsert.assert_async().await;
    }

    #[test]
    fn test_default_points_file_sits_beside_input_dir() {
        let options = IngestOptions::new("/data/chunks", 384);
        assert_eq!(
            options.resolved_points_file(),
            PathBuf::from("/data/embeddings.json")
        );
    }
}
