//! OpenAI embedding client tests against a local HTTP stub.
//!
//! The stub serves a scripted sequence of responses, one per connection,
//! so retry behavior can be asserted from request counts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use solrvec::{EmbeddingProvider, OpenAiEmbedder, RetryPolicy, StoreError};

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Serve one scripted response per connection; returns the endpoint URL and
/// a counter of requests actually received.
async fn spawn_stub(responses: Vec<(u16, String)>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_clone = hits.clone();

    tokio::spawn(async move {
        for (status, body) in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            hits_clone.fetch_add(1, Ordering::SeqCst);

            // Drain the request: headers, then content-length worth of body.
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let Ok(n) = socket.read(&mut chunk).await else {
                    break;
                };
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(header_end) = find_subslice(&buf, b"\r\n\r\n") {
                    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
                    let content_length = headers
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{addr}/v1/embeddings"), hits)
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_delay: Duration::from_millis(10),
        multiplier: 2.0,
        max_delay: Duration::from_millis(50),
    }
}

fn embedder(endpoint: &str) -> OpenAiEmbedder {
    OpenAiEmbedder::new("test-key".into(), "text-embedding-3-small".into())
        .with_endpoint(endpoint)
        .with_retry_policy(fast_retry())
}

#[tokio::test]
async fn test_embed_hello_returns_provider_vector() {
    let body = r#"{"data":[{"embedding":[0.1,0.2,0.3]}]}"#.to_string();
    let (endpoint, hits) = spawn_stub(vec![(200, body)]).await;

    let vector = embedder(&endpoint).embed("hello").await.unwrap();
    assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_server_error_retried_then_succeeds() {
    let ok = r#"{"data":[{"embedding":[1.0]}]}"#.to_string();
    let (endpoint, hits) = spawn_stub(vec![
        (500, r#"{"error":"overloaded"}"#.to_string()),
        (200, ok),
    ])
    .await;

    let vector = embedder(&endpoint).embed("hello").await.unwrap();
    assert_eq!(vector, vec![1.0]);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_retries_exhausted_surfaces_last_error() {
    let err = r#"{"error":"overloaded"}"#.to_string();
    let (endpoint, hits) =
        spawn_stub(vec![(503, err.clone()), (503, err.clone()), (503, err)]).await;

    let result = embedder(&endpoint).embed("hello").await;
    assert!(matches!(result, Err(StoreError::TransientError(_))));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_client_error_not_retried() {
    let err = r#"{"error":"invalid model"}"#.to_string();
    let (endpoint, hits) = spawn_stub(vec![(400, err.clone()), (400, err)]).await;

    let result = embedder(&endpoint).embed("hello").await;
    assert!(matches!(result, Err(StoreError::ProviderError(_))));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_batch_count_mismatch_detected() {
    // Two inputs, one vector back.
    let body = r#"{"data":[{"embedding":[0.1,0.2]}]}"#.to_string();
    let (endpoint, _) = spawn_stub(vec![(200, body)]).await;

    let texts = vec!["one".to_string(), "two".to_string()];
    let result = embedder(&endpoint).embed_batch(&texts).await;
    match result {
        Err(StoreError::CountMismatchError { expected, actual }) => {
            assert_eq!(expected, 2);
            assert_eq!(actual, 1);
        }
        other => panic!("expected count mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_batch_returns_vector_per_text() {
    let body = r#"{"data":[{"embedding":[0.1]},{"embedding":[0.2]}]}"#.to_string();
    let (endpoint, hits) = spawn_stub(vec![(200, body)]).await;

    let texts = vec!["one".to_string(), "two".to_string()];
    let vectors = embedder(&endpoint).embed_batch(&texts).await.unwrap();
    assert_eq!(vectors, vec![vec![0.1], vec![0.2]]);
    // Whole batch in a single provider call.
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
