//! HTTP adapter for downloading original images.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, header};
use tracing::debug;

use crate::domain::entities::FetchRequest;
use crate::domain::errors::{ImageError, ImageResult};
use crate::domain::ports::ImageFetchPort;

const USER_AGENT: &str = concat!("htpc-helpers/", env!("CARGO_PKG_VERSION"));

/// Header value sent when the caller asks to bypass remote caches.
///
/// Some backends answer 304 for artwork the local cache no longer has.
pub const NO_CACHE: &str = "private, max-age=0, no-cache, must-revalidate";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Downloads images over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    /// Creates a fetcher whose requests give up after `timeout`.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(timeout: Duration) -> ImageResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ImageError::fetch("", format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Creates a fetcher with the default timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_defaults() -> ImageResult<Self> {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

#[async_trait]
impl ImageFetchPort for HttpImageFetcher {
    async fn fetch(&self, request: &FetchRequest) -> ImageResult<Bytes> {
        debug!(url = %request.url, "Downloading image");

        let mut builder = self.client.get(&request.url);

        if let Some(auth) = &request.auth {
            builder = builder.header(header::AUTHORIZATION, format!("Basic {auth}"));
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.bypass_remote_cache {
            builder = builder.header(header::CACHE_CONTROL, NO_CACHE);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ImageError::fetch(&request.url, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::fetch(
                &request.url,
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            ));
        }

        response
            .bytes()
            .await
            .map_err(|e| ImageError::fetch(&request.url, format!("failed to read body: {e}")))
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    //! Minimal HTTP/1.1 server standing in for a remote artwork host.

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// A running server that answers every request with one canned response.
    pub struct TestServer {
        pub url: String,
        pub hits: Arc<AtomicUsize>,
        pub last_request: Arc<Mutex<String>>,
    }

    impl TestServer {
        pub fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }

        pub fn last_request(&self) -> String {
            self.last_request.lock().clone()
        }
    }

    pub async fn serve(status: &'static str, body: Vec<u8>) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let last_request = Arc::new(Mutex::new(String::new()));

        let server_hits = hits.clone();
        let server_last = last_request.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                server_hits.fetch_add(1, Ordering::SeqCst);

                let mut buf = vec![0u8; 8192];
                let mut read = 0;
                while let Ok(n) = socket.read(&mut buf[read..]).await {
                    if n == 0 {
                        break;
                    }
                    read += n;
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") || read == buf.len() {
                        break;
                    }
                }
                *server_last.lock() = String::from_utf8_lossy(&buf[..read]).into_owned();

                let head = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            }
        });

        TestServer {
            url: format!("http://{addr}/poster.jpg"),
            hits,
            last_request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_server::serve;
    use super::*;

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = serve("200 OK", b"image bytes".to_vec()).await;
        let fetcher = HttpImageFetcher::with_defaults().unwrap();

        let request = FetchRequest {
            url: server.url.clone(),
            ..FetchRequest::default()
        };
        let bytes = fetcher.fetch(&request).await.unwrap();

        assert_eq!(bytes.as_ref(), b"image bytes");
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_fetch_sends_auth_and_headers() {
        let server = serve("200 OK", b"ok".to_vec()).await;
        let fetcher = HttpImageFetcher::with_defaults().unwrap();

        let request = FetchRequest {
            url: server.url.clone(),
            auth: Some("dXNlcjpwYXNz".into()),
            headers: vec![("X-Api-Key".into(), "secret".into())],
            bypass_remote_cache: true,
        };
        fetcher.fetch(&request).await.unwrap();

        let raw = server.last_request().to_ascii_lowercase();
        assert!(raw.contains("authorization: basic dxnlcjpwyxnz"));
        assert!(raw.contains("x-api-key: secret"));
        assert!(raw.contains("cache-control: private, max-age=0, no-cache, must-revalidate"));
    }

    #[tokio::test]
    async fn test_fetch_without_bypass_sends_no_cache_control() {
        let server = serve("200 OK", b"ok".to_vec()).await;
        let fetcher = HttpImageFetcher::with_defaults().unwrap();

        let request = FetchRequest {
            url: server.url.clone(),
            headers: vec![("X-Api-Key".into(), "secret".into())],
            ..FetchRequest::default()
        };
        fetcher.fetch(&request).await.unwrap();

        assert!(!server.last_request().to_ascii_lowercase().contains("cache-control"));
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_error() {
        let server = serve("404 Not Found", b"nope".to_vec()).await;
        let fetcher = HttpImageFetcher::with_defaults().unwrap();

        let request = FetchRequest {
            url: server.url.clone(),
            ..FetchRequest::default()
        };
        let err = fetcher.fetch(&request).await.unwrap_err();

        assert!(matches!(err, ImageError::Fetch { .. }));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_error() {
        let fetcher = HttpImageFetcher::new(Duration::from_secs(2)).unwrap();
        let request = FetchRequest {
            url: "http://127.0.0.1:9/unreachable.png".into(),
            ..FetchRequest::default()
        };

        assert!(fetcher.fetch(&request).await.is_err());
    }
}
