//! Size-capped file fetching.

use std::path::Path;

use cadbom_core::config::{LimitsConfig, TimeoutConfig};
use cadbom_core::CadError;
use futures::StreamExt;
use reqwest::header::CONTENT_LENGTH;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

pub struct Downloader<'a> {
    client: &'a reqwest::Client,
    limits: &'a LimitsConfig,
    timeouts: &'a TimeoutConfig,
}

impl<'a> Downloader<'a> {
    pub fn new(
        client: &'a reqwest::Client,
        limits: &'a LimitsConfig,
        timeouts: &'a TimeoutConfig,
    ) -> Self {
        Self {
            client,
            limits,
            timeouts,
        }
    }

    /// HEAD the URL and reject it early if the declared size is over the cap.
    ///
    /// Transport failures are not fatal here; the download enforces the cap
    /// again on the bytes it actually receives.
    pub async fn probe(&self, url: &str) -> Result<Option<u64>, CadError> {
        let resp = match self.client.head(url).timeout(self.timeouts.probe()).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(url, "Size probe failed, continuing with download: {}", e);
                return Ok(None);
            }
        };

        let declared = declared_length(resp.headers());
        if let Some(bytes) = declared {
            debug!(url, bytes, "Probe reported content length");
            self.check(bytes)?;
        }
        Ok(declared)
    }

    /// Stream the body of `url` into `dest` and return the byte count.
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, CadError> {
        let resp = self
            .client
            .get(url)
            .timeout(self.timeouts.download())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| CadError::Download(e.to_string()))?;

        if let Some(bytes) = declared_length(resp.headers()) {
            self.check(bytes)?;
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut received: u64 = 0;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| CadError::Download(e.to_string()))?;
            received += chunk.len() as u64;
            self.check(received)?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        debug!(url, bytes = received, path = %dest.display(), "Download complete");
        Ok(received)
    }

    /// Probe then fetch.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64, CadError> {
        self.probe(url).await?;
        self.fetch(url, dest).await
    }

    fn check(&self, bytes: u64) -> Result<(), CadError> {
        if self.limits.exceeds(bytes) {
            return Err(CadError::FileTooLarge {
                actual: bytes,
                limit: self.limits.max_file_size(),
            });
        }
        Ok(())
    }
}

fn declared_length(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use cadbom_core::Config;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config_with_cap(mb: &str) -> Config {
        let mb = mb.to_string();
        Config::from_lookup(move |key: &str| (key == "MAX_FILE_SIZE_MB").then(|| mb.clone()))
    }

    #[tokio::test]
    async fn body_at_the_cap_is_accepted() {
        let server = MockServer::start().await;
        let body = vec![b'x'; 1024 * 1024];
        Mock::given(method("GET"))
            .and(path("/part.stl"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&server)
            .await;

        let config = config_with_cap("1");
        let client = reqwest::Client::new();
        let downloader = Downloader::new(&client, &config.limits, &config.timeouts);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("part.stl");

        let bytes = downloader
            .download(&format!("{}/part.stl", server.uri()), &dest)
            .await
            .unwrap();
        assert_eq!(bytes, 1024 * 1024);
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 1024 * 1024);
    }

    #[tokio::test]
    async fn probe_rejects_declared_oversize_without_downloading() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/big.step"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("content-length", "3145728"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/big.step"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = config_with_cap("2");
        let client = reqwest::Client::new();
        let downloader = Downloader::new(&client, &config.limits, &config.timeouts);
        let dir = tempfile::tempdir().unwrap();

        let err = downloader
            .download(&format!("{}/big.step", server.uri()), &dir.path().join("big.step"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "File size (3.0MB) exceeds limit of 2MB");
    }

    #[tokio::test]
    async fn actual_size_is_checked_when_probe_is_silent() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(405))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/big.stl"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 1024 * 1024 + 1]))
            .mount(&server)
            .await;

        let config = config_with_cap("1");
        let client = reqwest::Client::new();
        let downloader = Downloader::new(&client, &config.limits, &config.timeouts);
        let dir = tempfile::tempdir().unwrap();

        let err = downloader
            .download(&format!("{}/big.stl", server.uri()), &dir.path().join("big.stl"))
            .await
            .unwrap_err();
        assert!(matches!(err, CadError::FileTooLarge { .. }));
    }

    #[tokio::test]
    async fn error_status_is_a_download_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let config = Config::default();
        let client = reqwest::Client::new();
        let downloader = Downloader::new(&client, &config.limits, &config.timeouts);
        let dir = tempfile::tempdir().unwrap();

        let err = downloader
            .download(&format!("{}/missing.stl", server.uri()), &dir.path().join("m.stl"))
            .await
            .unwrap_err();
        assert!(matches!(err, CadError::Download(_)));
        assert!(err.to_string().contains("404"));
    }
}
