//! Fetch-if-absent download of a single artifact file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use object_store::ObjectStore;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use thiserror::Error;
use tracing::info;

use crate::ArtifactLocator;

/// The artifact could not be made available locally.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("invalid artifact locator {locator:?}: {reason}")]
    InvalidLocator {
        locator: String,
        reason: &'static str,
    },
    #[error("{0} artifacts not supported (enable the `{0}` feature of newsdesk-artifact)")]
    SourceDisabled(&'static str),
    #[error("fetching {locator}: {source}")]
    ObjectStore {
        locator: String,
        #[source]
        source: object_store::Error,
    },
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status} for {url}")]
    Server { status: u16, url: String },
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("fetching {locator} timed out after {timeout:?}")]
    Timeout { locator: String, timeout: Duration },
}

/// Resolves artifacts to local files, downloading only when the local copy
/// is missing. An existing local file is trusted as-is.
pub struct ArtifactResolver {
    timeout: Duration,
    #[cfg(feature = "http")]
    client: reqwest::Client,
}

impl ArtifactResolver {
    /// `timeout` bounds each download; a cached file returns immediately.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            #[cfg(feature = "http")]
            client: reqwest::Client::new(),
        }
    }

    /// Return `local_path`, fetching `locator` into it first if it does not
    /// exist. No retries.
    pub async fn resolve(
        &self,
        locator: &ArtifactLocator,
        local_path: &Path,
    ) -> Result<PathBuf, ArtifactError> {
        if local_path.exists() {
            info!(path = %local_path.display(), "using cached artifact");
            return Ok(local_path.to_path_buf());
        }

        info!(source = %locator, path = %local_path.display(), "fetching artifact");
        let bytes = tokio::time::timeout(self.timeout, self.fetch(locator))
            .await
            .map_err(|_| ArtifactError::Timeout {
                locator: locator.to_string(),
                timeout: self.timeout,
            })??;

        write_atomically(local_path, &bytes).await?;
        info!(bytes = bytes.len(), path = %local_path.display(), "artifact stored");
        Ok(local_path.to_path_buf())
    }

    async fn fetch(&self, locator: &ArtifactLocator) -> Result<Vec<u8>, ArtifactError> {
        match locator {
            ArtifactLocator::S3 { bucket, key } => self.fetch_s3(locator, bucket, key).await,
            ArtifactLocator::Http(url) => self.fetch_http(url).await,
            ArtifactLocator::Local(path) => {
                let object_err = |source| ArtifactError::ObjectStore {
                    locator: locator.to_string(),
                    source,
                };
                let file_name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| ArtifactError::InvalidLocator {
                        locator: locator.to_string(),
                        reason: "path has no file name",
                    })?;
                let dir = match path.parent() {
                    Some(p) if !p.as_os_str().is_empty() => p,
                    _ => Path::new("."),
                };
                let store = LocalFileSystem::new_with_prefix(dir).map_err(object_err)?;
                get_object(&store, &ObjectPath::from(file_name))
                    .await
                    .map_err(object_err)
            }
        }
    }

    #[cfg(feature = "s3")]
    async fn fetch_s3(
        &self,
        locator: &ArtifactLocator,
        bucket: &str,
        key: &str,
    ) -> Result<Vec<u8>, ArtifactError> {
        let object_err = |source| ArtifactError::ObjectStore {
            locator: locator.to_string(),
            source,
        };
        // Credentials and region come from the standard AWS_* variables.
        let store = object_store::aws::AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(object_err)?;
        get_object(&store, &ObjectPath::from(key))
            .await
            .map_err(object_err)
    }

    #[cfg(not(feature = "s3"))]
    async fn fetch_s3(
        &self,
        _locator: &ArtifactLocator,
        _bucket: &str,
        _key: &str,
    ) -> Result<Vec<u8>, ArtifactError> {
        Err(ArtifactError::SourceDisabled("s3"))
    }

    #[cfg(feature = "http")]
    async fn fetch_http(&self, url: &str) -> Result<Vec<u8>, ArtifactError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ArtifactError::Server {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }

    #[cfg(not(feature = "http"))]
    async fn fetch_http(&self, _url: &str) -> Result<Vec<u8>, ArtifactError> {
        Err(ArtifactError::SourceDisabled("http"))
    }
}

async fn get_object(store: &dyn ObjectStore, path: &ObjectPath) -> object_store::Result<Vec<u8>> {
    Ok(store.get(path).await?.bytes().await?.to_vec())
}

/// Write to `<path>.part` and rename, so a partial download never looks
/// like a cached artifact.
async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
    let io_err = |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    if let Err(source) = tokio::fs::write(&part, bytes).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(io_err(source));
    }
    tokio::fs::rename(&part, path).await.map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> ArtifactResolver {
        ArtifactResolver::new(Duration::from_secs(10))
    }

    #[tokio::test]
    async fn cached_file_is_returned_without_fetching() {
        let tmp = tempfile::TempDir::new().unwrap();
        let local = tmp.path().join("model.onnx");
        std::fs::write(&local, b"cached").unwrap();

        // The source does not exist; a fetch attempt would fail.
        let source = ArtifactLocator::Local(tmp.path().join("missing.onnx"));
        let path = resolver().resolve(&source, &local).await.unwrap();
        assert_eq!(path, local);
        assert_eq!(std::fs::read(&local).unwrap(), b"cached");
    }

    #[tokio::test]
    async fn fetches_into_new_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        let remote = tmp.path().join("remote");
        std::fs::create_dir(&remote).unwrap();
        std::fs::write(remote.join("model.onnx"), b"weights").unwrap();

        let local = tmp.path().join("cache").join("nested").join("model.onnx");
        let source = ArtifactLocator::Local(remote.join("model.onnx"));
        let path = resolver().resolve(&source, &local).await.unwrap();

        assert_eq!(path, local);
        assert_eq!(std::fs::read(&local).unwrap(), b"weights");
        assert!(!tmp.path().join("cache/nested/model.onnx.part").exists());
    }

    #[tokio::test]
    async fn missing_source_is_unavailable() {
        let tmp = tempfile::TempDir::new().unwrap();
        let local = tmp.path().join("model.onnx");
        let source = ArtifactLocator::Local(tmp.path().join("nowhere.onnx"));

        let err = resolver().resolve(&source, &local).await.unwrap_err();
        assert!(matches!(err, ArtifactError::ObjectStore { .. }), "{err}");
        assert!(!local.exists());
    }

    #[tokio::test]
    async fn unwritable_destination_is_unavailable() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("source.onnx"), b"weights").unwrap();
        // A regular file where a directory is needed.
        std::fs::write(tmp.path().join("blocker"), b"").unwrap();

        let local = tmp.path().join("blocker").join("model.onnx");
        let source = ArtifactLocator::Local(tmp.path().join("source.onnx"));
        let err = resolver().resolve(&source, &local).await.unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }), "{err}");
    }

    #[cfg(not(feature = "s3"))]
    #[tokio::test]
    async fn s3_without_feature_is_reported() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source: ArtifactLocator = "s3://bucket/model.onnx".parse().unwrap();
        let err = resolver()
            .resolve(&source, &tmp.path().join("model.onnx"))
            .await
            .unwrap_err();
        assert!(matches!(err, ArtifactError::SourceDisabled("s3")));
    }
}
