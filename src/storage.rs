use crate::error::TransferError;
use futures::TryStreamExt;
use log::info;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

/// Region of the public mf-nwp-models bucket.
const DEFAULT_REGION: &str = "eu-west-1";

/// Anonymous client for one bucket. Stateless per call and safe to share
/// across workers behind an `Arc`.
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
}

impl ObjectStorage {
    /// Client for the public read-only bucket. Signing is skipped so no
    /// credentials are ever looked up.
    pub fn anonymous(bucket: &str) -> Result<Self, TransferError> {
        let store = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(DEFAULT_REGION)
            .with_skip_signature(true)
            .build()?;
        Ok(Self {
            store: Arc::new(store),
        })
    }

    /// Client for a user-supplied S3-compatible endpoint, still anonymous.
    /// The bucket must accept unsigned writes.
    pub fn with_endpoint(endpoint: &str, bucket: &str) -> Result<Self, TransferError> {
        let store = AmazonS3Builder::new()
            .with_endpoint(endpoint)
            .with_bucket_name(bucket)
            .with_region(DEFAULT_REGION)
            .with_skip_signature(true)
            .with_allow_http(true)
            .build()?;
        Ok(Self {
            store: Arc::new(store),
        })
    }

    #[cfg(test)]
    fn with_store(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// List every object key under `prefix`, in the order the store returns
    /// them. A failure here is fatal to the whole command.
    pub async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, TransferError> {
        let path = ObjectPath::from(prefix);
        let metas: Vec<_> = self
            .store
            .list(Some(&path))
            .try_collect()
            .await
            .map_err(|source| TransferError::Listing {
                prefix: prefix.to_string(),
                source,
            })?;
        Ok(metas
            .into_iter()
            .map(|meta| meta.location.to_string())
            .collect())
    }

    /// Fetch the object at `key` into the local file `dest`, creating missing
    /// parent directories first. A flattened destination has no parent.
    pub async fn download(&self, key: &str, dest: &Path) -> Result<(), TransferError> {
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        info!("Downloading {}", key);
        let result = self.store.get(&ObjectPath::from(key)).await?;
        let mut stream = result.into_stream();
        let mut file = tokio::fs::File::create(dest).await?;
        while let Some(chunk) = stream.try_next().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }

    /// Stream the local file at `source` into the bucket under `key`. A
    /// failed upload is aborted so no incomplete multipart state lingers.
    pub async fn upload(&self, source: &Path, key: &str) -> Result<(), TransferError> {
        info!("Uploading {}", source.display());
        let mut file = tokio::fs::File::open(source).await?;
        let location = ObjectPath::from(key);
        let (multipart_id, mut writer) = self.store.put_multipart(&location).await?;
        match tokio::io::copy(&mut file, &mut writer).await {
            Ok(_) => {
                writer.shutdown().await?;
                Ok(())
            }
            Err(e) => {
                self.store
                    .abort_multipart(&location, &multipart_id)
                    .await
                    .ok();
                Err(e.into())
            }
        }
    }
}

/// Plain-HTTP PUT client for a WebDAV endpoint.
pub struct WebdavClient {
    client: reqwest::Client,
    base_url: String,
}

impl WebdavClient {
    pub fn new(host: &str, prefix: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{}/{}", host.trim_end_matches('/'), prefix.trim_matches('/')),
        }
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    /// PUT the local file at `source` to `{host}/{prefix}/{name}`, streaming
    /// the body instead of buffering the whole file.
    pub async fn put_file(&self, source: &Path, name: &str) -> Result<(), TransferError> {
        let url = self.url_for(name);
        info!("Uploading {} to {}", source.display(), url);
        let file = tokio::fs::File::open(source).await?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let response = self.client.put(&url).body(body).send().await?;
        if !response.status().is_success() {
            return Err(TransferError::Upload(format!(
                "HTTP {} for {}",
                response.status(),
                url
            )));
        }
        Ok(())
    }
}
