//! Where the delegation dump comes from.
//!
//! [`HttpSource`] downloads the dump; [`CachedSource`] wraps any source with
//! a file cache that is reused while it is non-empty and younger than a TTL.

use async_trait::async_trait;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

use crate::error::{RegionError, Result};

/// Default APNIC delegation dump.
pub const DEFAULT_REGISTRY_URL: &str =
    "http://ftp.apnic.net/apnic/stats/apnic/delegated-apnic-latest";

/// Produces the full text of a delegation dump.
#[async_trait]
pub trait DelegationSource: Send + Sync {
    async fn fetch(&self) -> Result<String>;

    /// Human readable origin used in log messages.
    fn describe(&self) -> String;
}

/// Fetches the dump over HTTP.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegionError::Fetch {
                url: url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DelegationSource for HttpSource {
    async fn fetch(&self) -> Result<String> {
        info!(url = %self.url, "Downloading delegation dump");

        let fetch_error = |e: reqwest::Error| RegionError::Fetch {
            url: self.url.clone(),
            message: e.to_string(),
        };

        let response = self.client.get(&self.url).send().await.map_err(fetch_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(RegionError::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(fetch_error)?;
        info!(url = %self.url, bytes = body.len(), "Finished downloading delegation dump");
        Ok(body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// File cache in front of another source.
pub struct CachedSource<S> {
    inner: S,
    path: PathBuf,
    ttl: Duration,
}

impl<S: DelegationSource> CachedSource<S> {
    pub fn new(inner: S, path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            inner,
            path: path.into(),
            ttl,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the cache file so the next fetch goes to the inner source.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Cleared delegation cache");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RegionError::cache(&self.path, e)),
        }
    }

    /// Returns the cached dump if it exists, is non-empty and is fresh.
    fn read_fresh(&self) -> Result<Option<String>> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RegionError::cache(&self.path, e)),
        };

        if metadata.len() == 0 {
            debug!(path = %self.path.display(), "Cache file is empty");
            return Ok(None);
        }

        let modified = metadata
            .modified()
            .map_err(|e| RegionError::cache(&self.path, e))?;
        // A modification time in the future counts as stale.
        let age = match SystemTime::now().duration_since(modified) {
            Ok(age) => age,
            Err(_) => return Ok(None),
        };
        if age >= self.ttl {
            debug!(path = %self.path.display(), age_secs = age.as_secs(), "Cache file is stale");
            return Ok(None);
        }

        fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|e| RegionError::cache(&self.path, e))
    }

    fn store(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| RegionError::cache(parent, e))?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text).map_err(|e| RegionError::cache(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| RegionError::cache(&self.path, e))
    }
}

#[async_trait]
impl<S: DelegationSource> DelegationSource for CachedSource<S> {
    async fn fetch(&self) -> Result<String> {
        if let Some(text) = self.read_fresh()? {
            info!(path = %self.path.display(), "Using cached delegation dump");
            return Ok(text);
        }

        let text = self.inner.fetch().await?;
        self.store(&text)?;
        debug!(path = %self.path.display(), "Stored delegation dump in cache");
        Ok(text)
    }

    fn describe(&self) -> String {
        format!("{} (cached at {})", self.inner.describe(), self.path.display())
    }
}
