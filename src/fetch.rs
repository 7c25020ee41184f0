//! Remote image fetching with an on-disk cache keyed by URL basename.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::error::{BannerError, BannerResult};
use crate::source::ImageReference;

/// Resolves image references to local files, downloading remote ones once.
///
/// Downloads land in the cache directory under the URL's basename. A file
/// already present there is reused without touching the network, so two URLs
/// that share a basename share a cache entry.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    cache_dir: PathBuf,
    chunk_size: usize,
    client: Client,
}

impl ImageFetcher {
    pub fn new(cache_dir: impl Into<PathBuf>, chunk_size: usize) -> BannerResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("banner-renderer/", env!("CARGO_PKG_VERSION")))
            .timeout(None)
            .build()
            .map_err(|e| BannerError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(cache_dir, chunk_size, client))
    }

    pub fn with_client(cache_dir: impl Into<PathBuf>, chunk_size: usize, client: Client) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            chunk_size: chunk_size.max(1),
            client,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Local path a remote reference is cached under.
    pub fn cached_path(&self, reference: &ImageReference) -> BannerResult<PathBuf> {
        let basename = reference.remote_basename().ok_or_else(|| {
            BannerError::invalid_request(format!("'{reference}' has no file name to cache under"))
        })?;
        Ok(self.cache_dir.join(basename))
    }

    /// Returns a local path for `reference`.
    ///
    /// Local paths come back unchanged. Remote URLs are downloaded into the
    /// cache directory unless already cached.
    pub fn resolve(&self, reference: &ImageReference) -> BannerResult<PathBuf> {
        let url = match reference {
            ImageReference::Local(path) => return Ok(path.clone()),
            ImageReference::Remote(url) => url,
        };

        let local = self.cached_path(reference)?;
        if local.is_file() {
            debug!(url = %url, path = %local.display(), "image cache hit");
            return Ok(local);
        }

        let bytes = self.download(url, &local)?;
        info!(url = %url, path = %local.display(), bytes, "downloaded image");
        Ok(local)
    }

    /// Streams `url` into `to` in `chunk_size` pieces.
    ///
    /// Each download writes its own temporary file in the cache directory and
    /// renames it over `to` on success. A failed transfer leaves nothing the
    /// cache would treat as complete, and concurrent first fetches of the same
    /// URL each land a whole file (the last rename wins).
    fn download(&self, url: &str, to: &Path) -> BannerResult<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| BannerError::fetch(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BannerError::fetch_status(url, status.as_u16()));
        }

        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| BannerError::fetch(url, format!("create {}: {e}", self.cache_dir.display())))?;

        let mut partial = tempfile::Builder::new()
            .prefix(".")
            .suffix(PARTIAL_SUFFIX)
            .tempfile_in(&self.cache_dir)
            .map_err(|e| BannerError::fetch(url, format!("create temp file: {e}")))?;
        let written = self
            .stream_to_file(&mut response, partial.as_file_mut())
            .map_err(|message| BannerError::fetch(url, message))?;

        partial
            .persist(to)
            .map_err(|e| BannerError::fetch(url, format!("rename into {}: {}", to.display(), e.error)))?;
        Ok(written)
    }

    fn stream_to_file(&self, body: &mut impl Read, file: &mut File) -> Result<u64, String> {
        let mut buf = vec![0u8; self.chunk_size];
        let mut written = 0u64;

        loop {
            let n = body.read(&mut buf).map_err(|e| format!("read body: {e}"))?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])
                .map_err(|e| format!("write partial download: {e}"))?;
            written += n as u64;
        }

        file.flush().map_err(|e| format!("flush partial download: {e}"))?;
        Ok(written)
    }
}

const PARTIAL_SUFFIX: &str = ".part";
