//! Asset downloader.
//!
//! Streams binary payloads to the image root, one file per source URL.
//! The destination filename is the final path segment of the URL; the body
//! is copied through a writer buffered at the configured chunk size, so
//! disk writes happen in fixed-size units no matter how the network
//! chunks the response.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use url::Url;

use imago_core::Error;

/// Streams assets from the remote catalog to local storage.
#[derive(Debug, Clone)]
pub struct Downloader {
    http: Client,
    root: PathBuf,
    chunk_size: usize,
}

impl Downloader {
    pub fn new(http: Client, root: PathBuf, chunk_size: usize) -> Self {
        Self { http, root, chunk_size }
    }

    /// Directory downloads land in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Download a URL to `root/<final path segment>`.
    ///
    /// Creates or overwrites the destination file and returns its path.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidUrl` when the URL does not parse or has no
    ///   non-empty trailing path segment to name the file after
    /// - `Error::Network` / `Error::HttpStatus` for transport faults
    /// - `Error::Storage` when the file cannot be created or written
    pub async fn download(&self, url_str: &str) -> Result<PathBuf, Error> {
        let url = Url::parse(url_str).map_err(|e| Error::InvalidUrl(format!("{url_str}: {e}")))?;
        let filename = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| Error::InvalidUrl(format!("no trailing path segment in {url_str}")))?;
        let dest = self.root.join(filename);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("network error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus { url: url_str.to_string(), status: status.as_u16() });
        }

        let file = File::create(&dest)
            .await
            .map_err(|e| storage_error(&dest, &e))?;
        let mut writer = BufWriter::with_capacity(self.chunk_size, file);

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Network(format!("body read failed: {e}")))?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| storage_error(&dest, &e))?;
        }
        writer.flush().await.map_err(|e| storage_error(&dest, &e))?;

        tracing::debug!("saved {} -> {}", url_str, dest.display());
        Ok(dest)
    }
}

fn storage_error(path: &Path, err: &std::io::Error) -> Error {
    Error::Storage { path: path.display().to_string(), message: err.to_string() }
}
