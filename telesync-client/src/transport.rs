//! HTTP transport to the hub.
//!
//! Two clients with the same surface: [`BasicAuthClient`] blocks the calling
//! thread, [`AsyncBasicAuthClient`] suspends at each request. Both send the
//! configured access key as basic-auth credentials on every request.
//!
//! ```text
//!  save ──PATCH <hub>/<url>──▸  hub     (body = diff, 200 = applied)
//!  load ──GET   <hub>/<url>──▸  hub  ──▸ page state JSON
//!  upload ─POST <hub>/_f ───▸  hub  ──▸ {"files": [url, ...]}
//!  download ─GET <hub>/<url>─▸ hub  ──▸ streamed to disk
//! ```
//!
//! Nothing here retries. A non-200 answer becomes [`ClientError::Service`]
//! carrying the status and body text.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::config::Config;
use crate::error::{ClientError, Result};

const UPLOAD_PATH: &str = "/_f";
const UPLOAD_FIELD: &str = "files";

#[derive(Debug, Deserialize)]
struct UploadReply {
    files: Vec<String>,
}

/// Join a page or file URL onto the hub address. Absolute URLs pass through.
fn endpoint(hub: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    let hub = hub.trim_end_matches('/');
    if url.starts_with('/') {
        format!("{hub}{url}")
    } else {
        format!("{hub}/{url}")
    }
}

/// Local target for a download: directories get the URL's last segment.
fn download_target(url: &str, path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }
    let name = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("cannot derive a file name from {url:?}"),
            )
        })?;
    Ok(path.join(name))
}

fn service_error(method: &str, url: &str, status: StatusCode, body: String) -> ClientError {
    log::warn!("{method} {url} failed with {status}: {body}");
    ClientError::Service {
        status: status.as_u16(),
        body,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string())
}

// ─── Blocking ────────────────────────────────────────────────────────────────

/// Request/response client used by [`crate::Page`] and [`crate::Site`].
///
/// Must not be called from inside an async runtime.
#[derive(Debug, Clone)]
pub struct BasicAuthClient {
    http: reqwest::blocking::Client,
    hub: String,
    key_id: String,
    key_secret: String,
}

impl BasicAuthClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: reqwest::blocking::Client::builder().build()?,
            hub: config.hub_address.clone(),
            key_id: config.hub_access_key_id.clone(),
            key_secret: config.hub_access_key_secret.clone(),
        })
    }

    pub fn hub_address(&self) -> &str {
        &self.hub
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::blocking::RequestBuilder {
        self.http
            .request(method, endpoint(&self.hub, url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
    }

    fn check(
        method: &str,
        url: &str,
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response> {
        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(service_error(method, url, status, body))
    }

    /// Send a diff for the page at `url`.
    pub fn patch(&self, url: &str, diff: &str) -> Result<()> {
        let response = self
            .request(reqwest::Method::PATCH, url)
            .header(CONTENT_TYPE, "application/json")
            .body(diff.to_string())
            .send()?;
        Self::check("PATCH", url, response)?;
        Ok(())
    }

    /// Fetch the serialized state of the page at `url`.
    pub fn get(&self, url: &str) -> Result<Value> {
        let response = self.request(reqwest::Method::GET, url).send()?;
        let text = Self::check("GET", url, response)?.text()?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Upload files; the returned URLs are in the same order as `paths`.
    pub fn upload<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<String>> {
        let mut form = reqwest::blocking::multipart::Form::new();
        for path in paths {
            form = form.file(UPLOAD_FIELD, path.as_ref())?;
        }
        let response = self
            .request(reqwest::Method::POST, UPLOAD_PATH)
            .multipart(form)
            .send()?;
        let reply: UploadReply = serde_json::from_str(
            &Self::check("POST", UPLOAD_PATH, response)?.text()?,
        )?;
        log::debug!("uploaded {} file(s)", reply.files.len());
        Ok(reply.files)
    }

    /// Stream the resource at `url` to `path`, returning the file written.
    pub fn download(&self, url: &str, path: impl AsRef<Path>) -> Result<PathBuf> {
        let target = download_target(url, path.as_ref())?;
        let response = self.request(reqwest::Method::GET, url).send()?;
        let mut response = Self::check("GET", url, response)?;
        let mut file = std::fs::File::create(&target)?;
        let bytes = response.copy_to(&mut file)?;
        log::debug!("downloaded {url} to {} ({bytes} bytes)", target.display());
        Ok(target)
    }
}

// ─── Async ───────────────────────────────────────────────────────────────────

/// Suspending client used by [`crate::AsyncPage`] and [`crate::AsyncSite`].
#[derive(Debug, Clone)]
pub struct AsyncBasicAuthClient {
    http: reqwest::Client,
    hub: String,
    key_id: String,
    key_secret: String,
}

impl AsyncBasicAuthClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            hub: config.hub_address.clone(),
            key_id: config.hub_access_key_id.clone(),
            key_secret: config.hub_access_key_secret.clone(),
        })
    }

    pub fn hub_address(&self) -> &str {
        &self.hub
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, endpoint(&self.hub, url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
    }

    async fn check(
        method: &str,
        url: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(service_error(method, url, status, body))
    }

    pub async fn patch(&self, url: &str, diff: &str) -> Result<()> {
        let response = self
            .request(reqwest::Method::PATCH, url)
            .header(CONTENT_TYPE, "application/json")
            .body(diff.to_string())
            .send()
            .await?;
        Self::check("PATCH", url, response).await?;
        Ok(())
    }

    pub async fn get(&self, url: &str) -> Result<Value> {
        let response = self.request(reqwest::Method::GET, url).send().await?;
        let text = Self::check("GET", url, response).await?.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn upload<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<String>> {
        let mut form = reqwest::multipart::Form::new();
        for path in paths {
            let path = path.as_ref();
            let bytes = tokio::fs::read(path).await?;
            let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name(path));
            form = form.part(UPLOAD_FIELD, part);
        }
        let response = self
            .request(reqwest::Method::POST, UPLOAD_PATH)
            .multipart(form)
            .send()
            .await?;
        let text = Self::check("POST", UPLOAD_PATH, response)
            .await?
            .text()
            .await?;
        let reply: UploadReply = serde_json::from_str(&text)?;
        log::debug!("uploaded {} file(s)", reply.files.len());
        Ok(reply.files)
    }

    pub async fn download(&self, url: &str, path: impl AsRef<Path>) -> Result<PathBuf> {
        let target = download_target(url, path.as_ref())?;
        let response = self.request(reqwest::Method::GET, url).send().await?;
        let response = Self::check("GET", url, response).await?;

        let mut file = tokio::fs::File::create(&target).await?;
        let mut stream = response.bytes_stream();
        let mut bytes = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            bytes += chunk.len();
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        log::debug!("downloaded {url} to {} ({bytes} bytes)", target.display());
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_hub_and_url() {
        assert_eq!(endpoint("http://hub:1", "/demo"), "http://hub:1/demo");
        assert_eq!(endpoint("http://hub:1/", "/demo"), "http://hub:1/demo");
        assert_eq!(endpoint("http://hub:1", "demo"), "http://hub:1/demo");
        assert_eq!(
            endpoint("http://hub:1", "https://cdn/x.png"),
            "https://cdn/x.png"
        );
    }

    #[test]
    fn test_download_target_for_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = download_target("/_f/abc/report.csv?x=1", dir.path()).unwrap();
        assert_eq!(target, dir.path().join("report.csv"));

        let file = dir.path().join("named.bin");
        assert_eq!(download_target("/_f/abc/report.csv", &file).unwrap(), file);
    }

    #[test]
    fn test_download_target_needs_a_name() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            download_target("/", dir.path()),
            Err(ClientError::Io(_))
        ));
    }

    #[test]
    fn test_client_from_config() {
        let config = Config {
            hub_address: "http://hub:9".into(),
            ..Config::default()
        };
        assert_eq!(BasicAuthClient::new(&config).unwrap().hub_address(), "http://hub:9");
        assert_eq!(
            AsyncBasicAuthClient::new(&config).unwrap().hub_address(),
            "http://hub:9"
        );
    }
}
