//! Page factories.
//!
//! A site holds one transport client built from a [`Config`] and hands out
//! page handles that share it. Handles are not cached; asking for the same
//! URL twice gives two independent buffers for the same remote page.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::channel::Channel;
use crate::config::Config;
use crate::error::Result;
use crate::page::{AsyncPage, Page};
use crate::transport::{AsyncBasicAuthClient, BasicAuthClient};

/// Blocking site.
#[derive(Debug, Clone)]
pub struct Site {
    client: Arc<BasicAuthClient>,
}

impl Site {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: Arc::new(BasicAuthClient::new(config)?),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(&Config::from_env()?)
    }

    pub fn page(&self, url: &str) -> Page {
        Page::new(url, self.client.clone())
    }

    pub fn load(&self, url: &str) -> Result<Value> {
        self.client.get(url)
    }

    pub fn upload<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<String>> {
        self.client.upload(paths)
    }

    pub fn download(&self, url: &str, path: impl AsRef<Path>) -> Result<PathBuf> {
        self.client.download(url, path)
    }
}

/// Async site: pages save over one shared channel.
#[derive(Debug)]
pub struct AsyncSite {
    client: Arc<AsyncBasicAuthClient>,
    channel: Channel,
}

impl AsyncSite {
    /// Use an already open channel.
    pub fn new(config: &Config, channel: Channel) -> Result<Self> {
        Ok(Self {
            client: Arc::new(AsyncBasicAuthClient::new(config)?),
            channel: channel.with_shutdown_timeout(config.shutdown_timeout),
        })
    }

    /// Open a channel to the configured internal address.
    pub async fn connect(config: &Config) -> Result<Self> {
        let channel = Channel::connect(&config.internal_address).await?;
        Self::new(config, channel)
    }

    pub fn page(&self, url: &str) -> AsyncPage {
        AsyncPage::new(url, self.client.clone(), self.channel.sender())
    }

    pub async fn load(&self, url: &str) -> Result<Value> {
        self.client.get(url).await
    }

    pub async fn upload<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<String>> {
        self.client.upload(paths).await
    }

    pub async fn download(&self, url: &str, path: impl AsRef<Path>) -> Result<PathBuf> {
        self.client.download(url, path).await
    }

    /// Flush the channel and shut it down. Pages from this site can no
    /// longer save afterwards.
    pub async fn close(mut self) -> Result<()> {
        self.channel.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_site_pages_are_fresh_handles() {
        let site = Site::new(&Config::default()).unwrap();
        let a = site.page("/demo");
        let b = site.page("/demo");
        a.get("c").unwrap().put("x", 1).unwrap();

        assert_eq!(a.pending(), 1);
        assert_eq!(b.pending(), 0);
        assert_eq!(b.url(), "/demo");
    }

    #[test]
    fn test_dropped_handle_does_not_poison_site() {
        let site = Site::new(&Config::default()).unwrap();
        let page = site.page("/demo");
        let other = site.page("/other");
        page.drop().unwrap();
        assert!(page.delete("c").is_err());
        assert!(other.delete("c").is_ok());
        assert!(site.page("/demo").delete("c").is_ok());
    }

    #[tokio::test]
    async fn test_async_site_close_stops_saves() {
        let (tx, mut rx) = mpsc::channel(8);
        let site = AsyncSite::new(&Config::default(), Channel::from_sender(tx)).unwrap();
        let page = site.page("/demo");
        let other = site.page("/other");
        page.drop().unwrap();
        page.save().await.unwrap();
        site.close().await.unwrap();

        assert_eq!(rx.recv().await.unwrap().to_text().unwrap(), r#"* /demo {"d":[{}]}"#);
        assert!(rx.recv().await.unwrap().is_close());
        drop(rx);

        other.get("c").unwrap().put("x", 1).unwrap();
        assert!(matches!(
            other.save().await,
            Err(crate::error::ClientError::ChannelClosed)
        ));
    }
}
