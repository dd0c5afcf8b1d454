//! Pages bound to a transport.
//!
//! [`Page`] and [`AsyncPage`] add `load` and `save` on top of
//! [`PageBase`]; every mutation method comes through `Deref`. Saving flushes
//! the buffer first, so a diff that fails to send is already gone from the
//! page. Callers that need to resend can flush and transmit themselves.

use std::ops::Deref;
use std::sync::Arc;

use serde_json::Value;
use telesync_core::PageBase;

use crate::channel::ChannelSender;
use crate::error::Result;
use crate::transport::{AsyncBasicAuthClient, BasicAuthClient};

/// Blocking page: each save is one PATCH request.
#[derive(Debug, Clone)]
pub struct Page {
    base: PageBase,
    client: Arc<BasicAuthClient>,
}

impl Page {
    pub fn new(url: impl Into<String>, client: Arc<BasicAuthClient>) -> Self {
        Self {
            base: PageBase::new(url),
            client,
        }
    }

    /// Current server-side state of this page.
    pub fn load(&self) -> Result<Value> {
        self.client.get(self.base.url())
    }

    /// Send pending changes. Does nothing when there are none.
    pub fn save(&self) -> Result<()> {
        let Some(diff) = self.base.flush()? else {
            return Ok(());
        };
        log::debug!("PATCH {} {diff}", self.base.url());
        self.client.patch(self.base.url(), &diff)
    }

    #[deprecated(note = "use `save` instead")]
    pub fn sync(&self) -> Result<()> {
        log::warn!("Page::sync is deprecated; use Page::save");
        self.save()
    }
}

impl Deref for Page {
    type Target = PageBase;

    fn deref(&self) -> &PageBase {
        &self.base
    }
}

/// Async page: saves go out over the site's channel, loads over HTTP.
#[derive(Debug, Clone)]
pub struct AsyncPage {
    base: PageBase,
    client: Arc<AsyncBasicAuthClient>,
    channel: ChannelSender,
}

impl AsyncPage {
    pub fn new(
        url: impl Into<String>,
        client: Arc<AsyncBasicAuthClient>,
        channel: ChannelSender,
    ) -> Self {
        Self {
            base: PageBase::new(url),
            client,
            channel,
        }
    }

    pub async fn load(&self) -> Result<Value> {
        self.client.get(self.base.url()).await
    }

    /// Queue pending changes on the channel without waiting for the hub.
    pub async fn save(&self) -> Result<()> {
        let Some(diff) = self.base.flush()? else {
            return Ok(());
        };
        log::debug!("* {} {diff}", self.base.url());
        self.channel
            .send(format!("* {} {diff}", self.base.url()))
            .await
    }

    #[deprecated(note = "use `save` instead")]
    pub async fn push(&self) -> Result<()> {
        log::warn!("AsyncPage::push is deprecated; use AsyncPage::save");
        self.save().await
    }
}

impl Deref for AsyncPage {
    type Target = PageBase;

    fn deref(&self) -> &PageBase {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use crate::config::Config;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn async_page(url: &str) -> (AsyncPage, mpsc::Receiver<tokio_tungstenite::tungstenite::Message>) {
        let (tx, rx) = mpsc::channel(8);
        let channel = Channel::from_sender(tx);
        let client = Arc::new(AsyncBasicAuthClient::new(&Config::default()).unwrap());
        (AsyncPage::new(url, client, channel.sender()), rx)
    }

    #[tokio::test]
    async fn test_async_save_sends_star_message() {
        let (page, mut rx) = async_page("/demo");
        page.get("c").unwrap().put("field", 5).unwrap();
        page.save().await.unwrap();

        let msg = rx.recv().await.unwrap();
        assert_eq!(
            msg.to_text().unwrap(),
            r#"* /demo {"d":[{"k":"c field","v":5}]}"#
        );
        assert_eq!(page.pending(), 0);
    }

    #[tokio::test]
    async fn test_async_save_without_changes_sends_nothing() {
        let (page, mut rx) = async_page("/demo");
        page.save().await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_async_save_on_closed_channel_drops_diff() {
        let (page, rx) = async_page("/demo");
        drop(rx);
        page.add("c", json!({"title": "t"})).unwrap();
        assert!(page.save().await.is_err());
        assert_eq!(page.pending(), 0);
    }

    #[test]
    fn test_blocking_save_without_changes_skips_request() {
        // Nothing listens on this port; an attempted request would fail
        let config = Config {
            hub_address: "http://127.0.0.1:9".into(),
            ..Config::default()
        };
        let page = Page::new("/demo", Arc::new(BasicAuthClient::new(&config).unwrap()));
        page.save().unwrap();
        assert_eq!(page.url(), "/demo");
    }
}
