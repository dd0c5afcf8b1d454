//! # telesync-client: Sites, pages and hub transport
//!
//! Binds [`telesync_core`] change tracking to a hub. A blocking [`Site`]
//! sends each page's diff as an HTTP PATCH; an [`AsyncSite`] queues diffs on
//! one WebSocket channel and loads over async HTTP.
//!
//! ## Architecture
//!
//! ```text
//!              ┌──────────┐
//!  Config ───▸ │   Site   │──page(url)──▸ Page ──save──▸ PATCH <hub><url>
//!              └────┬─────┘
//!                   │ BasicAuthClient (load / upload / download)
//!                   ▼
//!                  hub
//!                   ▲
//!                   │ AsyncBasicAuthClient          Channel (WebSocket)
//!              ┌────┴─────┐                          ▲
//!  Config ───▸ │AsyncSite │──page(url)──▸ AsyncPage ─┘ "* <url> <diff>"
//!              └──────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`]: `TELESYNC_*` settings and overrides
//! - [`transport`]: basic-auth HTTP clients
//! - [`channel`]: outbound WebSocket queue
//! - [`page`]: [`Page`] and [`AsyncPage`]
//! - [`site`]: [`Site`] and [`AsyncSite`]

pub mod error;
pub mod config;
pub mod transport;
pub mod channel;
pub mod page;
pub mod site;

pub use channel::{Channel, ChannelSender};
pub use config::{Config, Overrides};
pub use error::{ClientError, Result};
pub use page::{AsyncPage, Page};
pub use site::{AsyncSite, Site};
pub use transport::{AsyncBasicAuthClient, BasicAuthClient};

pub use telesync_core;
