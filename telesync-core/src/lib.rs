//! # telesync-core: Change tracking for remote Telesync pages
//!
//! Application code builds cards and assigns fields; every mutation becomes
//! an op in the page's buffer, and a flush produces one compact JSON diff for
//! the server to replay.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  add / delete / drop  ┌──────────────┐
//! │ Card / Data │ ────────────────────► │  PageBase    │
//! └─────────────┘                       │ (op buffer)  │
//! ┌─────────────┐     set / put         │              │
//! │ Ref (path)  │ ────────────────────► │              │
//! └─────────────┘                       └──────┬───────┘
//!                                              │ flush
//!                                              ▼
//!                                     {"d":[op, op, ...]}
//! ```
//!
//! ## Modules
//!
//! - [`value`]: primitive guards and the [`Dump`] capability
//! - [`marshal`]: compact JSON encode/decode
//! - [`data`]: server-side buffer declarations
//! - [`card`]: card property maps
//! - [`path`]: keys and space-separated paths
//! - [`op`]: diff wire model
//! - [`page`]: the mutation buffer
//! - [`reference`]: write handles ([`Ref`])
//! - [`expando`]: dynamic attribute bags

pub mod error;
pub mod value;
pub mod marshal;
pub mod data;
pub mod card;
pub mod path;
pub mod op;
pub mod page;
pub mod reference;
pub mod expando;

pub use card::{Card, Prop, Props};
pub use data::{data, pack_columns, pack_rows, BufferKind, Data, Fields};
pub use error::{Result, TelesyncError};
pub use expando::Expando;
pub use marshal::{marshal, pack, unmarshal};
pub use op::{Diff, Op};
pub use page::PageBase;
pub use path::{guard_key, Key, Path, KEY_SEPARATOR};
pub use reference::Ref;
pub use value::{
    dump, guard_primitive, guard_primitive_list, guard_primitive_map_values, is_primitive,
    is_primitive_container, Dump,
};
