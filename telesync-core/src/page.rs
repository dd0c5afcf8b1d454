//! Per-page mutation buffer.
//!
//! Every card insertion, field assignment, deletion and drop appends one
//! [`Op`] to the page's buffer. [`PageBase::flush`] turns the buffer into a
//! diff string and empties it in the same critical section, so a diff either
//! carries every pending op or none of them.
//!
//! ```text
//!  add / delete / drop ──┐
//!                        ├──▸ ChangeBuffer ──flush──▸ {"d":[...]}
//!  Ref::set ─────────────┘   (ordered Vec<Op>)
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::Map;

use crate::card::Prop;
use crate::error::{Result, TelesyncError};
use crate::op::Op;
use crate::path::{guard_key, Key, Path};
use crate::reference::Ref;
use crate::value::Dump;

#[derive(Debug, Default)]
struct Changes {
    ops: Vec<Op>,
    dropped: bool,
}

/// Borrowed diff, so flushing does not copy the buffer.
#[derive(Serialize)]
struct PendingDiff<'a> {
    d: &'a [Op],
}

/// Shared handle to one page's ops, held by the page and all of its refs.
#[derive(Debug, Clone, Default)]
pub(crate) struct ChangeBuffer(Arc<Mutex<Changes>>);

impl ChangeBuffer {
    fn lock(&self) -> MutexGuard<'_, Changes> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn track(&self, op: Op) -> Result<()> {
        let mut changes = self.lock();
        if changes.dropped {
            return Err(TelesyncError::InvalidAssignment(
                "page has been dropped".to_string(),
            ));
        }
        if matches!(op, Op::DropPage {}) {
            changes.dropped = true;
        }
        changes.ops.push(op);
        Ok(())
    }

    fn flush(&self) -> Result<Option<String>> {
        let mut changes = self.lock();
        if changes.ops.is_empty() {
            return Ok(None);
        }
        let diff = serde_json::to_string(&PendingDiff { d: &changes.ops })?;
        changes.ops.clear();
        Ok(Some(diff))
    }

    fn len(&self) -> usize {
        self.lock().ops.len()
    }
}

/// A remote page's local change tracker.
///
/// Handles are cheap; the server holds the page's state. Cloning a
/// `PageBase` shares its buffer.
#[derive(Debug, Clone)]
pub struct PageBase {
    url: String,
    changes: ChangeBuffer,
}

impl PageBase {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            changes: ChangeBuffer::default(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Add a card, overwriting any card with the same key.
    ///
    /// Data placeholders among the card's properties are moved into the op's
    /// buffer list; the property is replaced by `~<name>` holding the
    /// buffer's index.
    pub fn add(&self, key: &str, card: impl Dump) -> Result<Ref> {
        if key.is_empty() {
            return Err(TelesyncError::InvalidCard("card must have a key".to_string()));
        }
        let path = Path::root(key)?;

        let mut props = Map::new();
        let mut buffers = Vec::new();
        let mut placeholders = Vec::new();
        for (k, prop) in card.card_props()? {
            match prop {
                Prop::Value(v) => {
                    props.insert(k, v);
                }
                Prop::Data(d) => {
                    placeholders.push((format!("~{k}"), buffers.len()));
                    buffers.push(d.encode());
                }
            }
        }
        for (k, index) in placeholders {
            props.insert(k, index.into());
        }

        self.changes.track(Op::add_card(key, props, buffers))?;
        Ok(Ref::new(self.changes.clone(), path))
    }

    /// Reference to an existing card.
    pub fn get(&self, key: &str) -> Result<Ref> {
        Ok(Ref::new(self.changes.clone(), Path::root(key)?))
    }

    /// Remove a card.
    pub fn delete(&self, key: &str) -> Result<()> {
        guard_key(&Key::from(key))?;
        self.changes.track(Op::delete_card(key))
    }

    /// Delete the whole page. The handle accepts no mutations afterwards.
    pub fn drop(&self) -> Result<()> {
        self.changes.track(Op::drop_page())?;
        log::debug!("{}: page dropped", self.url);
        Ok(())
    }

    /// Take the pending diff, or `None` if nothing changed since the last flush.
    pub fn flush(&self) -> Result<Option<String>> {
        let diff = self.changes.flush()?;
        if let Some(diff) = &diff {
            log::trace!("{}: flushed {} byte diff", self.url, diff.len());
        }
        Ok(diff)
    }

    /// Number of buffered ops.
    pub fn pending(&self) -> usize {
        self.changes.len()
    }
}
