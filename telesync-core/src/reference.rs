//! Write handles into a page's object tree.

use std::fmt;

use crate::error::{Result, TelesyncError};
use crate::op::Op;
use crate::page::ChangeBuffer;
use crate::path::{Key, Path};
use crate::value::Dump;

/// An address on a page.
///
/// Navigating with [`Ref::at`] builds a new `Ref` and has no side effects.
/// Assigning with [`Ref::set`] or [`Ref::put`] appends a set op to the
/// owning page's buffer. A `Ref` never holds a value.
///
/// ```
/// use telesync_core::PageBase;
///
/// let page = PageBase::new("/demo");
/// let card = page.get("card").unwrap();
/// card.at("items").unwrap().at(0).unwrap().put("label", "Hi").unwrap();
/// assert_eq!(
///     page.flush().unwrap().unwrap(),
///     r#"{"d":[{"k":"card items 0 label","v":"Hi"}]}"#
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Ref {
    changes: ChangeBuffer,
    path: Path,
}

impl Ref {
    pub(crate) fn new(changes: ChangeBuffer, path: Path) -> Self {
        Self { changes, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reference one level deeper.
    pub fn at(&self, key: impl Into<Key>) -> Result<Ref> {
        Ok(Ref::new(self.changes.clone(), self.path.child(key)?))
    }

    /// Assign `value` at this reference's own path.
    pub fn set(&self, value: impl Dump) -> Result<()> {
        if value.as_data().is_some() {
            return Err(TelesyncError::InvalidAssignment(
                "data placeholders cannot be used in assignments".to_string(),
            ));
        }
        let v = value.dump()?;
        self.changes.track(Op::set(self.path.to_string(), v))
    }

    /// Assign `value` to the child `key`.
    pub fn put(&self, key: impl Into<Key>, value: impl Dump) -> Result<()> {
        self.at(key)?.set(value)
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.path, f)
    }
}
