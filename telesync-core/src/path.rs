//! Keys and paths into a page's object tree.
//!
//! A path is a card key followed by attribute names and list indices. On the
//! wire the segments are joined by a single space, which is why string keys
//! may not contain one.

use std::fmt;

use crate::error::{Result, TelesyncError};

pub const KEY_SEPARATOR: char = ' ';

/// A single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Str(String),
    Int(i64),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => f.write_str(s),
            Key::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Key::Str(s.clone())
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i64::from(i))
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<u32> for Key {
    fn from(i: u32) -> Self {
        Key::Int(i64::from(i))
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

/// Reject string keys containing the path separator.
pub fn guard_key(key: &Key) -> Result<()> {
    match key {
        Key::Str(s) if s.contains(KEY_SEPARATOR) => Err(TelesyncError::InvalidKey(format!(
            "keys cannot contain spaces: {s:?}"
        ))),
        _ => Ok(()),
    }
}

/// An address inside a page, rooted at a card key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path(Vec<Key>);

impl Path {
    pub fn root(key: impl Into<Key>) -> Result<Self> {
        let key = key.into();
        guard_key(&key)?;
        Ok(Self(vec![key]))
    }

    /// A new path one segment deeper. `self` is left untouched.
    pub fn child(&self, key: impl Into<Key>) -> Result<Self> {
        let key = key.into();
        guard_key(&key)?;
        let mut segments = self.0.clone();
        segments.push(key);
        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[Key] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{KEY_SEPARATOR}")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}
