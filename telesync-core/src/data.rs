//! Data placeholders: declarations of server-side buffers.
//!
//! The sign of `size` picks the buffer type:
//!
//! | size  | buffer              | wire key |
//! |-------|---------------------|----------|
//! | `0`   | map (variable)      | `m`      |
//! | `> 0` | fixed, `size` rows  | `f`      |
//! | `< 0` | circular, `-size`   | `c`      |
//!
//! Each encoding carries the field names under `f` and either the initial
//! rows under `d` or the number of rows to allocate under `n`.

use serde_json::{json, Value};

use crate::error::{Result, TelesyncError};
use crate::marshal::marshal;
use crate::value::{guard_primitive_list, kind, Dump};

/// Column names for a data placeholder.
///
/// Either a space-separated string (`"product date price"`) or a sequence of
/// names.
pub trait Fields {
    fn into_fields(self) -> Vec<String>;
}

impl Fields for &str {
    fn into_fields(self) -> Vec<String> {
        self.split_whitespace().map(str::to_owned).collect()
    }
}

impl Fields for String {
    fn into_fields(self) -> Vec<String> {
        self.as_str().into_fields()
    }
}

impl Fields for Vec<String> {
    fn into_fields(self) -> Vec<String> {
        self
    }
}

impl Fields for Vec<&str> {
    fn into_fields(self) -> Vec<String> {
        self.into_iter().map(str::to_owned).collect()
    }
}

impl Fields for &[&str] {
    fn into_fields(self) -> Vec<String> {
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

impl Fields for &[String] {
    fn into_fields(self) -> Vec<String> {
        self.to_vec()
    }
}

impl<const N: usize> Fields for [&str; N] {
    fn into_fields(self) -> Vec<String> {
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

fn fields(f: impl Fields) -> Result<Vec<String>> {
    let names = f.into_fields();
    if names.is_empty() {
        return Err(TelesyncError::InvalidValue("fields is empty".to_string()));
    }
    if names.iter().any(String::is_empty) {
        return Err(TelesyncError::InvalidValue(
            "field cannot be empty str".to_string(),
        ));
    }
    Ok(names)
}

/// Buffer type selected by a placeholder's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Variable length, addressed by key
    Map,
    /// Fixed number of rows
    Fixed(u64),
    /// Ring of rows, oldest overwritten first
    Circular(u64),
}

/// A data placeholder.
///
/// Only cards may carry placeholders; see `PageBase::add`.
#[derive(Debug, Clone, PartialEq)]
pub struct Data {
    fields: Vec<String>,
    size: i64,
    rows: Option<Value>,
}

fn guard_row(row: &Value) -> Result<()> {
    if !row.is_array() {
        return Err(TelesyncError::InvalidValue(format!(
            "row must be a list, got {}",
            kind(row)
        )));
    }
    guard_primitive_list(row)
}

/// Create a placeholder allocating `size` rows for `fields`.
pub fn data(f: impl Fields, size: i64) -> Result<Data> {
    Data::new(f, size)
}

impl Data {
    pub fn new(f: impl Fields, size: i64) -> Result<Self> {
        Ok(Self {
            fields: fields(f)?,
            size,
            rows: None,
        })
    }

    /// Attach initial rows: a list of rows, or a key-row map for map buffers.
    ///
    /// Every row must be a list of primitives.
    pub fn with_rows(mut self, rows: impl Dump) -> Result<Self> {
        let rows = rows.dump()?;
        match &rows {
            Value::Array(items) => items.iter().try_for_each(guard_row)?,
            Value::Object(items) => items.values().try_for_each(guard_row)?,
            other => {
                return Err(TelesyncError::InvalidValue(format!(
                    "rows must be list or map, got {}",
                    kind(other)
                )))
            }
        }
        self.rows = Some(rows);
        Ok(self)
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn rows(&self) -> Option<&Value> {
        self.rows.as_ref()
    }

    pub fn kind(&self) -> BufferKind {
        match self.size {
            0 => BufferKind::Map,
            n if n < 0 => BufferKind::Circular(n.unsigned_abs()),
            n => BufferKind::Fixed(n.unsigned_abs()),
        }
    }

    /// Wire form of this placeholder.
    pub fn encode(&self) -> Value {
        let f = &self.fields;
        match &self.rows {
            Some(Value::Object(d)) if !d.is_empty() => json!({"m": {"f": f, "d": d}}),
            Some(Value::Array(d)) if !d.is_empty() => {
                if self.size < 0 {
                    json!({"c": {"f": f, "d": d}})
                } else {
                    json!({"f": {"f": f, "d": d}})
                }
            }
            _ => match self.kind() {
                BufferKind::Map => json!({"m": {"f": f}}),
                BufferKind::Circular(n) => json!({"c": {"f": f, "n": n}}),
                BufferKind::Fixed(n) => json!({"f": {"f": f, "n": n}}),
            },
        }
    }
}

impl Dump for Data {
    fn dump(&self) -> Result<Value> {
        Ok(self.encode())
    }

    fn as_data(&self) -> Option<&Data> {
        Some(self)
    }
}

fn pack_table(prefix: &str, what: &str, f: impl Fields, table: impl Dump) -> Result<String> {
    let names = fields(f)?;
    let table = match table.dump()? {
        Value::Array(items) if !items.is_empty() => items,
        Value::Array(_) => {
            return Err(TelesyncError::InvalidValue(format!("{what} is empty")));
        }
        other => {
            return Err(TelesyncError::InvalidValue(format!(
                "{what} must be a list, got {}",
                kind(&other)
            )));
        }
    };
    for item in &table {
        if !item.is_array() {
            return Err(TelesyncError::InvalidValue(format!(
                "{what} must be a list of lists"
            )));
        }
        guard_primitive_list(item)?;
    }
    Ok(format!("{prefix}:{}", marshal(&json!([names, table]))?))
}

/// Pack rows into an inline string instead of allocating a buffer.
pub fn pack_rows(f: impl Fields, rows: impl Dump) -> Result<String> {
    pack_table("rows", "rows", f, rows)
}

/// Pack columns into an inline string instead of allocating a buffer.
pub fn pack_columns(f: impl Fields, columns: impl Dump) -> Result<String> {
    pack_table("cols", "columns", f, columns)
}
