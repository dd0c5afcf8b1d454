//! Compact JSON encoding of wire values.
//!
//! Diffs are appended verbatim to transport commands, so encoding never
//! emits whitespace and never emits non-finite numbers.

use serde_json::Value;

use crate::error::Result;
use crate::value::Dump;

/// Dump `x` and encode it as minimal JSON.
pub fn marshal(x: &(impl Dump + ?Sized)) -> Result<String> {
    let v = x.dump()?;
    Ok(serde_json::to_string(&v)?)
}

pub fn unmarshal(s: &str) -> Result<Value> {
    Ok(serde_json::from_str(s)?)
}

/// Pack a value into an inline `data:` string.
pub fn pack(x: &(impl Dump + ?Sized)) -> Result<String> {
    Ok(format!("data:{}", marshal(x)?))
}
