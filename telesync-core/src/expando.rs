//! Loosely structured attribute bags.

use std::fmt;

use serde_json::{Map, Value};

use crate::card::{Prop, Props};
use crate::error::Result;
use crate::value::Dump;

/// An object whose members can be added and removed at run time.
///
/// Missing members read as `None`. An expando can be used directly as a
/// card; data placeholders set on it are split into buffers like a
/// [`Card`](crate::Card)'s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expando {
    kv: Props,
}

impl Expando {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Prop> {
        self.kv.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Dump) -> Result<()> {
        let prop = match value.as_data() {
            Some(d) => Prop::Data(d.clone()),
            None => Prop::Value(value.dump()?),
        };
        self.kv.insert(key.into(), prop);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<Prop> {
        self.kv.shift_remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.kv.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.kv.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kv.is_empty()
    }

    /// Plain map form, with placeholders encoded in place.
    pub fn into_map(self) -> Map<String, Value> {
        self.to_map()
    }

    fn to_map(&self) -> Map<String, Value> {
        self.kv.iter().map(|(k, p)| (k.clone(), p.to_value())).collect()
    }
}

impl From<Map<String, Value>> for Expando {
    fn from(kv: Map<String, Value>) -> Self {
        Self {
            kv: kv.into_iter().map(|(k, v)| (k, Prop::Value(v))).collect(),
        }
    }
}

impl Dump for Expando {
    fn dump(&self) -> Result<Value> {
        Ok(Value::Object(self.to_map()))
    }

    fn card_props(&self) -> Result<Props> {
        Ok(self.kv.clone())
    }
}

impl fmt::Display for Expando {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, p)) in self.kv.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{k} = {}", p.to_value())?;
        }
        Ok(())
    }
}
