//! Wire values and the dump capability.
//!
//! Everything that can travel in a diff is turned into a `serde_json::Value`
//! through [`Dump`]. Sequences dump element by element, string-keyed maps dump
//! value by value, and builder types (cards, data placeholders, expandos)
//! provide their own expansion.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use crate::card::{Prop, Props};
use crate::data::Data;
use crate::error::{Result, TelesyncError};

/// `true` for booleans, strings, numbers and null.
pub fn is_primitive(x: &Value) -> bool {
    !matches!(x, Value::Array(_) | Value::Object(_))
}

/// `true` for an absent/null container or a list holding only primitives.
pub fn is_primitive_container(xs: Option<&Value>) -> bool {
    match xs {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items.iter().all(is_primitive),
        Some(_) => false,
    }
}

pub fn guard_primitive(x: &Value) -> Result<()> {
    if is_primitive(x) {
        Ok(())
    } else {
        Err(TelesyncError::InvalidValue(format!(
            "value must be a primitive, got {}",
            kind(x)
        )))
    }
}

pub fn guard_primitive_list(xs: &Value) -> Result<()> {
    if is_primitive_container(Some(xs)) {
        Ok(())
    } else {
        Err(TelesyncError::InvalidValue(
            "value must be a list of primitives".to_string(),
        ))
    }
}

pub fn guard_primitive_map_values(map: &Map<String, Value>) -> Result<()> {
    map.values().try_for_each(guard_primitive)
}

/// Short name of a value's JSON type, for error messages.
pub(crate) fn kind(x: &Value) -> &'static str {
    match x {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// The dump capability: expansion of a value into its wire form.
pub trait Dump {
    fn dump(&self) -> Result<Value>;

    /// The data placeholder this value stands for, if it is one.
    ///
    /// `PageBase::add` relies on this to move buffers out of card properties,
    /// and `Ref` relies on it to refuse buffers in assignments.
    fn as_data(&self) -> Option<&Data> {
        None
    }

    /// Card properties, with data placeholders still attached.
    ///
    /// The default dumps the value and requires a map.
    fn card_props(&self) -> Result<Props> {
        match self.dump()? {
            Value::Object(map) => Ok(map.into_iter().map(|(k, v)| (k, Prop::Value(v))).collect()),
            other => Err(TelesyncError::InvalidCard(format!(
                "card must be a map or dump to one, got {}",
                kind(&other)
            ))),
        }
    }
}

/// Recursively dump `x` into a wire value.
pub fn dump(x: &(impl Dump + ?Sized)) -> Result<Value> {
    x.dump()
}

impl<T: Dump + ?Sized> Dump for &T {
    fn dump(&self) -> Result<Value> {
        (**self).dump()
    }

    fn as_data(&self) -> Option<&Data> {
        (**self).as_data()
    }

    fn card_props(&self) -> Result<Props> {
        (**self).card_props()
    }
}

impl<T: Dump + ?Sized> Dump for Box<T> {
    fn dump(&self) -> Result<Value> {
        (**self).dump()
    }

    fn as_data(&self) -> Option<&Data> {
        (**self).as_data()
    }

    fn card_props(&self) -> Result<Props> {
        (**self).card_props()
    }
}

impl Dump for Value {
    fn dump(&self) -> Result<Value> {
        Ok(self.clone())
    }
}

impl Dump for Map<String, Value> {
    fn dump(&self) -> Result<Value> {
        Ok(Value::Object(self.clone()))
    }
}

impl Dump for bool {
    fn dump(&self) -> Result<Value> {
        Ok(Value::Bool(*self))
    }
}

impl Dump for str {
    fn dump(&self) -> Result<Value> {
        Ok(Value::String(self.to_owned()))
    }
}

impl Dump for String {
    fn dump(&self) -> Result<Value> {
        Ok(Value::String(self.clone()))
    }
}

macro_rules! dump_integer {
    ($($t:ty),*) => {
        $(
            impl Dump for $t {
                fn dump(&self) -> Result<Value> {
                    Ok(Value::from(*self))
                }
            }
        )*
    };
}

dump_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

fn dump_float(x: f64) -> Result<Value> {
    Number::from_f64(x)
        .map(Value::Number)
        .ok_or_else(|| TelesyncError::InvalidValue(format!("{x} is not a finite number")))
}

impl Dump for f32 {
    fn dump(&self) -> Result<Value> {
        dump_float(f64::from(*self))
    }
}

impl Dump for f64 {
    fn dump(&self) -> Result<Value> {
        dump_float(*self)
    }
}

impl<T: Dump> Dump for Option<T> {
    fn dump(&self) -> Result<Value> {
        match self {
            Some(x) => x.dump(),
            None => Ok(Value::Null),
        }
    }
}

fn dump_seq<'a, T: Dump + 'a>(xs: impl IntoIterator<Item = &'a T>) -> Result<Value> {
    xs.into_iter()
        .map(Dump::dump)
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

impl<T: Dump> Dump for [T] {
    fn dump(&self) -> Result<Value> {
        dump_seq(self)
    }
}

impl<T: Dump, const N: usize> Dump for [T; N] {
    fn dump(&self) -> Result<Value> {
        dump_seq(self)
    }
}

impl<T: Dump> Dump for Vec<T> {
    fn dump(&self) -> Result<Value> {
        dump_seq(self)
    }
}

fn dump_map<'a, K, V>(entries: impl IntoIterator<Item = (&'a K, &'a V)>) -> Result<Value>
where
    K: AsRef<str> + 'a,
    V: Dump + 'a,
{
    let mut out = Map::new();
    for (k, v) in entries {
        out.insert(k.as_ref().to_owned(), v.dump()?);
    }
    Ok(Value::Object(out))
}

/// Map entries as card properties, keeping data placeholders intact.
fn map_card_props<'a, K, V>(entries: impl IntoIterator<Item = (&'a K, &'a V)>) -> Result<Props>
where
    K: AsRef<str> + 'a,
    V: Dump + 'a,
{
    entries
        .into_iter()
        .map(|(k, v)| {
            let prop = match v.as_data() {
                Some(d) => Prop::Data(d.clone()),
                None => Prop::Value(v.dump()?),
            };
            Ok((k.as_ref().to_owned(), prop))
        })
        .collect()
}

impl<K: AsRef<str>, V: Dump> Dump for BTreeMap<K, V> {
    fn dump(&self) -> Result<Value> {
        dump_map(self)
    }

    fn card_props(&self) -> Result<Props> {
        map_card_props(self)
    }
}

impl<K: AsRef<str>, V: Dump, S> Dump for HashMap<K, V, S> {
    fn dump(&self) -> Result<Value> {
        dump_map(self)
    }

    fn card_props(&self) -> Result<Props> {
        map_card_props(self)
    }
}

impl<K: AsRef<str>, V: Dump, S> Dump for IndexMap<K, V, S> {
    fn dump(&self) -> Result<Value> {
        dump_map(self)
    }

    fn card_props(&self) -> Result<Props> {
        map_card_props(self)
    }
}

macro_rules! dump_tuple {
    ($($idx:tt $name:ident),+) => {
        impl<$($name: Dump),+> Dump for ($($name,)+) {
            fn dump(&self) -> Result<Value> {
                Ok(Value::Array(vec![$(self.$idx.dump()?),+]))
            }
        }
    };
}

dump_tuple!(0 A);
dump_tuple!(0 A, 1 B);
dump_tuple!(0 A, 1 B, 2 C);
dump_tuple!(0 A, 1 B, 2 C, 3 D);
dump_tuple!(0 A, 1 B, 2 C, 3 D, 4 E);
dump_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
