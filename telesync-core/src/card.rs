//! Card property maps.
//!
//! A card is an ordered map of properties. Data placeholders are kept apart
//! from ordinary values until the card is added to a page, where they are
//! split out into the operation's buffer list.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::data::Data;
use crate::error::Result;
use crate::value::Dump;

/// A single card property.
#[derive(Debug, Clone, PartialEq)]
pub enum Prop {
    /// An already dumped wire value
    Value(Value),
    /// A server-side buffer declaration
    Data(Data),
}

impl Prop {
    /// Wire value with a placeholder encoded in place.
    pub(crate) fn to_value(&self) -> Value {
        match self {
            Prop::Value(v) => v.clone(),
            Prop::Data(d) => d.encode(),
        }
    }
}

/// Ordered card properties.
pub type Props = IndexMap<String, Prop>;

/// A property map builder for cards.
///
/// ```
/// use telesync_core::{data, Card};
///
/// let card = Card::new()
///     .with("box", "1 1 4 5").unwrap()
///     .with("data", data("product date price", 50).unwrap()).unwrap();
/// assert_eq!(card.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Card {
    props: Props,
}

impl Card {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, keeping data placeholders intact.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Dump) -> Result<()> {
        let prop = match value.as_data() {
            Some(d) => Prop::Data(d.clone()),
            None => Prop::Value(value.dump()?),
        };
        self.props.insert(key.into(), prop);
        Ok(())
    }

    /// Builder form of [`Card::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Dump) -> Result<Self> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&Prop> {
        self.props.get(key)
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn into_props(self) -> Props {
        self.props
    }
}

impl From<Props> for Card {
    fn from(props: Props) -> Self {
        Self { props }
    }
}

impl Dump for Card {
    /// Inline form: data placeholders are encoded in place.
    fn dump(&self) -> Result<Value> {
        let out: Map<String, Value> = self
            .props
            .iter()
            .map(|(k, prop)| (k.clone(), prop.to_value()))
            .collect();
        Ok(Value::Object(out))
    }

    fn card_props(&self) -> Result<Props> {
        Ok(self.props.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::data;
    use serde_json::json;

    #[test]
    fn test_card_keeps_data_apart() {
        let card = Card::new()
            .with("title", "Line")
            .unwrap()
            .with("data", data("a b", 3).unwrap())
            .unwrap();

        assert_eq!(card.get("title"), Some(&Prop::Value(json!("Line"))));
        assert!(matches!(card.get("data"), Some(Prop::Data(_))));
    }

    #[test]
    fn test_card_dump_inlines_data() {
        let card = Card::new()
            .with("n", 1)
            .unwrap()
            .with("data", data("a b", 3).unwrap())
            .unwrap();

        assert_eq!(
            card.dump().unwrap(),
            json!({"n": 1, "data": {"f": {"f": ["a", "b"], "n": 3}}})
        );
    }

    #[test]
    fn test_card_preserves_insertion_order() {
        let card = Card::new()
            .with("z", 1)
            .unwrap()
            .with("a", 2)
            .unwrap();
        let keys: Vec<_> = card.card_props().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_card_rejects_bad_values() {
        assert!(Card::new().with("x", f64::NAN).is_err());
    }
}
