use std::collections::BTreeMap;

use serde::Serialize;

use crate::graph::PropertyValue;

/// A serializable scalar or container handed to downstream serializers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Primitive {
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
    List(Vec<Primitive>),
    Object(BTreeMap<String, Primitive>),
}

/// Renders resolved property values into primitives; `None` means absent.
pub trait ValueFormatter {
    fn to_primitive(&self, value: &PropertyValue) -> Option<Primitive>;
}

/// Formatter used when the caller does not supply one.
///
/// Dates render as their ISO text, points as coordinate lists, complex
/// properties as nested objects. Null values and references to entities
/// other than points render as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

impl ValueFormatter for DefaultFormatter {
    fn to_primitive(&self, value: &PropertyValue) -> Option<Primitive> {
        match value {
            PropertyValue::Text(s) | PropertyValue::Enumeration(s) | PropertyValue::Date(s) => {
                Some(Primitive::String(s.clone()))
            }
            PropertyValue::Integer(i) => Some(Primitive::Integer(*i)),
            PropertyValue::Real(f) => Some(Primitive::Number(*f)),
            PropertyValue::Boolean(b) => Some(Primitive::Bool(*b)),
            PropertyValue::Point(coords) => Some(Primitive::List(
                coords.iter().copied().map(Primitive::Number).collect(),
            )),
            PropertyValue::List(items) => Some(Primitive::List(
                items.iter().filter_map(|v| self.to_primitive(v)).collect(),
            )),
            PropertyValue::Complex(entries) => {
                let object: BTreeMap<_, _> = entries
                    .iter()
                    .filter_map(|(name, v)| Some((name.clone(), self.to_primitive(v)?)))
                    .collect();
                (!object.is_empty()).then_some(Primitive::Object(object))
            }
            PropertyValue::Reference(_) | PropertyValue::Null => None,
        }
    }
}
