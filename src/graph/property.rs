//! Property sets and the values of the properties they hold.

use tracing::warn;

use crate::graph::entity::{Entity, NodeKind};
use crate::graph::schema::PropertyForm;
use crate::graph::Graph;
use crate::parser::StepValue;

/// Nesting limit for complex properties.
const MAX_COMPLEX_DEPTH: usize = 8;

/// A property value resolved against the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Enumeration(String),
    /// `IFCDATE`, `IFCDATETIME` and `IFCTIME` values, kept as written.
    Date(String),
    /// Coordinates of a referenced `IFCCARTESIANPOINT`.
    Point(Vec<f64>),
    List(Vec<PropertyValue>),
    /// Named sub-properties of an `IFCCOMPLEXPROPERTY`.
    Complex(Vec<(String, PropertyValue)>),
    /// Reference to some other entity.
    Reference(u64),
    Null,
}

impl PropertyValue {
    /// Converts a raw attribute, following references to cartesian points.
    #[must_use]
    pub fn resolve(graph: &Graph, value: &StepValue) -> Self {
        match value {
            StepValue::String(s) => PropertyValue::Text(s.clone()),
            StepValue::Integer(i) => PropertyValue::Integer(*i),
            StepValue::Real(f) => PropertyValue::Real(*f),
            StepValue::Boolean(b) => PropertyValue::Boolean(*b),
            StepValue::Enum(e) => PropertyValue::Enumeration(e.clone()),
            StepValue::List(items) => {
                PropertyValue::List(items.iter().map(|v| Self::resolve(graph, v)).collect())
            }
            StepValue::Reference(id) => resolve_reference(graph, *id),
            StepValue::Typed { type_name, value } => match (type_name.as_str(), value.as_ref()) {
                ("IFCDATE" | "IFCDATETIME" | "IFCTIME", StepValue::String(s)) => {
                    PropertyValue::Date(s.clone())
                }
                // Unknown logical
                ("IFCLOGICAL", StepValue::Enum(e)) if e == "U" => PropertyValue::Null,
                (_, inner) => Self::resolve(graph, inner),
            },
            StepValue::Null | StepValue::Derived => PropertyValue::Null,
        }
    }
}

fn resolve_reference(graph: &Graph, id: u64) -> PropertyValue {
    let point = graph
        .node(id)
        .filter(|e| e.entity_type() == "IFCCARTESIANPOINT")
        .and_then(|e| e.attribute(0))
        .and_then(StepValue::as_list)
        .and_then(|coords| coords.iter().map(StepValue::as_real).collect::<Option<Vec<_>>>());

    match point {
        Some(coords) => PropertyValue::Point(coords),
        None => PropertyValue::Reference(id),
    }
}

/// A property set (or element quantity) node.
#[derive(Debug, Clone, Copy)]
pub struct PropertySet<'g> {
    entity: Entity<'g>,
    property_ids: &'g [u64],
}

impl<'g> PropertySet<'g> {
    /// Wraps `entity` when it is a property set node.
    #[must_use]
    pub fn from_entity(entity: Entity<'g>) -> Option<Self> {
        match entity.kind() {
            NodeKind::PropertySet { property_ids } => Some(Self {
                entity,
                property_ids,
            }),
            _ => None,
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.entity.id()
    }

    #[must_use]
    pub fn name(&self) -> Option<&'g str> {
        self.entity.name()
    }

    #[must_use]
    pub fn entity(&self) -> Entity<'g> {
        self.entity
    }

    #[must_use]
    pub fn property_ids(&self) -> &'g [u64] {
        self.property_ids
    }

    /// Resolves each referenced property to `(name, value)`.
    ///
    /// Ids that do not resolve to a named property are skipped.
    #[must_use]
    pub fn properties(&self) -> Vec<(String, PropertyValue)> {
        resolve_properties(self.entity.graph(), self.id(), self.property_ids, 0)
    }
}

fn resolve_properties(
    graph: &Graph,
    owner: u64,
    property_ids: &[u64],
    depth: usize,
) -> Vec<(String, PropertyValue)> {
    property_ids
        .iter()
        .filter_map(|&id| {
            let resolved = resolve_property(graph, id, depth);
            if resolved.is_none() {
                warn!(owner, property = id, "skipping unresolvable property");
            }
            resolved
        })
        .collect()
}

fn resolve_property(graph: &Graph, id: u64, depth: usize) -> Option<(String, PropertyValue)> {
    let entity = graph.node(id)?;
    let form = match entity.kind() {
        NodeKind::Property(form) => *form,
        _ => return None,
    };
    let name = entity.attribute(0).and_then(StepValue::as_str)?.to_string();
    let raw = entity.attribute(form.value_slot());

    let value = match (form, raw) {
        (_, None) => PropertyValue::Null,
        (PropertyForm::Complex, Some(StepValue::List(items))) if depth < MAX_COMPLEX_DEPTH => {
            let nested: Vec<u64> = items.iter().filter_map(StepValue::as_reference).collect();
            PropertyValue::Complex(resolve_properties(graph, id, &nested, depth + 1))
        }
        (PropertyForm::Complex, Some(_)) => PropertyValue::Null,
        (_, Some(raw)) => PropertyValue::resolve(graph, raw),
    };

    Some((name, value))
}
