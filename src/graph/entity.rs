//! Graph nodes and the borrowed [`Entity`] view over them.

use serde::Serialize;

use crate::error::GraphError;
use crate::graph::schema::PropertyForm;
use crate::graph::Graph;
use crate::parser::{StepEntity, StepValue};

/// Extra fields of the single IFCPROJECT node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectDetails {
    pub object_type: Option<String>,
    pub long_name: Option<String>,
    pub phase: Option<String>,
}

/// Extra fields of a spatial structure element (site, building, storey, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpatialDetails {
    pub object_type: Option<String>,
    pub composition_type: Option<String>,
    pub long_name: Option<String>,
}

/// Classification of a node, with any fields derived from its record.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Generic,
    Property(PropertyForm),
    PropertySet { property_ids: Vec<u64> },
    Project(ProjectDetails),
    SpatialStructure(SpatialDetails),
    /// Index into the graph's relation list.
    Relation(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: u64,
    pub kind: NodeKind,
}

/// `true` when the first four attributes match `IfcRoot`:
/// GlobalId string, OwnerHistory reference or `$`, optional Name, optional Description.
#[must_use]
pub fn is_root_shape(values: &[StepValue]) -> bool {
    let optional_text = |v: &StepValue| matches!(v, StepValue::String(_) | StepValue::Null);
    match values {
        [StepValue::String(_), owner, name, description, ..] => {
            matches!(owner, StepValue::Reference(_) | StepValue::Null)
                && optional_text(name)
                && optional_text(description)
        }
        _ => false,
    }
}

fn text_at(entity: &StepEntity, index: usize) -> Option<String> {
    entity.get(index).and_then(StepValue::as_str).map(str::to_string)
}

fn require_root(entity: &StepEntity, what: &str) -> Result<(), GraphError> {
    if is_root_shape(&entity.values) {
        Ok(())
    } else {
        Err(GraphError::Conversion {
            id: entity.id,
            entity_type: entity.entity_type.clone(),
            message: format!("{what} does not have the IfcRoot attribute layout"),
        })
    }
}

impl ProjectDetails {
    /// ObjectType at 4, LongName at 5, Phase at 6.
    pub fn from_entity(entity: &StepEntity) -> Result<Self, GraphError> {
        require_root(entity, "project")?;
        Ok(Self {
            object_type: text_at(entity, 4),
            long_name: text_at(entity, 5),
            phase: text_at(entity, 6),
        })
    }
}

impl SpatialDetails {
    /// ObjectType at 4, LongName at 7, CompositionType at 8.
    pub fn from_entity(entity: &StepEntity) -> Result<Self, GraphError> {
        require_root(entity, "spatial structure element")?;
        let composition_type = match entity.get(8) {
            Some(StepValue::Enum(e)) => Some(e.clone()),
            _ => None,
        };
        Ok(Self {
            object_type: text_at(entity, 4),
            composition_type,
            long_name: text_at(entity, 7),
        })
    }
}

/// A node together with its raw record and the graph that owns it.
#[derive(Debug, Clone, Copy)]
pub struct Entity<'g> {
    graph: &'g Graph,
    node: &'g Node,
    raw: &'g StepEntity,
}

impl<'g> Entity<'g> {
    pub(crate) fn new(graph: &'g Graph, node: &'g Node, raw: &'g StepEntity) -> Self {
        Self { graph, node, raw }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.node.id
    }

    /// Raw IFC type tag, e.g. `IFCBUILDINGSTOREY`.
    #[must_use]
    pub fn entity_type(&self) -> &'g str {
        &self.raw.entity_type
    }

    #[must_use]
    pub fn kind(&self) -> &'g NodeKind {
        &self.node.kind
    }

    #[must_use]
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    #[must_use]
    pub fn attribute(&self, index: usize) -> Option<&'g StepValue> {
        self.raw.get(index)
    }

    #[must_use]
    pub fn attributes(&self) -> &'g [StepValue] {
        &self.raw.values
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        is_root_shape(&self.raw.values)
    }

    fn root_text(&self, index: usize) -> Option<&'g str> {
        if self.is_root() {
            self.attribute(index).and_then(StepValue::as_str)
        } else {
            None
        }
    }

    #[must_use]
    pub fn guid(&self) -> Option<&'g str> {
        self.root_text(0)
    }

    /// Owning history reference, when the record is a root and has one.
    #[must_use]
    pub fn owner_id(&self) -> Option<u64> {
        if self.is_root() {
            self.attribute(1).and_then(StepValue::as_reference)
        } else {
            None
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&'g str> {
        self.root_text(2)
    }

    #[must_use]
    pub fn description(&self) -> Option<&'g str> {
        self.root_text(3)
    }

    #[must_use]
    pub fn project_details(&self) -> Option<&'g ProjectDetails> {
        match &self.node.kind {
            NodeKind::Project(details) => Some(details),
            _ => None,
        }
    }

    #[must_use]
    pub fn spatial_details(&self) -> Option<&'g SpatialDetails> {
        match &self.node.kind {
            NodeKind::SpatialStructure(details) => Some(details),
            _ => None,
        }
    }
}
