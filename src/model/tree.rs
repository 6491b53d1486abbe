use std::collections::BTreeMap;

use serde::Serialize;

use super::{Mesh, Primitive};
use crate::graph::{ProjectDetails, SpatialDetails};

/// Property set name -> property name -> value.
pub type PropertyBag = BTreeMap<String, BTreeMap<String, Primitive>>;

/// Fields only the project root and spatial structure elements carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "root_kind", rename_all = "snake_case")]
pub enum RootDetails {
    Project(ProjectDetails),
    SpatialStructure(SpatialDetails),
}

/// One record of the projected tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    /// GlobalId when the entity is a root entity.
    pub id: Option<String>,
    pub express_id: u64,
    pub name: String,
    /// Raw IFC type tag.
    pub ifc_type: String,
    #[serde(skip_serializing_if = "Option::is_none", flatten)]
    pub details: Option<RootDetails>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: PropertyBag,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub geometry: Vec<Mesh>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Depth-first, pre-order iteration over this node and its descendants.
    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter { stack: vec![self] }
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    #[must_use]
    pub fn find_by_guid(&self, guid: &str) -> Option<&TreeNode> {
        self.iter().find(|node| node.id.as_deref() == Some(guid))
    }
}

impl<'a> IntoIterator for &'a TreeNode {
    type Item = &'a TreeNode;
    type IntoIter = TreeIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct TreeIter<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
