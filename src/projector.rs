//! Projects the entity graph into a rooted tree, starting at the project.
//!
//! Children are the aggregated and spatially contained elements of a node,
//! merged without duplicates. A node met again on its own ancestor path is a
//! [`ProjectionError::Cycle`].

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::ProjectionError;
use crate::graph::{Entity, Graph};
use crate::model::{
    DefaultFormatter, GeometrySource, PropertyBag, RootDetails, TreeNode, ValueFormatter,
};

/// What to attach to each projected node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectorOptions {
    pub include_properties: bool,
    pub include_geometry: bool,
}

impl Default for ProjectorOptions {
    fn default() -> Self {
        Self {
            include_properties: true,
            include_geometry: true,
        }
    }
}

/// Projects `graph` with the default value formatter and options.
pub fn project(
    graph: &Graph,
    geometry: &dyn GeometrySource,
) -> Result<TreeNode, ProjectionError> {
    Projector::new(graph, geometry).project()
}

pub struct Projector<'a> {
    graph: &'a Graph,
    geometry: &'a dyn GeometrySource,
    formatter: &'a dyn ValueFormatter,
    options: ProjectorOptions,
}

impl<'a> Projector<'a> {
    #[must_use]
    pub fn new(graph: &'a Graph, geometry: &'a dyn GeometrySource) -> Self {
        Self {
            graph,
            geometry,
            formatter: &DefaultFormatter,
            options: ProjectorOptions::default(),
        }
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: &'a dyn ValueFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ProjectorOptions) -> Self {
        self.options = options;
        self
    }

    /// Projects the tree rooted at the project node.
    pub fn project(&self) -> Result<TreeNode, ProjectionError> {
        self.project_from(self.graph.project_id())
    }

    /// Projects the subtree rooted at `id`.
    pub fn project_from(&self, id: u64) -> Result<TreeNode, ProjectionError> {
        let root = self
            .graph
            .node(id)
            .ok_or(ProjectionError::MissingNode { id })?;
        let mut ancestors = FxHashSet::default();
        let tree = self.visit(root, &mut ancestors)?;
        debug!(root = id, nodes = tree.count(), "projected tree");
        Ok(tree)
    }

    fn visit(
        &self,
        entity: Entity<'a>,
        ancestors: &mut FxHashSet<u64>,
    ) -> Result<TreeNode, ProjectionError> {
        let id = entity.id();
        if !ancestors.insert(id) {
            return Err(ProjectionError::Cycle { id });
        }

        let children = self
            .graph
            .children(id)
            .into_iter()
            .map(|child| self.visit(child, ancestors))
            .collect::<Result<Vec<_>, _>>()?;

        ancestors.remove(&id);

        let guid = entity.guid().map(str::to_string);
        let name = entity
            .name()
            .map(str::to_string)
            .or_else(|| guid.clone())
            .unwrap_or_else(|| format!("{} #{}", entity.entity_type(), id));

        let details = if let Some(project) = entity.project_details() {
            Some(RootDetails::Project(project.clone()))
        } else {
            entity
                .spatial_details()
                .map(|spatial| RootDetails::SpatialStructure(spatial.clone()))
        };

        let properties = if self.options.include_properties {
            self.property_bag(id)
        } else {
            PropertyBag::new()
        };

        let geometry = if self.options.include_geometry {
            self.geometry.get_geometry(id)
        } else {
            Vec::new()
        };

        Ok(TreeNode {
            id: guid,
            express_id: id,
            name,
            ifc_type: entity.entity_type().to_string(),
            details,
            properties,
            geometry,
            children,
        })
    }

    /// One sub-bag per attached set; sets with nothing to render are left out.
    fn property_bag(&self, id: u64) -> PropertyBag {
        let mut bag = PropertyBag::new();

        for set in self.graph.property_sets(id) {
            let values: BTreeMap<_, _> = set
                .properties()
                .into_iter()
                .filter_map(|(name, value)| Some((name, self.formatter.to_primitive(&value)?)))
                .collect();
            if values.is_empty() {
                continue;
            }

            let set_name = set
                .name()
                .map_or_else(|| format!("PropertySet #{}", set.id()), str::to_string);
            bag.entry(set_name).or_default().extend(values);
        }

        bag
    }
}
