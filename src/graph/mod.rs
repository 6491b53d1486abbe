//! Entity/relation graph built from a STEP instance store.
//!
//! Construction is a single forward pass over the valid records. Every record
//! enters the node table through `GraphBuilder::materialize`, an insert-if-absent
//! step that is also used for relation endpoints not yet reached by the pass.
//! After construction the graph is read-only.

pub mod entity;
pub mod property;
pub mod relation;
pub mod schema;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::error::GraphError;
use crate::parser::{StepFile, StepValue};

pub use entity::{Entity, Node, NodeKind, ProjectDetails, SpatialDetails};
pub use property::{PropertySet, PropertyValue};
pub use relation::{Relation, RelationKind};
pub use schema::{classify, PropertyForm, Shape};

#[derive(Debug)]
pub struct Graph {
    store: StepFile,
    nodes: FxHashMap<u64, Node>,
    relations: Vec<Relation>,
    /// from-id -> indices into `relations`
    outgoing: FxHashMap<u64, Vec<usize>>,
    /// node id -> attached property set ids
    attached_sets: FxHashMap<u64, Vec<u64>>,
    project_id: u64,
}

impl Graph {
    /// Builds the graph, taking ownership of the parsed records.
    pub fn build(store: StepFile) -> Result<Self, GraphError> {
        let parts = GraphBuilder::new(&store).run()?;

        let graph = Self {
            store,
            nodes: parts.nodes,
            relations: parts.relations,
            outgoing: parts.outgoing,
            attached_sets: parts.attached_sets,
            project_id: parts.project_id,
        };

        debug!(
            nodes = graph.nodes.len(),
            relations = graph.relations.len(),
            attached = graph.attached_sets.len(),
            project = graph.project_id,
            "built entity graph"
        );
        Ok(graph)
    }

    #[must_use]
    pub fn store(&self) -> &StepFile {
        &self.store
    }

    #[must_use]
    pub fn project_id(&self) -> u64 {
        self.project_id
    }

    /// The single IFCPROJECT node; always present in a built graph.
    #[must_use]
    pub fn project(&self) -> Option<Entity<'_>> {
        self.node(self.project_id)
    }

    #[must_use]
    pub fn node(&self, id: u64) -> Option<Entity<'_>> {
        let node = self.nodes.get(&id)?;
        let raw = self.store.get_entity(id)?;
        Some(Entity::new(self, node, raw))
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Relations whose "from" end is `id`, in file order.
    pub fn outgoing_relations(&self, id: u64) -> impl Iterator<Item = &Relation> {
        self.outgoing
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|&index| self.relations.get(index))
    }

    fn children_by_kind(&self, id: u64, kind: RelationKind) -> Vec<Entity<'_>> {
        self.outgoing_relations(id)
            .filter(|rel| rel.kind == kind)
            .flat_map(|rel| rel.to.iter())
            .filter_map(|&child| self.node(child))
            .collect()
    }

    #[must_use]
    pub fn aggregated_children(&self, id: u64) -> Vec<Entity<'_>> {
        self.children_by_kind(id, RelationKind::Aggregation)
    }

    #[must_use]
    pub fn spatial_children(&self, id: u64) -> Vec<Entity<'_>> {
        self.children_by_kind(id, RelationKind::SpatialContainment)
    }

    /// Aggregated then spatially contained children, each id at most once.
    #[must_use]
    pub fn children(&self, id: u64) -> Vec<Entity<'_>> {
        let mut seen = FxHashSet::default();
        self.aggregated_children(id)
            .into_iter()
            .chain(self.spatial_children(id))
            .filter(|child| seen.insert(child.id()))
            .collect()
    }

    /// Property sets attached to `id`; empty when it carries none.
    #[must_use]
    pub fn property_sets(&self, id: u64) -> Vec<PropertySet<'_>> {
        self.attached_sets
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|&set_id| self.node(set_id))
            .filter_map(PropertySet::from_entity)
            .collect()
    }
}

struct GraphParts {
    nodes: FxHashMap<u64, Node>,
    relations: Vec<Relation>,
    outgoing: FxHashMap<u64, Vec<usize>>,
    attached_sets: FxHashMap<u64, Vec<u64>>,
    project_id: u64,
}

struct GraphBuilder<'s> {
    store: &'s StepFile,
    nodes: FxHashMap<u64, Node>,
    relations: Vec<Relation>,
    outgoing: FxHashMap<u64, Vec<usize>>,
    project_id: Option<u64>,
    /// Relation endpoints waiting to be materialized.
    pending: Vec<u64>,
}

impl<'s> GraphBuilder<'s> {
    fn new(store: &'s StepFile) -> Self {
        Self {
            store,
            nodes: FxHashMap::default(),
            relations: Vec::new(),
            outgoing: FxHashMap::default(),
            project_id: None,
            pending: Vec::new(),
        }
    }

    fn run(mut self) -> Result<GraphParts, GraphError> {
        let store = self.store;
        for entity in store.valid_instances() {
            self.materialize(entity.id)?;
            while let Some(endpoint) = self.pending.pop() {
                self.materialize(endpoint)?;
            }
        }

        let project_id = self.project_id.ok_or(GraphError::MissingProject)?;
        let attached_sets = self.invert_property_attachments();

        Ok(GraphParts {
            nodes: self.nodes,
            relations: self.relations,
            outgoing: self.outgoing,
            attached_sets,
            project_id,
        })
    }

    /// Inserts the node for `id` unless it is already present.
    ///
    /// Returns `false` when the store has no record for `id`.
    fn materialize(&mut self, id: u64) -> Result<bool, GraphError> {
        if self.nodes.contains_key(&id) {
            return Ok(true);
        }
        let store = self.store;
        let Some(entity) = store.get_entity(id) else {
            return Ok(false);
        };

        let kind = match classify(&entity.entity_type) {
            None => NodeKind::Generic,
            Some(Shape::Property(form)) => NodeKind::Property(form),
            Some(Shape::PropertySet { list_slot }) => {
                let property_ids = match entity.get(list_slot).and_then(StepValue::as_list) {
                    Some(items) => items.iter().filter_map(StepValue::as_reference).collect(),
                    None => {
                        warn!(id, entity_type = %entity.entity_type, "property list is not a list");
                        Vec::new()
                    }
                };
                NodeKind::PropertySet { property_ids }
            }
            Some(Shape::Aggregation) => self.add_relation(Relation::aggregation(entity)?),
            Some(Shape::SpatialContainment) => {
                self.add_relation(Relation::spatial_containment(entity)?)
            }
            Some(Shape::PropertyAttachment) => {
                self.add_relation(Relation::property_attachment(entity)?)
            }
            Some(Shape::Project) => {
                let details = ProjectDetails::from_entity(entity)?;
                if let Some(first) = self.project_id {
                    return Err(GraphError::AmbiguousProject { first, second: id });
                }
                self.project_id = Some(id);
                NodeKind::Project(details)
            }
            Some(Shape::SpatialStructure) => {
                NodeKind::SpatialStructure(SpatialDetails::from_entity(entity)?)
            }
        };

        self.nodes.insert(id, Node { id, kind });
        Ok(true)
    }

    fn add_relation(&mut self, relation: Relation) -> NodeKind {
        let index = self.relations.len();
        for &endpoint in std::iter::once(&relation.from).chain(&relation.to) {
            if self.store.get_entity(endpoint).is_none() {
                warn!(relation = relation.id, endpoint, "relation refers to a missing record");
            } else if !self.nodes.contains_key(&endpoint) {
                self.pending.push(endpoint);
            }
        }
        self.outgoing.entry(relation.from).or_default().push(index);
        self.relations.push(relation);
        NodeKind::Relation(index)
    }

    fn invert_property_attachments(&self) -> FxHashMap<u64, Vec<u64>> {
        let mut attached: FxHashMap<u64, Vec<u64>> = FxHashMap::default();

        for rel in &self.relations {
            if rel.kind != RelationKind::PropertyAttachment {
                continue;
            }
            let is_set = matches!(
                self.nodes.get(&rel.from).map(|n| &n.kind),
                Some(NodeKind::PropertySet { .. })
            );
            if !is_set {
                debug!(relation = rel.id, from = rel.from, "attachment source is not a property set");
                continue;
            }
            for &target in &rel.to {
                attached.entry(target).or_default().push(rel.from);
            }
        }

        attached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build(data: &str) -> Result<Graph, GraphError> {
        let content = format!("ISO-10303-21;\nDATA;\n{data}\nENDSEC;\nEND-ISO-10303-21;\n");
        Graph::build(StepFile::parse(&content).unwrap())
    }

    fn ids(entities: &[Entity<'_>]) -> Vec<u64> {
        entities.iter().map(Entity::id).collect()
    }

    const MODEL: &str = "
#3=IFCRELAGGREGATES('r1',$,$,$,#1,(#2));
#1=IFCPROJECT('p',$,'Project',$,$,'Long',$,$,$);
#2=IFCSITE('s',$,'Site',$,$,$,$,$,.ELEMENT.,$,$,$,$,$);
#4=IFCRELAGGREGATES('r2',$,$,$,#2,(#5));
#5=IFCBUILDINGSTOREY('st',$,'Level 1',$,$,$,$,$,.ELEMENT.,0.);
#6=IFCWALL('w',$,'Wall',$,$,$,$,$,$);
#7=IFCRELCONTAINEDINSPATIALSTRUCTURE('r3',$,$,$,(#6,#8),#5);
#8=IFCSLAB('sl',$,'Slab',$,$,$,$,$,$);
#9=IFCRELAGGREGATES('r4',$,$,$,#5,(#8));
#10=IFCPROPERTYSET('ps',$,'Pset_WallCommon',$,(#11));
#11=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$);
#12=IFCRELDEFINESBYPROPERTIES('r5',$,$,$,(#6,#8),#10);
#13=IFCBEAM('b',$,'Beam',$,$,$,$,$,$);
";

    #[test]
    fn records_the_single_project() {
        let graph = build(MODEL).unwrap();
        assert_eq!(graph.project_id(), 1);
        let project = graph.project().unwrap();
        assert_eq!(project.guid(), Some("p"));
        assert_eq!(
            project.project_details().and_then(|d| d.long_name.as_deref()),
            Some("Long")
        );
    }

    #[test]
    fn missing_project_is_fatal() {
        let err = build("#6=IFCWALL('w',$,'Wall',$,$,$,$,$,$);").unwrap_err();
        assert!(matches!(err, GraphError::MissingProject));
    }

    #[test]
    fn duplicate_project_is_fatal() {
        let err = build(
            "#1=IFCPROJECT('a',$,$,$,$,$,$,$,$);
             #2=IFCPROJECT('b',$,$,$,$,$,$,$,$);",
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::AmbiguousProject { first: 1, second: 2 }));
    }

    #[test]
    fn relation_without_list_is_fatal() {
        let err = build(
            "#1=IFCPROJECT('a',$,$,$,$,$,$,$,$);
             #2=IFCRELAGGREGATES('r',$,$,$,#1,#3);",
        )
        .unwrap_err();
        assert!(matches!(err, GraphError::MalformedRelation { id: 2, .. }));
    }

    #[test]
    fn unknown_types_become_generic_nodes() {
        let graph = build(MODEL).unwrap();
        let beam = graph.node(13).unwrap();
        assert_eq!(beam.kind(), &NodeKind::Generic);
        assert_eq!(beam.entity_type(), "IFCBEAM");
        assert_eq!(beam.name(), Some("Beam"));
    }

    #[test]
    fn forward_references_are_materialized() {
        // #3 refers to #1 and #2 before the pass reaches them.
        let graph = build(MODEL).unwrap();
        assert_eq!(ids(&graph.aggregated_children(1)), vec![2]);
        assert!(matches!(graph.node(2).unwrap().kind(), NodeKind::SpatialStructure(_)));
    }

    #[test]
    fn outgoing_relations_by_source() {
        let graph = build(MODEL).unwrap();
        let kinds: Vec<_> = graph.outgoing_relations(5).map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RelationKind::SpatialContainment, RelationKind::Aggregation]
        );
        assert_eq!(graph.outgoing_relations(6).count(), 0);
    }

    #[test]
    fn children_merge_both_hierarchies_without_duplicates() {
        let graph = build(MODEL).unwrap();
        assert_eq!(ids(&graph.aggregated_children(5)), vec![8]);
        assert_eq!(ids(&graph.spatial_children(5)), vec![6, 8]);
        assert_eq!(ids(&graph.children(5)), vec![8, 6]);
    }

    #[test]
    fn property_sets_come_from_the_inverted_index() {
        let graph = build(MODEL).unwrap();
        let sets = graph.property_sets(6);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name(), Some("Pset_WallCommon"));
        assert_eq!(
            sets[0].properties(),
            vec![("IsExternal".to_string(), PropertyValue::Boolean(true))]
        );
        assert!(graph.property_sets(13).is_empty());
    }

    #[test]
    fn dangling_endpoints_are_dropped_from_children() {
        let graph = build(
            "#1=IFCPROJECT('a',$,$,$,$,$,$,$,$);
             #2=IFCRELAGGREGATES('r',$,$,$,#1,(#3,#4));
             #4=IFCSITE('s',$,$,$,$,$,$,$,$,$,$,$,$,$);",
        )
        .unwrap();
        assert_eq!(ids(&graph.children(1)), vec![4]);
    }
}
