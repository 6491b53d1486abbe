//! One-to-many relation records.
//!
//! Aggregation and spatial containment store their endpoints in opposite
//! attribute slots, so each relation kind has its own constructor.

use crate::error::GraphError;
use crate::graph::entity::is_root_shape;
use crate::parser::{StepEntity, StepValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// `IfcRelAggregates`: whole to parts.
    Aggregation,
    /// `IfcRelContainedInSpatialStructure`: spatial element to contained elements.
    SpatialContainment,
    /// `IfcRelDefinesByProperties`: property set to the objects carrying it.
    PropertyAttachment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub id: u64,
    pub kind: RelationKind,
    pub from: u64,
    pub to: Vec<u64>,
}

impl Relation {
    /// RelatingObject at 4, RelatedObjects at 5.
    pub fn aggregation(entity: &StepEntity) -> Result<Self, GraphError> {
        const RELATING_OBJECT: usize = 4;
        const RELATED_OBJECTS: usize = 5;

        let edge = Edge::read(entity, RELATING_OBJECT, RELATED_OBJECTS)?;
        Ok(edge.into_relation(entity.id, RelationKind::Aggregation))
    }

    /// RelatedElements at 4, RelatingStructure at 5.
    pub fn spatial_containment(entity: &StepEntity) -> Result<Self, GraphError> {
        const RELATED_ELEMENTS: usize = 4;
        const RELATING_STRUCTURE: usize = 5;

        let edge = Edge::read(entity, RELATING_STRUCTURE, RELATED_ELEMENTS)?;
        Ok(edge.into_relation(entity.id, RelationKind::SpatialContainment))
    }

    /// RelatedObjects at 4, RelatingPropertyDefinition at 5.
    pub fn property_attachment(entity: &StepEntity) -> Result<Self, GraphError> {
        const RELATED_OBJECTS: usize = 4;
        const RELATING_PROPERTY_DEFINITION: usize = 5;

        let edge = Edge::read(entity, RELATING_PROPERTY_DEFINITION, RELATED_OBJECTS)?;
        Ok(edge.into_relation(entity.id, RelationKind::PropertyAttachment))
    }
}

struct Edge {
    from: u64,
    to: Vec<u64>,
}

impl Edge {
    fn read(entity: &StepEntity, from_slot: usize, to_slot: usize) -> Result<Self, GraphError> {
        let malformed = |reason: String| GraphError::MalformedRelation {
            id: entity.id,
            entity_type: entity.entity_type.clone(),
            reason,
        };

        if !is_root_shape(&entity.values) {
            return Err(malformed(
                "attributes 0-3 do not have the IfcRoot layout".to_string(),
            ));
        }

        let from = entity
            .get(from_slot)
            .and_then(StepValue::as_reference)
            .ok_or_else(|| malformed(format!("attribute {from_slot} is not a reference")))?;

        let items = entity
            .get(to_slot)
            .and_then(StepValue::as_list)
            .ok_or_else(|| malformed(format!("attribute {to_slot} is not a list")))?;

        let to = items
            .iter()
            .map(|item| {
                item.as_reference().ok_or_else(|| {
                    malformed(format!("attribute {to_slot} contains a non-reference item"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { from, to })
    }

    fn into_relation(self, id: u64, kind: RelationKind) -> Relation {
        Relation {
            id,
            kind,
            from: self.from,
            to: self.to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn relation_record(entity_type: &str, slot4: StepValue, slot5: StepValue) -> StepEntity {
        StepEntity {
            id: 30,
            entity_type: entity_type.to_string(),
            values: vec![
                StepValue::String("rel".to_string()),
                StepValue::Null,
                StepValue::Null,
                StepValue::Null,
                slot4,
                slot5,
            ],
        }
    }

    fn refs(ids: &[u64]) -> StepValue {
        StepValue::List(ids.iter().copied().map(StepValue::Reference).collect())
    }

    #[test]
    fn aggregation_and_containment_read_opposite_slots() {
        // Same raw ordering for both: a single reference at 4, a list at 5.
        let aggregation = relation_record(
            "IFCRELAGGREGATES",
            StepValue::Reference(1),
            refs(&[2, 3]),
        );
        let rel = Relation::aggregation(&aggregation).unwrap();
        assert_eq!((rel.from, rel.to), (1, vec![2, 3]));

        // Spatial containment with that layout is a schema violation: 5 must be the structure.
        let containment = relation_record(
            "IFCRELCONTAINEDINSPATIALSTRUCTURE",
            StepValue::Reference(1),
            refs(&[2, 3]),
        );
        assert!(Relation::spatial_containment(&containment).is_err());

        // Canonical containment layout decodes with from/to swapped relative to aggregation.
        let containment = relation_record(
            "IFCRELCONTAINEDINSPATIALSTRUCTURE",
            refs(&[2, 3]),
            StepValue::Reference(1),
        );
        let rel = Relation::spatial_containment(&containment).unwrap();
        assert_eq!(rel.kind, RelationKind::SpatialContainment);
        assert_eq!((rel.from, rel.to), (1, vec![2, 3]));
    }

    #[test]
    fn property_attachment_reads_definition_from_slot_five() {
        let record = relation_record(
            "IFCRELDEFINESBYPROPERTIES",
            refs(&[4, 5]),
            StepValue::Reference(9),
        );
        let rel = Relation::property_attachment(&record).unwrap();
        assert_eq!(rel.from, 9);
        assert_eq!(rel.to, vec![4, 5]);
    }

    #[test]
    fn to_attribute_must_be_a_list() {
        let record = relation_record(
            "IFCRELAGGREGATES",
            StepValue::Reference(1),
            StepValue::Reference(2),
        );
        let err = Relation::aggregation(&record).unwrap_err();
        assert!(matches!(
            err,
            GraphError::MalformedRelation { id: 30, ref reason, .. } if reason.contains("not a list")
        ));
    }

    #[test]
    fn relation_must_be_a_root() {
        let mut record = relation_record("IFCRELAGGREGATES", StepValue::Reference(1), refs(&[2]));
        record.values[0] = StepValue::Null;
        assert!(matches!(
            Relation::aggregation(&record),
            Err(GraphError::MalformedRelation { .. })
        ));
    }
}
