//! Static classification of IFC type tags into the node shapes the graph understands.
//!
//! Every type the graph treats specially is listed in [`SHAPES`]; anything else
//! becomes a generic node.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

/// The IFC property and quantity subtypes, each holding its value in a different slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyForm {
    /// `IfcPropertySingleValue.NominalValue`
    Single,
    /// `IfcPropertyEnumeratedValue.EnumerationValues`
    Enumerated,
    /// `IfcPropertyReferenceValue.PropertyReference`
    Reference,
    /// `IfcPropertyListValue.ListValues`
    List,
    /// `IfcComplexProperty.HasProperties`
    Complex,
    /// `IfcPhysicalSimpleQuantity` subtypes: the measure follows `Unit`.
    Quantity,
}

impl PropertyForm {
    #[must_use]
    pub const fn value_slot(self) -> usize {
        match self {
            PropertyForm::Single | PropertyForm::Enumerated | PropertyForm::List => 2,
            PropertyForm::Reference | PropertyForm::Complex | PropertyForm::Quantity => 3,
        }
    }
}

/// What a record becomes in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Property(PropertyForm),
    /// Property set or element quantity; `list_slot` holds the property ids.
    PropertySet { list_slot: usize },
    Aggregation,
    SpatialContainment,
    PropertyAttachment,
    Project,
    SpatialStructure,
}

/// Type tag to shape.
pub const SHAPES: &[(&str, Shape)] = &[
    // Properties
    ("IFCPROPERTYSINGLEVALUE", Shape::Property(PropertyForm::Single)),
    ("IFCPROPERTYENUMERATEDVALUE", Shape::Property(PropertyForm::Enumerated)),
    ("IFCPROPERTYREFERENCEVALUE", Shape::Property(PropertyForm::Reference)),
    ("IFCPROPERTYLISTVALUE", Shape::Property(PropertyForm::List)),
    ("IFCCOMPLEXPROPERTY", Shape::Property(PropertyForm::Complex)),
    // Quantities
    ("IFCQUANTITYLENGTH", Shape::Property(PropertyForm::Quantity)),
    ("IFCQUANTITYAREA", Shape::Property(PropertyForm::Quantity)),
    ("IFCQUANTITYVOLUME", Shape::Property(PropertyForm::Quantity)),
    ("IFCQUANTITYCOUNT", Shape::Property(PropertyForm::Quantity)),
    ("IFCQUANTITYWEIGHT", Shape::Property(PropertyForm::Quantity)),
    // Property containers
    ("IFCPROPERTYSET", Shape::PropertySet { list_slot: 4 }),
    ("IFCELEMENTQUANTITY", Shape::PropertySet { list_slot: 5 }),
    // Relations
    ("IFCRELAGGREGATES", Shape::Aggregation),
    ("IFCRELCONTAINEDINSPATIALSTRUCTURE", Shape::SpatialContainment),
    ("IFCRELDEFINESBYPROPERTIES", Shape::PropertyAttachment),
    // Roots
    ("IFCPROJECT", Shape::Project),
    ("IFCSITE", Shape::SpatialStructure),
    ("IFCBUILDING", Shape::SpatialStructure),
    ("IFCBUILDINGSTOREY", Shape::SpatialStructure),
    ("IFCSPACE", Shape::SpatialStructure),
    ("IFCFACILITY", Shape::SpatialStructure),
    ("IFCFACILITYPART", Shape::SpatialStructure),
    ("IFCFACILITYPARTCOMMON", Shape::SpatialStructure),
    ("IFCBRIDGE", Shape::SpatialStructure),
    ("IFCBRIDGEPART", Shape::SpatialStructure),
    ("IFCROAD", Shape::SpatialStructure),
    ("IFCROADPART", Shape::SpatialStructure),
    ("IFCRAILWAY", Shape::SpatialStructure),
    ("IFCRAILWAYPART", Shape::SpatialStructure),
    ("IFCMARINEFACILITY", Shape::SpatialStructure),
    ("IFCMARINEPART", Shape::SpatialStructure),
];

/// Shape for an uppercase type tag, or `None` for a generic node.
#[must_use]
pub fn classify(entity_type: &str) -> Option<Shape> {
    static TABLE: OnceLock<FxHashMap<&'static str, Shape>> = OnceLock::new();
    TABLE
        .get_or_init(|| SHAPES.iter().copied().collect())
        .get(entity_type)
        .copied()
}
