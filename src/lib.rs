//! # IFC Tree
//!
//! Turns an IFC building model stored as STEP text into a rooted,
//! property-enriched object tree ready for a generic serializer.
//!
//! ## Pipeline
//!
//! - [`parser`]: the instance store, one raw record per `#id=TYPE(...)` line
//! - [`graph`]: typed nodes, relations and the property-set index
//! - [`projector`]: walks from the project root, merging aggregation and
//!   spatial containment into one de-duplicated tree
//! - [`export`]: JSON and CSV sinks
//!
//! Geometry is supplied by the caller through [`model::GeometrySource`].
//!
//! ## Example
//!
//! ```no_run
//! use ifc_tree::model::NoGeometry;
//! use ifc_tree::convert_ifc_file;
//!
//! let tree = convert_ifc_file("model.ifc", &NoGeometry).expect("Failed to convert");
//! println!("Project: {}", tree.name);
//! println!("Nodes: {}", tree.count());
//! ```

pub mod convert;
pub mod error;
pub mod export;
pub mod graph;
pub mod model;
pub mod parser;
pub mod projector;

pub use convert::{convert_ifc_file, load_ifc_file};
pub use graph::Graph;
pub use projector::{project, Projector, ProjectorOptions};
