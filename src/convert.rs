use std::path::Path;

use crate::error::Error;
use crate::graph::Graph;
use crate::model::{GeometrySource, TreeNode};
use crate::parser::StepFile;
use crate::projector::Projector;

/// Reads an IFC file and builds its entity graph.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the file cannot be read or is not STEP.
/// Returns [`Error::Graph`] if the model has no single project or a relation is malformed.
///
/// # Example
///
/// ```no_run
/// use ifc_tree::load_ifc_file;
///
/// let graph = load_ifc_file("model.ifc")?;
/// println!("{} nodes", graph.node_count());
/// # Ok::<(), ifc_tree::error::Error>(())
/// ```
pub fn load_ifc_file<P: AsRef<Path>>(path: P) -> Result<Graph, Error> {
    let store = StepFile::open(path)?;
    Ok(Graph::build(store)?)
}

/// Reads an IFC file and projects it into a tree in one call.
pub fn convert_ifc_file<P: AsRef<Path>>(
    path: P,
    geometry: &dyn GeometrySource,
) -> Result<TreeNode, Error> {
    let graph = load_ifc_file(path)?;
    Ok(Projector::new(&graph, geometry).project()?)
}
