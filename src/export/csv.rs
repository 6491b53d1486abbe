use std::io::Write;
use std::path::Path;

use super::{create_file, Sink};
use crate::error::ExportError;
use crate::model::TreeNode;

/// Writes one row per tree node, parents before children.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    pub fn into_inner(self) -> Result<W, ExportError> {
        self.writer.into_inner().map_err(|e| ExportError::WriteError {
            message: e.to_string(),
        })
    }

    fn write_node(
        &mut self,
        node: &TreeNode,
        parent: Option<u64>,
        depth: usize,
    ) -> Result<(), ExportError> {
        self.writer.write_record([
            node.express_id.to_string(),
            parent.map(|p| p.to_string()).unwrap_or_default(),
            node.id.clone().unwrap_or_default(),
            node.ifc_type.clone(),
            node.name.clone(),
            depth.to_string(),
            node.properties.len().to_string(),
            node.geometry.len().to_string(),
        ])?;

        for child in &node.children {
            self.write_node(child, Some(node.express_id), depth + 1)?;
        }
        Ok(())
    }
}

impl<W: Write> Sink for CsvSink<W> {
    fn accept(&mut self, tree: &TreeNode) -> Result<(), ExportError> {
        self.writer.write_record([
            "Express ID",
            "Parent ID",
            "Global ID",
            "IFC Type",
            "Name",
            "Depth",
            "Property Sets",
            "Meshes",
        ])?;
        self.write_node(tree, None, 0)?;

        self.writer.flush().map_err(|e| ExportError::WriteError {
            message: e.to_string(),
        })
    }
}

pub fn export_csv<P: AsRef<Path>>(tree: &TreeNode, path: P) -> Result<(), ExportError> {
    let file = create_file(path.as_ref())?;
    CsvSink::new(file).accept(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyBag;
    use pretty_assertions::assert_eq;

    fn node(express_id: u64, name: &str, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            id: Some(format!("g{express_id}")),
            express_id,
            name: name.to_string(),
            ifc_type: "IFCBUILDINGSTOREY".to_string(),
            details: None,
            properties: PropertyBag::new(),
            geometry: Vec::new(),
            children,
        }
    }

    #[test]
    fn rows_carry_parent_and_depth() {
        let tree = node(1, "Root", vec![node(2, "Level, 1", vec![node(3, "Leaf", vec![])])]);
        let mut sink = CsvSink::new(Vec::new());
        sink.accept(&tree).unwrap();
        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "1,,g1,IFCBUILDINGSTOREY,Root,0,0,0");
        assert_eq!(lines[2], "2,1,g2,IFCBUILDINGSTOREY,\"Level, 1\",1,0,0");
        assert_eq!(lines[3], "3,2,g3,IFCBUILDINGSTOREY,Leaf,2,0,0");
    }
}
