use std::io::Write;
use std::path::Path;

use super::{create_file, Sink};
use crate::error::ExportError;
use crate::model::TreeNode;

/// Writes the tree as pretty-printed JSON.
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for JsonSink<W> {
    fn accept(&mut self, tree: &TreeNode) -> Result<(), ExportError> {
        serde_json::to_writer_pretty(&mut self.writer, tree)?;
        self.writer
            .write_all(b"\n")
            .and_then(|()| self.writer.flush())
            .map_err(|e| ExportError::WriteError {
                message: e.to_string(),
            })
    }
}

pub fn export_json<P: AsRef<Path>>(tree: &TreeNode, path: P) -> Result<(), ExportError> {
    let file = create_file(path.as_ref())?;
    JsonSink::new(std::io::BufWriter::new(file)).accept(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyBag;

    #[test]
    fn writes_nested_children() {
        let tree = TreeNode {
            id: Some("p".to_string()),
            express_id: 1,
            name: "Project".to_string(),
            ifc_type: "IFCPROJECT".to_string(),
            details: None,
            properties: PropertyBag::new(),
            geometry: Vec::new(),
            children: vec![TreeNode {
                id: None,
                express_id: 2,
                name: "IFCSITE #2".to_string(),
                ifc_type: "IFCSITE".to_string(),
                details: None,
                properties: PropertyBag::new(),
                geometry: Vec::new(),
                children: Vec::new(),
            }],
        };

        let mut sink = JsonSink::new(Vec::new());
        sink.accept(&tree).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&sink.into_inner()).unwrap();
        assert_eq!(value["children"][0]["ifc_type"], "IFCSITE");
        assert!(value["children"][0]["id"].is_null());
    }
}
