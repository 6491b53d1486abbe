pub mod csv;
pub mod json;

pub use crate::error::ExportError;
pub use self::csv::{export_csv, CsvSink};
pub use self::json::{export_json, JsonSink};

use crate::model::TreeNode;

/// Accepts a projected tree and ships it onward.
pub trait Sink {
    fn accept(&mut self, tree: &TreeNode) -> Result<(), ExportError>;
}

fn create_file(path: &std::path::Path) -> Result<std::fs::File, ExportError> {
    std::fs::File::create(path).map_err(|source| ExportError::FileCreate {
        path: path.to_path_buf(),
        source,
    })
}
