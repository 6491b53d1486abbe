//! Error types for IFC tree conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading STEP files.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read the IFC file from disk.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The STEP format is invalid or malformed.
    #[error("invalid STEP format: {message}")]
    InvalidStep { message: String },
}

/// Fatal errors raised while building the entity graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// No IFCPROJECT record exists, so there is no root to project from.
    #[error("no IFCPROJECT entity found")]
    MissingProject,

    /// More than one IFCPROJECT record exists.
    #[error("ambiguous project root: #{first} and #{second} are both IFCPROJECT")]
    AmbiguousProject { first: u64, second: u64 },

    /// A relation record does not have the shape its schema requires.
    #[error("malformed relation #{id} ({entity_type}): {reason}")]
    MalformedRelation {
        id: u64,
        entity_type: String,
        reason: String,
    },

    /// A record could not be converted into its specialized node.
    #[error("cannot convert #{id} ({entity_type}): {message}")]
    Conversion {
        id: u64,
        entity_type: String,
        message: String,
    },
}

/// Errors raised while projecting the graph into a tree.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// A node was reached again below itself through aggregation or containment.
    #[error("cycle detected: #{id} is its own ancestor")]
    Cycle { id: u64 },

    /// The node to project from is not part of the graph.
    #[error("node #{id} is not in the graph")]
    MissingNode { id: u64 },
}

/// Errors that can occur when exporting data.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to create the output file.
    #[error("failed to create file '{path}': {source}")]
    FileCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write data to the output.
    #[error("failed to write data: {message}")]
    WriteError { message: String },

    /// Failed to serialize data to JSON.
    #[error("JSON serialization failed: {source}")]
    JsonSerialize {
        #[from]
        source: serde_json::Error,
    },

    /// Failed to write CSV data.
    #[error("CSV write failed: {source}")]
    CsvWrite {
        #[from]
        source: csv::Error,
    },
}

/// Any failure of the one-call conversion helpers.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
