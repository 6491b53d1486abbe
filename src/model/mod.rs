pub mod geometry;
pub mod tree;
pub mod value;

pub use geometry::{GeometrySource, Mesh, NoGeometry, IDENTITY};
pub use tree::{PropertyBag, RootDetails, TreeIter, TreeNode};
pub use value::{DefaultFormatter, Primitive, ValueFormatter};
