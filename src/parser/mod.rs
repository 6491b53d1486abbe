pub mod step;

pub use crate::error::ParseError;
pub use step::{StepEntity, StepFile, StepValue};
