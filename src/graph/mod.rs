mod authoring;
pub mod conversion;
pub mod definition;
pub mod validator;

pub use conversion::*;
pub use definition::*;
pub use validator::{ValidationIssue, ValidationReport, validate, validate_connection};
