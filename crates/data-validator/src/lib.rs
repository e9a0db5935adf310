//! Accident Record Validation
//!
//! Range checking for the continuous weather measurements of a raw record,
//! reported per field.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ValidationConfig, ValidationResult, Validator};
