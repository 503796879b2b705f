pub mod entities;
pub mod errors;
pub mod model;
pub mod ports;
pub mod schema;

pub use entities::*;
pub use errors::{DomainError, StoreError, ValidationError, Violation};
pub use model::{overlay, Fields, Location, Model, ID_FIELD, UPDATED_AT_FIELD};
pub use schema::{FieldRule, Schema};
