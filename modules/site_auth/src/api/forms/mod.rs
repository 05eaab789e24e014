//! Page-facing layer: form values in, presenter updates out.

pub mod dto;
pub mod handlers;

pub use dto::{ids, FieldValues};
pub use handlers::SiteForms;
