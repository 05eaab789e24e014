pub mod client;
pub mod error;
pub mod model;

pub use client::SiteAuthApi;
pub use error::SiteAuthError;
pub use model::*;
