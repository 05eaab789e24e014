pub mod document_repo;
pub mod mapper;

pub use document_repo::{DocumentContactsRepository, DocumentProfilesRepository};
