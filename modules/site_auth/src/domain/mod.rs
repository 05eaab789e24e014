pub mod error;
pub mod messages;
pub mod ports;
pub mod repo;
pub mod service;
pub mod session;
pub mod ui;
pub mod validation;
