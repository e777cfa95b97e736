//! Config namespace.

mod service;

pub use service::ServiceConfig;
