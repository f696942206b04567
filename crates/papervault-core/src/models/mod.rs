//! Data models for the application
//!
//! Papers own their files; feedback and subjects are independent records.

mod feedback;
mod ingest;
mod paper;
mod subject;

pub use feedback::*;
pub use ingest::*;
pub use paper::*;
pub use subject::*;
