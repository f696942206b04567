//! Database repositories for data access layer
//!
//! Each store is a trait so the services can run against Postgres in
//! production and against the in-memory stores in tests.

pub mod feedback;
#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;
pub mod papers;
pub mod subjects;

pub use feedback::{FeedbackRepository, FeedbackStore};
pub use papers::{PaperRepository, PaperStore};
pub use subjects::{SubjectRepository, SubjectStore};
