//! PaperVault persistence
//!
//! Store traits used by the services, their Postgres implementations, and
//! in-memory implementations behind the `test-helpers` feature.

pub mod db;

pub use db::{
    FeedbackRepository, FeedbackStore, PaperRepository, PaperStore, SubjectRepository,
    SubjectStore,
};

#[cfg(any(test, feature = "test-helpers"))]
pub use db::memory::{InMemoryFeedbackStore, InMemoryPaperStore, InMemorySubjectStore};
