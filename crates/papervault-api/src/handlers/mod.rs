pub mod admin;
pub mod feedback;
pub mod papers;
pub mod subjects;
pub mod upload;
pub mod votes;
