pub mod entities;
pub mod repository;
pub mod value_objects;

pub use entities::{JobRecord, JobSnapshot, NewJob};
pub use repository::{JobRepository, JobStatistics};
pub use value_objects::JobStatus;
