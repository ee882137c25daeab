pub mod profession;
pub mod submission;
pub mod task;
